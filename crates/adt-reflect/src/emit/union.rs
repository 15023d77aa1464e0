//! Union emitter
//!
//! Union values are objects whose slot 0 holds the tag and whose remaining
//! slots hold the case fields in order.

use super::{field_mapping, instance_of, Representation, Shape};
use crate::error::HostError;
use crate::host::{
    method_body, AttributeData, ClassBody, FieldDef, MethodDef, PropertyDef,
    SourceConstructFlags, Type, Value,
};

const TAG_SLOT: usize = 0;

/// How the emitted union exposes the tag of a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TagAccess {
    /// Instance `Tag` property
    #[default]
    Property,
    /// Static `GetTag(union)` method
    StaticMethod,
}

#[derive(Debug, Clone)]
struct Case {
    name: String,
    fields: Vec<(String, Type)>,
}

/// Builds a union type
#[derive(Debug, Clone)]
pub struct UnionBuilder {
    shape: Shape,
    tag_access: TagAccess,
    cases: Vec<Case>,
}

impl UnionBuilder {
    /// Start a union declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            shape: Shape::new(name),
            tag_access: TagAccess::default(),
            cases: Vec::new(),
        }
    }

    /// Declare `arity` type parameters, referenced as `Type::param(i)`
    pub fn generic(mut self, arity: usize) -> Self {
        self.shape.arity = arity;
        self
    }

    /// Hide the representation from public reflection
    pub fn non_public_representation(mut self) -> Self {
        self.shape.hidden = true;
        self
    }

    /// Store attributes as data only
    pub fn inspection_only(mut self) -> Self {
        self.shape.inspection_only = true;
        self
    }

    /// Choose how the tag is exposed
    pub fn tag_access(mut self, access: TagAccess) -> Self {
        self.tag_access = access;
        self
    }

    /// Append a case with fields
    pub fn case<I, S>(mut self, name: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = (S, Type)>,
        S: Into<String>,
    {
        self.cases.push(Case {
            name: name.into(),
            fields: fields.into_iter().map(|(n, t)| (n.into(), t)).collect(),
        });
        self
    }

    /// Append a case without fields
    pub fn nullary(mut self, name: impl Into<String>) -> Self {
        self.cases.push(Case {
            name: name.into(),
            fields: Vec::new(),
        });
        self
    }

    /// Emit the union type
    pub fn build(self) -> Type {
        let shape = self.shape;
        let hidden = shape.hidden;
        let union = Type::declare(shape.class_def());
        let self_ty = shape.self_type(&union);
        let single = self.cases.len() == 1;

        let mut body =
            ClassBody::new().with_attribute(shape.mapping(SourceConstructFlags::SUM_TYPE));

        if !single {
            let tags = self
                .cases
                .iter()
                .enumerate()
                .fold(ClassBody::new(), |tags, (tag, case)| {
                    tags.with_field(
                        FieldDef::literal(case.name.as_str(), Type::int(), Value::from(tag as i64))
                            .hidden_if(hidden),
                    )
                });
            body = body.with_nested("Tags", Type::class(shape.nested_def("Tags", 0), tags));
        }

        for (tag, case) in self.cases.iter().enumerate() {
            let props = case.fields.iter().enumerate().map(|(seq, (name, ty))| {
                PropertyDef::slot(name.as_str(), ty.clone(), seq + 1)
                    .with_attribute(field_mapping(tag, seq))
                    .hidden_if(hidden)
            });

            let holder = if case.fields.is_empty() {
                None
            } else if single {
                for prop in props {
                    body = body.with_property(prop);
                }
                None
            } else {
                let case_body = props.fold(
                    ClassBody::new().with_base(self_ty.clone()),
                    ClassBody::with_property,
                );
                let case_ty =
                    Type::class(shape.nested_def(&case.name, shape.arity), case_body);
                body = body.with_nested(case.name.as_str(), case_ty.clone());
                Some(case_ty)
            };

            body = body.with_method(case_constructor(tag, case, holder, &self_ty, hidden));
        }

        body = match self.tag_access {
            TagAccess::Property => {
                body.with_property(PropertyDef::slot("Tag", Type::int(), TAG_SLOT).hidden_if(hidden))
            }
            TagAccess::StaticMethod => body.with_method(get_tag(&self_ty).hidden_if(hidden)),
        };

        tracing::trace!(name = %shape.name, cases = self.cases.len(), "emitting union");
        union.define(body);
        union
    }
}

/// Static factory for case `tag`, building an instance of `holder` (or of
/// the union itself) with the tag in slot 0
fn case_constructor(
    tag: usize,
    case: &Case,
    holder: Option<Type>,
    self_ty: &Type,
    hidden: bool,
) -> MethodDef {
    let name = if case.fields.is_empty() {
        format!("get_{}", case.name)
    } else {
        format!("New{}", case.name)
    };
    let params = case.fields.iter().map(|(_, ty)| ty.clone()).collect();
    MethodDef::new(
        name,
        params,
        self_ty.clone(),
        method_body(move |ty, _, args| {
            let object_ty = holder
                .as_ref()
                .map_or_else(|| ty.clone(), |holder| instance_of(holder, ty));
            let mut slots = Vec::with_capacity(args.len() + 1);
            slots.push(Value::from(tag as i64));
            slots.extend_from_slice(args);
            Ok(Value::object(object_ty, slots))
        }),
    )
    .as_static()
    .with_attribute(AttributeData::mapping_seq(
        SourceConstructFlags::UNION_CASE,
        tag as i32,
    ))
    .hidden_if(hidden)
}

fn get_tag(self_ty: &Type) -> MethodDef {
    MethodDef::new(
        "GetTag",
        vec![self_ty.clone()],
        Type::int(),
        method_body(|ty, _, args| {
            args.first()
                .and_then(Value::as_object)
                .and_then(|obj| obj.slot(TAG_SLOT))
                .cloned()
                .ok_or_else(|| HostError::Native {
                    member: format!("{}.GetTag", ty),
                    message: "argument is not a union value".to_string(),
                })
        }),
    )
    .as_static()
}
