//! Union codec
//!
//! A compiled union is laid out as follows:
//!
//! - the union type carries a `SumType` mapping
//! - with more than one case, a nested `Tags` class lists one literal field
//!   per case (`name = tag`), and each case with fields gets a nested class
//!   named after the case, deriving from the union
//! - case fields are properties with a `Field` mapping whose variant number
//!   is the case tag
//! - each case has a static constructor: `get_<Case>` for nullary cases,
//!   `New<Case>` otherwise, carrying a `UnionCase` mapping whose sequence
//!   number is the tag
//! - the tag is read from an instance `Tag` property or a static `GetTag`
//!
//! Options and lists are intrinsic and use fixed case names and layouts.

use std::fmt;
use std::sync::Arc;

use once_cell::race::OnceBox;

use super::classify::{
    is_list_type, is_option_type, type_of_repr_type, union_visibility,
};
use super::mapping::{self, sort_by_decoded};
use super::record::properties_reader;
use super::{tag_reader, value_constructor, FieldsReader, TagReader, ValueConstructor};
use crate::error::{ReflectError, ReflectResult, ShapeKind};
use crate::host::{
    Attribute, AttributeSource, BindingFlags, MethodInfo, PropertyInfo, SourceConstructFlags,
    Type, Value,
};

const TAGS_TYPE: &str = "Tags";
const TAG_PROPERTY: &str = "Tag";
const TAG_METHOD: &str = "GetTag";

const OPTION_CASES: [&str; 2] = ["None", "Some"];
const LIST_CASES: [&str; 2] = ["Empty", "Cons"];

pub(crate) fn check_union_type(ty: &Type, flags: BindingFlags) -> ReflectResult<()> {
    union_visibility(ty, flags)?.require(ty, ShapeKind::Union)
}

fn is_intrinsic_union(ty: &Type) -> bool {
    is_option_type(ty) || is_list_type(ty)
}

/// Case constructor name with the `get_`/`New` prefix removed
fn strip_case_prefix(ty: &Type, name: &str) -> String {
    if is_intrinsic_union(ty) || name.len() <= 3 {
        return name.to_string();
    }
    name.strip_prefix("get_")
        .or_else(|| name.strip_prefix("New"))
        .unwrap_or(name)
        .to_string()
}

/// Case names indexed by tag
pub fn case_names(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<String>> {
    if is_option_type(ty) {
        return Ok(OPTION_CASES.iter().map(|s| s.to_string()).collect());
    }
    if is_list_type(ty) {
        return Ok(LIST_CASES.iter().map(|s| s.to_string()).collect());
    }

    let tagged = match ty.nested_type(TAGS_TYPE, flags) {
        Some(tags) => tags_from_enum(&tags, flags)?,
        None => tags_from_constructors(ty, flags)?,
    };

    for (index, (tag, name)) in tagged.iter().enumerate() {
        if usize::try_from(*tag).ok() != Some(index) {
            return Err(ReflectError::configuration(format!(
                "union type '{}' assigns tag {} to case '{}', expected {}",
                ty, tag, name, index
            )));
        }
    }
    Ok(tagged.into_iter().map(|(_, name)| name).collect())
}

/// `(tag, name)` pairs from the literal fields of the nested `Tags` class
fn tags_from_enum(tags: &Type, flags: BindingFlags) -> ReflectResult<Vec<(i64, String)>> {
    let mut out = Vec::new();
    for field in tags.fields(flags.statics()) {
        if !field.is_literal() {
            continue;
        }
        let tag = field
            .literal_value()
            .and_then(Value::as_int)
            .ok_or_else(|| {
                ReflectError::configuration(format!(
                    "tag literal '{}.{}' is not an integer",
                    tags,
                    field.name()
                ))
            })?;
        out.push((tag, field.name().to_string()));
    }
    out.sort_by_key(|(tag, _)| *tag);
    Ok(out)
}

/// `(tag, name)` pairs from static methods carrying a union case mapping
fn tags_from_constructors(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<(i64, String)>> {
    let mut out = Vec::new();
    for method in ty.methods(flags.statics()) {
        let Some(found) = mapping::try_find(&method)? else {
            continue;
        };
        if found.flags.is_kind(SourceConstructFlags::UNION_CASE) {
            out.push((
                i64::from(found.sequence),
                strip_case_prefix(ty, method.name()),
            ));
        }
    }
    out.sort_by_key(|(tag, _)| *tag);
    Ok(out)
}

fn case_name(ty: &Type, tag: usize, flags: BindingFlags) -> ReflectResult<String> {
    case_names(ty, flags)?
        .into_iter()
        .nth(tag)
        .ok_or_else(|| bad_tag(ty, tag))
}

fn bad_tag(ty: &Type, tag: usize) -> ReflectError {
    ReflectError::invalid(format!("tag {} is out of range for union type '{}'", tag, ty))
}

/// Representation type holding the fields of case `tag`: the union itself
/// for single-case unions and for cases without a nested class
pub fn case_type(ty: &Type, tag: usize, flags: BindingFlags) -> ReflectResult<Type> {
    let names = case_names(ty, flags)?;
    let name = names.get(tag).ok_or_else(|| bad_tag(ty, tag))?;
    if names.len() == 1 {
        return Ok(ty.clone());
    }
    match ty.nested_type(name, flags) {
        Some(nested) if nested.is_generic_definition() => {
            Ok(nested.make_generic(&ty.generic_arguments())?)
        }
        Some(nested) => Ok(nested),
        None => Ok(ty.clone()),
    }
}

fn intrinsic_fields(
    ty: &Type,
    tag: usize,
    flags: BindingFlags,
    some_case: &[&str],
) -> ReflectResult<Vec<PropertyInfo>> {
    match tag {
        0 => Ok(Vec::new()),
        1 => some_case
            .iter()
            .map(|name| {
                ty.property(name, flags.instance()).ok_or_else(|| {
                    ReflectError::configuration(format!(
                        "union type '{}' has no property '{}'",
                        ty, name
                    ))
                })
            })
            .collect(),
        _ => Err(bad_tag(ty, tag)),
    }
}

/// Field properties of case `tag`, in declaration order
pub fn case_fields(ty: &Type, tag: usize, flags: BindingFlags) -> ReflectResult<Vec<PropertyInfo>> {
    if is_option_type(ty) {
        return intrinsic_fields(ty, tag, flags, &["Value"]);
    }
    if is_list_type(ty) {
        return intrinsic_fields(ty, tag, flags, &["Head", "Tail"]);
    }

    let holder = case_type(ty, tag, flags)?;
    let mut fields = Vec::new();
    for prop in holder.properties(flags.instance()) {
        let belongs = mapping::field_mapping(&prop)?
            .is_some_and(|(variant, _)| usize::try_from(variant).ok() == Some(tag));
        if belongs {
            fields.push(prop);
        }
    }
    sort_by_decoded(fields, |p| mapping::sequence_number(p))
}

/// Member that yields the tag of a union value
#[derive(Debug, Clone, PartialEq)]
pub enum TagMember {
    /// Instance `Tag` property
    Property(PropertyInfo),
    /// Static `GetTag(union)` method
    Method(MethodInfo),
}

/// The tag member of a union type
pub fn tag_member(ty: &Type, flags: BindingFlags) -> ReflectResult<TagMember> {
    if let Some(prop) = ty.property(TAG_PROPERTY, flags.instance()) {
        return Ok(TagMember::Property(prop));
    }
    ty.method(TAG_METHOD, flags.statics())
        .map(TagMember::Method)
        .ok_or_else(|| {
            ReflectError::configuration(format!(
                "union type '{}' has neither a {} property nor a {} method",
                ty, TAG_PROPERTY, TAG_METHOD
            ))
        })
}

fn to_tag(member: &str, value: Value) -> ReflectResult<usize> {
    value
        .as_int()
        .and_then(|i| usize::try_from(i).ok())
        .ok_or_else(|| {
            ReflectError::configuration(format!(
                "{} returned {:?}, expected a non-negative integer",
                member, value
            ))
        })
}

/// Reader computing the tag of a union value
pub fn tag_reader_for(ty: &Type, flags: BindingFlags) -> ReflectResult<TagReader> {
    if is_option_type(ty) {
        return Ok(tag_reader(|value| Ok(usize::from(!value.is_null()))));
    }
    if case_names(ty, flags)?.len() <= 1 {
        return Ok(tag_reader(|_| Ok(0)));
    }
    if let Some(prop) = ty.property(TAG_PROPERTY, flags.instance()) {
        let member = prop.qualified_name();
        return Ok(tag_reader(move |value| to_tag(&member, prop.get_value(value)?)));
    }
    let method = ty
        .method_with_params(TAG_METHOD, std::slice::from_ref(ty), flags.statics())
        .ok_or_else(|| {
            ReflectError::configuration(format!(
                "union type '{}' has no way to read the tag of a value",
                ty
            ))
        })?;
    let member = method.qualified_name();
    Ok(tag_reader(move |value| {
        to_tag(&member, method.invoke(None, std::slice::from_ref(value))?)
    }))
}

/// Static method building case `tag`
pub fn constructor_method(ty: &Type, tag: usize, flags: BindingFlags) -> ReflectResult<MethodInfo> {
    check_union_type(ty, flags)?;
    let name = case_name(ty, tag, flags)?;
    let nullary = case_fields(ty, tag, flags)?.is_empty();
    let method_name = if nullary {
        format!("get_{}", name)
    } else if is_intrinsic_union(ty) {
        name
    } else {
        format!("New{}", name)
    };
    ty.method(&method_name, flags.statics()).ok_or_else(|| {
        ReflectError::configuration(format!(
            "union type '{}' has no case constructor '{}'",
            ty, method_name
        ))
    })
}

/// Reader returning the fields of case `tag`
pub fn case_reader(ty: &Type, tag: usize, flags: BindingFlags) -> ReflectResult<FieldsReader> {
    check_union_type(ty, flags)?;
    Ok(properties_reader(case_fields(ty, tag, flags)?))
}

/// Constructor building case `tag` from its fields
pub fn case_constructor(
    ty: &Type,
    tag: usize,
    flags: BindingFlags,
) -> ReflectResult<ValueConstructor> {
    let method = constructor_method(ty, tag, flags)?;
    Ok(value_constructor(move |args| Ok(method.invoke(None, args)?)))
}

/// Descriptor of one union case.
///
/// Clones share a lazily decoded name table. Concurrent first accesses may
/// each decode it; one result wins and the rest are dropped.
#[derive(Clone)]
pub struct UnionCaseInfo {
    declaring_type: Type,
    tag: usize,
    names: Arc<OnceBox<Vec<String>>>,
}

impl UnionCaseInfo {
    pub(crate) fn new(declaring_type: Type, tag: usize) -> Self {
        Self {
            declaring_type,
            tag,
            names: Arc::new(OnceBox::new()),
        }
    }

    fn with_shared_names(declaring_type: Type, tag: usize, names: Arc<OnceBox<Vec<String>>>) -> Self {
        Self {
            declaring_type,
            tag,
            names,
        }
    }

    /// The union type
    pub fn declaring_type(&self) -> &Type {
        &self.declaring_type
    }

    /// Case tag, 0-based
    pub fn tag(&self) -> usize {
        self.tag
    }

    /// Case name.
    ///
    /// The name table is decoded on first use, regardless of visibility. If
    /// decoding fails (for instance a `Tags` class with a non-integer
    /// literal), the failure is logged at debug level and every case of the
    /// union reports an empty name instead of an error.
    pub fn name(&self) -> &str {
        let names = self.names.get_or_init(|| {
            let names = case_names(&self.declaring_type, BindingFlags::ANY_VISIBILITY)
                .unwrap_or_else(|err| {
                    tracing::debug!(ty = %self.declaring_type, %err, "case names unavailable");
                    Vec::new()
                });
            Box::new(names)
        });
        names.get(self.tag).map_or("", String::as_str)
    }

    /// Field properties of this case, visible or not
    pub fn fields(&self) -> ReflectResult<Vec<PropertyInfo>> {
        case_fields(&self.declaring_type, self.tag, BindingFlags::ANY_VISIBILITY)
    }

    /// Attributes of the case constructor, compilation mapping excluded
    pub fn custom_attributes(&self) -> ReflectResult<Vec<Attribute>> {
        let method =
            constructor_method(&self.declaring_type, self.tag, BindingFlags::ANY_VISIBILITY)?;
        Ok(method
            .custom_attributes()?
            .into_iter()
            .filter(|attr| !matches!(attr, Attribute::CompilationMapping(_)))
            .collect())
    }
}

impl PartialEq for UnionCaseInfo {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag && self.declaring_type == other.declaring_type
    }
}

impl Eq for UnionCaseInfo {}

impl fmt::Debug for UnionCaseInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.declaring_type, self.name())
    }
}

/// Every case of a union, by tag
pub fn cases(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<UnionCaseInfo>> {
    let ty = type_of_repr_type(ty, flags)?;
    check_union_type(&ty, flags)?;
    let count = case_names(&ty, flags)?.len();
    let names = Arc::new(OnceBox::new());
    Ok((0..count)
        .map(|tag| UnionCaseInfo::with_shared_names(ty.clone(), tag, Arc::clone(&names)))
        .collect())
}

/// Split a union value into its case and fields.
///
/// Without `declared`, the value's runtime type is used and case classes
/// are mapped back to their union.
pub fn decompose(
    value: &Value,
    declared: Option<&Type>,
    flags: BindingFlags,
) -> ReflectResult<(UnionCaseInfo, Vec<Value>)> {
    let ty = match declared {
        Some(ty) => ty.clone(),
        None => value
            .runtime_type()
            .ok_or(ReflectError::NullArgument { name: "value" })?,
    };
    let ty = type_of_repr_type(&ty, flags)?;
    check_union_type(&ty, flags)?;
    let tag = tag_reader_for(&ty, flags)?(value)?;
    let fields = case_reader(&ty, tag, flags)?(value)?;
    Ok((UnionCaseInfo::new(ty, tag), fields))
}

/// Build the value of `case` from its fields
pub fn make(case: &UnionCaseInfo, args: &[Value], flags: BindingFlags) -> ReflectResult<Value> {
    case_constructor(case.declaring_type(), case.tag(), flags)?(args)
}
