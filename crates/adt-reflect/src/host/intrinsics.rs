//! Intrinsic generic definitions
//!
//! Tuples, functions, options, lists and the exception root are host
//! intrinsics rather than compiled declarations. Their canonical definitions
//! are built once per process and never modified; head-type tests compare
//! against this table.
//!
//! | Definition        | Members                                              |
//! |-------------------|------------------------------------------------------|
//! | `Tuple`1`..`8`    | `Item1`..`Item7`, `Rest` (arity 8), one constructor  |
//! | `Func`2`          | `Invoke(T0) -> T1`                                   |
//! | `FuncAdapter`2`   | non-public, derives from `Func`2`                    |
//! | `Option`1`        | `Value`, `GetTag`, `get_None`, `Some`                |
//! | `List`1`          | `Head`, `Tail`, `Tag`, `get_Empty`, `Cons`           |
//! | `Exception`       | `Message`, one constructor                           |
//!
//! Tuple definitions carry a `RecordType` mapping, the way the compiler
//! marks its own tuple representation. Tuple identity takes precedence over
//! it when classifying.

use once_cell::sync::Lazy;

use super::attribute::{AttributeData, SourceConstructFlags};
use super::member::{method_body, ConstructorDef, MethodDef, PropertyDef};
use super::ty::{ClassBody, ClassDef, Type};
use super::value::Value;
use crate::error::HostError;

/// Largest tuple arity represented directly; longer tuples nest in `Rest`
pub const MAX_TUPLE_ARITY: usize = 8;

/// The intrinsic definition table
pub struct Intrinsics {
    tuples: Vec<Type>,
    func: Type,
    func_adapter: Type,
    option: Type,
    list: Type,
    exception: Type,
}

static INTRINSICS: Lazy<Intrinsics> = Lazy::new(Intrinsics::build);

/// Process-wide intrinsic table
pub fn intrinsics() -> &'static Intrinsics {
    &INTRINSICS
}

impl Intrinsics {
    fn build() -> Self {
        let func = build_func();
        Self {
            tuples: (1..=MAX_TUPLE_ARITY).map(build_tuple).collect(),
            func_adapter: build_func_adapter(&func),
            func,
            option: build_option(),
            list: build_list(),
            exception: build_exception(),
        }
    }

    /// Open tuple definition of `arity` (1..=8)
    pub fn tuple(&self, arity: usize) -> Option<&Type> {
        arity.checked_sub(1).and_then(|i| self.tuples.get(i))
    }

    /// All tuple definitions, by arity
    pub fn tuples(&self) -> &[Type] {
        &self.tuples
    }

    /// `Func`2`
    pub fn func(&self) -> &Type {
        &self.func
    }

    /// `FuncAdapter`2`
    pub fn func_adapter(&self) -> &Type {
        &self.func_adapter
    }

    /// `Option`1`
    pub fn option(&self) -> &Type {
        &self.option
    }

    /// `List`1`
    pub fn list(&self) -> &Type {
        &self.list
    }

    /// Root of exception declarations
    pub fn exception(&self) -> &Type {
        &self.exception
    }
}

/// `Option<element>`
pub fn option_type(element: Type) -> Type {
    intrinsics().option().with_args(vec![element])
}

/// `List<element>`
pub fn list_type(element: Type) -> Type {
    intrinsics().list().with_args(vec![element])
}

/// `Func<domain, range>`
pub fn function_type(domain: Type, range: Type) -> Type {
    intrinsics().func().with_args(vec![domain, range])
}

fn field_mapping(variant: i32, sequence: i32) -> AttributeData {
    AttributeData::mapping_variant(SourceConstructFlags::FIELD, variant, sequence)
}

fn case_mapping(tag: i32) -> AttributeData {
    AttributeData::mapping_seq(SourceConstructFlags::UNION_CASE, tag)
}

fn build_tuple(arity: usize) -> Type {
    let mut body =
        ClassBody::new().with_attribute(AttributeData::mapping(SourceConstructFlags::RECORD_TYPE));
    for i in 0..arity {
        let name = if arity == MAX_TUPLE_ARITY && i == arity - 1 {
            "Rest".to_string()
        } else {
            format!("Item{}", i + 1)
        };
        body = body.with_property(PropertyDef::slot(name, Type::param(i), i));
    }
    let params = (0..arity).map(Type::param).collect();
    body = body.with_constructor(ConstructorDef::slots(params));
    Type::class(ClassDef::new("Tuple").generic(arity), body)
}

fn build_func() -> Type {
    let invoke = MethodDef::new(
        "Invoke",
        vec![Type::param(0)],
        Type::param(1),
        method_body(|_, target, args| {
            let target = target.ok_or_else(|| HostError::NullTarget {
                member: "Func.Invoke".to_string(),
            })?;
            target.apply(args.first().cloned().unwrap_or(Value::Null))
        }),
    );
    Type::class(
        ClassDef::new("Func").generic(2),
        ClassBody::new().with_method(invoke),
    )
}

fn build_func_adapter(func: &Type) -> Type {
    let base = func.with_args(vec![Type::param(0), Type::param(1)]);
    Type::class(
        ClassDef::new("FuncAdapter").generic(2).non_public(),
        ClassBody::new().with_base(base),
    )
}

fn build_option() -> Type {
    let option = Type::declare(ClassDef::new("Option").generic(1));
    let self_ty = option.with_args(vec![Type::param(0)]);

    let get_none = MethodDef::new(
        "get_None",
        vec![],
        self_ty.clone(),
        method_body(|_, _, _| Ok(Value::Null)),
    )
    .as_static()
    .with_attribute(case_mapping(0));

    let some = MethodDef::new(
        "Some",
        vec![Type::param(0)],
        self_ty.clone(),
        method_body(|ty, _, args| Ok(Value::object(ty.clone(), args.to_vec()))),
    )
    .as_static()
    .with_attribute(case_mapping(1));

    let get_tag = MethodDef::new(
        "GetTag",
        vec![self_ty],
        Type::int(),
        method_body(|_, _, args| {
            let tag = match args.first() {
                None | Some(Value::Null) => 0,
                Some(_) => 1,
            };
            Ok(Value::Int(tag))
        }),
    )
    .as_static();

    option.define(
        ClassBody::new()
            .with_attribute(AttributeData::mapping(SourceConstructFlags::SUM_TYPE))
            .with_property(
                PropertyDef::slot("Value", Type::param(0), 0).with_attribute(field_mapping(1, 0)),
            )
            .with_method(get_none)
            .with_method(some)
            .with_method(get_tag),
    );
    option
}

const LIST_TAG_SLOT: usize = 0;

fn build_list() -> Type {
    let list = Type::declare(ClassDef::new("List").generic(1));
    let self_ty = list.with_args(vec![Type::param(0)]);

    let get_empty = MethodDef::new(
        "get_Empty",
        vec![],
        self_ty.clone(),
        method_body(|ty, _, _| Ok(Value::object(ty.clone(), vec![Value::Int(0)]))),
    )
    .as_static()
    .with_attribute(case_mapping(0));

    let cons = MethodDef::new(
        "Cons",
        vec![Type::param(0), self_ty.clone()],
        self_ty.clone(),
        method_body(|ty, _, args| {
            let mut slots = Vec::with_capacity(args.len() + 1);
            slots.push(Value::Int(1));
            slots.extend_from_slice(args);
            Ok(Value::object(ty.clone(), slots))
        }),
    )
    .as_static()
    .with_attribute(case_mapping(1));

    list.define(
        ClassBody::new()
            .with_attribute(AttributeData::mapping(SourceConstructFlags::SUM_TYPE))
            .with_property(PropertyDef::slot("Tag", Type::int(), LIST_TAG_SLOT))
            .with_property(
                PropertyDef::slot("Head", Type::param(0), 1).with_attribute(field_mapping(1, 0)),
            )
            .with_property(PropertyDef::slot("Tail", self_ty, 2).with_attribute(field_mapping(1, 1)))
            .with_method(get_empty)
            .with_method(cons),
    );
    list
}

fn build_exception() -> Type {
    Type::class(
        ClassDef::new("Exception"),
        ClassBody::new()
            .with_property(PropertyDef::slot("Message", Type::string(), 0))
            .with_constructor(ConstructorDef::slots(vec![Type::string()])),
    )
}
