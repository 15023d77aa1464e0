//! Value-oriented facade
//!
//! Construction and decomposition of tuple, record, union, function and
//! exception values. The `precompute_*` variants pay for classification and
//! member lookup once and return a closure or descriptor that can be reused
//! freely, including from several threads.

use crate::error::{HostResult, ReflectError, ReflectResult, ShapeKind};
use crate::host::{BindingFlags, ConstructorInfo, MethodInfo, PropertyInfo, Type, Value};
use crate::reflect::classify::{record_visibility, type_of_repr_type, ReprVisibility};
use crate::reflect::{exception, function, record, tuple, union};
use crate::reflect::{FieldReader, FieldsReader, TagMember, TagReader, UnionCaseInfo, ValueConstructor};

fn runtime_type(value: &Value, name: &'static str) -> ReflectResult<Type> {
    value
        .runtime_type()
        .ok_or(ReflectError::NullArgument { name })
}

// Records

/// Build a record of type `ty` from its fields
pub fn make_record(ty: &Type, args: &[Value], flags: BindingFlags) -> ReflectResult<Value> {
    record::constructor(ty, flags)?(args)
}

/// Every field of a record value, in declaration order
pub fn get_record_fields(value: &Value, flags: BindingFlags) -> ReflectResult<Vec<Value>> {
    let ty = runtime_type(value, "record")?;
    record::reader(&ty, flags)?(value)
}

/// One field of a record value
pub fn get_record_field(value: &Value, property: &PropertyInfo) -> ReflectResult<Value> {
    let ty = runtime_type(value, "record")?;
    if record_visibility(&ty, BindingFlags::ANY_VISIBILITY)? != ReprVisibility::Visible {
        return Err(ReflectError::NotOfKind {
            type_name: ty.to_string(),
            kind: ShapeKind::Record,
        });
    }
    Ok(property.get_value(value)?)
}

/// Reader for every field of records of type `ty`
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn precompute_record_reader(ty: &Type, flags: BindingFlags) -> ReflectResult<FieldsReader> {
    record::reader(ty, flags)
}

/// Reader for one record field
pub fn precompute_record_field_reader(property: &PropertyInfo) -> FieldReader {
    record::field_reader_for(property)
}

/// Constructor for records of type `ty`
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn precompute_record_constructor(
    ty: &Type,
    flags: BindingFlags,
) -> ReflectResult<ValueConstructor> {
    record::constructor(ty, flags)
}

/// The constructor taking every field of a record type
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn precompute_record_constructor_info(
    ty: &Type,
    flags: BindingFlags,
) -> ReflectResult<ConstructorInfo> {
    record::constructor_info(ty, flags)
}

// Unions

/// Build the value of `case` from its fields
pub fn make_union(case: &UnionCaseInfo, args: &[Value], flags: BindingFlags) -> ReflectResult<Value> {
    union::make(case, args, flags)
}

/// Case and fields of a union value.
///
/// `declared` is required when the value may be represented by null, which
/// carries no runtime type.
pub fn get_union_fields(
    value: &Value,
    declared: Option<&Type>,
    flags: BindingFlags,
) -> ReflectResult<(UnionCaseInfo, Vec<Value>)> {
    union::decompose(value, declared, flags)
}

/// Reader computing the tag of values of union type `ty`
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn precompute_union_tag_reader(ty: &Type, flags: BindingFlags) -> ReflectResult<TagReader> {
    let ty = type_of_repr_type(ty, flags)?;
    union::check_union_type(&ty, flags)?;
    union::tag_reader_for(&ty, flags)
}

/// The member yielding the tag of union type `ty`
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn precompute_union_tag_member_info(
    ty: &Type,
    flags: BindingFlags,
) -> ReflectResult<TagMember> {
    let ty = type_of_repr_type(ty, flags)?;
    union::check_union_type(&ty, flags)?;
    union::tag_member(&ty, flags)
}

/// Reader for the fields of `case`
#[tracing::instrument(level = "trace", skip_all, fields(case = ?case))]
pub fn precompute_union_reader(
    case: &UnionCaseInfo,
    flags: BindingFlags,
) -> ReflectResult<FieldsReader> {
    union::case_reader(case.declaring_type(), case.tag(), flags)
}

/// Constructor for `case`
#[tracing::instrument(level = "trace", skip_all, fields(case = ?case))]
pub fn precompute_union_constructor(
    case: &UnionCaseInfo,
    flags: BindingFlags,
) -> ReflectResult<ValueConstructor> {
    union::case_constructor(case.declaring_type(), case.tag(), flags)
}

/// The static method building `case`
#[tracing::instrument(level = "trace", skip_all, fields(case = ?case))]
pub fn precompute_union_constructor_info(
    case: &UnionCaseInfo,
    flags: BindingFlags,
) -> ReflectResult<MethodInfo> {
    union::constructor_method(case.declaring_type(), case.tag(), flags)
}

// Tuples

/// Build a tuple of type `ty` from its elements
pub fn make_tuple(elements: &[Value], ty: &Type) -> ReflectResult<Value> {
    tuple::constructor(ty)?(elements)
}

/// Every element of a tuple value
pub fn get_tuple_fields(value: &Value) -> ReflectResult<Vec<Value>> {
    let ty = runtime_type(value, "tuple")?;
    tuple::reader(&ty)?(value)
}

/// Element `index` of a tuple value
pub fn get_tuple_field(value: &Value, index: usize) -> ReflectResult<Value> {
    tuple::get_field(value, index)
}

/// Reader for every element of tuples of type `ty`
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn precompute_tuple_reader(ty: &Type) -> ReflectResult<FieldsReader> {
    tuple::reader(ty)
}

/// Constructor for tuples of type `ty`
#[tracing::instrument(level = "trace", skip_all, fields(ty = %ty))]
pub fn precompute_tuple_constructor(ty: &Type) -> ReflectResult<ValueConstructor> {
    tuple::constructor(ty)
}

/// Property reading element `index`, with the nested continuation
pub fn precompute_tuple_property_info(
    ty: &Type,
    index: usize,
) -> ReflectResult<(PropertyInfo, Option<(Type, usize)>)> {
    tuple::property_info(ty, index)
}

/// Outermost constructor, with the nested `Rest` type
pub fn precompute_tuple_constructor_info(
    ty: &Type,
) -> ReflectResult<(ConstructorInfo, Option<Type>)> {
    tuple::constructor_info(ty)
}

// Functions

/// Wrap `implementation` as a value of function type `ty`
pub fn make_function<F>(ty: &Type, implementation: F) -> ReflectResult<Value>
where
    F: Fn(Value) -> HostResult<Value> + Send + Sync + 'static,
{
    function::wrap(ty, implementation)
}

// Exceptions

/// Declared fields of an exception value
pub fn get_exception_fields(value: &Value, flags: BindingFlags) -> ReflectResult<Vec<Value>> {
    let ty = runtime_type(value, "exn")?;
    exception::reader(&ty, flags)?(value)
}
