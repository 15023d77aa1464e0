//! Type-oriented facade
//!
//! Classification predicates, field and case enumeration, and construction of
//! tuple and function types. Every entry point that looks at compiled
//! metadata takes a [`BindingFlags`] visibility choice; pass
//! `BindingFlags::PUBLIC` unless hidden representations should be visible.

use crate::error::{ReflectResult, ShapeKind};
use crate::host::{BindingFlags, PropertyInfo, Type};
use crate::reflect::classify::{self, type_of_repr_type};
use crate::reflect::{exception, function, record, tuple, union, UnionCaseInfo};

/// Whether `ty` is a tuple type
pub fn is_tuple(ty: &Type) -> bool {
    classify::is_tuple_type(ty)
}

/// Whether `ty` is a function type or a closure class
pub fn is_function(ty: &Type) -> ReflectResult<bool> {
    let ty = type_of_repr_type(ty, BindingFlags::PUBLIC)?;
    Ok(classify::is_function_type(&ty))
}

/// Whether `ty` is a record
pub fn is_record(ty: &Type, flags: BindingFlags) -> ReflectResult<bool> {
    classify::is_record_type(ty, flags)
}

/// Whether `ty` is a union or the representation of one of its cases
pub fn is_union(ty: &Type, flags: BindingFlags) -> ReflectResult<bool> {
    let ty = type_of_repr_type(ty, flags)?;
    classify::is_union_type(&ty, flags)
}

/// Whether `ty` is a compiled exception declaration
pub fn is_exception_representation(ty: &Type, flags: BindingFlags) -> ReflectResult<bool> {
    classify::is_exception_repr(ty, flags)
}

/// Whether `ty` is a compiled module
pub fn is_module(ty: &Type) -> ReflectResult<bool> {
    classify::is_module_type(ty)
}

/// Structural kind of `ty`
pub fn classify(ty: &Type, flags: BindingFlags) -> ReflectResult<Option<ShapeKind>> {
    classify::classify(ty, flags)
}

/// Element types of a tuple type, in order
pub fn get_tuple_elements(ty: &Type) -> ReflectResult<Vec<Type>> {
    tuple::element_types(ty)
}

/// `(domain, range)` of a function type
pub fn get_function_elements(ty: &Type) -> ReflectResult<(Type, Type)> {
    function::elements(ty)
}

/// Fields of a record type, in declaration order
pub fn get_record_fields(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<PropertyInfo>> {
    record::fields(ty, flags)
}

/// Cases of a union type, by tag
pub fn get_union_cases(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<UnionCaseInfo>> {
    union::cases(ty, flags)
}

/// Fields of an exception declaration, in declaration order
pub fn get_exception_fields(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<PropertyInfo>> {
    exception::fields(ty, flags)
}

/// Tuple type over `elements`
pub fn make_tuple_type(elements: &[Type]) -> ReflectResult<Type> {
    tuple::make_type(elements)
}

/// Function type from `domain` to `range`
pub fn make_function_type(domain: Type, range: Type) -> Type {
    function::make_type(domain, range)
}
