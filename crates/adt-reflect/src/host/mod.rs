//! In-memory host metadata facility
//!
//! The reflection core never inspects values or types directly; it asks this
//! module. The facility offers what a managed runtime's metadata API would:
//!
//! - type identity, generic instantiation and base-class traversal
//! - enumeration of properties, fields, methods, constructors and nested
//!   types, filtered by [`BindingFlags`]
//! - reading properties, invoking methods and constructors with argument
//!   type checks
//! - custom attributes, either materialized or as raw constructor data
//!
//! Member enumeration order is unspecified. Callers that need a stable order
//! must sort by the metadata they care about.

mod attribute;
mod flags;
mod intrinsics;
mod member;
mod ty;
mod value;

pub use attribute::{
    Attribute, AttributeArg, AttributeData, AttributeSource, CompilationMapping,
    SourceConstructFlags, COMPILATION_MAPPING,
};
pub use flags::BindingFlags;
pub use intrinsics::{
    function_type, intrinsics, list_type, option_type, Intrinsics, MAX_TUPLE_ARITY,
};
pub use member::{
    constructor_body, getter, method_body, slot_getter, ConstructorBody, ConstructorDef,
    ConstructorInfo, FieldDef, FieldInfo, Getter, MethodBody, MethodDef, MethodInfo, PropertyDef,
    PropertyInfo,
};
pub use ty::{ClassBody, ClassDef, Primitive, Type};
pub use value::{NativeFn, Object, Payload, Value};
