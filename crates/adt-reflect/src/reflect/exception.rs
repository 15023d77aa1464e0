//! Exception codec
//!
//! Compiled exception declarations lay out their fields like records: one
//! property per field with a `Field` mapping ordered by sequence number.

use super::classify::exception_visibility;
use super::record::{field_properties, properties_reader};
use super::FieldsReader;
use crate::error::{ReflectResult, ShapeKind};
use crate::host::{BindingFlags, PropertyInfo, Type};

pub(crate) fn check_exception_type(ty: &Type, flags: BindingFlags) -> ReflectResult<()> {
    exception_visibility(ty, flags)?.require(ty, ShapeKind::Exception)
}

/// Declared fields of an exception, in order
pub fn fields(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<PropertyInfo>> {
    check_exception_type(ty, flags)?;
    field_properties(ty, flags)
}

/// Reader returning the declared fields of an exception value
pub fn reader(ty: &Type, flags: BindingFlags) -> ReflectResult<FieldsReader> {
    Ok(properties_reader(fields(ty, flags)?))
}
