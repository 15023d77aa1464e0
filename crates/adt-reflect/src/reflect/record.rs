//! Record codec

use super::classify::record_visibility;
use super::mapping::{self, sort_by_decoded};
use super::{field_reader, fields_reader, value_constructor};
use super::{FieldReader, FieldsReader, ValueConstructor};
use crate::error::{ReflectError, ReflectResult, ShapeKind};
use crate::host::{BindingFlags, ConstructorInfo, PropertyInfo, Type};

pub(crate) fn check_record_type(ty: &Type, flags: BindingFlags) -> ReflectResult<()> {
    record_visibility(ty, flags)?.require(ty, ShapeKind::Record)
}

/// Instance properties carrying a field mapping, in declaration order.
///
/// Also serves exception declarations, which lay out their fields the same
/// way.
pub fn field_properties(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<PropertyInfo>> {
    let mut fields = Vec::new();
    for prop in ty.properties(flags.instance()) {
        if mapping::field_mapping(&prop)?.is_some() {
            fields.push(prop);
        }
    }
    sort_by_decoded(fields, |p| mapping::sequence_number(p))
}

/// Record fields, checked
pub fn fields(ty: &Type, flags: BindingFlags) -> ReflectResult<Vec<PropertyInfo>> {
    check_record_type(ty, flags)?;
    field_properties(ty, flags)
}

/// Constructor whose parameter types are the field types in order
pub fn constructor_info(ty: &Type, flags: BindingFlags) -> ReflectResult<ConstructorInfo> {
    check_record_type(ty, flags)?;
    let types: Vec<Type> = field_properties(ty, flags)?
        .iter()
        .map(|p| p.property_type().clone())
        .collect();
    ty.constructor(&types, flags.instance()).ok_or_else(|| {
        ReflectError::configuration(format!(
            "record type '{}' has no constructor taking its {} field(s)",
            ty,
            types.len()
        ))
    })
}

/// Reader returning every field of a record value
pub fn reader(ty: &Type, flags: BindingFlags) -> ReflectResult<FieldsReader> {
    check_record_type(ty, flags)?;
    Ok(properties_reader(field_properties(ty, flags)?))
}

pub(crate) fn properties_reader(props: Vec<PropertyInfo>) -> FieldsReader {
    fields_reader(move |value| {
        props
            .iter()
            .map(|p| p.get_value(value).map_err(ReflectError::from))
            .collect()
    })
}

/// Reader for the single field `property`
pub fn field_reader_for(property: &PropertyInfo) -> FieldReader {
    let property = property.clone();
    field_reader(move |value| Ok(property.get_value(value)?))
}

/// Constructor taking every field of the record, in order
pub fn constructor(ty: &Type, flags: BindingFlags) -> ReflectResult<ValueConstructor> {
    let ctor = constructor_info(ty, flags)?;
    Ok(value_constructor(move |args| Ok(ctor.invoke(args)?)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        AttributeData, ClassBody, ClassDef, ConstructorDef, PropertyDef, SourceConstructFlags,
        Value,
    };

    fn field(name: &str, ty: Type, slot: usize, seq: i32) -> PropertyDef {
        PropertyDef::slot(name, ty, slot)
            .with_attribute(AttributeData::mapping_seq(SourceConstructFlags::FIELD, seq))
    }

    fn person(kind: SourceConstructFlags) -> Type {
        Type::class(
            ClassDef::new("Person"),
            ClassBody::new()
                .with_attribute(AttributeData::mapping(kind))
                .with_property(field("Age", Type::int(), 1, 1))
                .with_property(field("Name", Type::string(), 0, 0))
                .with_property(PropertyDef::slot("Computed", Type::int(), 1))
                .with_constructor(ConstructorDef::slots(vec![Type::string(), Type::int()])),
        )
    }

    #[test]
    fn test_fields_in_sequence_order() {
        let ty = person(SourceConstructFlags::RECORD_TYPE);
        let names: Vec<String> = fields(&ty, BindingFlags::PUBLIC)
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        assert_eq!(names, vec!["Name", "Age"]);
    }

    #[test]
    fn test_read_and_construct() {
        let ty = person(SourceConstructFlags::RECORD_TYPE);
        let make = constructor(&ty, BindingFlags::PUBLIC).unwrap();
        let value = make(&[Value::from("Ada"), Value::from(36)]).unwrap();
        let read = reader(&ty, BindingFlags::PUBLIC).unwrap();
        assert_eq!(read(&value).unwrap(), vec![Value::from("Ada"), Value::from(36)]);

        let age = field_reader_for(&fields(&ty, BindingFlags::PUBLIC).unwrap()[1]);
        assert_eq!(age(&value).unwrap(), Value::from(36));
    }

    #[test]
    fn test_non_record_rejected() {
        let ty = person(SourceConstructFlags::OBJECT_TYPE);
        assert!(matches!(
            fields(&ty, BindingFlags::PUBLIC),
            Err(ReflectError::NotOfKind { kind: ShapeKind::Record, .. })
        ));
    }

    #[test]
    fn test_missing_constructor_is_configuration_error() {
        let ty = Type::class(
            ClassDef::new("Broken"),
            ClassBody::new()
                .with_attribute(AttributeData::mapping(SourceConstructFlags::RECORD_TYPE))
                .with_property(field("X", Type::int(), 0, 0)),
        );
        assert!(matches!(
            constructor_info(&ty, BindingFlags::PUBLIC),
            Err(ReflectError::Configuration { .. })
        ));
    }
}
