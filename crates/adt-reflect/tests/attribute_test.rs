//! Integration tests for compilation mapping decoding and classification

use adt_reflect::emit::{ExceptionBuilder, ModuleBuilder, RecordBuilder, UnionBuilder};
use adt_reflect::host::{
    method_body, AttributeData, AttributeSource, ClassBody, ClassDef, SourceConstructFlags,
};
use adt_reflect::reflect::{CompilationMappingDecoder, MappingDecoder};
use adt_reflect::{types, values, BindingFlags, HostError, ReflectError, ShapeKind, Type, Value};

const PUBLIC: BindingFlags = BindingFlags::PUBLIC;

#[test]
fn test_inspection_only_types_reflect_the_same() {
    let live = RecordBuilder::new("Point")
        .field("X", Type::int())
        .field("Y", Type::int())
        .build();
    let inspected = RecordBuilder::new("Point")
        .field("X", Type::int())
        .field("Y", Type::int())
        .inspection_only()
        .build();

    assert!(live.custom_attributes().is_ok());
    assert!(matches!(
        inspected.custom_attributes(),
        Err(HostError::InspectionOnly { .. })
    ));

    let decoder = CompilationMappingDecoder;
    assert_eq!(
        decoder.try_decode(&live).unwrap(),
        decoder.try_decode(&inspected).unwrap()
    );

    let names = |ty: &Type| -> Vec<String> {
        types::get_record_fields(ty, PUBLIC)
            .unwrap()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    };
    assert_eq!(names(&live), names(&inspected));
    assert_eq!(names(&inspected), vec!["X", "Y"]);
}

#[test]
fn test_inspection_only_union() {
    let ty = UnionBuilder::new("Light")
        .nullary("Red")
        .nullary("Green")
        .case("Blinking", [("Period", Type::int())])
        .inspection_only()
        .build();
    let cases = types::get_union_cases(&ty, PUBLIC).unwrap();
    let names: Vec<&str> = cases.iter().map(|c| c.name()).collect();
    assert_eq!(names, vec!["Red", "Green", "Blinking"]);
    assert_eq!(cases[2].fields().unwrap()[0].name(), "Period");

    assert!(matches!(
        cases[2].custom_attributes(),
        Err(ReflectError::Host(HostError::InspectionOnly { .. }))
    ));
}

#[test]
fn test_duplicate_mapping_is_a_configuration_error() {
    let ty = Type::class(
        ClassDef::new("Confused"),
        ClassBody::new()
            .with_attribute(AttributeData::mapping(SourceConstructFlags::RECORD_TYPE))
            .with_attribute(AttributeData::mapping(SourceConstructFlags::SUM_TYPE)),
    );
    assert!(matches!(
        types::is_record(&ty, PUBLIC),
        Err(ReflectError::Configuration { .. })
    ));
    assert!(matches!(
        types::classify(&ty, PUBLIC),
        Err(ReflectError::Configuration { .. })
    ));
}

#[test]
fn test_modules() {
    let ty = ModuleBuilder::new("Strings")
        .function(
            "shout",
            vec![Type::string()],
            Type::string(),
            method_body(|_, _, args| {
                Ok(Value::from(
                    args[0].as_str().unwrap_or_default().to_uppercase(),
                ))
            }),
        )
        .build();
    assert!(types::is_module(&ty).unwrap());
    assert_eq!(types::classify(&ty, PUBLIC).unwrap(), Some(ShapeKind::Module));
    assert!(!types::is_record(&ty, PUBLIC).unwrap());
    assert!(!types::is_module(&Type::string()).unwrap());

    let shout = ty.method("shout", PUBLIC.statics()).unwrap();
    assert_eq!(
        shout.invoke(None, &[Value::from("hi")]).unwrap(),
        Value::from("HI")
    );
}

#[test]
fn test_classification_is_exclusive() {
    let record = RecordBuilder::new("R").field("A", Type::int()).build();
    let union = UnionBuilder::new("U").nullary("X").nullary("Y").build();
    let exn = ExceptionBuilder::new("E").build();
    let tuple = types::make_tuple_type(&[Type::int(), Type::int()]).unwrap();

    for (ty, kind) in [
        (&record, ShapeKind::Record),
        (&union, ShapeKind::Union),
        (&exn, ShapeKind::Exception),
        (&tuple, ShapeKind::Tuple),
    ] {
        assert_eq!(types::classify(ty, PUBLIC).unwrap(), Some(kind), "{}", ty);
    }
    assert!(!types::is_union(&record, PUBLIC).unwrap());
    assert!(!types::is_record(&union, PUBLIC).unwrap());
    assert!(!types::is_tuple(&record));

    let r = values::make_record(&record, &[Value::from(1)], PUBLIC).unwrap();
    assert!(matches!(
        values::get_union_fields(&r, None, PUBLIC),
        Err(ReflectError::NotOfKind { kind: ShapeKind::Union, .. })
    ));
}
