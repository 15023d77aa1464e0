//! Integration tests for record reflection

use adt_reflect::emit::RecordBuilder;
use adt_reflect::host::SourceConstructFlags;
use adt_reflect::reflect::mapping;
use adt_reflect::{types, values, BindingFlags, ReflectError, ShapeKind, Type, Value};

fn person() -> Type {
    RecordBuilder::new("Person")
        .field("Name", Type::string())
        .field("Age", Type::int())
        .build()
}

#[test]
fn test_fields_follow_declaration_order() {
    let ty = person();
    assert!(types::is_record(&ty, BindingFlags::PUBLIC).unwrap());
    let names: Vec<String> = types::get_record_fields(&ty, BindingFlags::PUBLIC)
        .unwrap()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, vec!["Name", "Age"]);
}

#[test]
fn test_make_then_read_round_trips() {
    let ty = person();
    let ann = values::make_record(
        &ty,
        &[Value::from("Ann"), Value::from(30)],
        BindingFlags::PUBLIC,
    )
    .unwrap();
    assert_eq!(
        values::get_record_fields(&ann, BindingFlags::PUBLIC).unwrap(),
        vec![Value::from("Ann"), Value::from(30)]
    );
}

#[test]
fn test_wide_record_order_survives_hashing() {
    let names: Vec<String> = (0..32).map(|i| format!("F{}", i)).collect();
    let ty = names
        .iter()
        .fold(RecordBuilder::new("Wide"), |b, name| {
            b.field(name.as_str(), Type::int())
        })
        .build();
    let fields: Vec<String> = types::get_record_fields(&ty, BindingFlags::PUBLIC)
        .unwrap()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(fields, names);
}

#[test]
fn test_precomputed_readers_agree() {
    let ty = person();
    let ann = values::make_record(
        &ty,
        &[Value::from("Ann"), Value::from(30)],
        BindingFlags::PUBLIC,
    )
    .unwrap();
    let first = values::precompute_record_reader(&ty, BindingFlags::PUBLIC).unwrap();
    let second = values::precompute_record_reader(&ty, BindingFlags::PUBLIC).unwrap();
    let direct = values::get_record_fields(&ann, BindingFlags::PUBLIC).unwrap();
    assert_eq!(first(&ann).unwrap(), second(&ann).unwrap());
    assert_eq!(first(&ann).unwrap(), direct);
}

#[test]
fn test_single_field_access() {
    let ty = person();
    let ann = values::make_record(
        &ty,
        &[Value::from("Ann"), Value::from(30)],
        BindingFlags::PUBLIC,
    )
    .unwrap();
    let age = &types::get_record_fields(&ty, BindingFlags::PUBLIC).unwrap()[1];
    assert_eq!(values::get_record_field(&ann, age).unwrap(), Value::from(30));
    let read_age = values::precompute_record_field_reader(age);
    assert_eq!(read_age(&ann).unwrap(), Value::from(30));
}

#[test]
fn test_constructor_info_and_closure() {
    let ty = person();
    let info = values::precompute_record_constructor_info(&ty, BindingFlags::PUBLIC).unwrap();
    assert_eq!(info.parameter_types(), &[Type::string(), Type::int()]);

    let make = values::precompute_record_constructor(&ty, BindingFlags::PUBLIC).unwrap();
    assert!(make(&[Value::from("Bob")]).is_err());
    assert!(make(&[Value::from(1), Value::from("Bob")]).is_err());
}

#[test]
fn test_private_representation() {
    let ty = RecordBuilder::new("Token")
        .field("Secret", Type::string())
        .non_public_representation()
        .build();

    assert!(!types::is_record(&ty, BindingFlags::PUBLIC).unwrap());
    assert!(matches!(
        types::get_record_fields(&ty, BindingFlags::PUBLIC),
        Err(ReflectError::PrivateRepresentation { kind: ShapeKind::Record, .. })
    ));

    let any = BindingFlags::ANY_VISIBILITY;
    assert!(types::is_record(&ty, any).unwrap());
    let token = values::make_record(&ty, &[Value::from("k")], any).unwrap();
    assert_eq!(
        values::get_record_fields(&token, any).unwrap(),
        vec![Value::from("k")]
    );
}

#[test]
fn test_generic_record() {
    let pair = RecordBuilder::new("Pair")
        .generic(2)
        .field("First", Type::param(0))
        .field("Second", Type::param(1))
        .build();
    let ty = pair.make_generic(&[Type::int(), Type::string()]).unwrap();
    let value = values::make_record(
        &ty,
        &[Value::from(1), Value::from("one")],
        BindingFlags::PUBLIC,
    )
    .unwrap();
    assert_eq!(value.runtime_type(), Some(ty));
    assert_eq!(
        values::get_record_fields(&value, BindingFlags::PUBLIC).unwrap(),
        vec![Value::from(1), Value::from("one")]
    );
}

#[test]
fn test_not_a_record() {
    assert!(matches!(
        types::get_record_fields(&Type::int(), BindingFlags::PUBLIC),
        Err(ReflectError::NotOfKind { kind: ShapeKind::Record, .. })
    ));
    assert!(matches!(
        values::get_record_fields(&Value::Null, BindingFlags::PUBLIC),
        Err(ReflectError::NullArgument { name: "record" })
    ));
}

#[test]
fn test_tuples_are_never_records() {
    let any = BindingFlags::ANY_VISIBILITY;
    let tuple = types::make_tuple_type(&[Type::int(), Type::string()]).unwrap();
    assert!(mapping::has_kind(&tuple, SourceConstructFlags::RECORD_TYPE).unwrap());

    assert!(!types::is_record(&tuple, any).unwrap());
    assert_eq!(types::classify(&tuple, any).unwrap(), Some(ShapeKind::Tuple));
    assert!(matches!(
        types::get_record_fields(&tuple, any),
        Err(ReflectError::NotOfKind { kind: ShapeKind::Record, .. })
    ));

    let value = values::make_tuple(&[Value::from(1), Value::from("a")], &tuple).unwrap();
    assert!(matches!(
        values::get_record_fields(&value, any),
        Err(ReflectError::NotOfKind { kind: ShapeKind::Record, .. })
    ));
    assert_eq!(
        values::get_tuple_fields(&value).unwrap(),
        vec![Value::from(1), Value::from("a")]
    );
}
