//! Integration tests for exception reflection

use adt_reflect::emit::ExceptionBuilder;
use adt_reflect::host::intrinsics;
use adt_reflect::{types, values, BindingFlags, ReflectError, ShapeKind, Type, Value};

const PUBLIC: BindingFlags = BindingFlags::PUBLIC;

fn raise(ty: &Type, args: &[Value], flags: BindingFlags) -> Value {
    let params: Vec<Type> = args
        .iter()
        .map(|v| v.runtime_type().unwrap())
        .collect();
    ty.constructor(&params, flags.instance())
        .unwrap()
        .invoke(args)
        .unwrap()
}

#[test]
fn test_declared_fields_in_order() {
    let ty = ExceptionBuilder::new("ParseError")
        .field("Line", Type::int())
        .field("Column", Type::int())
        .field("Reason", Type::string())
        .build();
    assert!(types::is_exception_representation(&ty, PUBLIC).unwrap());
    assert_eq!(types::classify(&ty, PUBLIC).unwrap(), Some(ShapeKind::Exception));

    let names: Vec<String> = types::get_exception_fields(&ty, PUBLIC)
        .unwrap()
        .iter()
        .map(|p| p.name().to_string())
        .collect();
    assert_eq!(names, vec!["Line", "Column", "Reason"]);

    let err = raise(
        &ty,
        &[Value::from(3), Value::from(14), Value::from("unexpected ')'")],
        PUBLIC,
    );
    assert_eq!(
        values::get_exception_fields(&err, PUBLIC).unwrap(),
        vec![Value::from(3), Value::from(14), Value::from("unexpected ')'")]
    );
}

#[test]
fn test_message_is_not_a_field() {
    let ty = ExceptionBuilder::new("Timeout").build();
    assert!(types::get_exception_fields(&ty, PUBLIC).unwrap().is_empty());
    let err = raise(&ty, &[], PUBLIC);
    assert!(values::get_exception_fields(&err, PUBLIC).unwrap().is_empty());

    let message = ty.property("Message", PUBLIC.instance()).unwrap();
    assert_eq!(
        message.get_value(&err).unwrap(),
        Value::from("Exception of type 'Timeout' was raised.")
    );
}

#[test]
fn test_private_exception() {
    let ty = ExceptionBuilder::new("Internal")
        .field("Code", Type::int())
        .non_public_representation()
        .build();
    assert!(!types::is_exception_representation(&ty, PUBLIC).unwrap());
    assert!(matches!(
        types::get_exception_fields(&ty, PUBLIC),
        Err(ReflectError::PrivateRepresentation { kind: ShapeKind::Exception, .. })
    ));

    let any = BindingFlags::ANY_VISIBILITY;
    let err = raise(&ty, &[Value::from(500)], any);
    assert_eq!(
        values::get_exception_fields(&err, any).unwrap(),
        vec![Value::from(500)]
    );
}

#[test]
fn test_non_exceptions_rejected() {
    let root = intrinsics().exception().clone();
    assert!(!types::is_exception_representation(&root, PUBLIC).unwrap());
    assert!(matches!(
        types::get_exception_fields(&Type::int(), PUBLIC),
        Err(ReflectError::NotOfKind { kind: ShapeKind::Exception, .. })
    ));
    assert!(matches!(
        values::get_exception_fields(&Value::Null, PUBLIC),
        Err(ReflectError::NullArgument { name: "exn" })
    ));
}
