//! Integration tests for tuple reflection

use adt_reflect::{types, values, BindingFlags, ReflectError, ShapeKind, Type, Value};

fn element(i: usize) -> (Type, Value) {
    match i % 3 {
        0 => (Type::int(), Value::from(i as i64)),
        1 => (Type::string(), Value::from(format!("s{}", i))),
        _ => (Type::bool(), Value::from(i % 2 == 0)),
    }
}

#[test]
fn test_round_trip_all_arities() {
    for n in 1..=20 {
        let (tys, vals): (Vec<Type>, Vec<Value>) = (0..n).map(element).unzip();
        let ty = types::make_tuple_type(&tys).unwrap();
        assert!(types::is_tuple(&ty));
        assert_eq!(types::get_tuple_elements(&ty).unwrap(), tys, "arity {}", n);

        let tuple = values::make_tuple(&vals, &ty).unwrap();
        assert_eq!(tuple.runtime_type(), Some(ty.clone()));
        assert_eq!(values::get_tuple_fields(&tuple).unwrap(), vals, "arity {}", n);

        let reader = values::precompute_tuple_reader(&ty).unwrap();
        assert_eq!(reader(&tuple).unwrap(), vals, "arity {}", n);

        for (i, expected) in vals.iter().enumerate() {
            assert_eq!(&values::get_tuple_field(&tuple, i).unwrap(), expected);
        }
    }
}

#[test]
fn test_eight_nests_single_rest() {
    let tys: Vec<Type> = (0..8).map(|_| Type::int()).collect();
    let ty = types::make_tuple_type(&tys).unwrap();
    let (ctor, rest) = values::precompute_tuple_constructor_info(&ty).unwrap();
    assert_eq!(ctor.parameter_types().len(), 8);
    let rest = rest.unwrap();
    assert_eq!(rest.generic_arguments(), vec![Type::int()]);
    assert!(types::is_tuple(&rest));
}

#[test]
fn test_property_info_continuation_walks_to_element() {
    let tys: Vec<Type> = (0..17).map(|_| Type::int()).collect();
    let ty = types::make_tuple_type(&tys).unwrap();
    let vals: Vec<Value> = (0..17).map(|i| Value::from(i as i64)).collect();
    let tuple = values::make_tuple(&vals, &ty).unwrap();

    let mut current_ty = ty;
    let mut current = tuple;
    let mut index = 16;
    loop {
        let (prop, next) = values::precompute_tuple_property_info(&current_ty, index).unwrap();
        current = prop.get_value(&current).unwrap();
        match next {
            Some((nested, nested_index)) => {
                current_ty = nested;
                index = nested_index;
            }
            None => break,
        }
    }
    assert_eq!(current, Value::from(16));
}

#[test]
fn test_constructor_rejects_wrong_arguments() {
    let ty = types::make_tuple_type(&[Type::int(), Type::string()]).unwrap();
    let make = values::precompute_tuple_constructor(&ty).unwrap();
    assert!(matches!(
        make(&[Value::from(1)]),
        Err(ReflectError::InvalidArgument { .. })
    ));
    assert!(matches!(
        make(&[Value::from("x"), Value::from("y")]),
        Err(ReflectError::Host(_))
    ));
}

#[test]
fn test_field_index_out_of_range() {
    let ty = types::make_tuple_type(&[Type::int(), Type::int()]).unwrap();
    let tuple = values::make_tuple(&[Value::from(1), Value::from(2)], &ty).unwrap();
    assert!(matches!(
        values::get_tuple_field(&tuple, 2),
        Err(ReflectError::IndexOutOfRange { index: 2, .. })
    ));
}

#[test]
fn test_non_tuples_rejected() {
    assert!(matches!(
        types::get_tuple_elements(&Type::string()),
        Err(ReflectError::NotOfKind { kind: ShapeKind::Tuple, .. })
    ));
    assert!(matches!(
        values::get_tuple_fields(&Value::Null),
        Err(ReflectError::NullArgument { name: "tuple" })
    ));
    assert!(matches!(
        types::make_tuple_type(&[]),
        Err(ReflectError::InvalidArgument { .. })
    ));
    assert_eq!(
        types::classify(&Type::string(), BindingFlags::PUBLIC).unwrap(),
        None
    );
}
