//! Tuple codec
//!
//! Tuples of up to seven elements map onto one `Tuple`n` instantiation.
//! Longer tuples use `Tuple`8`: seven elements followed by a `Rest` slot
//! holding the remaining elements as another tuple, recursively. An 8-tuple
//! therefore nests a `Tuple`1` in `Rest`.

use super::classify::is_tuple_type;
use super::{fields_reader, value_constructor, FieldsReader, ValueConstructor};
use crate::error::{ReflectError, ReflectResult, ShapeKind};
use crate::host::{
    intrinsics, BindingFlags, ConstructorInfo, PropertyInfo, Type, Value, MAX_TUPLE_ARITY,
};

/// Elements stored directly in a nesting level before `Rest`
const DIRECT_ELEMENTS: usize = MAX_TUPLE_ARITY - 1;

pub(crate) fn check_tuple_type(ty: &Type) -> ReflectResult<()> {
    if is_tuple_type(ty) {
        Ok(())
    } else {
        Err(ReflectError::NotOfKind {
            type_name: ty.to_string(),
            kind: ShapeKind::Tuple,
        })
    }
}

/// Build the tuple type for `types`, nesting through `Rest` beyond seven
pub fn make_type(types: &[Type]) -> ReflectResult<Type> {
    if types.is_empty() {
        return Err(ReflectError::invalid("a tuple needs at least one element type"));
    }

    let mut chunks = Vec::new();
    let mut rest = types;
    while rest.len() >= MAX_TUPLE_ARITY {
        let (head, tail) = rest.split_at(DIRECT_ELEMENTS);
        chunks.push(head);
        rest = tail;
    }

    let mut tuple = instantiate(rest)?;
    for chunk in chunks.into_iter().rev() {
        let mut args = chunk.to_vec();
        args.push(tuple);
        tuple = instantiate(&args)?;
    }
    Ok(tuple)
}

fn instantiate(args: &[Type]) -> ReflectResult<Type> {
    let def = intrinsics()
        .tuple(args.len())
        .ok_or_else(|| ReflectError::invalid(format!("no tuple of arity {}", args.len())))?;
    Ok(def.make_generic(args)?)
}

/// Element types in order, flattening the `Rest` chain
pub fn element_types(ty: &Type) -> ReflectResult<Vec<Type>> {
    check_tuple_type(ty)?;
    let mut out = Vec::new();
    let mut current = ty.clone();
    loop {
        let mut args = current.generic_arguments();
        if args.len() < MAX_TUPLE_ARITY {
            out.extend(args);
            return Ok(out);
        }
        let rest = args.pop().ok_or_else(|| missing_rest(&current))?;
        out.extend(args);
        check_tuple_type(&rest)?;
        current = rest;
    }
}

fn missing_rest(ty: &Type) -> ReflectError {
    ReflectError::configuration(format!("tuple type '{}' has no Rest element", ty))
}

/// Position of a tuple property: `ItemN` is `N`, `Rest` comes last
fn slot_order(name: &str) -> Option<usize> {
    if name == "Rest" {
        return Some(MAX_TUPLE_ARITY);
    }
    name.strip_prefix("Item")?.parse().ok()
}

/// Public element properties of one nesting level, in element order
fn ordered_properties(ty: &Type) -> ReflectResult<Vec<PropertyInfo>> {
    let mut keyed = ty
        .properties(BindingFlags::PUBLIC.instance())
        .into_iter()
        .map(|p| match slot_order(p.name()) {
            Some(order) => Ok((order, p)),
            None => Err(ReflectError::configuration(format!(
                "unexpected tuple property '{}'",
                p.qualified_name()
            ))),
        })
        .collect::<ReflectResult<Vec<_>>>()?;
    keyed.sort_by_key(|(order, _)| *order);
    Ok(keyed.into_iter().map(|(_, p)| p).collect())
}

/// Property reading element `index`, plus where to continue when the element
/// lives in a nested tuple: `(Rest type, index within it)`
pub fn property_info(
    ty: &Type,
    index: usize,
) -> ReflectResult<(PropertyInfo, Option<(Type, usize)>)> {
    check_tuple_type(ty)?;
    let props = ordered_properties(ty)?;
    let out_of_range = || ReflectError::IndexOutOfRange {
        type_name: ty.to_string(),
        index,
    };
    if index < DIRECT_ELEMENTS {
        let prop = props.get(index).cloned().ok_or_else(out_of_range)?;
        return Ok((prop, None));
    }
    let args = ty.generic_arguments();
    if args.len() < MAX_TUPLE_ARITY {
        return Err(out_of_range());
    }
    let rest = props
        .get(DIRECT_ELEMENTS)
        .cloned()
        .ok_or_else(|| missing_rest(ty))?;
    Ok((
        rest,
        Some((args[DIRECT_ELEMENTS].clone(), index - DIRECT_ELEMENTS)),
    ))
}

/// Constructor of the outermost level, plus the `Rest` type when nested
pub fn constructor_info(ty: &Type) -> ReflectResult<(ConstructorInfo, Option<Type>)> {
    check_tuple_type(ty)?;
    let args = ty.generic_arguments();
    let ctor = ty
        .constructor(&args, BindingFlags::PUBLIC.instance())
        .ok_or_else(|| {
            ReflectError::configuration(format!("tuple type '{}' has no constructor", ty))
        })?;
    let rest = (args.len() == MAX_TUPLE_ARITY).then(|| args[DIRECT_ELEMENTS].clone());
    Ok((ctor, rest))
}

/// One nesting level of a tuple
struct Level<T> {
    members: T,
    nested: bool,
}

fn levels<T, F>(ty: &Type, mut describe: F) -> ReflectResult<Vec<Level<T>>>
where
    F: FnMut(&Type) -> ReflectResult<T>,
{
    check_tuple_type(ty)?;
    let mut out = Vec::new();
    let mut current = ty.clone();
    loop {
        let args = current.generic_arguments();
        let nested = args.len() == MAX_TUPLE_ARITY;
        out.push(Level {
            members: describe(&current)?,
            nested,
        });
        if !nested {
            return Ok(out);
        }
        current = args[DIRECT_ELEMENTS].clone();
        check_tuple_type(&current)?;
    }
}

/// Reader returning every element of a tuple value, flattened
pub fn reader(ty: &Type) -> ReflectResult<FieldsReader> {
    let levels = levels(ty, ordered_properties)?;
    Ok(fields_reader(move |value| {
        let mut out = Vec::new();
        let mut current = value.clone();
        for level in &levels {
            if !level.nested {
                for prop in &level.members {
                    out.push(prop.get_value(&current)?);
                }
                break;
            }
            let (direct, rest) = level.members.split_at(DIRECT_ELEMENTS);
            for prop in direct {
                out.push(prop.get_value(&current)?);
            }
            let rest = rest.first().ok_or_else(|| {
                ReflectError::configuration("tuple level without a Rest property")
            })?;
            current = rest.get_value(&current)?;
        }
        Ok(out)
    }))
}

/// Constructor taking every element of the tuple, flattened
pub fn constructor(ty: &Type) -> ReflectResult<ValueConstructor> {
    let levels = levels(ty, |level| constructor_info(level).map(|(ctor, _)| ctor))?;
    let arity = element_types(ty)?.len();
    let type_name = ty.to_string();
    Ok(value_constructor(move |args| {
        if args.len() != arity {
            return Err(ReflectError::invalid(format!(
                "tuple type '{}' has {} element(s), got {} value(s)",
                type_name,
                arity,
                args.len()
            )));
        }
        let mut inner: Option<Value> = None;
        for (depth, level) in levels.iter().enumerate().rev() {
            let start = depth * DIRECT_ELEMENTS;
            let value = match inner.take() {
                None => level.members.invoke(&args[start..])?,
                Some(rest) => {
                    let mut level_args = args[start..start + DIRECT_ELEMENTS].to_vec();
                    level_args.push(rest);
                    level.members.invoke(&level_args)?
                }
            };
            inner = Some(value);
        }
        inner.ok_or_else(|| ReflectError::configuration("tuple type without levels"))
    }))
}

/// Read element `index` of a tuple value
pub fn get_field(value: &Value, index: usize) -> ReflectResult<Value> {
    let mut ty = value
        .runtime_type()
        .ok_or(ReflectError::NullArgument { name: "tuple" })?;
    let mut current = value.clone();
    let mut index = index;
    loop {
        let (prop, next) = property_info(&ty, index)?;
        current = prop.get_value(&current)?;
        match next {
            None => return Ok(current),
            Some((rest, rest_index)) => {
                ty = rest;
                index = rest_index;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ints(n: usize) -> Vec<Type> {
        (0..n).map(|_| Type::int()).collect()
    }

    #[test]
    fn test_make_type_nesting() {
        let seven = make_type(&ints(7)).unwrap();
        assert_eq!(seven.generic_arguments().len(), 7);

        let eight = make_type(&ints(8)).unwrap();
        let args = eight.generic_arguments();
        assert_eq!(args.len(), 8);
        assert_eq!(args[7], make_type(&ints(1)).unwrap());

        let fifteen = make_type(&ints(15)).unwrap();
        assert_eq!(element_types(&fifteen).unwrap().len(), 15);
    }

    #[test]
    fn test_make_type_rejects_empty() {
        assert!(matches!(
            make_type(&[]),
            Err(ReflectError::InvalidArgument { .. })
        ));
    }

    #[test]
    fn test_non_tuple_is_rejected() {
        assert!(matches!(
            element_types(&Type::int()),
            Err(ReflectError::NotOfKind { kind: ShapeKind::Tuple, .. })
        ));
    }

    #[test]
    fn test_slot_order() {
        assert_eq!(slot_order("Item1"), Some(1));
        assert_eq!(slot_order("Item7"), Some(7));
        assert_eq!(slot_order("Rest"), Some(MAX_TUPLE_ARITY));
        assert_eq!(slot_order("Other"), None);
    }

    #[test]
    fn test_property_info_continuation() {
        let ty = make_type(&ints(10)).unwrap();
        let (prop, next) = property_info(&ty, 2).unwrap();
        assert_eq!(prop.name(), "Item3");
        assert!(next.is_none());

        let (prop, next) = property_info(&ty, 9).unwrap();
        assert_eq!(prop.name(), "Rest");
        let (rest, index) = next.unwrap();
        assert_eq!(index, 2);
        assert_eq!(rest.generic_arguments().len(), 3);

        let small = make_type(&ints(3)).unwrap();
        assert!(matches!(
            property_info(&small, 3),
            Err(ReflectError::IndexOutOfRange { index: 3, .. })
        ));
        assert!(matches!(
            property_info(&small, 8),
            Err(ReflectError::IndexOutOfRange { index: 8, .. })
        ));
    }

    #[test]
    fn test_constructor_info_rest() {
        let (_, rest) = constructor_info(&make_type(&ints(2)).unwrap()).unwrap();
        assert!(rest.is_none());
        let (ctor, rest) = constructor_info(&make_type(&ints(9)).unwrap()).unwrap();
        assert_eq!(ctor.parameter_types().len(), 8);
        assert_eq!(rest, Some(make_type(&ints(2)).unwrap()));
    }

    #[test]
    fn test_get_field_through_rest() {
        let ty = make_type(&ints(12)).unwrap();
        let values: Vec<Value> = (0..12).map(Value::from).collect();
        let tuple = constructor(&ty).unwrap()(&values).unwrap();
        for i in 0..12 {
            assert_eq!(get_field(&tuple, i).unwrap(), Value::from(i as i64));
        }
        assert!(matches!(
            get_field(&tuple, 12),
            Err(ReflectError::IndexOutOfRange { .. })
        ));
    }
}
