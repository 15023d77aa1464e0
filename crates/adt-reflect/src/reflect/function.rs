//! Function codec
//!
//! Function values are objects whose class is, or derives from, `Func`2`.
//! Wrapping an untyped closure instantiates the non-public `FuncAdapter`2`
//! for the requested signature; the adapter checks values crossing the
//! boundary against the domain and range.

use super::classify::is_function_type;
use crate::error::{HostError, HostResult, ReflectError, ReflectResult, ShapeKind};
use crate::host::{function_type, intrinsics, Type, Value};

pub(crate) fn check_function_type(ty: &Type) -> ReflectResult<()> {
    if is_function_type(ty) {
        Ok(())
    } else {
        Err(ReflectError::NotOfKind {
            type_name: ty.to_string(),
            kind: ShapeKind::Function,
        })
    }
}

/// `(domain, range)` of a function type
pub fn elements(ty: &Type) -> ReflectResult<(Type, Type)> {
    check_function_type(ty)?;
    match ty.generic_arguments().as_slice() {
        [domain, range] => Ok((domain.clone(), range.clone())),
        _ => Err(ReflectError::configuration(format!(
            "function type '{}' does not have a domain and a range",
            ty
        ))),
    }
}

/// Function type from `domain` to `range`
pub fn make_type(domain: Type, range: Type) -> Type {
    function_type(domain, range)
}

/// Wrap `implementation` as a value of function type `ty`.
///
/// Arguments outside the domain are rejected before `implementation` runs;
/// results outside the range are rejected after.
pub fn wrap<F>(ty: &Type, implementation: F) -> ReflectResult<Value>
where
    F: Fn(Value) -> HostResult<Value> + Send + Sync + 'static,
{
    let (domain, range) = elements(ty)?;
    let adapter = intrinsics()
        .func_adapter()
        .make_generic(&[domain.clone(), range.clone()])?;
    let member = format!("{}.Invoke", adapter);
    tracing::trace!(ty = %ty, "wrapping native function");

    Ok(Value::closure(adapter, move |arg| {
        if !domain.accepts(&arg) {
            return Err(HostError::ArgumentType {
                member: member.clone(),
                index: 0,
                expected: domain.to_string(),
                actual: arg.describe(),
            });
        }
        let result = implementation(arg)?;
        if !range.accepts(&result) {
            return Err(HostError::Native {
                member: member.clone(),
                message: format!("returned {}, expected {}", result.describe(), range),
            });
        }
        Ok(result)
    }))
}
