//! Runtime values

use std::fmt;
use std::sync::Arc;

use super::ty::{Primitive, Type};
use crate::error::{HostError, HostResult};

/// Native closure stored in a function object
pub type NativeFn = Arc<dyn Fn(Value) -> HostResult<Value> + Send + Sync>;

/// Object payload
#[derive(Clone)]
pub enum Payload {
    /// Field storage
    Slots(Box<[Value]>),
    /// Function body
    Closure(NativeFn),
}

/// Heap object with a runtime type
#[derive(Clone)]
pub struct Object {
    ty: Type,
    payload: Payload,
}

impl Object {
    /// Runtime type
    pub fn runtime_type(&self) -> &Type {
        &self.ty
    }

    /// Slot storage; empty for closures
    pub fn slots(&self) -> &[Value] {
        match &self.payload {
            Payload::Slots(slots) => &slots[..],
            Payload::Closure(_) => &[],
        }
    }

    /// Slot by index
    pub fn slot(&self, index: usize) -> Option<&Value> {
        self.slots().get(index)
    }

    /// Payload
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

/// A runtime value
#[derive(Clone)]
pub enum Value {
    /// Null reference
    Null,
    /// The unit value
    Unit,
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// String
    Str(Arc<str>),
    /// Heap object
    Object(Arc<Object>),
}

impl Value {
    /// Object with slot storage
    pub fn object(ty: Type, slots: Vec<Value>) -> Self {
        Value::Object(Arc::new(Object {
            ty,
            payload: Payload::Slots(slots.into_boxed_slice()),
        }))
    }

    /// Function object backed by a native closure
    pub fn closure<F>(ty: Type, f: F) -> Self
    where
        F: Fn(Value) -> HostResult<Value> + Send + Sync + 'static,
    {
        Value::Object(Arc::new(Object {
            ty,
            payload: Payload::Closure(Arc::new(f)),
        }))
    }

    /// Whether this is the null reference
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Primitive kind of a scalar value
    pub fn primitive(&self) -> Option<Primitive> {
        match self {
            Value::Unit => Some(Primitive::Unit),
            Value::Bool(_) => Some(Primitive::Bool),
            Value::Int(_) => Some(Primitive::Int),
            Value::Float(_) => Some(Primitive::Float),
            Value::Str(_) => Some(Primitive::String),
            Value::Null | Value::Object(_) => None,
        }
    }

    /// Runtime type; `None` for null, which carries no type
    pub fn runtime_type(&self) -> Option<Type> {
        match self {
            Value::Null => None,
            Value::Object(obj) => Some(obj.ty.clone()),
            other => other.primitive().map(Type::primitive),
        }
    }

    /// Object payload, if any
    pub fn as_object(&self) -> Option<&Object> {
        match self {
            Value::Object(obj) => Some(obj),
            _ => None,
        }
    }

    /// Integer payload
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// String payload
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Runtime type name, or `null`
    pub fn describe(&self) -> String {
        self.runtime_type()
            .map_or_else(|| "null".to_string(), |ty| ty.to_string())
    }

    /// Apply a function value to `arg`
    pub fn apply(&self, arg: Value) -> HostResult<Value> {
        match self {
            Value::Object(obj) => match &obj.payload {
                Payload::Closure(f) => f(arg),
                Payload::Slots(_) => Err(HostError::NotInvocable {
                    type_name: obj.ty.to_string(),
                }),
            },
            other => Err(HostError::NotInvocable {
                type_name: other.describe(),
            }),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) | (Value::Unit, Value::Unit) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                if Arc::ptr_eq(a, b) {
                    return true;
                }
                match (&a.payload, &b.payload) {
                    (Payload::Slots(x), Payload::Slots(y)) => a.ty == b.ty && x == y,
                    (Payload::Closure(f), Payload::Closure(g)) => Arc::ptr_eq(f, g),
                    _ => false,
                }
            }
            _ => false,
        }
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Unit => f.write_str("()"),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Int(i) => write!(f, "{}", i),
            Value::Float(x) => write!(f, "{}", x),
            Value::Str(s) => write!(f, "{:?}", s),
            Value::Object(obj) => match &obj.payload {
                Payload::Slots(slots) => {
                    write!(f, "{} ", obj.ty)?;
                    f.debug_list().entries(slots.iter()).finish()
                }
                Payload::Closure(_) => write!(f, "<fun {}>", obj.ty),
            },
        }
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<f64> for Value {
    fn from(x: f64) -> Self {
        Value::Float(x)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Str(Arc::from(s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::ty::{ClassBody, ClassDef};

    #[test]
    fn test_runtime_types() {
        assert_eq!(Value::Null.runtime_type(), None);
        assert_eq!(Value::Int(1).runtime_type(), Some(Type::int()));
        assert_eq!(Value::from("s").runtime_type(), Some(Type::string()));
        assert_eq!(Value::Null.describe(), "null");
    }

    #[test]
    fn test_object_equality_is_structural() {
        let ty = Type::class(ClassDef::new("Cell"), ClassBody::new());
        let a = Value::object(ty.clone(), vec![Value::Int(1)]);
        let b = Value::object(ty.clone(), vec![Value::Int(1)]);
        let c = Value::object(ty, vec![Value::Int(2)]);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_apply() {
        let ty = Type::class(ClassDef::new("Inc"), ClassBody::new());
        let inc = Value::closure(ty.clone(), |v| match v {
            Value::Int(i) => Ok(Value::Int(i + 1)),
            other => Ok(other),
        });
        assert_eq!(inc.apply(Value::Int(41)), Ok(Value::Int(42)));
        assert!(matches!(
            Value::object(ty, vec![]).apply(Value::Unit),
            Err(HostError::NotInvocable { .. })
        ));
        assert!(Value::Int(1).apply(Value::Unit).is_err());
    }
}
