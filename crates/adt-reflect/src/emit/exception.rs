//! Exception emitter
//!
//! Exception values keep the message in slot 0, inherited from the intrinsic
//! exception root, and the declared fields after it.

use super::{field_mapping, Representation, Shape};
use crate::host::{
    constructor_body, intrinsics, ClassBody, ConstructorDef, PropertyDef, SourceConstructFlags,
    Type, Value,
};

/// Builds an exception declaration
#[derive(Debug, Clone)]
pub struct ExceptionBuilder {
    shape: Shape,
    fields: Vec<(String, Type)>,
}

impl ExceptionBuilder {
    /// Start an exception declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            shape: Shape::new(name),
            fields: Vec::new(),
        }
    }

    /// Hide the representation from public reflection
    pub fn non_public_representation(mut self) -> Self {
        self.shape.hidden = true;
        self
    }

    /// Store attributes as data only
    pub fn inspection_only(mut self) -> Self {
        self.shape.inspection_only = true;
        self
    }

    /// Append a field
    pub fn field(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.fields.push((name.into(), ty));
        self
    }

    /// Emit the exception type
    pub fn build(self) -> Type {
        let hidden = self.shape.hidden;
        let mut body = ClassBody::new()
            .with_base(intrinsics().exception().clone())
            .with_attribute(self.shape.mapping(SourceConstructFlags::EXCEPTION));
        for (seq, (name, ty)) in self.fields.iter().enumerate() {
            body = body.with_property(
                PropertyDef::slot(name.as_str(), ty.clone(), seq + 1)
                    .with_attribute(field_mapping(0, seq))
                    .hidden_if(hidden),
            );
        }

        let params = self.fields.into_iter().map(|(_, ty)| ty).collect();
        let ctor = ConstructorDef::new(
            params,
            constructor_body(|ty, args| {
                let mut slots = Vec::with_capacity(args.len() + 1);
                slots.push(Value::from(format!("Exception of type '{}' was raised.", ty)));
                slots.extend_from_slice(args);
                Ok(Value::object(ty.clone(), slots))
            }),
        );
        body = body.with_constructor(ctor.hidden_if(hidden));

        tracing::trace!(name = %self.shape.name, "emitting exception");
        Type::class(self.shape.class_def(), body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::BindingFlags;

    #[test]
    fn test_exception_layout() {
        let ty = ExceptionBuilder::new("ParseError")
            .field("Line", Type::int())
            .build();
        assert_eq!(ty.base_type(), Some(intrinsics().exception().clone()));

        let ctor = ty
            .constructor(&[Type::int()], BindingFlags::PUBLIC.instance())
            .unwrap();
        let err = ctor.invoke(&[Value::from(7)]).unwrap();
        let flags = BindingFlags::PUBLIC.instance();
        assert_eq!(
            ty.property("Line", flags).unwrap().get_value(&err).unwrap(),
            Value::from(7)
        );
        assert_eq!(
            ty.property("Message", flags).unwrap().get_value(&err).unwrap(),
            Value::from("Exception of type 'ParseError' was raised.")
        );
    }
}
