//! Record emitter

use super::{field_mapping, Representation, Shape};
use crate::host::{ClassBody, ConstructorDef, PropertyDef, SourceConstructFlags, Type};

/// Builds a record type
#[derive(Debug, Clone)]
pub struct RecordBuilder {
    shape: Shape,
    fields: Vec<(String, Type)>,
}

impl RecordBuilder {
    /// Start a record declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            shape: Shape::new(name),
            fields: Vec::new(),
        }
    }

    /// Declare `arity` type parameters, referenced as `Type::param(i)`
    pub fn generic(mut self, arity: usize) -> Self {
        self.shape.arity = arity;
        self
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

    /// Emit the record type
    pub fn build(self) -> Type {
        let hidden = self.shape.hidden;
        let mut body =
            ClassBody::new().with_attribute(self.shape.mapping(SourceConstructFlags::RECORD_TYPE));
        for (seq, (name, ty)) in self.fields.iter().enumerate() {
            let prop = PropertyDef::slot(name.as_str(), ty.clone(), seq)
                .with_attribute(field_mapping(0, seq));
            body = body.with_property(prop.hidden_if(hidden));
        }

        let ctor = ConstructorDef::slots(self.fields.into_iter().map(|(_, ty)| ty).collect());
        body = body.with_constructor(ctor.hidden_if(hidden));

        tracing::trace!(name = %self.shape.name, "emitting record");
        Type::class(self.shape.class_def(), body)
    }
}
