//! Module emitter

use super::Shape;
use crate::host::{ClassBody, MethodBody, MethodDef, SourceConstructFlags, Type};

/// Builds a module: a class holding static functions
pub struct ModuleBuilder {
    shape: Shape,
    functions: Vec<MethodDef>,
}

impl ModuleBuilder {
    /// Start a module declaration
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            shape: Shape::new(name),
            functions: Vec::new(),
        }
    }

    /// Store attributes as data only
    pub fn inspection_only(mut self) -> Self {
        self.shape.inspection_only = true;
        self
    }

    /// Add a static function
    pub fn function(
        mut self,
        name: impl Into<String>,
        params: Vec<Type>,
        ret: Type,
        body: MethodBody,
    ) -> Self {
        self.functions
            .push(MethodDef::new(name, params, ret, body).as_static());
        self
    }

    /// Emit the module type
    pub fn build(self) -> Type {
        let body = self.functions.into_iter().fold(
            ClassBody::new().with_attribute(self.shape.mapping(SourceConstructFlags::MODULE)),
            ClassBody::with_method,
        );
        Type::class(self.shape.class_def(), body)
    }
}
