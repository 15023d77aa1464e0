//! Compiled-shape emitter
//!
//! Builds host types laid out exactly the way the ADT compiler lays out its
//! declarations, so that the reflection core has something to reflect over
//! without a compiler in the loop.
//!
//! ```text
//! RecordBuilder::new("Person")
//!     .field("Name", Type::string())
//!     .field("Age", Type::int())
//!     .build()
//! ```
//!
//! All builders share the same options:
//!
//! | Option                        | Effect                                        |
//! |-------------------------------|-----------------------------------------------|
//! | `generic(arity)`              | open definition with `arity` type parameters  |
//! | `non_public_representation()` | mapping flag set, members emitted non-public  |
//! | `inspection_only()`           | attributes readable as data only              |

mod exception;
mod module;
mod record;
mod union;

pub use exception::ExceptionBuilder;
pub use module::ModuleBuilder;
pub use record::RecordBuilder;
pub use union::{TagAccess, UnionBuilder};

use crate::host::{
    AttributeData, ClassDef, ConstructorDef, FieldDef, MethodDef, PropertyDef, SourceConstructFlags,
    Type,
};

/// Options shared by every builder
#[derive(Debug, Clone, Default)]
struct Shape {
    name: String,
    arity: usize,
    hidden: bool,
    inspection_only: bool,
}

impl Shape {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Class definition for the declaration itself, which stays public
    fn class_def(&self) -> ClassDef {
        ClassDef::new(self.name.as_str())
            .generic(self.arity)
            .inspection_only(self.inspection_only)
    }

    /// Class definition for a representation type nested in the declaration
    fn nested_def(&self, name: &str, arity: usize) -> ClassDef {
        let def = ClassDef::new(name)
            .generic(arity)
            .inspection_only(self.inspection_only);
        if self.hidden {
            def.non_public()
        } else {
            def
        }
    }

    /// Mapping attribute for the declaration
    fn mapping(&self, kind: SourceConstructFlags) -> AttributeData {
        let flags = if self.hidden {
            kind.union(SourceConstructFlags::NON_PUBLIC_REPRESENTATION)
        } else {
            kind
        };
        AttributeData::mapping(flags)
    }

    /// The declaration as seen from inside its own body: the plain class, or
    /// the definition instantiated with its own parameters
    fn self_type(&self, declared: &Type) -> Type {
        if self.arity == 0 {
            declared.clone()
        } else {
            declared.with_args((0..self.arity).map(Type::param).collect())
        }
    }
}

/// Instance of `def` matching the generic arguments of `owner`
fn instance_of(def: &Type, owner: &Type) -> Type {
    if def.is_generic_definition() {
        def.with_args(owner.generic_arguments())
    } else {
        def.clone()
    }
}

/// Members that follow the declaration's representation visibility
trait Representation: Sized {
    fn non_public_member(self) -> Self;

    fn hidden_if(self, hidden: bool) -> Self {
        if hidden {
            self.non_public_member()
        } else {
            self
        }
    }
}

macro_rules! impl_representation {
    ($($def:ty),*) => {
        $(
            impl Representation for $def {
                fn non_public_member(self) -> Self {
                    self.non_public()
                }
            }
        )*
    };
}

impl_representation!(PropertyDef, FieldDef, MethodDef, ConstructorDef);

/// `Field` mapping for the field at `seq` of case `variant`
fn field_mapping(variant: usize, seq: usize) -> AttributeData {
    AttributeData::mapping_variant(SourceConstructFlags::FIELD, variant as i32, seq as i32)
}
