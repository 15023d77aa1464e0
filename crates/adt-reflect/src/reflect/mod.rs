//! Reflection core
//!
//! Codecs that take compiled tuples, records, unions, closures and exceptions
//! apart and build them back up, plus the decoder and classifier they share.
//! Operations that return a closure do all metadata lookups up front; the
//! closure itself only reads properties or invokes members.

pub mod classify;
pub mod exception;
pub mod function;
pub mod mapping;
pub mod record;
pub mod tuple;
pub mod union;

use std::sync::Arc;

use crate::error::ReflectResult;
use crate::host::Value;

/// Reads every field of a value, in declaration order
pub type FieldsReader = Arc<dyn Fn(&Value) -> ReflectResult<Vec<Value>> + Send + Sync>;

/// Reads one field of a value
pub type FieldReader = Arc<dyn Fn(&Value) -> ReflectResult<Value> + Send + Sync>;

/// Builds a value from its fields
pub type ValueConstructor = Arc<dyn Fn(&[Value]) -> ReflectResult<Value> + Send + Sync>;

/// Reads the case tag of a union value
pub type TagReader = Arc<dyn Fn(&Value) -> ReflectResult<usize> + Send + Sync>;

pub(crate) fn fields_reader<F>(f: F) -> FieldsReader
where
    F: Fn(&Value) -> ReflectResult<Vec<Value>> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn field_reader<F>(f: F) -> FieldReader
where
    F: Fn(&Value) -> ReflectResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn value_constructor<F>(f: F) -> ValueConstructor
where
    F: Fn(&[Value]) -> ReflectResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub(crate) fn tag_reader<F>(f: F) -> TagReader
where
    F: Fn(&Value) -> ReflectResult<usize> + Send + Sync + 'static,
{
    Arc::new(f)
}

pub use classify::{classify, ReprVisibility};
pub use mapping::{CompilationMappingDecoder, MappingDecoder, MappingTriple};
pub use union::{TagMember, UnionCaseInfo};
