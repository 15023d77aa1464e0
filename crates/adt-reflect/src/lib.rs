//! ADT Reflection
//!
//! Structural reflection over values produced by an algebraic-data-type
//! compiler: tuples, records, discriminated unions, closures and exceptions.
//! Given a type or a value, decide which of these it is, take it apart into
//! its fields and case tags, or build one back up from its parts.
//!
//! - [`types`]: classification and enumeration over types
//! - [`values`]: construction, decomposition and precomputed accessors
//! - [`reflect`]: the codecs behind both facades
//! - [`host`]: the in-memory metadata facility the codecs query
//! - [`emit`]: builders producing types laid out as the compiler lays them out

#![warn(missing_docs)]

pub mod emit;
pub mod error;
pub mod host;
pub mod reflect;
pub mod types;
pub mod values;

pub use error::{HostError, HostResult, ReflectError, ReflectResult, ShapeKind};
pub use host::{BindingFlags, Type, Value};
pub use reflect::{
    FieldReader, FieldsReader, TagMember, TagReader, UnionCaseInfo, ValueConstructor,
};
