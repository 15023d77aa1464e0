//! Reflection errors

use std::fmt;

use thiserror::Error;

/// Errors raised by the in-memory host metadata facility
#[derive(Debug, Clone, Error, PartialEq)]
pub enum HostError {
    /// Wrong number of arguments passed to a method or constructor
    #[error("{member} expects {expected} argument(s), got {actual}")]
    ArgumentCount {
        /// Member being invoked
        member: String,
        /// Declared parameter count
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// Argument value not accepted by the declared parameter type
    #[error("argument {index} of {member}: expected {expected}, got {actual}")]
    ArgumentType {
        /// Member being invoked
        member: String,
        /// Parameter position
        index: usize,
        /// Declared parameter type
        expected: String,
        /// Runtime description of the supplied value
        actual: String,
    },

    /// Instance member used without a target
    #[error("{member} requires a non-null target")]
    NullTarget {
        /// Member being accessed
        member: String,
    },

    /// Instance member used on a value of an unrelated type
    #[error("{member} is declared on {expected}, target is {actual}")]
    TargetType {
        /// Member being accessed
        member: String,
        /// Declaring type
        expected: String,
        /// Runtime type of the target
        actual: String,
    },

    /// Value is not a closure
    #[error("value of type {type_name} cannot be applied")]
    NotInvocable {
        /// Runtime type of the value
        type_name: String,
    },

    /// Wrong number of generic arguments
    #[error("{type_name} takes {expected} type argument(s), got {actual}")]
    GenericArity {
        /// Generic definition
        type_name: String,
        /// Declared arity
        expected: usize,
        /// Supplied argument count
        actual: usize,
    },

    /// `make_generic` called on a type that is not an open generic definition
    #[error("{type_name} is not a generic type definition")]
    NotGeneric {
        /// Offending type
        type_name: String,
    },

    /// Attribute constructor arguments do not fit any constructor
    #[error("invalid attribute {type_name}: {reason}")]
    InvalidAttribute {
        /// Attribute type name
        type_name: String,
        /// What is wrong with the arguments
        reason: String,
    },

    /// Attribute instances requested on metadata loaded for inspection only
    #[error("cannot instantiate attributes of {owner}: loaded for inspection only")]
    InspectionOnly {
        /// Type or member owning the attributes
        owner: String,
    },

    /// Native member body failed
    #[error("{member} failed: {message}")]
    Native {
        /// Member being invoked
        member: String,
        /// Failure description
        message: String,
    },
}

/// Structural kind named in classification errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    /// Tuple type
    Tuple,
    /// Function type or closure representation
    Function,
    /// Record type
    Record,
    /// Discriminated union type
    Union,
    /// Representation type of one union case
    UnionCase,
    /// Exception declaration
    Exception,
    /// Module
    Module,
}

impl fmt::Display for ShapeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ShapeKind::Tuple => "tuple",
            ShapeKind::Function => "function",
            ShapeKind::Record => "record",
            ShapeKind::Union => "union",
            ShapeKind::UnionCase => "union case",
            ShapeKind::Exception => "exception",
            ShapeKind::Module => "module",
        };
        f.write_str(name)
    }
}

/// Errors raised by the reflection core
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ReflectError {
    /// A required argument is absent
    #[error("argument '{name}' must not be null")]
    NullArgument {
        /// Argument name
        name: &'static str,
    },

    /// The type is not of the requested structural kind
    #[error("the type '{type_name}' is not a {kind} type")]
    NotOfKind {
        /// Offending type
        type_name: String,
        /// Requested kind
        kind: ShapeKind,
    },

    /// The type is of the requested kind but its representation is hidden
    #[error(
        "the type '{type_name}' is a {kind} type with a private representation; \
         pass BindingFlags::NON_PUBLIC to access it"
    )]
    PrivateRepresentation {
        /// Offending type
        type_name: String,
        /// Requested kind
        kind: ShapeKind,
    },

    /// Argument violates a contract not covered by a more specific variant
    #[error("invalid argument: {message}")]
    InvalidArgument {
        /// Description
        message: String,
    },

    /// Tuple field index outside the tuple's field count
    #[error("index {index} is out of range for tuple type '{type_name}'")]
    IndexOutOfRange {
        /// Tuple type
        type_name: String,
        /// Offending index
        index: usize,
    },

    /// Compiled metadata does not have the shape the codecs expect
    #[error("inconsistent compiled metadata: {message}")]
    Configuration {
        /// Description
        message: String,
    },

    /// Failure reported by the host metadata facility
    #[error(transparent)]
    Host(#[from] HostError),
}

impl ReflectError {
    /// Shorthand for [`ReflectError::InvalidArgument`]
    pub fn invalid(message: impl Into<String>) -> Self {
        ReflectError::InvalidArgument {
            message: message.into(),
        }
    }

    /// Shorthand for [`ReflectError::Configuration`]
    pub fn configuration(message: impl Into<String>) -> Self {
        let message = message.into();
        tracing::debug!(%message, "compiled metadata mismatch");
        ReflectError::Configuration { message }
    }
}

/// Result type for host metadata operations
pub type HostResult<T> = Result<T, HostError>;

/// Result type for reflection operations
pub type ReflectResult<T> = Result<T, ReflectError>;
