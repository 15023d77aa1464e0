//! Custom attribute storage
//!
//! Attributes are stored the way a loader sees them: as the attribute type
//! name plus its constructor arguments (`AttributeData`). Live instances
//! (`Attribute`) are materialized on demand by running the attribute's
//! constructor over that data, which is refused for metadata that was loaded
//! for inspection only.

use std::fmt;

use crate::error::{HostError, HostResult};

/// Type name of the compilation mapping attribute
pub const COMPILATION_MAPPING: &str = "CompilationMappingAttribute";

/// Kind and visibility bits carried by the compilation mapping attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceConstructFlags(u32);

impl SourceConstructFlags {
    /// Not a compiled construct
    pub const NONE: Self = Self(0);
    /// Discriminated union
    pub const SUM_TYPE: Self = Self(1);
    /// Record
    pub const RECORD_TYPE: Self = Self(2);
    /// Plain class
    pub const OBJECT_TYPE: Self = Self(3);
    /// Record, union case or exception field
    pub const FIELD: Self = Self(4);
    /// Exception declaration
    pub const EXCEPTION: Self = Self(5);
    /// Closure class
    pub const CLOSURE: Self = Self(6);
    /// Module
    pub const MODULE: Self = Self(7);
    /// Union case constructor or singleton getter
    pub const UNION_CASE: Self = Self(8);
    /// Module-level value
    pub const VALUE: Self = Self(9);
    /// Bits holding the kind
    pub const KIND_MASK: Self = Self(31);
    /// The declaration's representation is hidden from public reflection
    pub const NON_PUBLIC_REPRESENTATION: Self = Self(32);

    /// Create from raw bits
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Get raw bits
    pub const fn bits(&self) -> u32 {
        self.0
    }

    /// Kind bits only
    pub const fn kind(&self) -> Self {
        Self(self.0 & Self::KIND_MASK.0)
    }

    /// Whether the kind bits equal `kind`
    pub const fn is_kind(&self, kind: Self) -> bool {
        self.kind().0 == kind.0
    }

    /// Whether the non-public representation bit is set
    pub const fn is_non_public(&self) -> bool {
        self.0 & Self::NON_PUBLIC_REPRESENTATION.0 != 0
    }

    /// Union of flags
    pub const fn union(&self, other: Self) -> Self {
        Self(self.0 | other.0)
    }
}

/// Constructor argument of a stored attribute
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttributeArg {
    /// Enumeration value
    Enum(u32),
    /// 32-bit integer
    Int(i32),
    /// String
    Str(String),
    /// Boolean
    Bool(bool),
}

/// An attribute as stored in metadata: type name and constructor arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeData {
    /// Attribute type name
    pub type_name: String,
    /// Constructor arguments in order
    pub args: Vec<AttributeArg>,
}

impl AttributeData {
    /// Create attribute data
    pub fn new(type_name: impl Into<String>, args: Vec<AttributeArg>) -> Self {
        Self {
            type_name: type_name.into(),
            args,
        }
    }

    /// Compilation mapping with flags only
    pub fn mapping(flags: SourceConstructFlags) -> Self {
        Self::new(COMPILATION_MAPPING, vec![AttributeArg::Enum(flags.bits())])
    }

    /// Compilation mapping with flags and sequence number
    pub fn mapping_seq(flags: SourceConstructFlags, sequence: i32) -> Self {
        Self::new(
            COMPILATION_MAPPING,
            vec![AttributeArg::Enum(flags.bits()), AttributeArg::Int(sequence)],
        )
    }

    /// Compilation mapping with flags, variant number and sequence number
    pub fn mapping_variant(flags: SourceConstructFlags, variant: i32, sequence: i32) -> Self {
        Self::new(
            COMPILATION_MAPPING,
            vec![
                AttributeArg::Enum(flags.bits()),
                AttributeArg::Int(variant),
                AttributeArg::Int(sequence),
            ],
        )
    }

    /// Whether this is a compilation mapping attribute
    pub fn is_compilation_mapping(&self) -> bool {
        self.type_name == COMPILATION_MAPPING
    }
}

/// Live compilation mapping attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CompilationMapping {
    /// Kind and visibility flags
    pub flags: SourceConstructFlags,
    /// Declaration order among siblings
    pub sequence_number: i32,
    /// Owning union case for case fields
    pub variant_number: i32,
}

impl CompilationMapping {
    /// Run the attribute constructor matching `args`
    pub fn from_args(args: &[AttributeArg]) -> HostResult<Self> {
        let bad = |reason: &str| HostError::InvalidAttribute {
            type_name: COMPILATION_MAPPING.to_string(),
            reason: reason.to_string(),
        };
        match args {
            [AttributeArg::Enum(flags)] => Ok(Self {
                flags: SourceConstructFlags::from_bits(*flags),
                sequence_number: 0,
                variant_number: 0,
            }),
            [AttributeArg::Enum(flags), AttributeArg::Int(sequence)] => Ok(Self {
                flags: SourceConstructFlags::from_bits(*flags),
                sequence_number: *sequence,
                variant_number: 0,
            }),
            [AttributeArg::Enum(flags), AttributeArg::Int(variant), AttributeArg::Int(sequence)] => {
                Ok(Self {
                    flags: SourceConstructFlags::from_bits(*flags),
                    sequence_number: *sequence,
                    variant_number: *variant,
                })
            }
            [] => Err(bad("no constructor takes zero arguments")),
            _ => Err(bad("constructor arguments do not match (flags[, variant], sequence)")),
        }
    }
}

/// Materialized attribute instance
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attribute {
    /// Compilation mapping attribute
    CompilationMapping(CompilationMapping),
    /// Any other attribute, kept as data
    Other(AttributeData),
}

impl Attribute {
    /// Instantiate an attribute from its stored data
    pub fn materialize(data: &AttributeData) -> HostResult<Self> {
        if data.is_compilation_mapping() {
            CompilationMapping::from_args(&data.args).map(Attribute::CompilationMapping)
        } else {
            Ok(Attribute::Other(data.clone()))
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Attribute::CompilationMapping(m) => write!(
                f,
                "{}({}, variant = {}, sequence = {})",
                COMPILATION_MAPPING,
                m.flags.bits(),
                m.variant_number,
                m.sequence_number
            ),
            Attribute::Other(data) => write!(f, "{}", data.type_name),
        }
    }
}

/// Anything that carries custom attributes: types and their members
pub trait AttributeSource {
    /// Owner name, used in error messages
    fn attribute_owner(&self) -> String;

    /// Stored attribute data
    fn attribute_data(&self) -> &[AttributeData];

    /// Whether the owner was loaded for inspection only
    fn inspection_only(&self) -> bool;

    /// Materialized attribute instances
    fn custom_attributes(&self) -> HostResult<Vec<Attribute>> {
        if self.inspection_only() {
            return Err(HostError::InspectionOnly {
                owner: self.attribute_owner(),
            });
        }
        self.attribute_data().iter().map(Attribute::materialize).collect()
    }
}
