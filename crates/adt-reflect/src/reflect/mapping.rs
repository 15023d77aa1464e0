//! Compilation mapping decoder
//!
//! Every compiled declaration the codecs care about carries at most one
//! compilation mapping attribute: `(flags[, variant], sequence)`. The decoder
//! reads it in one of two ways:
//!
//! - **live**: materialize the attribute instances and pick the mapping
//! - **data**: read the stored constructor arguments without instantiating
//!   anything, for metadata loaded for inspection only
//!
//! Both paths yield the same [`MappingTriple`] for the same attribute.

use crate::error::{ReflectError, ReflectResult};
use crate::host::{
    Attribute, AttributeData, AttributeSource, CompilationMapping, SourceConstructFlags,
};

/// Decoded compilation mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MappingTriple {
    /// Kind and visibility flags
    pub flags: SourceConstructFlags,
    /// Declaration order among siblings
    pub sequence: i32,
    /// Owning union case, for case fields
    pub variant: i32,
}

impl From<CompilationMapping> for MappingTriple {
    fn from(mapping: CompilationMapping) -> Self {
        Self {
            flags: mapping.flags,
            sequence: mapping.sequence_number,
            variant: mapping.variant_number,
        }
    }
}

/// Reads the compilation mapping off a type or member
pub trait MappingDecoder: Send + Sync {
    /// Decode the mapping carried by `source`, if any.
    ///
    /// More than one mapping on the same source is a configuration error.
    fn try_decode(&self, source: &dyn AttributeSource) -> ReflectResult<Option<MappingTriple>>;
}

/// Default decoder: live attributes, or stored data when the source cannot
/// materialize attribute instances
#[derive(Debug, Default, Clone, Copy)]
pub struct CompilationMappingDecoder;

impl MappingDecoder for CompilationMappingDecoder {
    fn try_decode(&self, source: &dyn AttributeSource) -> ReflectResult<Option<MappingTriple>> {
        if source.inspection_only() {
            decode_data(source)
        } else {
            decode_live(source)
        }
    }
}

/// Decoder used by the codecs
pub fn decoder() -> &'static dyn MappingDecoder {
    static DEFAULT: CompilationMappingDecoder = CompilationMappingDecoder;
    &DEFAULT
}

/// Decode from materialized attribute instances
pub fn decode_live(source: &dyn AttributeSource) -> ReflectResult<Option<MappingTriple>> {
    let mappings: Vec<CompilationMapping> = source
        .custom_attributes()?
        .into_iter()
        .filter_map(|attr| match attr {
            Attribute::CompilationMapping(m) => Some(m),
            Attribute::Other(_) => None,
        })
        .collect();
    match mappings.as_slice() {
        [] => Ok(None),
        [mapping] => Ok(Some((*mapping).into())),
        _ => Err(duplicate(source)),
    }
}

/// Decode from stored constructor arguments without instantiating attributes
pub fn decode_data(source: &dyn AttributeSource) -> ReflectResult<Option<MappingTriple>> {
    let data: Vec<&AttributeData> = source
        .attribute_data()
        .iter()
        .filter(|d| d.is_compilation_mapping())
        .collect();
    match data.as_slice() {
        [] => Ok(None),
        [d] => Ok(Some(CompilationMapping::from_args(&d.args)?.into())),
        _ => Err(duplicate(source)),
    }
}

fn duplicate(source: &dyn AttributeSource) -> ReflectError {
    ReflectError::configuration(format!(
        "multiple compilation mapping attributes on '{}'",
        source.attribute_owner()
    ))
}

/// Decode with the default decoder
pub fn try_find(source: &dyn AttributeSource) -> ReflectResult<Option<MappingTriple>> {
    decoder().try_decode(source)
}

/// Whether `source` carries a mapping whose kind is `kind`
pub fn has_kind(source: &dyn AttributeSource, kind: SourceConstructFlags) -> ReflectResult<bool> {
    Ok(try_find(source)?.is_some_and(|m| m.flags.is_kind(kind)))
}

/// Sequence number, `0` when unmapped
pub fn sequence_number(source: &dyn AttributeSource) -> ReflectResult<i32> {
    Ok(try_find(source)?.map_or(0, |m| m.sequence))
}

/// Field mapping of a property: `Some((variant, sequence))` when the
/// property is a compiled record, case or exception field
pub fn field_mapping(source: &dyn AttributeSource) -> ReflectResult<Option<(i32, i32)>> {
    Ok(try_find(source)?
        .filter(|m| m.flags.is_kind(SourceConstructFlags::FIELD))
        .map(|m| (m.variant, m.sequence)))
}

/// Sort items by a fallible key computed once per item
pub(crate) fn sort_by_decoded<T, K, F>(items: Vec<T>, mut key: F) -> ReflectResult<Vec<T>>
where
    K: Ord,
    F: FnMut(&T) -> ReflectResult<K>,
{
    let mut keyed = items
        .into_iter()
        .map(|item| Ok((key(&item)?, item)))
        .collect::<ReflectResult<Vec<_>>>()?;
    keyed.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(keyed.into_iter().map(|(_, item)| item).collect())
}
