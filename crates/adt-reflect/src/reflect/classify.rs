//! Type-shape classifier
//!
//! Decides which structural kind a type is, given the caller's visibility
//! choice. Tuples, functions, options and lists are recognized by head type
//! against the intrinsic table; records, unions, exceptions and modules by
//! their compilation mapping.

use super::mapping;
use crate::error::{ReflectError, ReflectResult, ShapeKind};
use crate::host::{intrinsics, BindingFlags, SourceConstructFlags, Type};

/// Outcome of testing a type against a compiled kind
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReprVisibility {
    /// Not of the kind
    Absent,
    /// Of the kind, but the representation is hidden from the caller
    Hidden,
    /// Of the kind and visible
    Visible,
}

impl ReprVisibility {
    /// Turn the outcome into the error the codecs report
    pub fn require(self, ty: &Type, kind: ShapeKind) -> ReflectResult<()> {
        match self {
            ReprVisibility::Visible => Ok(()),
            ReprVisibility::Hidden => Err(ReflectError::PrivateRepresentation {
                type_name: ty.to_string(),
                kind,
            }),
            ReprVisibility::Absent => Err(ReflectError::NotOfKind {
                type_name: ty.to_string(),
                kind,
            }),
        }
    }
}

/// Head-type equivalence: same generic definition for generic types, plain
/// equality otherwise. Arrays and by-ref types never match.
pub fn equiv_head_types(ty: &Type, head: &Type) -> bool {
    if ty.is_array() || ty.is_by_ref() {
        return false;
    }
    if ty.is_generic_type() {
        head.is_generic_type() && ty.generic_type_definition() == head.generic_type_definition()
    } else {
        ty == head
    }
}

/// Whether `ty` is a tuple of any arity
pub fn is_tuple_type(ty: &Type) -> bool {
    intrinsics()
        .tuples()
        .iter()
        .any(|head| equiv_head_types(ty, head))
}

/// Whether `ty` is exactly a function type
pub fn is_function_type(ty: &Type) -> bool {
    equiv_head_types(ty, intrinsics().func())
}

/// Whether `ty` is an option type
pub fn is_option_type(ty: &Type) -> bool {
    equiv_head_types(ty, intrinsics().option())
}

/// Whether `ty` is a list type
pub fn is_list_type(ty: &Type) -> bool {
    equiv_head_types(ty, intrinsics().list())
}

/// Whether `ty` is a function type or a closure class deriving from one
pub fn is_closure_repr(ty: &Type) -> bool {
    ty.base_chain().any(|t| is_function_type(&t))
}

fn compiled_kind(
    ty: &Type,
    kind: SourceConstructFlags,
    flags: BindingFlags,
) -> ReflectResult<ReprVisibility> {
    let Some(mapping) = mapping::try_find(ty)? else {
        return Ok(ReprVisibility::Absent);
    };
    if !mapping.flags.is_kind(kind) {
        Ok(ReprVisibility::Absent)
    } else if mapping.flags.is_non_public() && !flags.includes_non_public() {
        Ok(ReprVisibility::Hidden)
    } else {
        Ok(ReprVisibility::Visible)
    }
}

/// Record test with the visibility outcome
pub fn record_visibility(ty: &Type, flags: BindingFlags) -> ReflectResult<ReprVisibility> {
    if is_tuple_type(ty) {
        return Ok(ReprVisibility::Absent);
    }
    compiled_kind(ty, SourceConstructFlags::RECORD_TYPE, flags)
}

/// Union test with the visibility outcome
pub fn union_visibility(ty: &Type, flags: BindingFlags) -> ReflectResult<ReprVisibility> {
    if is_option_type(ty) || is_list_type(ty) {
        return Ok(ReprVisibility::Visible);
    }
    compiled_kind(ty, SourceConstructFlags::SUM_TYPE, flags)
}

/// Exception test with the visibility outcome
pub fn exception_visibility(ty: &Type, flags: BindingFlags) -> ReflectResult<ReprVisibility> {
    compiled_kind(ty, SourceConstructFlags::EXCEPTION, flags)
}

/// Whether `ty` is a record visible under `flags`
pub fn is_record_type(ty: &Type, flags: BindingFlags) -> ReflectResult<bool> {
    Ok(record_visibility(ty, flags)? == ReprVisibility::Visible)
}

/// Whether `ty` is a union visible under `flags`
pub fn is_union_type(ty: &Type, flags: BindingFlags) -> ReflectResult<bool> {
    Ok(union_visibility(ty, flags)? == ReprVisibility::Visible)
}

/// Whether `ty` is an exception declaration visible under `flags`
pub fn is_exception_repr(ty: &Type, flags: BindingFlags) -> ReflectResult<bool> {
    Ok(exception_visibility(ty, flags)? == ReprVisibility::Visible)
}

/// Whether `ty` is a compiled module
pub fn is_module_type(ty: &Type) -> ReflectResult<bool> {
    mapping::has_kind(ty, SourceConstructFlags::MODULE)
}

/// Whether `ty` is a union or derives from one
pub fn is_constructor_repr(ty: &Type, flags: BindingFlags) -> ReflectResult<bool> {
    for t in ty.base_chain() {
        if is_union_type(&t, flags)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// First union in the base chain of `ty`, hidden representations included
fn declaring_union(ty: &Type) -> ReflectResult<Option<Type>> {
    for t in ty.base_chain() {
        if union_visibility(&t, BindingFlags::ANY_VISIBILITY)? != ReprVisibility::Absent {
            return Ok(Some(t));
        }
    }
    Ok(None)
}

/// The union a case representation type belongs to; `ty` itself when no
/// ancestor is a union.
///
/// The lookup ignores visibility so that a case of a hidden union still
/// resolves to the union, and the caller's visibility check reports the
/// private representation rather than a missing union.
pub fn union_type_of_case_type(ty: &Type) -> ReflectResult<Type> {
    Ok(declaring_union(ty)?.unwrap_or_else(|| ty.clone()))
}

/// Map a representation type to the type reflection should describe:
/// exception declarations to their base, case classes to their union and
/// closure classes to their function type
pub fn type_of_repr_type(ty: &Type, flags: BindingFlags) -> ReflectResult<Type> {
    if is_exception_repr(ty, flags)? {
        return Ok(ty.base_type().unwrap_or_else(|| ty.clone()));
    }
    if let Some(union) = declaring_union(ty)? {
        return Ok(union);
    }
    Ok(ty
        .base_chain()
        .find(is_function_type)
        .unwrap_or_else(|| ty.clone()))
}

/// Structural kind of `ty`, or `None` for an ordinary type
pub fn classify(ty: &Type, flags: BindingFlags) -> ReflectResult<Option<ShapeKind>> {
    let kind = if is_tuple_type(ty) {
        Some(ShapeKind::Tuple)
    } else if is_closure_repr(ty) {
        Some(ShapeKind::Function)
    } else if is_exception_repr(ty, flags)? {
        Some(ShapeKind::Exception)
    } else if is_record_type(ty, flags)? {
        Some(ShapeKind::Record)
    } else if is_union_type(ty, flags)? {
        Some(ShapeKind::Union)
    } else if is_constructor_repr(ty, flags)? {
        Some(ShapeKind::UnionCase)
    } else if is_module_type(ty)? {
        Some(ShapeKind::Module)
    } else {
        None
    };
    tracing::trace!(ty = %ty, ?kind, "classified");
    Ok(kind)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{
        function_type, list_type, option_type, AttributeData, ClassBody, ClassDef,
    };

    fn tagged(name: &str, flags: SourceConstructFlags) -> Type {
        Type::class(
            ClassDef::new(name),
            ClassBody::new().with_attribute(AttributeData::mapping(flags)),
        )
    }

    #[test]
    fn test_head_type_equivalence() {
        let pair = intrinsics()
            .tuple(2)
            .unwrap()
            .make_generic(&[Type::int(), Type::string()])
            .unwrap();
        assert!(equiv_head_types(&pair, intrinsics().tuple(2).unwrap()));
        assert!(!equiv_head_types(&pair, intrinsics().tuple(3).unwrap()));
        assert!(!equiv_head_types(&Type::array(pair.clone()), intrinsics().tuple(2).unwrap()));
        assert!(equiv_head_types(&Type::int(), &Type::int()));
        assert!(is_tuple_type(&pair));
        assert!(!is_tuple_type(&Type::int()));
    }

    #[test]
    fn test_tuple_outranks_record_mapping() {
        let pair = intrinsics()
            .tuple(2)
            .unwrap()
            .make_generic(&[Type::int(), Type::int()])
            .unwrap();
        assert!(mapping::has_kind(&pair, SourceConstructFlags::RECORD_TYPE).unwrap());
        assert_eq!(
            compiled_kind(&pair, SourceConstructFlags::RECORD_TYPE, BindingFlags::ANY_VISIBILITY)
                .unwrap(),
            ReprVisibility::Visible
        );
        assert_eq!(
            record_visibility(&pair, BindingFlags::ANY_VISIBILITY).unwrap(),
            ReprVisibility::Absent
        );
        assert_eq!(
            classify(&pair, BindingFlags::ANY_VISIBILITY).unwrap(),
            Some(ShapeKind::Tuple)
        );
    }

    #[test]
    fn test_intrinsic_kinds() {
        let f = function_type(Type::int(), Type::int());
        assert!(is_function_type(&f));
        assert!(is_closure_repr(&f));
        assert!(is_option_type(&option_type(Type::int())));
        assert!(is_list_type(&list_type(Type::int())));
        assert!(is_union_type(&option_type(Type::int()), BindingFlags::PUBLIC).unwrap());
        assert_eq!(
            classify(&f, BindingFlags::PUBLIC).unwrap(),
            Some(ShapeKind::Function)
        );
    }

    #[test]
    fn test_hidden_representation() {
        let hidden = tagged(
            "Hidden",
            SourceConstructFlags::RECORD_TYPE.union(SourceConstructFlags::NON_PUBLIC_REPRESENTATION),
        );
        assert_eq!(
            record_visibility(&hidden, BindingFlags::PUBLIC).unwrap(),
            ReprVisibility::Hidden
        );
        assert_eq!(
            record_visibility(&hidden, BindingFlags::ANY_VISIBILITY).unwrap(),
            ReprVisibility::Visible
        );
        assert!(matches!(
            ReprVisibility::Hidden.require(&hidden, ShapeKind::Record),
            Err(ReflectError::PrivateRepresentation { .. })
        ));
        assert!(matches!(
            ReprVisibility::Absent.require(&hidden, ShapeKind::Union),
            Err(ReflectError::NotOfKind { kind: ShapeKind::Union, .. })
        ));
    }

    #[test]
    fn test_classify_compiled_kinds() {
        let flags = BindingFlags::PUBLIC;
        assert_eq!(
            classify(&tagged("R", SourceConstructFlags::RECORD_TYPE), flags).unwrap(),
            Some(ShapeKind::Record)
        );
        assert_eq!(
            classify(&tagged("M", SourceConstructFlags::MODULE), flags).unwrap(),
            Some(ShapeKind::Module)
        );
        assert_eq!(
            classify(&tagged("O", SourceConstructFlags::OBJECT_TYPE), flags).unwrap(),
            None
        );
        assert_eq!(classify(&Type::string(), flags).unwrap(), None);
    }

    #[test]
    fn test_case_class_maps_to_union() {
        let union = tagged("U", SourceConstructFlags::SUM_TYPE);
        let case = Type::class(ClassDef::new("A"), ClassBody::new().with_base(union.clone()));
        let flags = BindingFlags::PUBLIC;
        assert!(is_constructor_repr(&case, flags).unwrap());
        assert!(!is_union_type(&case, flags).unwrap());
        assert_eq!(classify(&case, flags).unwrap(), Some(ShapeKind::UnionCase));
        assert_eq!(union_type_of_case_type(&case).unwrap(), union);
        assert_eq!(type_of_repr_type(&case, flags).unwrap(), union);
        assert_eq!(type_of_repr_type(&Type::int(), flags).unwrap(), Type::int());
    }

    #[test]
    fn test_hidden_case_class_maps_to_union() {
        let union = tagged(
            "U",
            SourceConstructFlags::SUM_TYPE.union(SourceConstructFlags::NON_PUBLIC_REPRESENTATION),
        );
        let case = Type::class(ClassDef::new("A"), ClassBody::new().with_base(union.clone()));
        let flags = BindingFlags::PUBLIC;
        assert_eq!(type_of_repr_type(&case, flags).unwrap(), union);
        assert_eq!(
            union_visibility(&type_of_repr_type(&case, flags).unwrap(), flags).unwrap(),
            ReprVisibility::Hidden
        );
        assert_eq!(classify(&case, flags).unwrap(), None);
        assert_eq!(
            classify(&case, BindingFlags::ANY_VISIBILITY).unwrap(),
            Some(ShapeKind::UnionCase)
        );
    }
}
