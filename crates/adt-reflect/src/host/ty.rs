//! Runtime type handles
//!
//! A `Type` is a cheap, clonable handle. Class definitions are shared through
//! `Arc<ClassDef>` and compared by identity; generic instantiations compare by
//! definition and arguments; everything else compares structurally.
//!
//! Class bodies are set once after the handle exists, so that nested case
//! types can name their declaring union as base type while the union lists
//! them as nested types. Loaded types live for the rest of the process.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use once_cell::sync::OnceCell;
use rustc_hash::FxHashMap;

use super::attribute::{AttributeData, AttributeSource};
use super::flags::BindingFlags;
use super::member::{
    ConstructorDef, ConstructorInfo, FieldDef, FieldInfo, MethodDef, MethodInfo, PropertyDef,
    PropertyInfo,
};
use super::value::Value;
use crate::error::{HostError, HostResult};

/// Built-in scalar types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// The unit type
    Unit,
    /// Booleans
    Bool,
    /// 64-bit integers
    Int,
    /// 64-bit floats
    Float,
    /// Strings
    String,
    /// Top type: accepts every value
    Object,
}

impl fmt::Display for Primitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Primitive::Unit => "unit",
            Primitive::Bool => "bool",
            Primitive::Int => "int",
            Primitive::Float => "float",
            Primitive::String => "string",
            Primitive::Object => "obj",
        };
        f.write_str(name)
    }
}

/// Class header; the body is attached later with [`Type::define`]
pub struct ClassDef {
    name: String,
    generic_arity: usize,
    is_public: bool,
    inspection_only: bool,
    body: OnceCell<ClassBody>,
}

impl ClassDef {
    /// Public, non-generic class
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            generic_arity: 0,
            is_public: true,
            inspection_only: false,
            body: OnceCell::new(),
        }
    }

    /// Make this an open generic definition with `arity` parameters
    pub fn generic(mut self, arity: usize) -> Self {
        self.generic_arity = arity;
        self
    }

    /// Mark the class as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Mark the class as loaded for inspection only
    pub fn inspection_only(mut self, inspection_only: bool) -> Self {
        self.inspection_only = inspection_only;
        self
    }

    /// Class name without generic arguments
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of generic parameters
    pub fn generic_arity(&self) -> usize {
        self.generic_arity
    }
}

impl fmt::Debug for ClassDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassDef")
            .field("name", &self.name)
            .field("generic_arity", &self.generic_arity)
            .field("is_public", &self.is_public)
            .field("defined", &self.body.get().is_some())
            .finish()
    }
}

/// Members and metadata of a class
#[derive(Default)]
pub struct ClassBody {
    /// Base class
    pub base: Option<Type>,
    /// Stored custom attributes
    pub attributes: Vec<AttributeData>,
    /// Properties by name
    pub properties: FxHashMap<String, Arc<PropertyDef>>,
    /// Fields by name
    pub fields: FxHashMap<String, Arc<FieldDef>>,
    /// Methods by name
    pub methods: FxHashMap<String, Arc<MethodDef>>,
    /// Constructors
    pub constructors: Vec<Arc<ConstructorDef>>,
    /// Nested types by name
    pub nested: FxHashMap<String, Type>,
}

impl ClassBody {
    /// Empty body
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base class
    pub fn with_base(mut self, base: Type) -> Self {
        self.base = Some(base);
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }

    /// Add a property
    pub fn with_property(mut self, property: PropertyDef) -> Self {
        self.properties
            .insert(property.name.clone(), Arc::new(property));
        self
    }

    /// Add a field
    pub fn with_field(mut self, field: FieldDef) -> Self {
        self.fields.insert(field.name.clone(), Arc::new(field));
        self
    }

    /// Add a method
    pub fn with_method(mut self, method: MethodDef) -> Self {
        self.methods.insert(method.name.clone(), Arc::new(method));
        self
    }

    /// Add a constructor
    pub fn with_constructor(mut self, constructor: ConstructorDef) -> Self {
        self.constructors.push(Arc::new(constructor));
        self
    }

    /// Add a nested type
    pub fn with_nested(mut self, name: impl Into<String>, ty: Type) -> Self {
        self.nested.insert(name.into(), ty);
        self
    }
}

enum TypeRepr {
    Primitive(Primitive),
    Class(Arc<ClassDef>),
    Generic(Arc<ClassDef>, Arc<[Type]>),
    Param(usize),
    Array(Type),
    ByRef(Type),
}

/// Handle to a runtime type
#[derive(Clone)]
pub struct Type(Arc<TypeRepr>);

impl Type {
    fn new(repr: TypeRepr) -> Self {
        Type(Arc::new(repr))
    }

    /// Primitive type
    pub fn primitive(p: Primitive) -> Self {
        Self::new(TypeRepr::Primitive(p))
    }

    /// `unit`
    pub fn unit() -> Self {
        Self::primitive(Primitive::Unit)
    }

    /// `bool`
    pub fn bool() -> Self {
        Self::primitive(Primitive::Bool)
    }

    /// `int`
    pub fn int() -> Self {
        Self::primitive(Primitive::Int)
    }

    /// `float`
    pub fn float() -> Self {
        Self::primitive(Primitive::Float)
    }

    /// `string`
    pub fn string() -> Self {
        Self::primitive(Primitive::String)
    }

    /// `obj`, the top type
    pub fn object() -> Self {
        Self::primitive(Primitive::Object)
    }

    /// Generic parameter `index` of the enclosing definition
    pub fn param(index: usize) -> Self {
        Self::new(TypeRepr::Param(index))
    }

    /// Array of `element`
    pub fn array(element: Type) -> Self {
        Self::new(TypeRepr::Array(element))
    }

    /// By-reference `element`
    pub fn by_ref(element: Type) -> Self {
        Self::new(TypeRepr::ByRef(element))
    }

    /// Declare a class. Its body is attached with [`Type::define`].
    pub fn declare(def: ClassDef) -> Self {
        Self::new(TypeRepr::Class(Arc::new(def)))
    }

    /// Declare and define a class in one step
    pub fn class(def: ClassDef, body: ClassBody) -> Self {
        let ty = Self::declare(def);
        ty.define(body);
        ty
    }

    /// Attach the body of a declared class.
    ///
    /// Returns `false` when the type is not a class declaration or already
    /// has a body.
    pub fn define(&self, body: ClassBody) -> bool {
        match &*self.0 {
            TypeRepr::Class(def) => def.body.set(body).is_ok(),
            _ => false,
        }
    }

    /// Instantiation of a generic definition without arity checks
    pub(crate) fn instantiate(def: &Arc<ClassDef>, args: Vec<Type>) -> Self {
        Self::new(TypeRepr::Generic(Arc::clone(def), args.into()))
    }

    /// Instantiate the definition behind this type with `args`, skipping
    /// arity checks. Non-class types are returned unchanged.
    pub(crate) fn with_args(&self, args: Vec<Type>) -> Self {
        match self.class_def() {
            Some(def) => Self::instantiate(def, args),
            None => self.clone(),
        }
    }

    /// Class definition behind a class or instantiation
    pub fn class_def(&self) -> Option<&Arc<ClassDef>> {
        match &*self.0 {
            TypeRepr::Class(def) | TypeRepr::Generic(def, _) => Some(def),
            _ => None,
        }
    }

    fn body(&self) -> Option<&ClassBody> {
        self.class_def().and_then(|def| def.body.get())
    }

    /// Primitive kind, if any
    pub fn as_primitive(&self) -> Option<Primitive> {
        match &*self.0 {
            TypeRepr::Primitive(p) => Some(*p),
            _ => None,
        }
    }

    /// Whether this is an array type
    pub fn is_array(&self) -> bool {
        matches!(&*self.0, TypeRepr::Array(_))
    }

    /// Whether this is a by-reference type
    pub fn is_by_ref(&self) -> bool {
        matches!(&*self.0, TypeRepr::ByRef(_))
    }

    /// Whether this is a generic parameter
    pub fn is_param(&self) -> bool {
        matches!(&*self.0, TypeRepr::Param(_))
    }

    /// Whether this is a generic definition or an instantiation
    pub fn is_generic_type(&self) -> bool {
        match &*self.0 {
            TypeRepr::Class(def) => def.generic_arity > 0,
            TypeRepr::Generic(..) => true,
            _ => false,
        }
    }

    /// Whether this is an open generic definition
    pub fn is_generic_definition(&self) -> bool {
        matches!(&*self.0, TypeRepr::Class(def) if def.generic_arity > 0)
    }

    /// Open definition of a generic type
    pub fn generic_type_definition(&self) -> Option<Type> {
        match &*self.0 {
            TypeRepr::Class(def) if def.generic_arity > 0 => Some(self.clone()),
            TypeRepr::Generic(def, _) => Some(Self::new(TypeRepr::Class(Arc::clone(def)))),
            _ => None,
        }
    }

    /// Generic arguments; parameters for an open definition
    pub fn generic_arguments(&self) -> Vec<Type> {
        match &*self.0 {
            TypeRepr::Class(def) => (0..def.generic_arity).map(Type::param).collect(),
            TypeRepr::Generic(_, args) => args.to_vec(),
            _ => Vec::new(),
        }
    }

    /// Instantiate an open generic definition
    pub fn make_generic(&self, args: &[Type]) -> HostResult<Type> {
        match &*self.0 {
            TypeRepr::Class(def) if def.generic_arity > 0 => {
                if def.generic_arity != args.len() {
                    return Err(HostError::GenericArity {
                        type_name: self.to_string(),
                        expected: def.generic_arity,
                        actual: args.len(),
                    });
                }
                Ok(Self::instantiate(def, args.to_vec()))
            }
            _ => Err(HostError::NotGeneric {
                type_name: self.to_string(),
            }),
        }
    }

    /// Replace generic parameters with `args`
    pub fn substitute(&self, args: &[Type]) -> Type {
        match &*self.0 {
            TypeRepr::Param(i) => args.get(*i).cloned().unwrap_or_else(|| self.clone()),
            TypeRepr::Generic(def, inner) => {
                Self::instantiate(def, inner.iter().map(|t| t.substitute(args)).collect())
            }
            TypeRepr::Array(e) => Type::array(e.substitute(args)),
            TypeRepr::ByRef(e) => Type::by_ref(e.substitute(args)),
            _ => self.clone(),
        }
    }

    /// Short type name
    pub fn name(&self) -> String {
        self.to_string()
    }

    /// Whether the class is public; non-class types are public
    pub fn is_public(&self) -> bool {
        self.class_def().map_or(true, |def| def.is_public)
    }

    /// Base class, instantiated with this type's generic arguments
    pub fn base_type(&self) -> Option<Type> {
        let base = self.body()?.base.as_ref()?;
        Some(base.substitute(&self.generic_arguments()))
    }

    /// This type followed by all of its base classes
    pub fn base_chain(&self) -> impl Iterator<Item = Type> {
        std::iter::successors(Some(self.clone()), Type::base_type)
    }

    /// Whether this type is `other` or derives from it
    pub fn is_subtype_of(&self, other: &Type) -> bool {
        self.base_chain().any(|t| &t == other)
    }

    /// Whether `value` is a valid instance of this type. Reference types
    /// accept null; primitives accept only their own kind.
    pub fn accepts(&self, value: &Value) -> bool {
        match (&*self.0, value) {
            (TypeRepr::Primitive(Primitive::Object), _) | (TypeRepr::Param(_), _) => true,
            (TypeRepr::Primitive(p), v) => v.primitive() == Some(*p),
            (_, Value::Null) => true,
            (_, Value::Object(obj)) => obj.runtime_type().is_subtype_of(self),
            _ => false,
        }
    }

    /// Properties matching `flags`. Instance properties of base classes are
    /// included unless shadowed by name. Enumeration order is unspecified.
    pub fn properties(&self, flags: BindingFlags) -> Vec<PropertyInfo> {
        let mut seen: Vec<String> = Vec::new();
        let mut out = Vec::new();
        for (depth, owner) in self.base_chain().enumerate() {
            let Some(body) = owner.body() else { continue };
            let args = owner.generic_arguments();
            for def in body.properties.values() {
                if depth > 0 && def.is_static {
                    continue;
                }
                if !flags.matches(def.is_public, def.is_static) || seen.contains(&def.name) {
                    continue;
                }
                seen.push(def.name.clone());
                out.push(PropertyInfo::new(owner.clone(), Arc::clone(def), &args));
            }
        }
        out
    }

    /// Property by name
    pub fn property(&self, name: &str, flags: BindingFlags) -> Option<PropertyInfo> {
        self.properties(flags).into_iter().find(|p| p.name() == name)
    }

    /// Fields declared on this type matching `flags`
    pub fn fields(&self, flags: BindingFlags) -> Vec<FieldInfo> {
        let Some(body) = self.body() else {
            return Vec::new();
        };
        let args = self.generic_arguments();
        body.fields
            .values()
            .filter(|def| flags.matches(def.is_public, def.is_static))
            .map(|def| FieldInfo::new(self.clone(), Arc::clone(def), &args))
            .collect()
    }

    /// Methods matching `flags`. Instance methods of base classes are
    /// included unless shadowed by name; static methods are not inherited.
    pub fn methods(&self, flags: BindingFlags) -> Vec<MethodInfo> {
        let mut seen: Vec<String> = Vec::new();
        let mut out = Vec::new();
        for (depth, owner) in self.base_chain().enumerate() {
            let Some(body) = owner.body() else { continue };
            let args = owner.generic_arguments();
            for def in body.methods.values() {
                if depth > 0 && def.is_static {
                    continue;
                }
                if !flags.matches(def.is_public, def.is_static) || seen.contains(&def.name) {
                    continue;
                }
                seen.push(def.name.clone());
                out.push(MethodInfo::new(owner.clone(), Arc::clone(def), &args));
            }
        }
        out
    }

    /// Method by name
    pub fn method(&self, name: &str, flags: BindingFlags) -> Option<MethodInfo> {
        self.methods(flags).into_iter().find(|m| m.name() == name)
    }

    /// Method by name and exact parameter types
    pub fn method_with_params(
        &self,
        name: &str,
        params: &[Type],
        flags: BindingFlags,
    ) -> Option<MethodInfo> {
        self.method(name, flags)
            .filter(|m| m.parameter_types() == params)
    }

    /// Constructors matching `flags`
    pub fn constructors(&self, flags: BindingFlags) -> Vec<ConstructorInfo> {
        let Some(body) = self.body() else {
            return Vec::new();
        };
        let args = self.generic_arguments();
        body.constructors
            .iter()
            .filter(|def| flags.matches(def.is_public, false))
            .map(|def| ConstructorInfo::new(self.clone(), Arc::clone(def), &args))
            .collect()
    }

    /// Constructor whose parameter types equal `params` position by position
    pub fn constructor(&self, params: &[Type], flags: BindingFlags) -> Option<ConstructorInfo> {
        self.constructors(flags)
            .into_iter()
            .find(|c| c.parameter_types() == params)
    }

    /// Nested types visible under `flags`
    pub fn nested_types(&self, flags: BindingFlags) -> Vec<Type> {
        let Some(body) = self.body() else {
            return Vec::new();
        };
        body.nested
            .values()
            .filter(|t| nested_visible(t, flags))
            .cloned()
            .collect()
    }

    /// Nested type by name
    pub fn nested_type(&self, name: &str, flags: BindingFlags) -> Option<Type> {
        let nested = self.body()?.nested.get(name)?;
        nested_visible(nested, flags).then(|| nested.clone())
    }

    fn ptr_key(&self) -> usize {
        match &*self.0 {
            TypeRepr::Class(def) | TypeRepr::Generic(def, _) => Arc::as_ptr(def) as *const () as usize,
            _ => 0,
        }
    }
}

fn nested_visible(nested: &Type, flags: BindingFlags) -> bool {
    if nested.is_public() {
        flags.contains(BindingFlags::PUBLIC)
    } else {
        flags.contains(BindingFlags::NON_PUBLIC)
    }
}

impl PartialEq for Type {
    fn eq(&self, other: &Self) -> bool {
        if Arc::ptr_eq(&self.0, &other.0) {
            return true;
        }
        match (&*self.0, &*other.0) {
            (TypeRepr::Primitive(a), TypeRepr::Primitive(b)) => a == b,
            (TypeRepr::Class(a), TypeRepr::Class(b)) => Arc::ptr_eq(a, b),
            (TypeRepr::Generic(a, x), TypeRepr::Generic(b, y)) => Arc::ptr_eq(a, b) && x == y,
            (TypeRepr::Param(a), TypeRepr::Param(b)) => a == b,
            (TypeRepr::Array(a), TypeRepr::Array(b)) => a == b,
            (TypeRepr::ByRef(a), TypeRepr::ByRef(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Type {}

impl Hash for Type {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match &*self.0 {
            TypeRepr::Primitive(p) => {
                0u8.hash(state);
                p.hash(state);
            }
            TypeRepr::Class(_) => {
                1u8.hash(state);
                self.ptr_key().hash(state);
            }
            TypeRepr::Generic(_, args) => {
                2u8.hash(state);
                self.ptr_key().hash(state);
                args.hash(state);
            }
            TypeRepr::Param(i) => {
                3u8.hash(state);
                i.hash(state);
            }
            TypeRepr::Array(e) => {
                4u8.hash(state);
                e.hash(state);
            }
            TypeRepr::ByRef(e) => {
                5u8.hash(state);
                e.hash(state);
            }
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.0 {
            TypeRepr::Primitive(p) => write!(f, "{}", p),
            TypeRepr::Class(def) if def.generic_arity > 0 => {
                write!(f, "{}`{}", def.name, def.generic_arity)
            }
            TypeRepr::Class(def) => f.write_str(&def.name),
            TypeRepr::Generic(def, args) => {
                write!(f, "{}<", def.name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(">")
            }
            TypeRepr::Param(i) => write!(f, "T{}", i),
            TypeRepr::Array(e) => write!(f, "{}[]", e),
            TypeRepr::ByRef(e) => write!(f, "{}&", e),
        }
    }
}

impl fmt::Debug for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type({})", self)
    }
}

impl AttributeSource for Type {
    fn attribute_owner(&self) -> String {
        self.to_string()
    }

    fn attribute_data(&self) -> &[AttributeData] {
        self.body().map_or(&[], |body| body.attributes.as_slice())
    }

    fn inspection_only(&self) -> bool {
        self.class_def().is_some_and(|def| def.inspection_only)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::member::PropertyDef;

    fn point() -> Type {
        Type::class(
            ClassDef::new("Point"),
            ClassBody::new()
                .with_property(PropertyDef::slot("X", Type::int(), 0))
                .with_property(PropertyDef::slot("Y", Type::int(), 1)),
        )
    }

    #[test]
    fn test_class_identity() {
        let a = point();
        let b = point();
        assert_eq!(a, a.clone());
        assert_ne!(a, b, "distinct definitions with the same name differ");
    }

    #[test]
    fn test_generic_instantiation_equality() {
        let boxed = Type::declare(ClassDef::new("Box").generic(1));
        let a = boxed.make_generic(&[Type::int()]).unwrap();
        let b = boxed.make_generic(&[Type::int()]).unwrap();
        let c = boxed.make_generic(&[Type::string()]).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.generic_type_definition(), Some(boxed.clone()));
        assert_eq!(a.to_string(), "Box<int>");
        assert_eq!(boxed.to_string(), "Box`1");
    }

    #[test]
    fn test_make_generic_arity() {
        let boxed = Type::declare(ClassDef::new("Box").generic(1));
        assert!(matches!(
            boxed.make_generic(&[]),
            Err(HostError::GenericArity { expected: 1, actual: 0, .. })
        ));
        assert!(matches!(
            Type::int().make_generic(&[Type::int()]),
            Err(HostError::NotGeneric { .. })
        ));
    }

    #[test]
    fn test_property_types_are_substituted() {
        let boxed = Type::class(
            ClassDef::new("Box").generic(1),
            ClassBody::new().with_property(PropertyDef::slot("Value", Type::param(0), 0)),
        );
        let inst = boxed.make_generic(&[Type::string()]).unwrap();
        let prop = inst.property("Value", BindingFlags::PUBLIC.instance()).unwrap();
        assert_eq!(prop.property_type(), &Type::string());
        assert_eq!(prop.declaring_type(), &inst);
    }

    #[test]
    fn test_inherited_properties() {
        let base = point();
        let derived = Type::class(
            ClassDef::new("Point3"),
            ClassBody::new()
                .with_base(base.clone())
                .with_property(PropertyDef::slot("Z", Type::int(), 2)),
        );
        let mut names: Vec<String> = derived
            .properties(BindingFlags::PUBLIC.instance())
            .iter()
            .map(|p| p.name().to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["X", "Y", "Z"]);
        assert!(derived.is_subtype_of(&base));
        assert!(!base.is_subtype_of(&derived));
    }

    #[test]
    fn test_accepts() {
        let p = point();
        assert!(Type::object().accepts(&Value::Int(1)));
        assert!(Type::int().accepts(&Value::Int(1)));
        assert!(!Type::int().accepts(&Value::from("x")));
        assert!(!Type::int().accepts(&Value::Null));
        assert!(p.accepts(&Value::Null));
        assert!(p.accepts(&Value::object(p.clone(), vec![Value::Int(1), Value::Int(2)])));
        assert!(!point().accepts(&Value::object(p, vec![])));
    }

    #[test]
    fn test_define_once() {
        let ty = Type::declare(ClassDef::new("Late"));
        assert!(ty.define(ClassBody::new()));
        assert!(!ty.define(ClassBody::new()));
        assert!(!Type::int().define(ClassBody::new()));
    }
}
