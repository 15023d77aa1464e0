//! Class members
//!
//! `*Def` structs are the stored definitions of a class; `*Info` structs are
//! the views returned by lookups on a particular (possibly instantiated)
//! type, with member types substituted by that type's generic arguments.

use std::fmt;
use std::sync::Arc;

use super::attribute::{AttributeData, AttributeSource};
use super::ty::Type;
use super::value::Value;
use crate::error::{HostError, HostResult};

/// Property getter
pub type Getter = Arc<dyn Fn(&Value) -> HostResult<Value> + Send + Sync>;

/// Method body: declaring type, target (instance methods), arguments
pub type MethodBody = Arc<dyn Fn(&Type, Option<&Value>, &[Value]) -> HostResult<Value> + Send + Sync>;

/// Constructor body: declaring type, arguments
pub type ConstructorBody = Arc<dyn Fn(&Type, &[Value]) -> HostResult<Value> + Send + Sync>;

/// Box a property getter
pub fn getter<F>(f: F) -> Getter
where
    F: Fn(&Value) -> HostResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Box a method body
pub fn method_body<F>(f: F) -> MethodBody
where
    F: Fn(&Type, Option<&Value>, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Box a constructor body
pub fn constructor_body<F>(f: F) -> ConstructorBody
where
    F: Fn(&Type, &[Value]) -> HostResult<Value> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// Getter reading slot `index` of an object
pub fn slot_getter(name: &str, index: usize) -> Getter {
    let name = name.to_string();
    getter(move |target| {
        target
            .as_object()
            .and_then(|obj| obj.slot(index))
            .cloned()
            .ok_or_else(|| HostError::Native {
                member: name.clone(),
                message: format!("target has no slot {}", index),
            })
    })
}

/// Stored property definition
pub struct PropertyDef {
    /// Property name
    pub name: String,
    /// Declared type, may mention generic parameters
    pub ty: Type,
    /// Public visibility
    pub is_public: bool,
    /// Static property
    pub is_static: bool,
    /// Stored custom attributes
    pub attributes: Vec<AttributeData>,
    /// Getter
    pub getter: Getter,
}

impl PropertyDef {
    /// Public instance property with a custom getter
    pub fn new(name: impl Into<String>, ty: Type, getter: Getter) -> Self {
        Self {
            name: name.into(),
            ty,
            is_public: true,
            is_static: false,
            attributes: Vec::new(),
            getter,
        }
    }

    /// Public instance property backed by object slot `index`
    pub fn slot(name: impl Into<String>, ty: Type, index: usize) -> Self {
        let name = name.into();
        let getter = slot_getter(&name, index);
        Self::new(name, ty, getter)
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Stored field definition
pub struct FieldDef {
    /// Field name
    pub name: String,
    /// Declared type
    pub ty: Type,
    /// Public visibility
    pub is_public: bool,
    /// Static field
    pub is_static: bool,
    /// Compile-time constant value
    pub literal: Option<Value>,
    /// Stored custom attributes
    pub attributes: Vec<AttributeData>,
}

impl FieldDef {
    /// Public static literal field
    pub fn literal(name: impl Into<String>, ty: Type, value: Value) -> Self {
        Self {
            name: name.into(),
            ty,
            is_public: true,
            is_static: true,
            literal: Some(value),
            attributes: Vec::new(),
        }
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }
}

/// Stored method definition
pub struct MethodDef {
    /// Method name
    pub name: String,
    /// Parameter types
    pub params: Vec<Type>,
    /// Return type
    pub ret: Type,
    /// Public visibility
    pub is_public: bool,
    /// Static method
    pub is_static: bool,
    /// Stored custom attributes
    pub attributes: Vec<AttributeData>,
    /// Implementation
    pub body: MethodBody,
}

impl MethodDef {
    /// Public instance method
    pub fn new(name: impl Into<String>, params: Vec<Type>, ret: Type, body: MethodBody) -> Self {
        Self {
            name: name.into(),
            params,
            ret,
            is_public: true,
            is_static: false,
            attributes: Vec::new(),
            body,
        }
    }

    /// Mark as static
    pub fn as_static(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }

    /// Add an attribute
    pub fn with_attribute(mut self, attribute: AttributeData) -> Self {
        self.attributes.push(attribute);
        self
    }
}

/// Stored constructor definition
pub struct ConstructorDef {
    /// Parameter types
    pub params: Vec<Type>,
    /// Public visibility
    pub is_public: bool,
    /// Implementation
    pub body: ConstructorBody,
}

impl ConstructorDef {
    /// Public constructor
    pub fn new(params: Vec<Type>, body: ConstructorBody) -> Self {
        Self {
            params,
            is_public: true,
            body,
        }
    }

    /// Public constructor storing its arguments as object slots
    pub fn slots(params: Vec<Type>) -> Self {
        Self::new(
            params,
            constructor_body(|ty, args| Ok(Value::object(ty.clone(), args.to_vec()))),
        )
    }

    /// Mark as non-public
    pub fn non_public(mut self) -> Self {
        self.is_public = false;
        self
    }
}

fn check_args(member: &str, params: &[Type], args: &[Value]) -> HostResult<()> {
    if params.len() != args.len() {
        return Err(HostError::ArgumentCount {
            member: member.to_string(),
            expected: params.len(),
            actual: args.len(),
        });
    }
    for (index, (param, arg)) in params.iter().zip(args).enumerate() {
        if !param.accepts(arg) {
            return Err(HostError::ArgumentType {
                member: member.to_string(),
                index,
                expected: param.to_string(),
                actual: arg.describe(),
            });
        }
    }
    Ok(())
}

fn check_target(member: &str, declaring: &Type, target: Option<&Value>) -> HostResult<()> {
    match target {
        None | Some(Value::Null) => Err(HostError::NullTarget {
            member: member.to_string(),
        }),
        Some(value) if declaring.accepts(value) => Ok(()),
        Some(value) => Err(HostError::TargetType {
            member: member.to_string(),
            expected: declaring.to_string(),
            actual: value.describe(),
        }),
    }
}

/// Property of a particular type
#[derive(Clone)]
pub struct PropertyInfo {
    declaring_type: Type,
    def: Arc<PropertyDef>,
    property_type: Type,
}

impl PropertyInfo {
    pub(crate) fn new(declaring_type: Type, def: Arc<PropertyDef>, args: &[Type]) -> Self {
        let property_type = def.ty.substitute(args);
        Self {
            declaring_type,
            def,
            property_type,
        }
    }

    /// Property name
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Type declaring the property
    pub fn declaring_type(&self) -> &Type {
        &self.declaring_type
    }

    /// Property type
    pub fn property_type(&self) -> &Type {
        &self.property_type
    }

    /// Public visibility
    pub fn is_public(&self) -> bool {
        self.def.is_public
    }

    /// Static property
    pub fn is_static(&self) -> bool {
        self.def.is_static
    }

    /// Qualified name for messages
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.def.name)
    }

    /// Read the property from `target`
    pub fn get_value(&self, target: &Value) -> HostResult<Value> {
        if !self.def.is_static {
            check_target(&self.qualified_name(), &self.declaring_type, Some(target))?;
        }
        (self.def.getter)(target)
    }
}

impl PartialEq for PropertyInfo {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.def, &other.def) && self.declaring_type == other.declaring_type
    }
}

impl fmt::Debug for PropertyInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.qualified_name(), self.property_type)
    }
}

impl AttributeSource for PropertyInfo {
    fn attribute_owner(&self) -> String {
        self.qualified_name()
    }

    fn attribute_data(&self) -> &[AttributeData] {
        &self.def.attributes
    }

    fn inspection_only(&self) -> bool {
        self.declaring_type.inspection_only()
    }
}

/// Field of a particular type
#[derive(Clone)]
pub struct FieldInfo {
    declaring_type: Type,
    def: Arc<FieldDef>,
    field_type: Type,
}

impl FieldInfo {
    pub(crate) fn new(declaring_type: Type, def: Arc<FieldDef>, args: &[Type]) -> Self {
        let field_type = def.ty.substitute(args);
        Self {
            declaring_type,
            def,
            field_type,
        }
    }

    /// Field name
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Field type
    pub fn field_type(&self) -> &Type {
        &self.field_type
    }

    /// Static field
    pub fn is_static(&self) -> bool {
        self.def.is_static
    }

    /// Compile-time constant field
    pub fn is_literal(&self) -> bool {
        self.def.literal.is_some()
    }

    /// Constant value of a literal field
    pub fn literal_value(&self) -> Option<&Value> {
        self.def.literal.as_ref()
    }
}

impl fmt::Debug for FieldInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.declaring_type, self.def.name, self.field_type)
    }
}

impl AttributeSource for FieldInfo {
    fn attribute_owner(&self) -> String {
        format!("{}.{}", self.declaring_type, self.def.name)
    }

    fn attribute_data(&self) -> &[AttributeData] {
        &self.def.attributes
    }

    fn inspection_only(&self) -> bool {
        self.declaring_type.inspection_only()
    }
}

/// Method of a particular type
#[derive(Clone)]
pub struct MethodInfo {
    declaring_type: Type,
    def: Arc<MethodDef>,
    params: Vec<Type>,
    ret: Type,
}

impl MethodInfo {
    pub(crate) fn new(declaring_type: Type, def: Arc<MethodDef>, args: &[Type]) -> Self {
        let params = def.params.iter().map(|p| p.substitute(args)).collect();
        let ret = def.ret.substitute(args);
        Self {
            declaring_type,
            def,
            params,
            ret,
        }
    }

    /// Method name
    pub fn name(&self) -> &str {
        &self.def.name
    }

    /// Type declaring the method
    pub fn declaring_type(&self) -> &Type {
        &self.declaring_type
    }

    /// Parameter types
    pub fn parameter_types(&self) -> &[Type] {
        &self.params
    }

    /// Return type
    pub fn return_type(&self) -> &Type {
        &self.ret
    }

    /// Static method
    pub fn is_static(&self) -> bool {
        self.def.is_static
    }

    /// Public visibility
    pub fn is_public(&self) -> bool {
        self.def.is_public
    }

    /// Qualified name for messages
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.declaring_type, self.def.name)
    }

    /// Invoke the method. `target` is ignored for static methods.
    pub fn invoke(&self, target: Option<&Value>, args: &[Value]) -> HostResult<Value> {
        let member = self.qualified_name();
        if !self.def.is_static {
            check_target(&member, &self.declaring_type, target)?;
        }
        check_args(&member, &self.params, args)?;
        let target = if self.def.is_static { None } else { target };
        (self.def.body)(&self.declaring_type, target, args)
    }
}

impl PartialEq for MethodInfo {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.def, &other.def) && self.declaring_type == other.declaring_type
    }
}

impl fmt::Debug for MethodInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.qualified_name())?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ") -> {}", self.ret)
    }
}

impl AttributeSource for MethodInfo {
    fn attribute_owner(&self) -> String {
        self.qualified_name()
    }

    fn attribute_data(&self) -> &[AttributeData] {
        &self.def.attributes
    }

    fn inspection_only(&self) -> bool {
        self.declaring_type.inspection_only()
    }
}

/// Constructor of a particular type
#[derive(Clone)]
pub struct ConstructorInfo {
    declaring_type: Type,
    def: Arc<ConstructorDef>,
    params: Vec<Type>,
}

impl ConstructorInfo {
    pub(crate) fn new(declaring_type: Type, def: Arc<ConstructorDef>, args: &[Type]) -> Self {
        let params = def.params.iter().map(|p| p.substitute(args)).collect();
        Self {
            declaring_type,
            def,
            params,
        }
    }

    /// Type the constructor builds
    pub fn declaring_type(&self) -> &Type {
        &self.declaring_type
    }

    /// Parameter types
    pub fn parameter_types(&self) -> &[Type] {
        &self.params
    }

    /// Public visibility
    pub fn is_public(&self) -> bool {
        self.def.is_public
    }

    /// Build an instance
    pub fn invoke(&self, args: &[Value]) -> HostResult<Value> {
        check_args(&format!("{}.ctor", self.declaring_type), &self.params, args)?;
        (self.def.body)(&self.declaring_type, args)
    }
}

impl PartialEq for ConstructorInfo {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.def, &other.def) && self.declaring_type == other.declaring_type
    }
}

impl fmt::Debug for ConstructorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.ctor(", self.declaring_type)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", p)?;
        }
        f.write_str(")")
    }
}
