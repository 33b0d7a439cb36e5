use std::any::{Any, TypeId};

use serde::{Deserialize, Serialize};

/// Primitive property value with built-in equality semantics
///
/// Scalars need no comparer registration: value equality is the right
/// change test and cloning is cheap and aliasing-free.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ScalarValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl ScalarValue {
    pub fn is_null(&self) -> bool {
        matches!(self, ScalarValue::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ScalarValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            ScalarValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            ScalarValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ScalarValue::Text(s) => Some(s.as_str()),
            _ => None,
        }
    }
}

impl From<bool> for ScalarValue {
    fn from(v: bool) -> Self {
        ScalarValue::Bool(v)
    }
}

impl From<i64> for ScalarValue {
    fn from(v: i64) -> Self {
        ScalarValue::Int(v)
    }
}

impl From<f64> for ScalarValue {
    fn from(v: f64) -> Self {
        ScalarValue::Float(v)
    }
}

impl From<&str> for ScalarValue {
    fn from(v: &str) -> Self {
        ScalarValue::Text(v.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(v: String) -> Self {
        ScalarValue::Text(v)
    }
}

/// Type-erased complex property value
///
/// Carries the value's `TypeId` and type name so comparers and codecs can
/// be resolved for it. Deliberately does NOT implement `Clone`: the only
/// way to duplicate a complex value is through a registered comparer's
/// clone function, which keeps snapshots structurally incapable of
/// aliasing live state.
pub struct ComplexValue {
    type_id: TypeId,
    type_name: &'static str,
    boxed: Box<dyn Any + Send + Sync>,
}

impl ComplexValue {
    /// Wrap a concrete value
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            boxed: Box::new(value),
        }
    }

    /// The `TypeId` of the wrapped value
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The full type name of the wrapped value (diagnostic purposes)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Check whether the wrapped value is of type `T`
    pub fn is<T: Any>(&self) -> bool {
        self.type_id == TypeId::of::<T>()
    }

    /// Borrow the wrapped value as `T`
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.boxed.downcast_ref::<T>()
    }

    /// Mutably borrow the wrapped value as `T`
    ///
    /// This is the live in-place mutation path: callers hold `&mut T`
    /// directly into the tracked value, which is exactly what change
    /// detection must cope with.
    pub fn downcast_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.boxed.downcast_mut::<T>()
    }

    /// Borrow as `&dyn Any` for comparer dispatch
    pub(crate) fn as_any(&self) -> &dyn Any {
        self.boxed.as_ref()
    }
}

impl std::fmt::Debug for ComplexValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ComplexValue<{}>", self.type_name)
    }
}

/// A property's current or snapshot value
#[derive(Debug)]
pub enum PropertyValue {
    Scalar(ScalarValue),
    Complex(ComplexValue),
}

impl PropertyValue {
    /// Wrap a scalar value
    pub fn scalar(value: impl Into<ScalarValue>) -> Self {
        PropertyValue::Scalar(value.into())
    }

    /// Wrap a complex value
    pub fn complex<T: Any + Send + Sync>(value: T) -> Self {
        PropertyValue::Complex(ComplexValue::new(value))
    }

    pub fn is_complex(&self) -> bool {
        matches!(self, PropertyValue::Complex(_))
    }

    pub fn as_scalar(&self) -> Option<&ScalarValue> {
        match self {
            PropertyValue::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_complex(&self) -> Option<&ComplexValue> {
        match self {
            PropertyValue::Complex(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_complex_mut(&mut self) -> Option<&mut ComplexValue> {
        match self {
            PropertyValue::Complex(c) => Some(c),
            _ => None,
        }
    }

    /// Short description of the value's type (diagnostic purposes)
    pub fn type_label(&self) -> &'static str {
        match self {
            PropertyValue::Scalar(_) => "scalar",
            PropertyValue::Complex(c) => c.type_name(),
        }
    }
}

/// Declared shape of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PropertyKind {
    /// Primitive value; built-in equality, identity clone
    Scalar,
    /// Composite value; requires a registered comparer
    Complex {
        type_id: TypeId,
        type_name: &'static str,
    },
}

impl PropertyKind {
    /// Whether `value` agrees with this declared kind
    pub fn accepts(&self, value: &PropertyValue) -> bool {
        match (self, value) {
            (PropertyKind::Scalar, PropertyValue::Scalar(_)) => true,
            (PropertyKind::Complex { type_id, .. }, PropertyValue::Complex(c)) => {
                *type_id == c.type_id()
            }
            _ => false,
        }
    }

    /// Human-readable label for error messages
    pub fn label(&self) -> &'static str {
        match self {
            PropertyKind::Scalar => "scalar",
            PropertyKind::Complex { type_name, .. } => type_name,
        }
    }
}

/// Declared property of an entity model: name, value shape, mutability
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    name: String,
    kind: PropertyKind,
    mutable: bool,
}

impl PropertyDescriptor {
    /// Declare a scalar property
    pub fn scalar(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Scalar,
            mutable: true,
        }
    }

    /// Declare a complex property of type `T`
    pub fn complex<T: Any + Send + Sync>(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: PropertyKind::Complex {
                type_id: TypeId::of::<T>(),
                type_name: std::any::type_name::<T>(),
            },
            mutable: true,
        }
    }

    /// Mark the property as read-only after initial population
    pub fn read_only(mut self) -> Self {
        self.mutable = false;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn is_mutable(&self) -> bool {
        self.mutable
    }

    pub fn is_complex(&self) -> bool {
        matches!(self.kind, PropertyKind::Complex { .. })
    }
}
