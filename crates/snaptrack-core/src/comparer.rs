//! Per-type value comparers and their registry
//!
//! A [`ValueComparer`] pairs an equality function with a clone function for
//! one complex value type. The registry resolves a property's declared type
//! to its comparer; scalar properties use built-in value equality and need
//! no registration.

use std::any::{Any, TypeId};
use std::collections::HashMap;

use crate::errors::{Result, TrackError};
use crate::model::{ComplexValue, PropertyValue};

type ErasedEquals = Box<dyn Fn(&dyn Any, &dyn Any) -> Option<bool> + Send + Sync>;
type ErasedSnapshot = Box<dyn Fn(&dyn Any) -> Option<ComplexValue> + Send + Sync>;

/// Equality plus clone for one complex value type
///
/// # Contract
///
/// - `clone(v)` must produce a value independent of `v`'s internal mutable
///   state: later mutation of `v` must not affect the clone, and vice versa.
/// - `equals(v, clone(v))` must be `true` immediately after cloning.
///
/// The engine cannot verify this at runtime. A shallow clone here silently
/// breaks detection: the "original" used for comparison would mutate along
/// with the live value.
pub struct ValueComparer {
    type_id: TypeId,
    type_name: &'static str,
    equals: ErasedEquals,
    snapshot: ErasedSnapshot,
}

impl ValueComparer {
    /// Build a comparer from typed equality and clone functions
    pub fn new<T, E, C>(equals: E, clone: C) -> Self
    where
        T: Any + Send + Sync,
        E: Fn(&T, &T) -> bool + Send + Sync + 'static,
        C: Fn(&T) -> T + Send + Sync + 'static,
    {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: std::any::type_name::<T>(),
            equals: Box::new(move |a, b| {
                match (a.downcast_ref::<T>(), b.downcast_ref::<T>()) {
                    (Some(a), Some(b)) => Some(equals(a, b)),
                    _ => None,
                }
            }),
            snapshot: Box::new(move |v| {
                v.downcast_ref::<T>().map(|v| ComplexValue::new(clone(v)))
            }),
        }
    }

    /// Build a comparer from `PartialEq` and `Clone` impls
    ///
    /// Correct whenever `T::clone` is a deep copy, which holds for any type
    /// composed of owned data (`String`, `Vec`, nested structs of those).
    /// Types with shared interior state (`Rc<RefCell<_>>` and friends) need
    /// an explicit deep-cloning [`ValueComparer::new`].
    pub fn of<T>() -> Self
    where
        T: Any + Send + Sync + PartialEq + Clone,
    {
        Self::new::<T, _, _>(|a, b| a == b, T::clone)
    }

    /// The `TypeId` this comparer handles
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The type name this comparer handles (diagnostic purposes)
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Compare two values of this comparer's type
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if either value is not of this comparer's type.
    pub fn equals(&self, a: &ComplexValue, b: &ComplexValue) -> Result<bool> {
        (self.equals)(a.as_any(), b.as_any()).ok_or_else(|| TrackError::TypeMismatch {
            expected: self.type_name.to_string(),
            actual: if a.type_id() == self.type_id {
                b.type_name().to_string()
            } else {
                a.type_name().to_string()
            },
        })
    }

    /// Produce an independent snapshot clone of `value`
    ///
    /// # Errors
    ///
    /// `TypeMismatch` if `value` is not of this comparer's type.
    pub fn snapshot(&self, value: &ComplexValue) -> Result<ComplexValue> {
        (self.snapshot)(value.as_any()).ok_or_else(|| TrackError::TypeMismatch {
            expected: self.type_name.to_string(),
            actual: value.type_name().to_string(),
        })
    }
}

impl std::fmt::Debug for ValueComparer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ValueComparer<{}>", self.type_name)
    }
}

/// Registry mapping complex value types to their comparers
///
/// Registration is static configuration: install every comparer before any
/// tracking occurs. Resolution failure for a complex property is a fatal
/// configuration error, surfaced at first attach or detection attempt.
#[derive(Debug, Default)]
pub struct ComparerRegistry {
    comparers: HashMap<TypeId, ValueComparer>,
}

impl ComparerRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            comparers: HashMap::new(),
        }
    }

    /// Install a comparer
    ///
    /// # Errors
    ///
    /// Returns `ComparerAlreadyRegistered` if a comparer for the same type
    /// is already installed. Re-registration is rejected rather than
    /// replaced so two configuration sites cannot silently disagree.
    pub fn register(&mut self, comparer: ValueComparer) -> Result<()> {
        let type_id = comparer.type_id();
        if self.comparers.contains_key(&type_id) {
            return Err(TrackError::ComparerAlreadyRegistered {
                type_name: comparer.type_name().to_string(),
            });
        }
        self.comparers.insert(type_id, comparer);
        Ok(())
    }

    /// Install the `PartialEq`/`Clone`-derived comparer for `T`
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::register`].
    pub fn register_default<T>(&mut self) -> Result<()>
    where
        T: Any + Send + Sync + PartialEq + Clone,
    {
        self.register(ValueComparer::of::<T>())
    }

    /// Whether a comparer for `T` is installed
    pub fn is_registered<T: Any>(&self) -> bool {
        self.comparers.contains_key(&TypeId::of::<T>())
    }

    /// Resolve the comparer for a type
    ///
    /// # Errors
    ///
    /// `ComparerMissing` when no comparer was registered for the type.
    pub fn resolve(&self, type_id: TypeId, type_name: &str) -> Result<&ValueComparer> {
        self.comparers
            .get(&type_id)
            .ok_or_else(|| TrackError::ComparerMissing {
                type_name: type_name.to_string(),
            })
    }

    /// Resolve the comparer for a concrete value
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::resolve`].
    pub fn resolve_for(&self, value: &ComplexValue) -> Result<&ValueComparer> {
        self.resolve(value.type_id(), value.type_name())
    }

    /// Number of registered comparers
    pub fn len(&self) -> usize {
        self.comparers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparers.is_empty()
    }

    /// Clone a property value for snapshot storage
    ///
    /// Scalars clone directly (identity clone is aliasing-free for owned
    /// primitives); complex values go through their registered comparer.
    ///
    /// # Errors
    ///
    /// `ComparerMissing` for an unregistered complex type.
    pub fn snapshot_value(&self, value: &PropertyValue) -> Result<PropertyValue> {
        match value {
            PropertyValue::Scalar(s) => Ok(PropertyValue::Scalar(s.clone())),
            PropertyValue::Complex(c) => {
                let comparer = self.resolve_for(c)?;
                Ok(PropertyValue::Complex(comparer.snapshot(c)?))
            }
        }
    }

    /// Compare a current property value against a snapshot value
    ///
    /// Scalar/complex disagreement and differing complex types compare
    /// unequal without consulting a comparer.
    ///
    /// # Errors
    ///
    /// `ComparerMissing` for an unregistered complex type.
    pub fn values_equal(&self, a: &PropertyValue, b: &PropertyValue) -> Result<bool> {
        match (a, b) {
            (PropertyValue::Scalar(a), PropertyValue::Scalar(b)) => Ok(a == b),
            (PropertyValue::Complex(a), PropertyValue::Complex(b)) => {
                if a.type_id() != b.type_id() {
                    return Ok(false);
                }
                let comparer = self.resolve_for(a)?;
                comparer.equals(a, b)
            }
            _ => Ok(false),
        }
    }
}
