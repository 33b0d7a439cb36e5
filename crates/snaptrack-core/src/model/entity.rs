use std::any::Any;
use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::property::{PropertyDescriptor, PropertyValue, ScalarValue};
use super::state::EntityState;
use crate::errors::{Result, TrackError};

/// Identity of a tracked entity: entity kind plus primary key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityKey {
    kind: String,
    id: String,
}

impl EntityKey {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn id(&self) -> &str {
        &self.id
    }
}

impl std::fmt::Display for EntityKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Property schema for one entity kind
///
/// Declares each property's name, value shape, and mutability. Models are
/// static configuration: built once at startup, then shared by hydration,
/// validation, and write checks.
#[derive(Debug, Clone)]
pub struct EntityModel {
    kind: String,
    properties: Vec<PropertyDescriptor>,
}

impl EntityModel {
    /// Build a model from its property declarations
    ///
    /// # Errors
    ///
    /// Returns `DuplicateProperty` if two declarations share a name.
    pub fn new(kind: impl Into<String>, properties: Vec<PropertyDescriptor>) -> Result<Self> {
        let mut seen = BTreeSet::new();
        for descriptor in &properties {
            if !seen.insert(descriptor.name().to_string()) {
                return Err(TrackError::DuplicateProperty {
                    property: descriptor.name().to_string(),
                });
            }
        }
        Ok(Self {
            kind: kind.into(),
            properties,
        })
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn properties(&self) -> &[PropertyDescriptor] {
        &self.properties
    }

    /// Look up a property declaration by name
    pub fn property(&self, name: &str) -> Option<&PropertyDescriptor> {
        self.properties.iter().find(|p| p.name() == name)
    }

    /// Build the key for an instance of this kind
    pub fn key_for(&self, id: impl Into<String>) -> EntityKey {
        EntityKey::new(self.kind.clone(), id)
    }
}

/// An entity under change tracking
///
/// Holds the identity, lifecycle state, and the live property values the
/// caller mutates. Snapshots live in the
/// [`SnapshotStore`](crate::snapshot::SnapshotStore), never here, so the
/// live side and the original side cannot share storage.
#[derive(Debug)]
pub struct TrackedEntity {
    key: EntityKey,
    state: EntityState,
    model: Option<EntityModel>,
    values: BTreeMap<String, PropertyValue>,
    modified: BTreeSet<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TrackedEntity {
    /// Create a free-form entity (no model; every property is mutable)
    pub fn new(key: EntityKey) -> Self {
        let now = Utc::now();
        Self {
            key,
            state: EntityState::Detached,
            model: None,
            values: BTreeMap::new(),
            modified: BTreeSet::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Create an entity bound to a model
    ///
    /// Writes are then validated against the model's declarations: unknown
    /// property names, wrong value types, and overwrites of read-only
    /// properties are rejected.
    pub fn for_model(model: &EntityModel, id: impl Into<String>) -> Self {
        let mut entity = Self::new(model.key_for(id));
        entity.model = Some(model.clone());
        entity
    }

    pub fn key(&self) -> &EntityKey {
        &self.key
    }

    pub fn state(&self) -> EntityState {
        self.state
    }

    pub fn model(&self) -> Option<&EntityModel> {
        self.model.as_ref()
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Move to a new lifecycle state, enforcing the transition table
    pub(crate) fn transition_to(&mut self, to: EntityState) -> Result<()> {
        if !self.state.can_transition(to) {
            return Err(TrackError::InvalidTransition {
                from: self.state.to_string(),
                to: to.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Iterate properties in name order
    pub fn properties(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }

    pub fn property_count(&self) -> usize {
        self.values.len()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    /// Raw value access
    pub fn value(&self, name: &str) -> Option<&PropertyValue> {
        self.values.get(name)
    }

    /// Read a scalar property
    ///
    /// # Errors
    ///
    /// `PropertyNotFound` if the property has no value; `TypeMismatch` if
    /// the property holds a complex value.
    pub fn scalar(&self, name: &str) -> Result<&ScalarValue> {
        let value = self.values.get(name).ok_or_else(|| TrackError::PropertyNotFound {
            property: name.to_string(),
        })?;
        value.as_scalar().ok_or_else(|| TrackError::TypeMismatch {
            expected: "scalar".to_string(),
            actual: value.type_label().to_string(),
        })
    }

    /// Read a complex property as `T`
    ///
    /// # Errors
    ///
    /// `PropertyNotFound` if the property has no value; `TypeMismatch` if
    /// the stored value is not a `T`.
    pub fn complex<T: Any>(&self, name: &str) -> Result<&T> {
        let value = self.values.get(name).ok_or_else(|| TrackError::PropertyNotFound {
            property: name.to_string(),
        })?;
        let complex = value.as_complex().ok_or_else(|| TrackError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: value.type_label().to_string(),
        })?;
        complex.downcast_ref::<T>().ok_or_else(|| TrackError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: complex.type_name().to_string(),
        })
    }

    /// Mutably borrow a complex property as `T` for in-place mutation
    ///
    /// This hands out a live `&mut T` into the tracked value. Nothing is
    /// marked dirty here: mutation through this reference is only visible
    /// to a later detection pass comparing against the snapshot.
    ///
    /// # Errors
    ///
    /// `EntityDeleted` if the entity is scheduled for deletion;
    /// `PropertyImmutable` if the model declares the property read-only;
    /// `PropertyNotFound` / `TypeMismatch` as for [`Self::complex`].
    pub fn complex_mut<T: Any>(&mut self, name: &str) -> Result<&mut T> {
        if self.state == EntityState::Deleted {
            return Err(TrackError::EntityDeleted {
                key: self.key.to_string(),
            });
        }
        if let Some(model) = &self.model {
            if let Some(descriptor) = model.property(name) {
                if !descriptor.is_mutable() {
                    return Err(TrackError::PropertyImmutable {
                        property: name.to_string(),
                    });
                }
            }
        }
        let value = self.values.get_mut(name).ok_or_else(|| TrackError::PropertyNotFound {
            property: name.to_string(),
        })?;
        let label = value.type_label();
        let complex = value.as_complex_mut().ok_or_else(|| TrackError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: label.to_string(),
        })?;
        let type_name = complex.type_name();
        let inner = complex.downcast_mut::<T>().ok_or_else(|| TrackError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: type_name.to_string(),
        })?;
        self.updated_at = Utc::now();
        Ok(inner)
    }

    /// Set a scalar property (initial population or reassignment)
    ///
    /// # Errors
    ///
    /// `EntityDeleted`, `PropertyNotFound` (name not declared on the
    /// model), `TypeMismatch` (model declares the property complex), or
    /// `PropertyImmutable` (overwriting a read-only property).
    pub fn put_scalar(&mut self, name: &str, value: impl Into<ScalarValue>) -> Result<()> {
        self.put(name, PropertyValue::Scalar(value.into()))
    }

    /// Set a complex property (initial population or whole-value reassignment)
    ///
    /// Reassigning a brand-new instance is just another way of making the
    /// current value differ from its snapshot; detection treats it exactly
    /// like in-place mutation.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::put_scalar`].
    pub fn put_complex<T: Any + Send + Sync>(&mut self, name: &str, value: T) -> Result<()> {
        self.put(name, PropertyValue::complex(value))
    }

    /// Insert a pre-built value (used by hydration)
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::put_scalar`].
    pub fn put(&mut self, name: &str, value: PropertyValue) -> Result<()> {
        if self.state == EntityState::Deleted {
            return Err(TrackError::EntityDeleted {
                key: self.key.to_string(),
            });
        }
        if let Some(model) = &self.model {
            let descriptor = model.property(name).ok_or_else(|| TrackError::PropertyNotFound {
                property: name.to_string(),
            })?;
            if !descriptor.kind().accepts(&value) {
                return Err(TrackError::TypeMismatch {
                    expected: descriptor.kind().label().to_string(),
                    actual: value.type_label().to_string(),
                });
            }
            // First population is always allowed; only overwrites honour
            // the read-only flag.
            if self.values.contains_key(name) && !descriptor.is_mutable() {
                return Err(TrackError::PropertyImmutable {
                    property: name.to_string(),
                });
            }
        }
        self.values.insert(name.to_string(), value);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Whether the last detection pass flagged this property
    pub fn is_property_modified(&self, name: &str) -> bool {
        self.modified.contains(name)
    }

    /// Properties flagged by detection, in name order
    pub fn modified_properties(&self) -> Vec<&str> {
        self.modified.iter().map(|s| s.as_str()).collect()
    }

    pub(crate) fn mark_property_modified(&mut self, name: &str) {
        self.modified.insert(name.to_string());
    }

    pub(crate) fn clear_modified(&mut self) {
        self.modified.clear();
    }
}
