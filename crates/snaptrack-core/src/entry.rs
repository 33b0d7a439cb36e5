//! Read-only inspection view over a tracked entity
//!
//! An [`EntityEntry`] exposes the state, per-property modified flags, and
//! current/original values of one tracked entity without handing out any
//! mutable access.

use std::any::Any;

use crate::context::TrackingContext;
use crate::errors::{Result, TrackError};
use crate::model::{EntityKey, EntityState, ScalarValue, TrackedEntity};
use crate::snapshot::EntitySnapshot;

/// Inspection view over one tracked entity and its snapshots
#[derive(Debug)]
pub struct EntityEntry<'a> {
    entity: &'a TrackedEntity,
    snapshot: &'a EntitySnapshot,
}

impl<'a> EntityEntry<'a> {
    /// Build an entry for a tracked key
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope; `SnapshotMissing` if
    /// the entity has no stored snapshot (internal inconsistency).
    pub fn new(context: &'a TrackingContext, key: &EntityKey) -> Result<Self> {
        let entity = context.entity(key)?;
        let snapshot = context
            .snapshots()
            .snapshot(key)
            .ok_or_else(|| TrackError::SnapshotMissing {
                key: key.to_string(),
            })?;
        Ok(Self { entity, snapshot })
    }

    pub fn key(&self) -> &EntityKey {
        self.entity.key()
    }

    pub fn state(&self) -> EntityState {
        self.entity.state()
    }

    /// Whether the last detection pass flagged this property
    pub fn is_modified(&self, property: &str) -> bool {
        self.entity.is_property_modified(property)
    }

    /// Properties flagged by detection, in name order
    pub fn modified_properties(&self) -> Vec<&str> {
        self.entity.modified_properties()
    }

    /// Current value of a scalar property
    ///
    /// # Errors
    ///
    /// `PropertyNotFound` / `TypeMismatch` as for
    /// [`TrackedEntity::scalar`].
    pub fn current_scalar(&self, property: &str) -> Result<&ScalarValue> {
        self.entity.scalar(property)
    }

    /// Current value of a complex property
    ///
    /// # Errors
    ///
    /// `PropertyNotFound` / `TypeMismatch` as for
    /// [`TrackedEntity::complex`].
    pub fn current_complex<T: Any>(&self, property: &str) -> Result<&T> {
        self.entity.complex::<T>(property)
    }

    /// Original (snapshot) value of a scalar property
    ///
    /// # Errors
    ///
    /// `PropertyNotFound` if no snapshot exists for the property;
    /// `TypeMismatch` if the snapshot holds a complex value.
    pub fn original_scalar(&self, property: &str) -> Result<&ScalarValue> {
        let value = self
            .snapshot
            .get(property)
            .ok_or_else(|| TrackError::PropertyNotFound {
                property: property.to_string(),
            })?;
        value.as_scalar().ok_or_else(|| TrackError::TypeMismatch {
            expected: "scalar".to_string(),
            actual: value.type_label().to_string(),
        })
    }

    /// Original (snapshot) value of a complex property
    ///
    /// # Errors
    ///
    /// `PropertyNotFound` if no snapshot exists for the property;
    /// `TypeMismatch` if the snapshot is not a `T`.
    pub fn original_complex<T: Any>(&self, property: &str) -> Result<&T> {
        let value = self
            .snapshot
            .get(property)
            .ok_or_else(|| TrackError::PropertyNotFound {
                property: property.to_string(),
            })?;
        let complex = value.as_complex().ok_or_else(|| TrackError::TypeMismatch {
            expected: std::any::type_name::<T>().to_string(),
            actual: value.type_label().to_string(),
        })?;
        complex
            .downcast_ref::<T>()
            .ok_or_else(|| TrackError::TypeMismatch {
                expected: std::any::type_name::<T>().to_string(),
                actual: complex.type_name().to_string(),
            })
    }
}
