//! Snapshot storage for tracked entities
//!
//! Holds, per tracked entity, one independently-cloned copy of each
//! property value taken at attach time and refreshed after each confirmed
//! save. These clones are the "original values" change detection compares
//! against.

use std::collections::{BTreeMap, HashMap};

use crate::comparer::ComparerRegistry;
use crate::errors::{Result, TrackError};
use crate::model::{EntityKey, PropertyValue, TrackedEntity};

/// Per-entity snapshot map: property name -> cloned original value
pub type EntitySnapshot = BTreeMap<String, PropertyValue>;

/// Store of original-value clones, one set per tracked entity
///
/// A snapshot is never aliased with a live value: every entry is produced
/// by a comparer clone (or scalar copy), so mutating the live object graph
/// cannot touch the stored original. This property is what makes in-place
/// mutation detectable at all.
///
/// Not thread-safe (no interior locking) - one store per tracking context,
/// single-threaded use.
#[derive(Debug, Default)]
pub struct SnapshotStore {
    snapshots: HashMap<EntityKey, EntitySnapshot>,
}

impl SnapshotStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self {
            snapshots: HashMap::new(),
        }
    }

    /// Take initial snapshots for a newly tracked entity
    ///
    /// Clones every current property value through the registry and stores
    /// the result under the entity's key.
    ///
    /// # Errors
    ///
    /// `EntityAlreadyTracked` if snapshots for the key already exist;
    /// `ComparerMissing` if a complex property's type has no registered
    /// comparer (fatal, nothing is stored).
    pub fn attach(&mut self, registry: &ComparerRegistry, entity: &TrackedEntity) -> Result<()> {
        if self.snapshots.contains_key(entity.key()) {
            return Err(TrackError::EntityAlreadyTracked {
                key: entity.key().to_string(),
            });
        }
        let snapshot = Self::clone_properties(registry, entity)?;
        self.snapshots.insert(entity.key().clone(), snapshot);
        Ok(())
    }

    /// Re-clone current values over the stored snapshots
    ///
    /// Called after a confirmed save so the just-persisted state becomes
    /// the new baseline. Must never be called for a save that failed: the
    /// stale snapshot is what keeps the dirty set intact for retry.
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if no snapshots exist for the key;
    /// `ComparerMissing` as for [`Self::attach`] (existing snapshots are
    /// left untouched on error).
    pub fn refresh(&mut self, registry: &ComparerRegistry, entity: &TrackedEntity) -> Result<()> {
        if !self.snapshots.contains_key(entity.key()) {
            return Err(TrackError::EntityNotTracked {
                key: entity.key().to_string(),
            });
        }
        let snapshot = Self::clone_properties(registry, entity)?;
        self.snapshots.insert(entity.key().clone(), snapshot);
        Ok(())
    }

    /// Discard an entity's snapshots, removing it from detection scope
    ///
    /// Returns true if snapshots existed for the key.
    pub fn detach(&mut self, key: &EntityKey) -> bool {
        self.snapshots.remove(key).is_some()
    }

    /// Whether snapshots exist for the key
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.snapshots.contains_key(key)
    }

    /// The full snapshot map for an entity
    pub fn snapshot(&self, key: &EntityKey) -> Option<&EntitySnapshot> {
        self.snapshots.get(key)
    }

    /// A single property's original value
    pub fn original(&self, key: &EntityKey, property: &str) -> Option<&PropertyValue> {
        self.snapshots.get(key).and_then(|s| s.get(property))
    }

    /// Number of entities with stored snapshots
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    fn clone_properties(
        registry: &ComparerRegistry,
        entity: &TrackedEntity,
    ) -> Result<EntitySnapshot> {
        let mut snapshot = EntitySnapshot::new();
        for (name, value) in entity.properties() {
            snapshot.insert(name.to_string(), registry.snapshot_value(value)?);
        }
        Ok(snapshot)
    }
}
