//! Tracking context: the set of entities under change tracking
//!
//! A context owns the tracked entities and their snapshot store. It is the
//! unit of isolation: one context per logical unit of work, mutated and
//! queried from a single thread (no interior locking).

use std::collections::BTreeMap;

use crate::comparer::ComparerRegistry;
use crate::errors::{Result, TrackError};
use crate::model::{EntityKey, EntityState, TrackedEntity};
use crate::snapshot::SnapshotStore;

/// Owner of tracked entities and their snapshots
///
/// Entities enter the context through [`attach`](Self::attach) (loaded from
/// a backend) or [`add`](Self::add) (newly created), and leave through
/// [`detach`](Self::detach). Entry order does not matter: entities iterate
/// in key order, and detection is a pure comparison either way.
#[derive(Debug, Default)]
pub struct TrackingContext {
    pub(crate) entities: BTreeMap<EntityKey, TrackedEntity>,
    pub(crate) snapshots: SnapshotStore,
}

impl TrackingContext {
    /// Create an empty context
    pub fn new() -> Self {
        Self {
            entities: BTreeMap::new(),
            snapshots: SnapshotStore::new(),
        }
    }

    /// Start tracking an entity that exists in the backend (load path)
    ///
    /// Snapshots are taken from the entity's current values and the entity
    /// enters `Unchanged`. Whether the entity was just built from a backend
    /// row or handed over from elsewhere makes no difference to later
    /// detection: the snapshot is cloned fresh here either way.
    ///
    /// # Errors
    ///
    /// `EntityAlreadyTracked` if the key is already in scope;
    /// `ComparerMissing` if a complex property type lacks a comparer;
    /// `InvalidTransition` if the entity is not in `Detached` state.
    pub fn attach(&mut self, registry: &ComparerRegistry, entity: TrackedEntity) -> Result<()> {
        self.enter(registry, entity, EntityState::Unchanged)
    }

    /// Start tracking a newly created entity (no persisted counterpart)
    ///
    /// Snapshots are taken and the entity enters `Added`.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Self::attach`].
    pub fn add(&mut self, registry: &ComparerRegistry, entity: TrackedEntity) -> Result<()> {
        self.enter(registry, entity, EntityState::Added)
    }

    fn enter(
        &mut self,
        registry: &ComparerRegistry,
        mut entity: TrackedEntity,
        state: EntityState,
    ) -> Result<()> {
        if self.entities.contains_key(entity.key()) {
            return Err(TrackError::EntityAlreadyTracked {
                key: entity.key().to_string(),
            });
        }
        self.snapshots.attach(registry, &entity)?;
        if let Err(err) = entity.transition_to(state) {
            self.snapshots.detach(entity.key());
            return Err(err);
        }
        entity.clear_modified();
        self.entities.insert(entity.key().clone(), entity);
        Ok(())
    }

    /// Schedule a tracked entity for deletion on the next save
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope; `InvalidTransition`
    /// if the entity cannot be deleted from its current state.
    pub fn mark_deleted(&mut self, key: &EntityKey) -> Result<()> {
        let entity = self.entity_mut(key)?;
        entity.transition_to(EntityState::Deleted)
    }

    /// Stop tracking an entity and return it
    ///
    /// Snapshots are discarded and the entity leaves detection scope in
    /// `Detached` state; mutating it afterwards is invisible to the engine.
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope.
    pub fn detach(&mut self, key: &EntityKey) -> Result<TrackedEntity> {
        let mut entity = self
            .entities
            .remove(key)
            .ok_or_else(|| TrackError::EntityNotTracked {
                key: key.to_string(),
            })?;
        self.snapshots.detach(key);
        entity.transition_to(EntityState::Detached)?;
        entity.clear_modified();
        Ok(entity)
    }

    /// Rebase an entity on its just-saved state
    ///
    /// Refreshes snapshots from current values, clears per-property
    /// modified flags, and moves `Added`/`Modified` to `Unchanged`. Call
    /// this only after the backend confirmed the write; calling it before
    /// would silently drop the dirty state a failed save needs for retry.
    ///
    /// # Errors
    ///
    /// `EntityNotTracked`, `ComparerMissing`, or `InvalidTransition` (for
    /// example on an entity in `Deleted` state, which completes through
    /// [`Self::detach`] instead).
    pub fn accept_changes(&mut self, registry: &ComparerRegistry, key: &EntityKey) -> Result<()> {
        let entity = self
            .entities
            .get_mut(key)
            .ok_or_else(|| TrackError::EntityNotTracked {
                key: key.to_string(),
            })?;
        entity.transition_to(EntityState::Unchanged)?;
        self.snapshots.refresh(registry, entity)?;
        entity.clear_modified();
        Ok(())
    }

    /// Borrow a tracked entity
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope.
    pub fn entity(&self, key: &EntityKey) -> Result<&TrackedEntity> {
        self.entities
            .get(key)
            .ok_or_else(|| TrackError::EntityNotTracked {
                key: key.to_string(),
            })
    }

    /// Mutably borrow a tracked entity (the live mutation path)
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope.
    pub fn entity_mut(&mut self, key: &EntityKey) -> Result<&mut TrackedEntity> {
        self.entities
            .get_mut(key)
            .ok_or_else(|| TrackError::EntityNotTracked {
                key: key.to_string(),
            })
    }

    /// Whether the key is in tracking scope
    pub fn is_tracked(&self, key: &EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    /// Keys of all tracked entities, in key order
    pub fn keys(&self) -> impl Iterator<Item = &EntityKey> {
        self.entities.keys()
    }

    /// Direct access to the snapshot store (read side)
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }

    /// Number of tracked entities
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
