//! Session: unit of work over a tracking context and a backend
//!
//! A session wires the engine to a persistence backend: models and
//! comparers/codecs are registered once at setup, entities are added or
//! found (loaded + attached), mutated in place through live references,
//! and `save_changes` persists the dirty set and rebases snapshots.
//!
//! One session per logical unit of work, single-threaded.

use std::any::Any;
use std::collections::HashMap;
use std::time::Instant;

use serde::de::DeserializeOwned;
use serde::Serialize;
use snaptrack_core::model::PropertyKind;
use snaptrack_core::{
    detect_changes, log_op_end, log_op_error, log_op_start, ComparerRegistry, DetectionReport,
    EntityEntry, EntityKey, EntityModel, EntityState, TrackedEntity, TrackingContext,
    ValueComparer,
};
use snaptrack_core_types::RequestContext;

use crate::backend::Backend;
use crate::codec::{CodecRegistry, JsonCodec};
use crate::errors::{Result, StoreError};
use crate::hydration;

/// Outcome of a `save_changes` call
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaveReport {
    /// Entities written to the backend (added + modified), in save order
    pub saved: Vec<EntityKey>,
    /// Entities deleted from the backend and detached
    pub deleted: Vec<EntityKey>,
}

impl SaveReport {
    /// True when the save had nothing to do
    pub fn is_empty(&self) -> bool {
        self.saved.is_empty() && self.deleted.is_empty()
    }
}

/// Unit of work: tracking context + comparer/codec configuration + backend
pub struct Session<B: Backend> {
    backend: B,
    registry: ComparerRegistry,
    codecs: CodecRegistry,
    models: HashMap<String, EntityModel>,
    context: TrackingContext,
    request: RequestContext,
}

impl<B: Backend> Session<B> {
    /// Create a session over a backend with empty configuration
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            registry: ComparerRegistry::new(),
            codecs: CodecRegistry::new(),
            models: HashMap::new(),
            context: TrackingContext::new(),
            request: RequestContext::new(),
        }
    }

    /// Attach a correlation context carried in this session's op logs
    pub fn with_request_context(mut self, request: RequestContext) -> Self {
        self.request = request;
        self
    }

    // ===== Configuration =====

    /// Install a value comparer
    ///
    /// # Errors
    ///
    /// `ComparerAlreadyRegistered` (via the engine) on double registration.
    pub fn register_comparer(&mut self, comparer: ValueComparer) -> Result<()> {
        self.registry.register(comparer).map_err(StoreError::from)
    }

    /// Install a JSON codec
    ///
    /// # Errors
    ///
    /// `CodecAlreadyRegistered` on double registration.
    pub fn register_codec(&mut self, codec: JsonCodec) -> Result<()> {
        self.codecs.register(codec)
    }

    /// Install the derived comparer and serde-backed codec for `T` in one go
    ///
    /// The usual way to map a complex property type persisted as JSON:
    /// equality and snapshot cloning from `PartialEq`/`Clone`, stored shape
    /// from serde.
    ///
    /// # Errors
    ///
    /// Double registration of either half.
    pub fn register_json_type<T>(&mut self) -> Result<()>
    where
        T: Any + Send + Sync + PartialEq + Clone + Serialize + DeserializeOwned,
    {
        self.register_comparer(ValueComparer::of::<T>())?;
        self.register_codec(JsonCodec::of::<T>())
    }

    /// Register an entity model, validating its configuration eagerly
    ///
    /// Every complex property of the model must already have both a
    /// comparer and a codec, so misconfiguration surfaces at setup rather
    /// than on the first detection pass.
    ///
    /// # Errors
    ///
    /// `ComparerMissing` / `CodecMissing` naming the offending type.
    pub fn register_model(&mut self, model: EntityModel) -> Result<()> {
        for descriptor in model.properties() {
            if let PropertyKind::Complex { type_id, type_name } = descriptor.kind() {
                self.registry
                    .resolve(*type_id, type_name)
                    .map_err(StoreError::from)?;
                self.codecs.resolve(*type_id, type_name)?;
            }
        }
        self.models.insert(model.kind().to_string(), model);
        Ok(())
    }

    /// Build a fresh (detached) entity for a registered model
    ///
    /// # Errors
    ///
    /// `ModelMissing` if the kind has no registered model.
    pub fn new_entity(&self, kind: &str, id: &str) -> Result<TrackedEntity> {
        let model = self.model(kind)?;
        Ok(TrackedEntity::for_model(model, id))
    }

    /// Look up a registered model
    ///
    /// # Errors
    ///
    /// `ModelMissing` if the kind has no registered model.
    pub fn model(&self, kind: &str) -> Result<&EntityModel> {
        self.models.get(kind).ok_or_else(|| StoreError::ModelMissing {
            kind: kind.to_string(),
        })
    }

    // ===== Tracking =====

    /// Track a newly created entity for insertion on the next save
    ///
    /// # Errors
    ///
    /// Engine errors from [`TrackingContext::add`].
    pub fn add(&mut self, entity: TrackedEntity) -> Result<()> {
        self.context
            .add(&self.registry, entity)
            .map_err(StoreError::from)
    }

    /// Track an entity that already exists in the backend
    ///
    /// # Errors
    ///
    /// Engine errors from [`TrackingContext::attach`].
    pub fn attach(&mut self, entity: TrackedEntity) -> Result<()> {
        self.context
            .attach(&self.registry, entity)
            .map_err(StoreError::from)
    }

    /// Find an entity by kind and id
    ///
    /// Already-tracked entities are returned as-is (the session is an
    /// identity map); otherwise the row is loaded, hydrated through the
    /// model, and attached.
    ///
    /// # Errors
    ///
    /// `RowNotFound` if the backend has no row; `ModelMissing` if the kind
    /// is not registered; hydration and engine errors otherwise.
    pub fn find(&mut self, kind: &str, id: &str) -> Result<&mut TrackedEntity> {
        log_op_start!("find", entity_kind = kind, request_id = self.request.request_id.as_str());
        let start = Instant::now();

        match self.find_impl(kind, id) {
            Ok(entity) => {
                log_op_end!("find", duration_ms = start.elapsed().as_millis() as u64);
                Ok(entity)
            }
            Err(err) => {
                log_op_error!("find", err, duration_ms = start.elapsed().as_millis() as u64);
                Err(err)
            }
        }
    }

    fn find_impl(&mut self, kind: &str, id: &str) -> Result<&mut TrackedEntity> {
        let key = EntityKey::new(kind, id);
        if !self.context.is_tracked(&key) {
            let row = self
                .backend
                .load(&key)?
                .ok_or_else(|| StoreError::RowNotFound {
                    key: key.to_string(),
                })?;
            let model = self.model(kind)?;
            let entity = hydration::hydrate(&self.codecs, model, id, &row)?;
            self.context
                .attach(&self.registry, entity)
                .map_err(StoreError::from)?;
        }
        Ok(self.context.entity_mut(&key)?)
    }

    /// Stop tracking an entity and return it
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` (via the engine) if the key is not in scope.
    pub fn detach(&mut self, key: &EntityKey) -> Result<TrackedEntity> {
        Ok(self.context.detach(key)?)
    }

    /// Schedule a tracked entity for deletion on the next save
    ///
    /// Deleting an `Added` entity (never persisted) simply detaches it:
    /// there is no row to remove.
    ///
    /// # Errors
    ///
    /// Engine errors from [`TrackingContext::mark_deleted`].
    pub fn mark_deleted(&mut self, key: &EntityKey) -> Result<()> {
        if self.context.entity(key)?.state() == EntityState::Added {
            self.context.detach(key)?;
            return Ok(());
        }
        Ok(self.context.mark_deleted(key)?)
    }

    /// Borrow a tracked entity
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope.
    pub fn entity(&self, key: &EntityKey) -> Result<&TrackedEntity> {
        Ok(self.context.entity(key)?)
    }

    /// Mutably borrow a tracked entity (the live mutation path)
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope.
    pub fn entity_mut(&mut self, key: &EntityKey) -> Result<&mut TrackedEntity> {
        Ok(self.context.entity_mut(key)?)
    }

    /// Inspection view over a tracked entity (state, modified flags,
    /// current and original values)
    ///
    /// # Errors
    ///
    /// `EntityNotTracked` if the key is not in scope.
    pub fn entry(&self, key: &EntityKey) -> Result<EntityEntry<'_>> {
        Ok(EntityEntry::new(&self.context, key)?)
    }

    /// Whether the key is in tracking scope
    pub fn is_tracked(&self, key: &EntityKey) -> bool {
        self.context.is_tracked(key)
    }

    // ===== Detection and save =====

    /// Run a detection pass without saving
    ///
    /// # Errors
    ///
    /// Engine errors from [`detect_changes`].
    pub fn detect_changes(&mut self) -> Result<DetectionReport> {
        log_op_start!(
            "detect_changes",
            request_id = self.request.request_id.as_str()
        );
        let start = Instant::now();

        match detect_changes(&self.registry, &mut self.context) {
            Ok(report) => {
                log_op_end!(
                    "detect_changes",
                    duration_ms = start.elapsed().as_millis() as u64,
                    dirty_count = report.dirty_count() as u64
                );
                Ok(report)
            }
            Err(err) => {
                log_op_error!(
                    "detect_changes",
                    err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err.into())
            }
        }
    }

    /// Detect changes, persist the dirty set, and rebase snapshots
    ///
    /// Entities are processed one at a time; each entity's snapshots are
    /// refreshed immediately after its own backend write succeeds. On a
    /// backend failure the pass aborts: entities already written are
    /// clean, the failing entity and any not yet processed keep their
    /// dirty state for retry. Deletes run after writes; a deleted entity
    /// is detached only once the backend confirms.
    ///
    /// # Errors
    ///
    /// Detection errors, codec errors, and `Backend` failures.
    pub fn save_changes(&mut self) -> Result<SaveReport> {
        log_op_start!(
            "save_changes",
            request_id = self.request.request_id.as_str()
        );
        let start = Instant::now();

        match self.save_changes_impl() {
            Ok(report) => {
                log_op_end!(
                    "save_changes",
                    duration_ms = start.elapsed().as_millis() as u64,
                    saved_count = report.saved.len() as u64,
                    deleted_count = report.deleted.len() as u64
                );
                Ok(report)
            }
            Err(err) => {
                log_op_error!(
                    "save_changes",
                    err,
                    duration_ms = start.elapsed().as_millis() as u64
                );
                Err(err)
            }
        }
    }

    fn save_changes_impl(&mut self) -> Result<SaveReport> {
        let report = detect_changes(&self.registry, &mut self.context)?;

        let mut saved = Vec::new();
        for entry in &report.entries {
            let entity = self.context.entity(&entry.key)?;
            let row = hydration::dehydrate(&self.codecs, entity)?;
            self.backend.save(&entry.key, row)?;
            // Refresh only now that the backend confirmed the write
            self.context.accept_changes(&self.registry, &entry.key)?;
            saved.push(entry.key.clone());
        }

        let mut deleted = Vec::new();
        for key in &report.pending_deletes {
            self.backend.delete(key)?;
            self.context.detach(key)?;
            deleted.push(key.clone());
        }

        Ok(SaveReport { saved, deleted })
    }

    // ===== Accessors =====

    /// The underlying backend (read side, for assertions)
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// The underlying backend (write side, e.g. for failure injection)
    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    /// The tracking context (read side)
    pub fn context(&self) -> &TrackingContext {
        &self.context
    }
}
