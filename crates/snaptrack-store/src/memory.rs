//! In-memory backend
//!
//! HashMap-backed row store. Not thread-safe (no Arc/RwLock) - one backend
//! per session, single-threaded use. Carries a one-shot failure switch so
//! tests can prove that a failed save leaves the dirty set intact.

use std::collections::HashMap;

use snaptrack_core::EntityKey;

use crate::backend::Backend;
use crate::errors::{Result, StoreError};
use crate::row::Row;

/// In-memory row store
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    rows: HashMap<EntityKey, Row>,
    fail_next_save: bool,
}

impl MemoryBackend {
    /// Create an empty backend
    pub fn new() -> Self {
        Self {
            rows: HashMap::new(),
            fail_next_save: false,
        }
    }

    /// Make the next `save` call fail with a backend error
    ///
    /// The switch resets after firing, so a retry succeeds.
    pub fn fail_next_save(&mut self) {
        self.fail_next_save = true;
    }

    /// Direct row access for assertions
    pub fn row(&self, key: &EntityKey) -> Option<&Row> {
        self.rows.get(key)
    }

    /// Whether a row exists for the key
    pub fn contains(&self, key: &EntityKey) -> bool {
        self.rows.contains_key(key)
    }

    /// Number of stored rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl Backend for MemoryBackend {
    fn load(&self, key: &EntityKey) -> Result<Option<Row>> {
        Ok(self.rows.get(key).cloned())
    }

    fn save(&mut self, key: &EntityKey, row: Row) -> Result<()> {
        if self.fail_next_save {
            self.fail_next_save = false;
            return Err(StoreError::Backend {
                message: format!("injected save failure for {}", key),
            });
        }
        self.rows.insert(key.clone(), row);
        Ok(())
    }

    fn delete(&mut self, key: &EntityKey) -> Result<()> {
        if self.rows.remove(key).is_none() {
            return Err(StoreError::RowNotFound {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}
