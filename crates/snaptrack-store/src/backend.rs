//! Persistence backend seam
//!
//! The engine's only external collaborator. Snapshots are refreshed only
//! after `save` returns Ok, never before, so a failed save leaves the
//! dirty set intact for retry.

use snaptrack_core::EntityKey;

use crate::errors::Result;
use crate::row::Row;

/// A store of persisted rows keyed by entity key
pub trait Backend {
    /// Load the row for a key, if one was ever saved
    ///
    /// # Errors
    ///
    /// `Backend` on storage failure.
    fn load(&self, key: &EntityKey) -> Result<Option<Row>>;

    /// Persist the row for a key (insert or overwrite)
    ///
    /// # Errors
    ///
    /// `Backend` on storage failure; nothing may be partially written.
    fn save(&mut self, key: &EntityKey, row: Row) -> Result<()>;

    /// Remove the row for a key
    ///
    /// # Errors
    ///
    /// `RowNotFound` if no row exists for the key; `Backend` on storage
    /// failure.
    fn delete(&mut self, key: &EntityKey) -> Result<()>;
}
