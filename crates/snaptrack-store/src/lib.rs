//! snaptrack store - persistence side of the change-tracking engine
//!
//! This crate provides:
//! - The [`Backend`] trait (`load`/`save`/`delete`), the engine's only
//!   external collaborator
//! - [`MemoryBackend`], a HashMap row store with failure injection
//! - JSON codecs mapping complex property types to their stored shape
//! - Hydration between live entities and persisted rows
//! - [`Session`], the unit of work tying a tracking context to a backend:
//!   register types and models once, add or find entities, mutate them in
//!   place, and `save_changes` to persist the dirty set and rebase
//!   snapshots

pub mod backend;
pub mod codec;
pub mod errors;
pub mod hydration;
pub mod memory;
pub mod row;
pub mod session;

// Re-export commonly used types
pub use backend::Backend;
pub use codec::{CodecRegistry, JsonCodec};
pub use errors::{Result, StoreError};
pub use memory::MemoryBackend;
pub use row::Row;
pub use session::{SaveReport, Session};
