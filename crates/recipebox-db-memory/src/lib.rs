//! In-memory aggregate store backend for Recipebox.
//!
//! This crate provides an in-memory implementation of the `AggregateStore`
//! trait from `recipebox-storage`, using papaya lock-free HashMap for
//! concurrent reads.
//!
//! # Example
//!
//! ```ignore
//! use recipebox_db_memory::InMemoryStore;
//! use recipebox_storage::AggregateStore;
//!
//! let store = InMemoryStore::new();
//! let recipe = store.create_recipe(&tenant_id).await?;
//! ```

mod record;
pub mod storage;
pub mod transaction;

// Re-export the AggregateStore trait for convenience
pub use recipebox_storage::{AggregateStore, StorageError};

pub use storage::InMemoryStore;
pub use transaction::{InMemoryTransaction, TransactionStats, TransactionStatsSnapshot};

/// Creates a new in-memory store behind a shareable handle.
pub fn create_store() -> recipebox_storage::DynStore {
    std::sync::Arc::new(InMemoryStore::new())
}
