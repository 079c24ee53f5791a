//! Storage contract for the recipe aggregate.
//!
//! Backends implement [`AggregateStore`]; the edit workflow only ever talks
//! to a [`DynStore`]. The contract is narrow on purpose:
//! - tenant-scoped reads of a recipe with its ordered children
//! - recipe creation and deletion
//! - writing one child at a position, and pruning every child at or past a
//!   threshold
//! - optional atomic scopes via [`StoreTransaction`]
//!
//! Implementations live in `recipebox-db-memory` and `recipebox-db-postgres`.

mod error;
mod traits;
mod types;

pub use error::{ErrorCategory, StorageError};
pub use traits::{AggregateStore, StoreTransaction};
pub use types::{ChildFields, ChildKind, RecipeScope};

/// Shared handle to whichever backend was configured.
pub type DynStore = std::sync::Arc<dyn AggregateStore>;
