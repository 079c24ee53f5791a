//! SQL query implementations.
//!
//! - [`recipes`]: reads, creation and deletion of recipe rows
//! - [`children`]: position-keyed upserts and prunes of steps and ingredients
//!
//! Write queries are generic over the executor so the same statements run
//! against the pool or inside a transaction.

pub mod children;
pub mod recipes;

use recipebox_storage::StorageError;

/// Converts a stored child index back to the domain type.
pub(crate) fn from_db_index(idx: i32) -> Result<u32, StorageError> {
    u32::try_from(idx).map_err(|_| StorageError::invalid_record(format!("Negative child index {idx}")))
}

/// Converts a domain index to the `INTEGER` column type.
pub(crate) fn to_db_index(index: u32) -> Result<i32, StorageError> {
    i32::try_from(index)
        .map_err(|_| StorageError::invalid_record(format!("Child index {index} is out of range")))
}
