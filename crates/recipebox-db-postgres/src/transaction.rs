//! PostgreSQL transaction implementation.
//!
//! Wraps one sqlx transaction so that the writes of a single aggregate
//! update become visible together or not at all.

use async_trait::async_trait;
use sqlx_postgres::PgTransaction;
use tokio::sync::Mutex;

use recipebox_core::RecipeDetails;
use recipebox_storage::{ChildFields, ChildKind, RecipeScope, StorageError, StoreTransaction};

use crate::queries;

/// PostgreSQL transaction wrapper.
///
/// The transaction rolls back on drop if it was not explicitly committed.
/// The `Option` lets commit and rollback take ownership of the inner
/// transaction; the `Mutex` keeps the wrapper `Sync`.
pub struct PostgresTransaction {
    tx: Mutex<Option<PgTransaction<'static>>>,
}

impl PostgresTransaction {
    /// Wraps a started sqlx transaction.
    pub fn new(tx: PgTransaction<'static>) -> Self {
        Self {
            tx: Mutex::new(Some(tx)),
        }
    }

    fn active(&mut self) -> Result<&mut PgTransaction<'static>, StorageError> {
        self.tx.get_mut().as_mut().ok_or_else(|| {
            StorageError::transaction_error("Transaction already completed (committed or rolled back)")
        })
    }
}

#[async_trait]
impl StoreTransaction for PostgresTransaction {
    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.get_mut().take() {
            tx.commit().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to commit transaction: {e}"))
            })?;
            tracing::debug!("Transaction committed successfully");
        }
        Ok(())
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StorageError> {
        if let Some(tx) = self.tx.get_mut().take() {
            tx.rollback().await.map_err(|e| {
                StorageError::transaction_error(format!("Failed to rollback transaction: {e}"))
            })?;
            tracing::debug!("Transaction rolled back successfully");
        }
        Ok(())
    }

    async fn update_recipe_details(
        &mut self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError> {
        let tx = self.active()?;
        queries::children::update_details(&mut **tx, scope, details).await
    }

    async fn upsert_child_by_position(
        &mut self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError> {
        let tx = self.active()?;
        queries::children::upsert(&mut **tx, scope, index, fields).await
    }

    async fn delete_children_with_index_at_or_above(
        &mut self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        let tx = self.active()?;
        queries::children::prune(&mut **tx, scope, kind, threshold).await
    }
}

impl Drop for PostgresTransaction {
    /// The inner sqlx transaction issues the ROLLBACK itself when dropped.
    fn drop(&mut self) {
        if self.tx.get_mut().is_some() {
            tracing::warn!(
                "PostgresTransaction dropped without explicit commit/rollback - will auto-rollback"
            );
        }
    }
}
