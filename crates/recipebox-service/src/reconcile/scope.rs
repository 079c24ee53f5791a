//! Destination of reconciliation writes: a transaction or the store itself.

use recipebox_core::RecipeDetails;
use recipebox_storage::{
    AggregateStore, ChildFields, ChildKind, RecipeScope, StorageError, StoreTransaction,
};
use tracing::warn;

pub(crate) enum WriteScope<'a> {
    Atomic(Box<dyn StoreTransaction>),
    Direct(&'a dyn AggregateStore),
}

impl<'a> WriteScope<'a> {
    /// Opens a transaction when the store has them, else writes go straight through.
    pub(crate) async fn open(store: &'a dyn AggregateStore) -> Result<Self, StorageError> {
        if store.supports_transactions() {
            Ok(Self::Atomic(store.begin_transaction().await?))
        } else {
            Ok(Self::Direct(store))
        }
    }

    pub(crate) fn is_atomic(&self) -> bool {
        matches!(self, Self::Atomic(_))
    }

    pub(crate) async fn update_details(
        &mut self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError> {
        match self {
            Self::Atomic(tx) => tx.update_recipe_details(scope, details).await,
            Self::Direct(store) => store.update_recipe_details(scope, details).await,
        }
    }

    pub(crate) async fn upsert(
        &mut self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError> {
        match self {
            Self::Atomic(tx) => tx.upsert_child_by_position(scope, index, fields).await,
            Self::Direct(store) => store.upsert_child_by_position(scope, index, fields).await,
        }
    }

    pub(crate) async fn prune(
        &mut self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        match self {
            Self::Atomic(tx) => {
                tx.delete_children_with_index_at_or_above(scope, kind, threshold)
                    .await
            }
            Self::Direct(store) => {
                store
                    .delete_children_with_index_at_or_above(scope, kind, threshold)
                    .await
            }
        }
    }

    /// Makes the writes visible. A no-op for direct writes.
    pub(crate) async fn finish(self) -> Result<(), StorageError> {
        match self {
            Self::Atomic(tx) => tx.commit().await,
            Self::Direct(_) => Ok(()),
        }
    }

    /// Discards the writes where possible. Direct writes already happened.
    pub(crate) async fn abort(self) {
        match self {
            Self::Atomic(tx) => {
                if let Err(err) = tx.rollback().await {
                    warn!(error = %err, "Rollback after failed reconciliation also failed");
                }
            }
            Self::Direct(store) => {
                warn!(
                    backend = store.backend_name(),
                    "Reconciliation failed on a store without transactions; earlier writes persist"
                );
            }
        }
    }
}
