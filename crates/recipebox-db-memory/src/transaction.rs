//! Transactions for the in-memory store.
//!
//! Writes are applied to a private working copy as they are issued, so the
//! caller gets immediate row counts and `NotFound` errors. Nothing is visible
//! to readers until commit, which takes the store's write lock and replays the
//! recorded writes against the then-current records. Either every replayed
//! write succeeds and all touched records are published, or none are.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use recipebox_core::{RecipeDetails, RecipeId};
use recipebox_storage::{ChildFields, ChildKind, RecipeScope, StorageError, StoreTransaction};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::record::{RecipeRecord, WriteOp, apply_op};
use crate::storage::apply_and_publish;

/// Counters for transaction outcomes.
#[derive(Debug, Default)]
pub struct TransactionStats {
    begun: AtomicU64,
    committed: AtomicU64,
    rolled_back: AtomicU64,
    failed: AtomicU64,
}

/// Point-in-time copy of [`TransactionStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TransactionStatsSnapshot {
    pub begun: u64,
    pub committed: u64,
    pub rolled_back: u64,
    pub failed: u64,
}

impl TransactionStats {
    pub fn snapshot(&self) -> TransactionStatsSnapshot {
        TransactionStatsSnapshot {
            begun: self.begun.load(Ordering::Relaxed),
            committed: self.committed.load(Ordering::Relaxed),
            rolled_back: self.rolled_back.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
        }
    }
}

pub struct InMemoryTransaction {
    data: Arc<PapayaHashMap<RecipeId, RecipeRecord>>,
    write_lock: Arc<Mutex<()>>,
    stats: Arc<TransactionStats>,
    ops: Vec<WriteOp>,
    /// Records as this transaction sees them
    working: HashMap<RecipeId, RecipeRecord>,
    finished: bool,
}

impl InMemoryTransaction {
    pub(crate) fn new(
        data: Arc<PapayaHashMap<RecipeId, RecipeRecord>>,
        write_lock: Arc<Mutex<()>>,
        stats: Arc<TransactionStats>,
    ) -> Self {
        stats.begun.fetch_add(1, Ordering::Relaxed);
        Self {
            data,
            write_lock,
            stats,
            ops: Vec::new(),
            working: HashMap::new(),
            finished: false,
        }
    }

    fn stage(&mut self, op: WriteOp) -> Result<u64, StorageError> {
        let data = &self.data;
        let affected = apply_op(&mut self.working, |id| data.pin().get(id).cloned(), &op)?;
        self.ops.push(op);
        Ok(affected)
    }
}

#[async_trait]
impl StoreTransaction for InMemoryTransaction {
    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        self.finished = true;
        let ops = std::mem::take(&mut self.ops);

        let _lock = self.write_lock.lock().await;
        match apply_and_publish(&self.data, &ops) {
            Ok(_) => {
                self.stats.committed.fetch_add(1, Ordering::Relaxed);
                debug!(writes = ops.len(), "Transaction committed");
                Ok(())
            }
            Err(e) => {
                self.stats.failed.fetch_add(1, Ordering::Relaxed);
                // A recipe deleted since staging reads the same as a direct write to it.
                if e.is_not_found() {
                    return Err(e);
                }
                Err(StorageError::transaction_error(format!(
                    "Commit aborted, nothing applied: {e}"
                )))
            }
        }
    }

    async fn rollback(mut self: Box<Self>) -> Result<(), StorageError> {
        self.finished = true;
        self.stats.rolled_back.fetch_add(1, Ordering::Relaxed);
        debug!(discarded = self.ops.len(), "Transaction rolled back");
        Ok(())
    }

    async fn update_recipe_details(
        &mut self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError> {
        self.stage(WriteOp::Details {
            scope: scope.clone(),
            details: details.clone(),
        })
        .map(|_| ())
    }

    async fn upsert_child_by_position(
        &mut self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError> {
        self.stage(WriteOp::Upsert {
            scope: scope.clone(),
            index,
            fields: fields.clone(),
        })
        .map(|_| ())
    }

    async fn delete_children_with_index_at_or_above(
        &mut self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        self.stage(WriteOp::Prune {
            scope: scope.clone(),
            kind,
            threshold,
        })
    }
}

impl Drop for InMemoryTransaction {
    fn drop(&mut self) {
        if !self.finished {
            self.stats.rolled_back.fetch_add(1, Ordering::Relaxed);
            warn!(
                discarded = self.ops.len(),
                "InMemoryTransaction dropped without commit/rollback - writes discarded"
            );
        }
    }
}
