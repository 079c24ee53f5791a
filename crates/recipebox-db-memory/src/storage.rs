use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use papaya::HashMap as PapayaHashMap;
use recipebox_core::{Recipe, RecipeDetails, RecipeId, RecipeSummary, Tag, TenantId};
use recipebox_storage::{
    AggregateStore, ChildFields, ChildKind, RecipeScope, StorageError, StoreTransaction,
};
use tokio::sync::Mutex;
use tracing::debug;

use crate::record::{RecipeRecord, WriteOp, apply_op};
use crate::transaction::{InMemoryTransaction, TransactionStats, TransactionStatsSnapshot};

/// In-memory recipe store using a papaya lock-free HashMap.
///
/// This storage implementation provides:
/// - Lock-free concurrent reads via papaya::HashMap
/// - Writes serialized by a single async mutex
/// - Whole-record replacement, so a reader sees a recipe either before or
///   after a write, never halfway through
/// - Transactions that replay their writes at commit, all or nothing
#[derive(Debug)]
pub struct InMemoryStore {
    /// One entry per recipe, children embedded
    pub(crate) data: Arc<PapayaHashMap<RecipeId, RecipeRecord>>,
    /// Held for the duration of every write and every commit
    pub(crate) write_lock: Arc<Mutex<()>>,
    pub(crate) stats: Arc<TransactionStats>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(PapayaHashMap::new()),
            write_lock: Arc::new(Mutex::new(())),
            stats: Arc::new(TransactionStats::default()),
        }
    }

    /// Attaches a tag to a recipe regardless of owner.
    ///
    /// Tags are maintained outside the recipe workflow; this is the seam used
    /// to seed them. Attaching a tag with an existing name replaces it.
    pub async fn attach_tag(&self, id: &RecipeId, tag: Tag) -> Result<(), StorageError> {
        let _lock = self.write_lock.lock().await;
        let guard = self.data.pin();
        let mut record = guard
            .get(id)
            .cloned()
            .ok_or_else(|| StorageError::recipe_not_found(id.as_str()))?;
        record.tags.retain(|t| t.name != tag.name);
        record.tags.push(tag);
        guard.insert(id.clone(), record);
        Ok(())
    }

    /// Number of recipes across all tenants.
    pub fn count(&self) -> usize {
        self.data.pin().iter().count()
    }

    pub fn transaction_stats(&self) -> TransactionStatsSnapshot {
        self.stats.snapshot()
    }

    async fn write(&self, op: WriteOp) -> Result<u64, StorageError> {
        let _lock = self.write_lock.lock().await;
        apply_and_publish(&self.data, std::slice::from_ref(&op))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies `ops` to copies of the current records and, only if every op
/// succeeds, publishes the copies. Returns the total rows affected.
///
/// Callers must hold the store's write lock.
pub(crate) fn apply_and_publish(
    data: &PapayaHashMap<RecipeId, RecipeRecord>,
    ops: &[WriteOp],
) -> Result<u64, StorageError> {
    let guard = data.pin();
    let mut working: HashMap<RecipeId, RecipeRecord> = HashMap::new();
    let mut affected = 0;

    for op in ops {
        affected += apply_op(&mut working, |id| guard.get(id).cloned(), op)?;
    }

    for (id, record) in working {
        guard.insert(id, record);
    }

    Ok(affected)
}

#[async_trait]
impl AggregateStore for InMemoryStore {
    async fn fetch_recipe(
        &self,
        id: &RecipeId,
        tenant_id: &TenantId,
    ) -> Result<Option<Recipe>, StorageError> {
        let guard = self.data.pin();
        Ok(guard
            .get(id)
            .filter(|record| &record.owner_id == tenant_id)
            .map(|record| record.to_recipe(id)))
    }

    async fn list_recipes(&self, tenant_id: &TenantId) -> Result<Vec<RecipeSummary>, StorageError> {
        let guard = self.data.pin();
        let mut summaries: Vec<RecipeSummary> = guard
            .iter()
            .filter(|(_, record)| &record.owner_id == tenant_id)
            .map(|(id, record)| RecipeSummary {
                id: id.clone(),
                title: record.title.clone(),
                tags: record.tags.clone(),
            })
            .collect();

        // Untitled recipes last, ties broken by id
        summaries.sort_by(|a, b| {
            (a.title.is_none(), &a.title, &a.id).cmp(&(b.title.is_none(), &b.title, &b.id))
        });
        Ok(summaries)
    }

    async fn create_recipe(&self, tenant_id: &TenantId) -> Result<Recipe, StorageError> {
        let id = RecipeId::generate();
        let record = RecipeRecord::empty(tenant_id.clone());
        let recipe = record.to_recipe(&id);

        let _lock = self.write_lock.lock().await;
        {
            let guard = self.data.pin();
            if guard.get(&id).is_some() {
                return Err(StorageError::internal(format!(
                    "Generated recipe id collided: {id}"
                )));
            }
            guard.insert(id.clone(), record);
        }

        debug!(recipe_id = %id, tenant_id = %tenant_id, "Recipe created");
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: &RecipeId, tenant_id: &TenantId) -> Result<u64, StorageError> {
        let _lock = self.write_lock.lock().await;
        let guard = self.data.pin();

        let owned = guard
            .get(id)
            .is_some_and(|record| &record.owner_id == tenant_id);
        if !owned {
            return Ok(0);
        }

        guard.remove(id);
        Ok(1)
    }

    async fn update_recipe_details(
        &self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError> {
        self.write(WriteOp::Details {
            scope: scope.clone(),
            details: details.clone(),
        })
        .await
        .map(|_| ())
    }

    async fn upsert_child_by_position(
        &self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError> {
        self.write(WriteOp::Upsert {
            scope: scope.clone(),
            index,
            fields: fields.clone(),
        })
        .await
        .map(|_| ())
    }

    async fn delete_children_with_index_at_or_above(
        &self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        self.write(WriteOp::Prune {
            scope: scope.clone(),
            kind,
            threshold,
        })
        .await
    }

    async fn begin_transaction(&self) -> Result<Box<dyn StoreTransaction>, StorageError> {
        Ok(Box::new(InMemoryTransaction::new(
            Arc::clone(&self.data),
            Arc::clone(&self.write_lock),
            Arc::clone(&self.stats),
        )))
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
