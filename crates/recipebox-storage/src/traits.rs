//! The store and transaction traits backends implement.

use async_trait::async_trait;

use recipebox_core::{Recipe, RecipeDetails, RecipeId, RecipeSummary, TenantId};

use crate::error::StorageError;
use crate::types::{ChildFields, ChildKind, RecipeScope};

/// The main storage trait that all recipe storage backends must implement.
///
/// Every operation is tenant scoped: reads filter on the owner, writes take a
/// [`RecipeScope`] and never touch rows of another recipe or another tenant.
/// Implementations must be thread-safe (`Send + Sync`).
///
/// # Example
///
/// ```ignore
/// use recipebox_storage::{AggregateStore, StorageError};
///
/// async fn title_of(store: &dyn AggregateStore, id: &RecipeId, tenant: &TenantId)
///     -> Result<Option<String>, StorageError>
/// {
///     Ok(store.fetch_recipe(id, tenant).await?.and_then(|r| r.title))
/// }
/// ```
#[async_trait]
pub trait AggregateStore: Send + Sync {
    // ==================== Recipes ====================

    /// Reads a recipe with its tags and children.
    ///
    /// Returns `None` both when the recipe does not exist and when it is owned
    /// by another tenant. Children are sorted by ascending index.
    ///
    /// # Errors
    ///
    /// Returns an error only for infrastructure issues, not for missing recipes.
    async fn fetch_recipe(
        &self,
        id: &RecipeId,
        tenant_id: &TenantId,
    ) -> Result<Option<Recipe>, StorageError>;

    /// Lists summaries of every recipe owned by the tenant.
    async fn list_recipes(&self, tenant_id: &TenantId) -> Result<Vec<RecipeSummary>, StorageError>;

    /// Creates an empty recipe owned by the tenant.
    async fn create_recipe(&self, tenant_id: &TenantId) -> Result<Recipe, StorageError>;

    /// Deletes an owned recipe together with its children.
    ///
    /// Returns the number of recipes deleted: `0` when the recipe is absent or
    /// owned by someone else. Deleting twice is not an error.
    async fn delete_recipe(&self, id: &RecipeId, tenant_id: &TenantId) -> Result<u64, StorageError>;

    // ==================== Aggregate writes ====================

    /// Overwrites title and source of the scoped recipe.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the scope matches no recipe.
    async fn update_recipe_details(
        &self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError>;

    /// Creates the child row at `(recipe, index)` or overwrites its fields.
    ///
    /// The collection is selected by the variant of `fields`. Rows at other
    /// indices are never touched.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if the scope matches no recipe.
    async fn upsert_child_by_position(
        &self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError>;

    /// Removes the rows of one collection whose index is `>= threshold`.
    ///
    /// Returns the number of rows removed. A scope that matches no recipe
    /// removes nothing.
    async fn delete_children_with_index_at_or_above(
        &self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError>;

    /// Opens an atomic scope for aggregate writes.
    ///
    /// The returned `StoreTransaction` offers the aggregate writes; none of
    /// them is visible to readers until `commit` succeeds.
    ///
    /// # Errors
    ///
    /// `StorageError::TransactionError` when the backend has no transactions
    /// or cannot start one.
    async fn begin_transaction(&self) -> Result<Box<dyn StoreTransaction>, StorageError>;

    /// Whether `begin_transaction` can succeed. Callers fall back to direct
    /// writes when it returns `false`.
    fn supports_transactions(&self) -> bool;

    /// Short backend name for log fields, e.g. `"memory"`.
    fn backend_name(&self) -> &'static str;
}

/// An atomic scope for aggregate writes.
///
/// If an error occurs, `rollback` is called, or the transaction is dropped
/// without `commit`, all writes are discarded.
///
/// # Example
///
/// ```ignore
/// let mut tx = store.begin_transaction().await?;
/// tx.upsert_child_by_position(&scope, 0, &fields).await?;
/// tx.delete_children_with_index_at_or_above(&scope, ChildKind::Step, 1).await?;
/// tx.commit().await?;
/// ```
#[async_trait]
pub trait StoreTransaction: Send + Sync {
    /// Commits all writes in this transaction.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::TransactionError` if the commit fails. Nothing
    /// is applied in that case.
    async fn commit(self: Box<Self>) -> Result<(), StorageError>;

    /// Discards all writes in this transaction.
    async fn rollback(self: Box<Self>) -> Result<(), StorageError>;

    /// See `AggregateStore::update_recipe_details`.
    async fn update_recipe_details(
        &mut self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError>;

    /// See `AggregateStore::upsert_child_by_position`.
    async fn upsert_child_by_position(
        &mut self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError>;

    /// See `AggregateStore::delete_children_with_index_at_or_above`.
    async fn delete_children_with_index_at_or_above(
        &mut self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError>;
}
