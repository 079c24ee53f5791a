//! PostgreSQL implementation of the `AggregateStore` trait.

use async_trait::async_trait;
use sqlx_postgres::PgPool;
use tracing::{debug, instrument};

use recipebox_core::{Recipe, RecipeDetails, RecipeId, RecipeSummary, TenantId};
use recipebox_storage::{
    AggregateStore, ChildFields, ChildKind, RecipeScope, StorageError, StoreTransaction,
};

use crate::config::PostgresConfig;
use crate::transaction::PostgresTransaction;
use crate::{migrations, pool, queries};

/// PostgreSQL-backed aggregate store.
///
/// Clones share the same connection pool.
#[derive(Debug, Clone)]
pub struct PostgresStorage {
    pool: PgPool,
}

impl PostgresStorage {
    /// Creates a new storage backend with the given configuration.
    ///
    /// Connects the pool and, when `run_migrations` is set, brings the schema
    /// up to date before returning.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot connect or a migration fails.
    pub async fn new(config: PostgresConfig) -> Result<Self, StorageError> {
        let pool = pool::create_pool(&config).await?;

        if config.run_migrations {
            migrations::run(&pool).await?;
        }

        Ok(Self::from_pool(pool))
    }

    /// Wraps an existing pool. The schema is assumed to be migrated.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Returns the underlying pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl AggregateStore for PostgresStorage {
    #[instrument(skip(self), fields(recipe_id = %id, tenant_id = %tenant_id))]
    async fn fetch_recipe(
        &self,
        id: &RecipeId,
        tenant_id: &TenantId,
    ) -> Result<Option<Recipe>, StorageError> {
        queries::recipes::fetch(&self.pool, id, tenant_id).await
    }

    async fn list_recipes(&self, tenant_id: &TenantId) -> Result<Vec<RecipeSummary>, StorageError> {
        queries::recipes::list(&self.pool, tenant_id).await
    }

    async fn create_recipe(&self, tenant_id: &TenantId) -> Result<Recipe, StorageError> {
        let recipe = queries::recipes::create(&self.pool, tenant_id).await?;
        debug!(recipe_id = %recipe.id, tenant_id = %tenant_id, "Created recipe");
        Ok(recipe)
    }

    async fn delete_recipe(&self, id: &RecipeId, tenant_id: &TenantId) -> Result<u64, StorageError> {
        queries::recipes::delete(&self.pool, id, tenant_id).await
    }

    async fn update_recipe_details(
        &self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError> {
        queries::children::update_details(&self.pool, scope, details).await
    }

    async fn upsert_child_by_position(
        &self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError> {
        queries::children::upsert(&self.pool, scope, index, fields).await
    }

    async fn delete_children_with_index_at_or_above(
        &self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        queries::children::prune(&self.pool, scope, kind, threshold).await
    }

    async fn begin_transaction(&self) -> Result<Box<dyn StoreTransaction>, StorageError> {
        let tx = self.pool.begin().await.map_err(|e| {
            StorageError::transaction_error(format!("Failed to begin transaction: {e}"))
        })?;
        Ok(Box::new(PostgresTransaction::new(tx)))
    }

    fn supports_transactions(&self) -> bool {
        true
    }

    fn backend_name(&self) -> &'static str {
        "postgres"
    }
}

