//! Shared fixtures for the service integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use recipebox_core::{
    IngredientInput, Recipe, RecipeDetails, RecipeId, RecipeSummary, StepInput, TenantId,
};
use recipebox_db_memory::InMemoryStore;
use recipebox_storage::{
    AggregateStore, ChildFields, ChildKind, RecipeScope, StorageError, StoreTransaction,
};

pub fn tenant(id: &str) -> TenantId {
    TenantId::new(id).unwrap()
}

pub fn steps(texts: &[&str]) -> Vec<StepInput> {
    texts.iter().map(|t| StepInput::new(*t)).collect()
}

pub fn ingredients(pairs: &[(&str, &str)]) -> Vec<IngredientInput> {
    pairs
        .iter()
        .map(|(amount, item)| IngredientInput::new(*amount, *item))
        .collect()
}

pub fn step_texts(recipe: &Recipe) -> Vec<(u32, String)> {
    recipe
        .steps
        .iter()
        .map(|s| (s.index, s.text.clone()))
        .collect()
}

pub fn ingredient_rows(recipe: &Recipe) -> Vec<(u32, String, String)> {
    recipe
        .ingredients
        .iter()
        .map(|i| (i.index, i.amount.clone(), i.item.clone()))
        .collect()
}

/// Wraps the in-memory store and fails every ingredient upsert once armed.
///
/// With `transactional = false` it also hides transaction support so the
/// direct write path can be observed.
pub struct FaultyStore {
    pub inner: Arc<InMemoryStore>,
    transactional: bool,
    armed: bool,
    pub writes: Arc<AtomicUsize>,
}

impl FaultyStore {
    pub fn new(inner: Arc<InMemoryStore>, transactional: bool, armed: bool) -> Self {
        Self {
            inner,
            transactional,
            armed,
            writes: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn check(&self, fields: &ChildFields) -> Result<(), StorageError> {
        check(self.armed, fields)
    }
}

fn check(armed: bool, fields: &ChildFields) -> Result<(), StorageError> {
    if armed && fields.kind() == ChildKind::Ingredient {
        return Err(StorageError::connection_error("injected failure"));
    }
    Ok(())
}

#[async_trait]
impl AggregateStore for FaultyStore {
    async fn fetch_recipe(
        &self,
        id: &RecipeId,
        tenant_id: &TenantId,
    ) -> Result<Option<Recipe>, StorageError> {
        self.inner.fetch_recipe(id, tenant_id).await
    }

    async fn list_recipes(&self, tenant_id: &TenantId) -> Result<Vec<RecipeSummary>, StorageError> {
        self.inner.list_recipes(tenant_id).await
    }

    async fn create_recipe(&self, tenant_id: &TenantId) -> Result<Recipe, StorageError> {
        self.inner.create_recipe(tenant_id).await
    }

    async fn delete_recipe(&self, id: &RecipeId, tenant_id: &TenantId) -> Result<u64, StorageError> {
        self.inner.delete_recipe(id, tenant_id).await
    }

    async fn update_recipe_details(
        &self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_recipe_details(scope, details).await
    }

    async fn upsert_child_by_position(
        &self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.check(fields)?;
        self.inner.upsert_child_by_position(scope, index, fields).await
    }

    async fn delete_children_with_index_at_or_above(
        &self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .delete_children_with_index_at_or_above(scope, kind, threshold)
            .await
    }

    async fn begin_transaction(&self) -> Result<Box<dyn StoreTransaction>, StorageError> {
        if !self.transactional {
            return Err(StorageError::transaction_error("transactions disabled"));
        }
        Ok(Box::new(FaultyTransaction {
            inner: self.inner.begin_transaction().await?,
            armed: self.armed,
            writes: self.writes.clone(),
        }))
    }

    fn supports_transactions(&self) -> bool {
        self.transactional
    }

    fn backend_name(&self) -> &'static str {
        "faulty"
    }
}

struct FaultyTransaction {
    inner: Box<dyn StoreTransaction>,
    armed: bool,
    writes: Arc<AtomicUsize>,
}

#[async_trait]
impl StoreTransaction for FaultyTransaction {
    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        self.inner.commit().await
    }

    async fn rollback(self: Box<Self>) -> Result<(), StorageError> {
        self.inner.rollback().await
    }

    async fn update_recipe_details(
        &mut self,
        scope: &RecipeScope,
        details: &RecipeDetails,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.update_recipe_details(scope, details).await
    }

    async fn upsert_child_by_position(
        &mut self,
        scope: &RecipeScope,
        index: u32,
        fields: &ChildFields,
    ) -> Result<(), StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        check(self.armed, fields)?;
        self.inner.upsert_child_by_position(scope, index, fields).await
    }

    async fn delete_children_with_index_at_or_above(
        &mut self,
        scope: &RecipeScope,
        kind: ChildKind,
        threshold: u32,
    ) -> Result<u64, StorageError> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .delete_children_with_index_at_or_above(scope, kind, threshold)
            .await
    }
}
