//! Reconciliation of a recipe's child collections with a submitted list.
//!
//! Position in the submitted list is the only identity a child has:
//! - the item at position `i` is upserted at index `i`
//! - rows at index `len` and beyond are pruned afterwards
//!
//! Steps and ingredients are reconciled independently. Indices echoed back by
//! the client are ignored.

mod scope;

use recipebox_core::{IngredientInput, RecipeDetails, RecipeId, StepInput, TenantId, ValidatedUpdate};
use recipebox_storage::{ChildFields, ChildKind, DynStore, RecipeScope, StorageError};
use serde::Serialize;
use tracing::{info, instrument};

use crate::error::ServiceError;
use scope::WriteScope;

/// Counts of the rows written by one reconciliation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileOutcome {
    pub steps_upserted: usize,
    pub ingredients_upserted: usize,
    pub steps_pruned: u64,
    pub ingredients_pruned: u64,
    /// Whether all writes were applied in a single transaction.
    pub atomic: bool,
}

/// Applies submitted child lists to a recipe.
///
/// The engine does not check ownership; callers authorize first. Every write
/// is still scoped to `(recipe_id, tenant_id)` at the store, so an
/// unauthorized pair cannot touch any row.
#[derive(Clone)]
pub struct ReconciliationEngine {
    store: DynStore,
}

impl ReconciliationEngine {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Makes the stored steps and ingredients equal the submitted lists.
    ///
    /// Calling this twice with the same input leaves the same state as
    /// calling it once.
    ///
    /// # Errors
    ///
    /// `StoreFailure` if a write fails; with a transactional store nothing is
    /// applied in that case.
    #[instrument(skip_all, fields(recipe_id = %recipe_id, tenant_id = %tenant_id))]
    pub async fn reconcile(
        &self,
        recipe_id: &RecipeId,
        tenant_id: &TenantId,
        steps: &[StepInput],
        ingredients: &[IngredientInput],
    ) -> Result<ReconcileOutcome, ServiceError> {
        let scope = RecipeScope::new(recipe_id.clone(), tenant_id.clone());
        self.run(&scope, None, steps, ingredients).await
    }

    /// Writes title and source, then reconciles both collections, all in
    /// one atomic scope.
    #[instrument(skip_all, fields(recipe_id = %recipe_id, tenant_id = %tenant_id))]
    pub async fn apply_update(
        &self,
        recipe_id: &RecipeId,
        tenant_id: &TenantId,
        update: &ValidatedUpdate,
    ) -> Result<ReconcileOutcome, ServiceError> {
        let scope = RecipeScope::new(recipe_id.clone(), tenant_id.clone());
        self.run(
            &scope,
            Some(&update.details),
            &update.steps,
            &update.ingredients,
        )
        .await
    }

    async fn run(
        &self,
        scope: &RecipeScope,
        details: Option<&RecipeDetails>,
        steps: &[StepInput],
        ingredients: &[IngredientInput],
    ) -> Result<ReconcileOutcome, ServiceError> {
        let mut writes = WriteScope::open(self.store.as_ref()).await?;

        match write_all(&mut writes, scope, details, steps, ingredients).await {
            Ok(mut outcome) => {
                outcome.atomic = writes.is_atomic();
                writes.finish().await?;
                info!(
                    steps_upserted = outcome.steps_upserted,
                    ingredients_upserted = outcome.ingredients_upserted,
                    steps_pruned = outcome.steps_pruned,
                    ingredients_pruned = outcome.ingredients_pruned,
                    atomic = outcome.atomic,
                    "Recipe children reconciled"
                );
                Ok(outcome)
            }
            Err(err) => {
                writes.abort().await;
                Err(err.into())
            }
        }
    }
}

/// Issues every write in order: details, step upserts, ingredient upserts,
/// step prune, ingredient prune.
async fn write_all(
    writes: &mut WriteScope<'_>,
    scope: &RecipeScope,
    details: Option<&RecipeDetails>,
    steps: &[StepInput],
    ingredients: &[IngredientInput],
) -> Result<ReconcileOutcome, StorageError> {
    if let Some(details) = details {
        writes.update_details(scope, details).await?;
    }

    for (position, step) in steps.iter().enumerate() {
        writes
            .upsert(scope, position_index(position)?, &ChildFields::from(step))
            .await?;
    }
    for (position, ingredient) in ingredients.iter().enumerate() {
        writes
            .upsert(scope, position_index(position)?, &ChildFields::from(ingredient))
            .await?;
    }

    let steps_pruned = writes
        .prune(scope, ChildKind::Step, position_index(steps.len())?)
        .await?;
    let ingredients_pruned = writes
        .prune(scope, ChildKind::Ingredient, position_index(ingredients.len())?)
        .await?;

    Ok(ReconcileOutcome {
        steps_upserted: steps.len(),
        ingredients_upserted: ingredients.len(),
        steps_pruned,
        ingredients_pruned,
        atomic: false,
    })
}

fn position_index(position: usize) -> Result<u32, StorageError> {
    u32::try_from(position)
        .map_err(|_| StorageError::invalid_record(format!("Child position {position} is out of range")))
}
