//! Ownership check performed before every mutation.

use recipebox_core::{Recipe, RecipeId, TenantId};
use recipebox_storage::DynStore;
use tracing::debug;

use crate::error::ServiceError;

/// Confirms that a tenant owns a recipe.
///
/// A recipe owned by someone else is reported exactly like a missing one so
/// callers cannot probe for ids belonging to other tenants.
#[derive(Clone)]
pub struct AuthorizationGate {
    store: DynStore,
}

impl AuthorizationGate {
    pub fn new(store: DynStore) -> Self {
        Self { store }
    }

    /// Returns the owned recipe, or `NotFound`.
    pub async fn authorize(
        &self,
        recipe_id: &RecipeId,
        tenant_id: &TenantId,
    ) -> Result<Recipe, ServiceError> {
        match self.store.fetch_recipe(recipe_id, tenant_id).await? {
            Some(recipe) if recipe.is_owned_by(tenant_id) => Ok(recipe),
            _ => {
                debug!(recipe_id = %recipe_id, tenant_id = %tenant_id, "Recipe not visible to tenant");
                Err(ServiceError::not_found(recipe_id))
            }
        }
    }
}
