//! The recipe workflow as seen by a transport layer.

use std::fmt;

use recipebox_core::{Ingredient, Recipe, RecipeId, RecipeSummary, RecipeUpdate, Step, Tag};
use recipebox_storage::DynStore;
use serde::Serialize;
use tracing::{debug, info, instrument};

use crate::error::ServiceError;
use crate::gate::AuthorizationGate;
use crate::identity::IdentityResolver;
use crate::reconcile::ReconciliationEngine;

/// Where the caller should be sent after a mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    View(RecipeId),
    Edit(RecipeId),
    List,
}

impl Navigation {
    pub fn location(&self) -> String {
        match self {
            Self::View(id) => format!("/recipes/{id}"),
            Self::Edit(id) => format!("/recipes/{id}?edit=true"),
            Self::List => "/recipes".to_string(),
        }
    }
}

impl fmt::Display for Navigation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.location())
    }
}

/// Data pre-filled into the edit form.
///
/// Absent title and source become empty strings; children are in index order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeForm {
    pub id: RecipeId,
    pub title: String,
    pub source: String,
    pub tags: Vec<Tag>,
    pub steps: Vec<Step>,
    pub ingredients: Vec<Ingredient>,
}

impl From<Recipe> for RecipeForm {
    fn from(mut recipe: Recipe) -> Self {
        recipe.sort_children();
        Self {
            id: recipe.id,
            title: recipe.title.unwrap_or_default(),
            source: recipe.source.unwrap_or_default(),
            tags: recipe.tags,
            steps: recipe.steps,
            ingredients: recipe.ingredients,
        }
    }
}

/// Tenant-scoped recipe operations.
///
/// Every operation resolves the tenant first; an unauthenticated request
/// never reaches the store.
pub struct RecipeService<R: IdentityResolver> {
    store: DynStore,
    identity: R,
    gate: AuthorizationGate,
    engine: ReconciliationEngine,
}

impl<R: IdentityResolver> RecipeService<R> {
    pub fn new(store: DynStore, identity: R) -> Self {
        Self {
            gate: AuthorizationGate::new(store.clone()),
            engine: ReconciliationEngine::new(store.clone()),
            store,
            identity,
        }
    }

    pub fn store(&self) -> &DynStore {
        &self.store
    }

    /// Summaries of the caller's recipes.
    pub async fn list(&self, request: &R::Request) -> Result<Vec<RecipeSummary>, ServiceError> {
        let tenant_id = self.identity.require_tenant_id(request).await?;
        Ok(self.store.list_recipes(&tenant_id).await?)
    }

    /// One recipe with its children in index order.
    pub async fn view(&self, request: &R::Request, id: &RecipeId) -> Result<Recipe, ServiceError> {
        let tenant_id = self.identity.require_tenant_id(request).await?;
        let mut recipe = self.gate.authorize(id, &tenant_id).await?;
        recipe.sort_children();
        Ok(recipe)
    }

    pub async fn edit_form(
        &self,
        request: &R::Request,
        id: &RecipeId,
    ) -> Result<RecipeForm, ServiceError> {
        let tenant_id = self.identity.require_tenant_id(request).await?;
        let recipe = self.gate.authorize(id, &tenant_id).await?;
        Ok(RecipeForm::from(recipe))
    }

    /// Validates and persists an edit submission.
    ///
    /// Validation runs before the store is consulted, so an invalid
    /// submission neither reads nor writes anything.
    #[instrument(skip(self, request, update), fields(recipe_id = %id))]
    pub async fn submit_update(
        &self,
        request: &R::Request,
        id: &RecipeId,
        update: RecipeUpdate,
    ) -> Result<Navigation, ServiceError> {
        let tenant_id = self.identity.require_tenant_id(request).await?;
        let validated = update.validate().inspect_err(|errors| {
            debug!(errors = %errors, "Rejected recipe submission");
        })?;

        self.gate.authorize(id, &tenant_id).await?;
        self.engine.apply_update(id, &tenant_id, &validated).await?;

        Ok(Navigation::View(id.clone()))
    }

    pub async fn delete(&self, request: &R::Request, id: &RecipeId) -> Result<Navigation, ServiceError> {
        let tenant_id = self.identity.require_tenant_id(request).await?;
        self.gate.authorize(id, &tenant_id).await?;

        let deleted = self.store.delete_recipe(id, &tenant_id).await?;
        info!(recipe_id = %id, tenant_id = %tenant_id, deleted, "Recipe deleted");

        Ok(Navigation::List)
    }

    /// Creates an empty recipe and points the caller at its edit form.
    pub async fn create(&self, request: &R::Request) -> Result<Navigation, ServiceError> {
        let tenant_id = self.identity.require_tenant_id(request).await?;
        let recipe = self.store.create_recipe(&tenant_id).await?;
        info!(recipe_id = %recipe.id, tenant_id = %tenant_id, "Recipe created");
        Ok(Navigation::Edit(recipe.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use recipebox_core::TenantId;

    #[test]
    fn test_navigation_locations() {
        let id = RecipeId::new("abc").unwrap();
        assert_eq!(Navigation::View(id.clone()).location(), "/recipes/abc");
        assert_eq!(Navigation::Edit(id).location(), "/recipes/abc?edit=true");
        assert_eq!(Navigation::List.to_string(), "/recipes");
    }

    #[test]
    fn test_form_defaults_and_ordering() {
        let id = RecipeId::new("abc").unwrap();
        let mut recipe = Recipe::empty(id.clone(), TenantId::new("t").unwrap());
        for (index, text) in [(1, "second"), (0, "first")] {
            recipe.steps.push(Step {
                recipe_id: id.clone(),
                index,
                text: text.to_string(),
            });
        }

        let form = RecipeForm::from(recipe);
        assert_eq!(form.title, "");
        assert_eq!(form.source, "");
        assert_eq!(form.steps[0].text, "first");
        assert_eq!(form.steps[1].text, "second");

        let json = serde_json::to_value(&form).unwrap();
        assert_eq!(json["title"], "");
        assert_eq!(json["steps"][0]["recipeId"], "abc");
    }
}
