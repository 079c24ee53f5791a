//! The recipe aggregate: a parent record with two ordered child collections.

use serde::{Deserialize, Serialize};

use crate::id::{RecipeId, TenantId};

/// A tag attached to a recipe. Tags are managed outside this workspace and
/// are only ever read here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub name: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    pub recipe_id: RecipeId,
    pub index: u32,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ingredient {
    pub recipe_id: RecipeId,
    pub index: u32,
    pub amount: String,
    pub item: String,
}

/// A recipe together with its tags, steps and ingredients.
///
/// Collections are never absent: a recipe without children carries empty
/// vectors. Stores return children sorted by ascending index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: RecipeId,
    pub owner_id: TenantId,
    pub title: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    #[serde(default)]
    pub steps: Vec<Step>,
    #[serde(default)]
    pub ingredients: Vec<Ingredient>,
}

impl Recipe {
    /// A freshly created recipe: no title, no source, no children.
    pub fn empty(id: RecipeId, owner_id: TenantId) -> Self {
        Self {
            id,
            owner_id,
            title: None,
            source: None,
            tags: Vec::new(),
            steps: Vec::new(),
            ingredients: Vec::new(),
        }
    }

    pub fn is_owned_by(&self, tenant_id: &TenantId) -> bool {
        &self.owner_id == tenant_id
    }

    /// Orders both child collections by ascending index.
    pub fn sort_children(&mut self) {
        self.steps.sort_by_key(|s| s.index);
        self.ingredients.sort_by_key(|i| i.index);
    }
}

/// Row of the per-tenant recipe list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeSummary {
    pub id: RecipeId,
    pub title: Option<String>,
    #[serde(default)]
    pub tags: Vec<Tag>,
}
