//! Types shared by every aggregate store backend.

use std::fmt;

use recipebox_core::{IngredientInput, RecipeId, StepInput, TenantId};
use serde::{Deserialize, Serialize};

/// The two child collections of a recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChildKind {
    Step,
    Ingredient,
}

impl ChildKind {
    /// Name used in logs and error messages.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Step => "step",
            Self::Ingredient => "ingredient",
        }
    }
}

impl fmt::Display for ChildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Content of a single child row. The variant selects the collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ChildFields {
    Step { text: String },
    Ingredient { amount: String, item: String },
}

impl ChildFields {
    #[must_use]
    pub fn kind(&self) -> ChildKind {
        match self {
            Self::Step { .. } => ChildKind::Step,
            Self::Ingredient { .. } => ChildKind::Ingredient,
        }
    }
}

impl From<&StepInput> for ChildFields {
    fn from(input: &StepInput) -> Self {
        Self::Step {
            text: input.text.clone(),
        }
    }
}

impl From<&IngredientInput> for ChildFields {
    fn from(input: &IngredientInput) -> Self {
        Self::Ingredient {
            amount: input.amount.clone(),
            item: input.item.clone(),
        }
    }
}

/// The (recipe, tenant) pair every write is restricted to.
///
/// A write issued under a scope whose recipe does not exist, or belongs to
/// another tenant, touches no rows.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RecipeScope {
    pub recipe_id: RecipeId,
    pub tenant_id: TenantId,
}

impl RecipeScope {
    #[must_use]
    pub fn new(recipe_id: RecipeId, tenant_id: TenantId) -> Self {
        Self {
            recipe_id,
            tenant_id,
        }
    }
}

impl fmt::Display for RecipeScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.recipe_id, self.tenant_id)
    }
}
