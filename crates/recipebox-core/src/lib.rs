//! Recipe aggregate types shared by every Recipebox crate.
//!
//! A [`Recipe`] owns two ordered child collections, [`Step`]s and
//! [`Ingredient`]s, whose `index` is their position. Form submissions arrive
//! as a [`RecipeUpdate`] and become a [`ValidatedUpdate`] only after
//! [`RecipeUpdate::validate`] succeeds.

pub mod id;
pub mod recipe;
pub mod submission;

pub use id::{IdError, RecipeId, TenantId, generate_id, validate_id};
pub use recipe::{Ingredient, Recipe, RecipeSummary, Step, Tag};
pub use submission::{
    IngredientInput, RecipeDetails, RecipeUpdate, StepInput, ValidatedUpdate, ValidationErrors,
};
