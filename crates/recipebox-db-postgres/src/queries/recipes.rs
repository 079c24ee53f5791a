//! Recipe reads, creation and deletion.

use std::collections::HashMap;

use sqlx_core::query::query;
use sqlx_core::query_as::query_as;
use sqlx_postgres::PgPool;

use recipebox_core::{Ingredient, Recipe, RecipeId, RecipeSummary, Step, Tag, TenantId};
use recipebox_storage::StorageError;

use super::from_db_index;
use crate::error::query_error;

/// Reads a recipe and its children from one snapshot.
///
/// Runs in a read-only REPEATABLE READ transaction so the children always
/// belong to a single committed state of the aggregate.
pub async fn fetch(
    pool: &PgPool,
    id: &RecipeId,
    tenant_id: &TenantId,
) -> Result<Option<Recipe>, StorageError> {
    let mut tx = pool
        .begin()
        .await
        .map_err(|e| query_error("begin read transaction", e))?;

    query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY")
        .execute(&mut *tx)
        .await
        .map_err(|e| query_error("set isolation level", e))?;

    let row: Option<(String, String, Option<String>, Option<String>)> = query_as(
        r#"SELECT id, owner_id, title, source
           FROM recipe
           WHERE id = $1 AND owner_id = $2"#,
    )
    .bind(id.as_str())
    .bind(tenant_id.as_str())
    .fetch_optional(&mut *tx)
    .await
    .map_err(|e| query_error("fetch recipe", e))?;

    let Some((id, owner_id, title, source)) = row else {
        return Ok(None);
    };
    let recipe_id = RecipeId::new(id)?;

    let step_rows: Vec<(i32, String)> =
        query_as("SELECT idx, text FROM step WHERE recipe_id = $1 ORDER BY idx ASC")
            .bind(recipe_id.as_str())
            .fetch_all(&mut *tx)
            .await
            .map_err(|e| query_error("fetch steps", e))?;

    let ingredient_rows: Vec<(i32, String, String)> = query_as(
        "SELECT idx, amount, item FROM ingredient WHERE recipe_id = $1 ORDER BY idx ASC",
    )
    .bind(recipe_id.as_str())
    .fetch_all(&mut *tx)
    .await
    .map_err(|e| query_error("fetch ingredients", e))?;

    let tag_rows: Vec<(String, String)> = query_as(
        r#"SELECT t.name, t.display_name
           FROM recipe_tag rt JOIN tag t ON t.name = rt.tag_name
           WHERE rt.recipe_id = $1
           ORDER BY t.name"#,
    )
    .bind(recipe_id.as_str())
    .fetch_all(&mut *tx)
    .await
    .map_err(|e| query_error("fetch tags", e))?;

    tx.commit()
        .await
        .map_err(|e| query_error("finish read transaction", e))?;

    let steps = step_rows
        .into_iter()
        .map(|(idx, text)| {
            Ok(Step {
                recipe_id: recipe_id.clone(),
                index: from_db_index(idx)?,
                text,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    let ingredients = ingredient_rows
        .into_iter()
        .map(|(idx, amount, item)| {
            Ok(Ingredient {
                recipe_id: recipe_id.clone(),
                index: from_db_index(idx)?,
                amount,
                item,
            })
        })
        .collect::<Result<Vec<_>, StorageError>>()?;

    Ok(Some(Recipe {
        id: recipe_id,
        owner_id: TenantId::new(owner_id)?,
        title,
        source,
        tags: tag_rows
            .into_iter()
            .map(|(name, display_name)| Tag { name, display_name })
            .collect(),
        steps,
        ingredients,
    }))
}

/// Lists the tenant's recipes with their tags.
pub async fn list(pool: &PgPool, tenant_id: &TenantId) -> Result<Vec<RecipeSummary>, StorageError> {
    let rows: Vec<(String, Option<String>)> = query_as(
        r#"SELECT id, title FROM recipe
           WHERE owner_id = $1
           ORDER BY title IS NULL, title, id"#,
    )
    .bind(tenant_id.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| query_error("list recipes", e))?;

    let tag_rows: Vec<(String, String, String)> = query_as(
        r#"SELECT rt.recipe_id, t.name, t.display_name
           FROM recipe_tag rt
           JOIN tag t ON t.name = rt.tag_name
           JOIN recipe r ON r.id = rt.recipe_id
           WHERE r.owner_id = $1
           ORDER BY t.name"#,
    )
    .bind(tenant_id.as_str())
    .fetch_all(pool)
    .await
    .map_err(|e| query_error("list recipe tags", e))?;

    let mut tags_by_recipe: HashMap<String, Vec<Tag>> = HashMap::new();
    for (recipe_id, name, display_name) in tag_rows {
        tags_by_recipe
            .entry(recipe_id)
            .or_default()
            .push(Tag { name, display_name });
    }

    rows.into_iter()
        .map(|(id, title)| {
            let tags = tags_by_recipe.remove(&id).unwrap_or_default();
            Ok(RecipeSummary {
                id: RecipeId::new(id)?,
                title,
                tags,
            })
        })
        .collect()
}

/// Inserts an empty recipe owned by the tenant.
pub async fn create(pool: &PgPool, tenant_id: &TenantId) -> Result<Recipe, StorageError> {
    let id = RecipeId::generate();

    query("INSERT INTO recipe (id, owner_id) VALUES ($1, $2)")
        .bind(id.as_str())
        .bind(tenant_id.as_str())
        .execute(pool)
        .await
        .map_err(|e| query_error("create recipe", e))?;

    Ok(Recipe::empty(id, tenant_id.clone()))
}

/// Deletes an owned recipe; children and tag links cascade.
pub async fn delete(pool: &PgPool, id: &RecipeId, tenant_id: &TenantId) -> Result<u64, StorageError> {
    let result = query("DELETE FROM recipe WHERE id = $1 AND owner_id = $2")
        .bind(id.as_str())
        .bind(tenant_id.as_str())
        .execute(pool)
        .await
        .map_err(|e| query_error("delete recipe", e))?;

    Ok(result.rows_affected())
}
