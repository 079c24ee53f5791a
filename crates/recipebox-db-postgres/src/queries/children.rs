//! Step and ingredient writes.
//!
//! Every statement joins through `recipe` on `(id, owner_id)`, so a scope
//! naming another tenant's recipe matches zero rows.

use sqlx_core::executor::Executor;
use sqlx_core::query::query;
use sqlx_postgres::Postgres;

use recipebox_core::RecipeDetails;
use recipebox_storage::{ChildFields, ChildKind, RecipeScope, StorageError};

use super::to_db_index;
use crate::error::query_error;

const UPDATE_DETAILS: &str = r#"UPDATE recipe SET title = $3, source = $4
   WHERE id = $1 AND owner_id = $2"#;

const UPSERT_STEP: &str = r#"INSERT INTO step (recipe_id, idx, text)
   SELECT r.id, $3, $4 FROM recipe r WHERE r.id = $1 AND r.owner_id = $2
   ON CONFLICT (recipe_id, idx) DO UPDATE SET text = EXCLUDED.text"#;

const UPSERT_INGREDIENT: &str = r#"INSERT INTO ingredient (recipe_id, idx, amount, item)
   SELECT r.id, $3, $4, $5 FROM recipe r WHERE r.id = $1 AND r.owner_id = $2
   ON CONFLICT (recipe_id, idx) DO UPDATE SET amount = EXCLUDED.amount, item = EXCLUDED.item"#;

const PRUNE_STEPS: &str = r#"DELETE FROM step s USING recipe r
   WHERE s.recipe_id = r.id AND r.id = $1 AND r.owner_id = $2 AND s.idx >= $3"#;

const PRUNE_INGREDIENTS: &str = r#"DELETE FROM ingredient i USING recipe r
   WHERE i.recipe_id = r.id AND r.id = $1 AND r.owner_id = $2 AND i.idx >= $3"#;

/// Overwrites title and source of the scoped recipe.
pub async fn update_details<'e, E>(
    executor: E,
    scope: &RecipeScope,
    details: &RecipeDetails,
) -> Result<(), StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let result = query(UPDATE_DETAILS)
        .bind(scope.recipe_id.as_str())
        .bind(scope.tenant_id.as_str())
        .bind(details.title.as_str())
        .bind(details.source.as_str())
        .execute(executor)
        .await
        .map_err(|e| query_error("update recipe details", e))?;

    if result.rows_affected() == 0 {
        return Err(StorageError::recipe_not_found(scope.recipe_id.as_str()));
    }
    Ok(())
}

/// Inserts or overwrites the child row at `index`.
pub async fn upsert<'e, E>(
    executor: E,
    scope: &RecipeScope,
    index: u32,
    fields: &ChildFields,
) -> Result<(), StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let idx = to_db_index(index)?;

    let statement = match fields {
        ChildFields::Step { text } => query(UPSERT_STEP)
            .bind(scope.recipe_id.as_str())
            .bind(scope.tenant_id.as_str())
            .bind(idx)
            .bind(text.as_str()),
        ChildFields::Ingredient { amount, item } => query(UPSERT_INGREDIENT)
            .bind(scope.recipe_id.as_str())
            .bind(scope.tenant_id.as_str())
            .bind(idx)
            .bind(amount.as_str())
            .bind(item.as_str()),
    };

    let result = statement
        .execute(executor)
        .await
        .map_err(|e| query_error(&format!("upsert {}", fields.kind()), e))?;

    // The INSERT ... SELECT produced no row: the scope matched no recipe
    if result.rows_affected() == 0 {
        return Err(StorageError::recipe_not_found(scope.recipe_id.as_str()));
    }
    Ok(())
}

/// Deletes the rows of `kind` with `idx >= threshold`, returning how many.
pub async fn prune<'e, E>(
    executor: E,
    scope: &RecipeScope,
    kind: ChildKind,
    threshold: u32,
) -> Result<u64, StorageError>
where
    E: Executor<'e, Database = Postgres>,
{
    let sql = match kind {
        ChildKind::Step => PRUNE_STEPS,
        ChildKind::Ingredient => PRUNE_INGREDIENTS,
    };

    let result = query(sql)
        .bind(scope.recipe_id.as_str())
        .bind(scope.tenant_id.as_str())
        .bind(i64::from(threshold))
        .execute(executor)
        .await
        .map_err(|e| query_error(&format!("prune {kind} rows"), e))?;

    Ok(result.rows_affected())
}
