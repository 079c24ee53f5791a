//! Stored representation of one recipe aggregate and the writes applied to it.

use std::collections::BTreeMap;
use std::collections::HashMap;
use std::collections::hash_map::Entry;

use recipebox_core::{Ingredient, Recipe, RecipeDetails, RecipeId, Step, Tag, TenantId};
use recipebox_storage::{ChildFields, ChildKind, RecipeScope, StorageError};

/// A recipe with its children keyed by index.
///
/// Keying children by index makes "one row per position" structural: an
/// upsert at an occupied index replaces the row, it cannot add a second one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecipeRecord {
    pub(crate) owner_id: TenantId,
    pub(crate) title: Option<String>,
    pub(crate) source: Option<String>,
    pub(crate) tags: Vec<Tag>,
    pub(crate) steps: BTreeMap<u32, String>,
    pub(crate) ingredients: BTreeMap<u32, IngredientRow>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct IngredientRow {
    pub(crate) amount: String,
    pub(crate) item: String,
}

impl RecipeRecord {
    pub(crate) fn empty(owner_id: TenantId) -> Self {
        Self {
            owner_id,
            title: None,
            source: None,
            tags: Vec::new(),
            steps: BTreeMap::new(),
            ingredients: BTreeMap::new(),
        }
    }

    /// Materializes the aggregate; BTreeMap iteration yields ascending indices.
    pub(crate) fn to_recipe(&self, id: &RecipeId) -> Recipe {
        Recipe {
            id: id.clone(),
            owner_id: self.owner_id.clone(),
            title: self.title.clone(),
            source: self.source.clone(),
            tags: self.tags.clone(),
            steps: self
                .steps
                .iter()
                .map(|(index, text)| Step {
                    recipe_id: id.clone(),
                    index: *index,
                    text: text.clone(),
                })
                .collect(),
            ingredients: self
                .ingredients
                .iter()
                .map(|(index, row)| Ingredient {
                    recipe_id: id.clone(),
                    index: *index,
                    amount: row.amount.clone(),
                    item: row.item.clone(),
                })
                .collect(),
        }
    }

    /// Applies one write, returning the number of rows it affected.
    fn apply(&mut self, op: &WriteOp) -> u64 {
        match op {
            WriteOp::Details { details, .. } => {
                self.title = Some(details.title.clone());
                self.source = Some(details.source.clone());
                1
            }
            WriteOp::Upsert { index, fields, .. } => {
                match fields {
                    ChildFields::Step { text } => {
                        self.steps.insert(*index, text.clone());
                    }
                    ChildFields::Ingredient { amount, item } => {
                        self.ingredients.insert(
                            *index,
                            IngredientRow {
                                amount: amount.clone(),
                                item: item.clone(),
                            },
                        );
                    }
                }
                1
            }
            WriteOp::Prune {
                kind, threshold, ..
            } => match kind {
                ChildKind::Step => self.steps.split_off(threshold).len() as u64,
                ChildKind::Ingredient => self.ingredients.split_off(threshold).len() as u64,
            },
        }
    }
}

/// A single aggregate write, recorded so transactions can replay it on commit.
#[derive(Debug, Clone)]
pub(crate) enum WriteOp {
    Details {
        scope: RecipeScope,
        details: RecipeDetails,
    },
    Upsert {
        scope: RecipeScope,
        index: u32,
        fields: ChildFields,
    },
    Prune {
        scope: RecipeScope,
        kind: ChildKind,
        threshold: u32,
    },
}

impl WriteOp {
    fn scope(&self) -> &RecipeScope {
        match self {
            Self::Details { scope, .. } | Self::Upsert { scope, .. } | Self::Prune { scope, .. } => {
                scope
            }
        }
    }
}

/// Applies `op` to the working set, loading the target record with `load` on
/// first touch.
///
/// A scope that matches no owned recipe is a no-op for prunes and a
/// `NotFound` for every other write.
pub(crate) fn apply_op(
    working: &mut HashMap<RecipeId, RecipeRecord>,
    load: impl FnOnce(&RecipeId) -> Option<RecipeRecord>,
    op: &WriteOp,
) -> Result<u64, StorageError> {
    let scope = op.scope();
    let miss = || match op {
        WriteOp::Prune { .. } => Ok(0),
        _ => Err(StorageError::recipe_not_found(scope.recipe_id.as_str())),
    };

    let record = match working.entry(scope.recipe_id.clone()) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => match load(&scope.recipe_id) {
            Some(record) => entry.insert(record),
            None => return miss(),
        },
    };

    if record.owner_id != scope.tenant_id {
        return miss();
    }

    Ok(record.apply(op))
}
