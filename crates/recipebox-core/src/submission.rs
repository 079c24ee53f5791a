//! Typed edit submissions, as produced by the form decoder, and their
//! validation.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One submitted step. `index` is whatever the client echoed back; only the
/// position within the submitted list is used when persisting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepInput {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl StepInput {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            index: None,
        }
    }
}

/// One submitted ingredient; see [`StepInput`] for the meaning of `index`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IngredientInput {
    pub amount: String,
    pub item: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<u32>,
}

impl IngredientInput {
    pub fn new(amount: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            amount: amount.into(),
            item: item.into(),
            index: None,
        }
    }
}

/// Decoded edit submission.
///
/// `title` and `source` are `None` when the field was missing from the
/// submission. Missing lists decode as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeUpdate {
    pub title: Option<String>,
    pub source: Option<String>,
    #[serde(default)]
    pub steps: Vec<StepInput>,
    #[serde(default)]
    pub ingredients: Vec<IngredientInput>,
}

/// Scalar fields of a recipe written alongside its child collections.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeDetails {
    pub title: String,
    pub source: String,
}

/// A submission that passed validation and may be persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedUpdate {
    pub details: RecipeDetails,
    pub steps: Vec<StepInput>,
    pub ingredients: Vec<IngredientInput>,
}

impl RecipeUpdate {
    /// Checks required fields, collecting one message per offending field.
    pub fn validate(self) -> Result<ValidatedUpdate, ValidationErrors> {
        let mut errors = ValidationErrors::new();

        let title = match self.title {
            Some(title) if !title.is_empty() => Some(title),
            _ => {
                errors.insert("title", "Title is required");
                None
            }
        };

        if self.source.is_none() {
            errors.insert("source", "Invalid source type");
        }

        match (title, self.source) {
            (Some(title), Some(source)) if errors.is_empty() => Ok(ValidatedUpdate {
                details: RecipeDetails { title, source },
                steps: self.steps,
                ingredients: self.ingredients,
            }),
            _ => Err(errors),
        }
    }
}

/// Field name to message, in the order the problems were found.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationErrors(IndexMap<String, String>);

impl ValidationErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.insert(field.into(), message.into());
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (field, message) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{field}: {message}")?;
            first = false;
        }
        Ok(())
    }
}
