//! Error type surfaced by the recipe workflow.

use recipebox_core::{RecipeId, ValidationErrors};
use recipebox_storage::StorageError;
use thiserror::Error;

/// Failure of a workflow operation, mapped onto an HTTP-like status.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No tenant could be resolved from the request.
    #[error("Authentication required")]
    Unauthenticated,

    /// The recipe does not exist or belongs to another tenant.
    #[error("Recipe not found: {recipe_id}")]
    NotFound { recipe_id: String },

    /// The submission was rejected before any write.
    #[error("Validation failed: {0}")]
    Validation(ValidationErrors),

    /// The store failed; details are logged, not returned to the caller.
    #[error("Store failure: {message}")]
    StoreFailure { message: String },
}

impl ServiceError {
    pub fn not_found(recipe_id: &RecipeId) -> Self {
        Self::NotFound {
            recipe_id: recipe_id.to_string(),
        }
    }

    pub fn store_failure(message: impl Into<String>) -> Self {
        Self::StoreFailure {
            message: message.into(),
        }
    }

    /// Status code a transport layer should answer with.
    pub fn status_code(&self) -> u16 {
        match self {
            Self::Unauthenticated => 401,
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::StoreFailure { .. } => 500,
        }
    }

    /// Message safe to show the caller. Store failures stay opaque.
    pub fn public_message(&self) -> String {
        match self {
            Self::StoreFailure { .. } => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<StorageError> for ServiceError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::NotFound { id, .. } => Self::NotFound { recipe_id: id },
            other => {
                tracing::error!(category = %other.category(), error = %other, "Store operation failed");
                Self::store_failure(other.to_string())
            }
        }
    }
}

impl From<ValidationErrors> for ServiceError {
    fn from(errors: ValidationErrors) -> Self {
        Self::Validation(errors)
    }
}
