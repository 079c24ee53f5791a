//! Failures reported by aggregate store backends.

use std::fmt;

/// A failed store operation.
///
/// `NotFound` is also what a tenant sees for a recipe owned by someone
/// else; backends never distinguish the two.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("Record not found: {entity}/{id}")]
    NotFound { entity: String, id: String },

    /// Data that cannot be written or read back, such as an out-of-range
    /// child index or a malformed stored id.
    #[error("Invalid record: {message}")]
    InvalidRecord { message: String },

    /// Begin, commit or rollback failed.
    #[error("Transaction error: {message}")]
    TransactionError { message: String },

    /// The backend could not be reached.
    #[error("Connection error: {message}")]
    ConnectionError { message: String },

    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl StorageError {
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    #[must_use]
    pub fn recipe_not_found(id: impl Into<String>) -> Self {
        Self::not_found("Recipe", id)
    }

    #[must_use]
    pub fn invalid_record(message: impl Into<String>) -> Self {
        Self::InvalidRecord {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn transaction_error(message: impl Into<String>) -> Self {
        Self::TransactionError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Coarse classification used as a structured log field.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidRecord { .. } => ErrorCategory::Validation,
            Self::TransactionError { .. } => ErrorCategory::Transaction,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

impl From<recipebox_core::IdError> for StorageError {
    fn from(err: recipebox_core::IdError) -> Self {
        Self::invalid_record(format!("Stored identifier is invalid: {err}"))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Transaction,
    Infrastructure,
    Internal,
}

impl ErrorCategory {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::Validation => "validation",
            Self::Transaction => "transaction",
            Self::Infrastructure => "infrastructure",
            Self::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
