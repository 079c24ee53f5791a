//! Errors raised by the PostgreSQL backend and their mapping onto
//! [`StorageError`].

use recipebox_storage::StorageError;
use sqlx_core::error::Error as SqlxError;
use sqlx_core::migrate::MigrateError;

/// SQLSTATE codes that point at bad input rather than a broken database.
const FOREIGN_KEY_VIOLATION: &str = "23503";
const CHECK_VIOLATION: &str = "23514";
const NUMERIC_OUT_OF_RANGE: &str = "22003";

/// Failures while setting the backend up.
#[derive(Debug, thiserror::Error)]
pub enum PostgresError {
    #[error("Database connection error: {0}")]
    Connection(#[from] SqlxError),

    #[error("Migration error: {0}")]
    Migration(#[from] MigrateError),

    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl PostgresError {
    #[must_use]
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<PostgresError> for StorageError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::Connection(e) => StorageError::connection_error(e.to_string()),
            other => StorageError::internal(other.to_string()),
        }
    }
}

/// SQLSTATE of a database error, if `err` carries one.
fn sqlstate(err: &SqlxError) -> Option<String> {
    match err {
        SqlxError::Database(db_err) => db_err.code().map(|code| code.into_owned()),
        _ => None,
    }
}

/// Maps a failed statement to a storage error.
///
/// Pool and transport failures become `ConnectionError`, constraint
/// violations become `InvalidRecord`, anything else is `Internal`.
pub(crate) fn query_error(operation: &str, err: SqlxError) -> StorageError {
    if matches!(
        err,
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_) | SqlxError::Tls(_)
    ) {
        return StorageError::connection_error(format!("{operation}: {err}"));
    }

    match sqlstate(&err).as_deref() {
        Some(FOREIGN_KEY_VIOLATION | CHECK_VIOLATION | NUMERIC_OUT_OF_RANGE) => {
            StorageError::invalid_record(format!("{operation}: {err}"))
        }
        _ => StorageError::internal(format!("Failed to {operation}: {err}")),
    }
}

pub type Result<T> = std::result::Result<T, PostgresError>;
