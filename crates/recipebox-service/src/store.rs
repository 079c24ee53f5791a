//! Builds the configured aggregate store.

use recipebox_storage::{DynStore, StorageError};
use tracing::info;

use crate::config::{StorageBackend, StorageSettings};

/// Creates the store selected by `settings.backend`.
///
/// # Errors
///
/// For the postgres backend, fails when the pool cannot connect or a
/// migration fails.
pub async fn create_store(settings: &StorageSettings) -> Result<DynStore, StorageError> {
    let store: DynStore = match settings.backend {
        StorageBackend::Memory => recipebox_db_memory::create_store(),
        StorageBackend::Postgres => {
            recipebox_db_postgres::create_storage(settings.postgres.clone()).await?
        }
    };

    info!(
        backend = store.backend_name(),
        transactions = store.supports_transactions(),
        "Aggregate store ready"
    );
    Ok(store)
}
