use anyhow::Context;
use recipebox_service::config::loader;
use recipebox_service::{create_store, observability};

/// Loads configuration, initializes logging and connects the configured
/// store, running migrations when enabled.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config_path = std::env::args().nth(1);
    let config =
        loader::load_config(config_path.as_deref()).context("failed to load configuration")?;

    observability::init_tracing(&config.logging);
    tracing::info!(backend = ?config.storage.backend, "Starting recipebox");

    let store = create_store(&config.storage)
        .await
        .context("failed to initialize aggregate store")?;

    tracing::info!(backend = store.backend_name(), "Store initialized");
    Ok(())
}
