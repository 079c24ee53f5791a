//! Tracing setup with a log level that can be changed while running.

use std::sync::OnceLock;

use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

use crate::config::LoggingConfig;

type FilterHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

static FILTER_HANDLE: OnceLock<FilterHandle> = OnceLock::new();

/// Installs the global subscriber.
///
/// `RUST_LOG` wins over the configured level when set and valid. Calling
/// this more than once keeps the first subscriber.
pub fn init_tracing(config: &LoggingConfig) {
    init_tracing_with_level(&config.level);
}

pub fn init_tracing_with_level(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| parse_level(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let (filter_layer, handle) = reload::Layer::new(filter);
    if FILTER_HANDLE.set(handle).is_err() {
        return;
    }

    let _ = tracing_subscriber::registry()
        .with(filter_layer)
        .with(fmt::layer().with_target(true))
        .try_init();
}

/// Parses a filter directive such as `info` or `recipebox_service=debug,warn`.
pub fn parse_level(level: &str) -> Result<EnvFilter, String> {
    EnvFilter::try_new(level).map_err(|e| format!("invalid log level '{level}': {e}"))
}

/// Swaps the active filter. A no-op before [`init_tracing`] ran.
pub fn apply_logging_level(level: &str) -> Result<(), String> {
    let filter = parse_level(level)?;
    let Some(handle) = FILTER_HANDLE.get() else {
        return Ok(());
    };
    handle
        .modify(|current| *current = filter)
        .map_err(|e| format!("failed to reload log filter: {e}"))?;
    tracing::info!(level, "Logging level updated");
    Ok(())
}
