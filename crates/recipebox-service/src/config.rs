//! Application configuration.
//!
//! Values come from an optional TOML file overlaid with `RECIPEBOX__`
//! environment variables, e.g. `RECIPEBOX__STORAGE__BACKEND=postgres` or
//! `RECIPEBOX__STORAGE__POSTGRES__POOL_SIZE=4`.

use recipebox_db_postgres::PostgresConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::observability;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("config build error: {0}")]
    Build(#[source] ::config::ConfigError),

    #[error("config deserialize error: {0}")]
    Deserialize(#[source] ::config::ConfigError),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        observability::parse_level(&self.logging.level).map_err(ConfigError::Invalid)?;

        if self.storage.backend == StorageBackend::Postgres {
            let pg = &self.storage.postgres;
            if pg.url.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "storage.postgres.url must be set for the postgres backend".into(),
                ));
            }
            if pg.pool_size == 0 {
                return Err(ConfigError::Invalid(
                    "storage.postgres.pool_size must be > 0".into(),
                ));
            }
            if let Some(min) = pg.min_connections
                && min > pg.pool_size
            {
                return Err(ConfigError::Invalid(format!(
                    "storage.postgres.min_connections ({min}) exceeds pool_size ({})",
                    pg.pool_size
                )));
            }
        }
        Ok(())
    }
}

/// Which aggregate store implementation to build.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    #[default]
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageSettings {
    #[serde(default)]
    pub backend: StorageBackend,
    /// Only read when `backend = "postgres"`.
    #[serde(default)]
    pub postgres: PostgresConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}
fn default_log_level() -> String {
    "info".into()
}
impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

pub mod loader {
    use super::{AppConfig, ConfigError};
    use ::config::{Config, Environment, File, Map};
    use std::path::PathBuf;

    pub const DEFAULT_CONFIG_FILE: &str = "recipebox.toml";
    pub const ENV_PREFIX: &str = "RECIPEBOX";

    pub fn load_config(path: Option<&str>) -> Result<AppConfig, ConfigError> {
        load_config_with_env(path, None)
    }

    /// Like [`load_config`], but reads overrides from `env` instead of the
    /// process environment when given.
    pub fn load_config_with_env(
        path: Option<&str>,
        env: Option<Map<String, String>>,
    ) -> Result<AppConfig, ConfigError> {
        let mut builder = Config::builder();
        let pathbuf = PathBuf::from(path.unwrap_or(DEFAULT_CONFIG_FILE));
        if pathbuf.exists() {
            builder = builder.add_source(File::from(pathbuf));
        }
        // Environment variable overrides, e.g., RECIPEBOX__LOGGING__LEVEL=debug
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .separator("__")
                .source(env),
        );
        let cfg = builder.build().map_err(ConfigError::Build)?;
        let merged: AppConfig = cfg.try_deserialize().map_err(ConfigError::Deserialize)?;
        merged.validate()?;
        Ok(merged)
    }
}
