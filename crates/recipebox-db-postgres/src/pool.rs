//! Connection pool construction.

use sqlx_core::pool::PoolOptions;
use sqlx_postgres::{PgPool, Postgres};
use tracing::{debug, info, instrument};

use crate::config::PostgresConfig;
use crate::error::{PostgresError, Result};

/// Opens a pool sized and timed according to `config`.
///
/// # Errors
///
/// `PostgresError::Config` for a zero pool size, `Connection` if the first
/// connection cannot be established.
#[instrument(skip(config), fields(url = %config.masked_url()))]
pub async fn create_pool(config: &PostgresConfig) -> Result<PgPool> {
    if config.pool_size == 0 {
        return Err(PostgresError::config("pool_size must be > 0"));
    }

    let min_connections = config.effective_min_connections();
    info!(
        pool_size = config.pool_size,
        min_connections,
        connect_timeout_ms = config.connect_timeout_ms,
        "Opening PostgreSQL pool"
    );

    let pool = PoolOptions::<Postgres>::new()
        .max_connections(config.pool_size)
        .min_connections(min_connections)
        .acquire_timeout(config.connect_timeout())
        .idle_timeout(config.idle_timeout())
        .max_lifetime(config.max_lifetime())
        .test_before_acquire(false)
        .connect(&config.url)
        .await?;

    debug!(size = pool.size(), "PostgreSQL pool ready");
    Ok(pool)
}
