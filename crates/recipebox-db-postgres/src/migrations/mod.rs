//! Schema migrations, compiled into the binary.
//!
//! Applied versions are recorded in `_sqlx_migrations`, so [`run`] on an
//! up-to-date database does nothing. New migrations go into `migrations/`
//! and get a line in [`EMBEDDED`], in version order.

use std::borrow::Cow;

use sqlx_core::migrate::{Migration, MigrationType, Migrator};
use sqlx_postgres::PgPool;
use tracing::{info, instrument};

use crate::error::Result;

/// `(version, description, sql)`
const EMBEDDED: &[(i64, &str, &str)] = &[(
    20250301000001,
    "recipe_aggregate",
    include_str!("../../migrations/20250301000001_recipe_aggregate.sql"),
)];

fn migrator() -> Migrator {
    let migrations = EMBEDDED
        .iter()
        .map(|&(version, description, sql)| Migration {
            version,
            description: Cow::Borrowed(description),
            migration_type: MigrationType::Simple,
            sql: Cow::Borrowed(sql),
            // Checksums are not tracked for embedded migrations
            checksum: Cow::Borrowed(&[]),
            no_tx: false,
        })
        .collect();

    Migrator {
        migrations: Cow::Owned(migrations),
        ignore_missing: false,
        locking: true,
        no_tx: false,
    }
}

/// Brings the schema up to date.
#[instrument(skip(pool))]
pub async fn run(pool: &PgPool) -> Result<()> {
    let migrator = migrator();
    info!(available = migrator.migrations.len(), "Applying schema migrations");
    migrator.run(pool).await?;
    info!("Schema is up to date");
    Ok(())
}
