//! Schema management for the store.
//!
//! The three tables (items plus the two denormalized review tables) are
//! created through SQLx migrations so the schema is versioned and the check
//! is idempotent at startup.

use sqlx::{PgPool, migrate::Migrator};

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Apply any pending migrations.
///
/// Idempotent: already-applied migrations are skipped, and checksum drift
/// aborts before anything is written.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("checking store schema");

    MIGRATOR.run(pool).await?;

    log::info!("store schema up to date");
    Ok(())
}
