use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the store session, migrations, and load setup.
///
/// Per-record problems during a load never appear here; they are absorbed at
/// the insert-unit boundary and reported through `LoadSummary` counts.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to open source file {path}: {source}")]
    Source {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("ingest workers stopped accepting work")]
    WorkersStopped,

    #[error("DATABASE_URL not set")]
    MissingDatabaseUrl,
}
