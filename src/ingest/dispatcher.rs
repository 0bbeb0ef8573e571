//! Converts a line-delimited source into insert units and drains them.

use crate::error::StoreError;
use crate::ingest::LoadConfig;
use crate::ingest::progress::{LoadSummary, OutcomeCounters, ProgressCounters};
use crate::ingest::schema::TargetSchema;
use crate::ingest::task::InsertTask;
use crate::ingest::worker::WorkerPool;
use sqlx::PgPool;
use std::path::Path;
use std::sync::Arc;
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Reads a record source lazily, fans each line out into one or more insert
/// units, and blocks on the pool's completion barrier before returning.
///
/// Per-record failures never reach the caller; they are absorbed inside the
/// units and surface only as `LoadSummary` counts and log lines. The only
/// errors a load itself returns are an unopenable source and a stopped
/// worker pool.
pub struct LoadDispatcher {
    pool: PgPool,
    config: LoadConfig,
    progress: Arc<ProgressCounters>,
}

impl LoadDispatcher {
    pub fn new(pool: PgPool, config: LoadConfig, progress: Arc<ProgressCounters>) -> Self {
        Self {
            pool,
            config,
            progress,
        }
    }

    /// Load a catalog items file: one insert unit per line.
    pub async fn load_items(&self, path: &Path) -> Result<LoadSummary, StoreError> {
        log::info!("loading items from {}", path.display());

        let summary = self
            .load(path, &[TargetSchema::Item], self.config.item_workers)
            .await?;

        log::info!(
            "finished loading items: {} written, {} parse errors, {} store errors",
            summary.written,
            summary.parse_errors,
            summary.store_errors
        );
        Ok(summary)
    }

    /// Load a reviews file: two insert units per line, one per review table.
    ///
    /// The pair races independently; there is no transactional link between
    /// the two writes, and either, both, or neither may succeed.
    pub async fn load_reviews(&self, path: &Path) -> Result<LoadSummary, StoreError> {
        log::info!("loading reviews from {}", path.display());

        let summary = self
            .load(
                path,
                &[TargetSchema::UserReview, TargetSchema::ItemReview],
                self.config.review_workers,
            )
            .await?;

        log::info!(
            "finished loading reviews: {} written, {} parse errors, {} store errors",
            summary.written,
            summary.parse_errors,
            summary.store_errors
        );
        Ok(summary)
    }

    async fn load(
        &self,
        path: &Path,
        schemas: &[TargetSchema],
        workers: usize,
    ) -> Result<LoadSummary, StoreError> {
        let file = File::open(path).await.map_err(|source| StoreError::Source {
            path: path.to_path_buf(),
            source,
        })?;

        let outcomes = Arc::new(OutcomeCounters::new());
        let pool = WorkerPool::spawn(
            self.pool.clone(),
            workers,
            self.config.queue_depth,
            self.config.throttle,
            Arc::clone(&self.progress),
            Arc::clone(&outcomes),
        );

        let mut lines = BufReader::new(file).lines();
        let mut submitted: u64 = 0;

        while let Some(line) = lines
            .next_line()
            .await
            .map_err(|source| StoreError::Source {
                path: path.to_path_buf(),
                source,
            })?
        {
            for &schema in schemas {
                // Blocks when the queue is full; the source never runs
                // unboundedly ahead of the workers.
                pool.submit(InsertTask::new(line.clone(), schema)).await?;
                submitted += 1;
            }
        }

        // Barrier: no further submissions, wait for every unit to finish.
        pool.join().await;

        Ok(outcomes.summarize(submitted))
    }
}
