//! The insert unit: one write for one (raw line, target schema) pair.

use crate::ingest::progress::{ProgressCounters, UnitOutcome};
use crate::ingest::schema::{MappedRow, TargetSchema};
use serde_json::Value;
use sqlx::PgPool;
use std::time::Duration;

/// Log a progress line every Nth successful write per table.
pub const PROGRESS_LOG_INTERVAL: u64 = 50_000;

/// Longest slice of a raw line reproduced in malformed-record diagnostics.
const LINE_PREVIEW_CHARS: usize = 160;

/// One unit of work: parse a raw line, map it, execute exactly one upsert,
/// and classify what happened. Failures stay inside the unit; sibling units
/// are never affected.
#[derive(Debug)]
pub struct InsertTask {
    pub line: String,
    pub schema: TargetSchema,
}

impl InsertTask {
    pub fn new(line: String, schema: TargetSchema) -> Self {
        Self { line, schema }
    }

    /// Run the unit to completion. Always sleeps `throttle` after the
    /// attempt, success or failure, so the instantaneous write rate stays
    /// capped regardless of how many workers the pool runs.
    pub async fn run(
        self,
        pool: &PgPool,
        progress: &ProgressCounters,
        throttle: Duration,
    ) -> UnitOutcome {
        let outcome = self.attempt(pool, progress).await;

        if !throttle.is_zero() {
            tokio::time::sleep(throttle).await;
        }

        outcome
    }

    async fn attempt(&self, pool: &PgPool, progress: &ProgressCounters) -> UnitOutcome {
        let record: Value = match serde_json::from_str(&self.line) {
            Ok(record) => record,
            Err(e) => {
                log::warn!(
                    "{}: skipping malformed record: {} (line: {})",
                    self.schema.table(),
                    e,
                    line_preview(&self.line)
                );
                return UnitOutcome::ParseError;
            }
        };

        match execute(pool, self.schema, self.schema.map(&record)).await {
            Ok(()) => {
                let total = progress.record_write(self.schema);
                if total % PROGRESS_LOG_INTERVAL == 0 {
                    log::info!("{}: {} rows written", self.schema.table(), total);
                }
                UnitOutcome::Written
            }
            Err(e) => {
                log::warn!("{}: write failed: {}", self.schema.table(), e);
                UnitOutcome::StoreError
            }
        }
    }
}

/// Bind the mapped values to the schema's prepared upsert and execute it.
async fn execute(pool: &PgPool, schema: TargetSchema, row: MappedRow) -> Result<(), sqlx::Error> {
    match row {
        MappedRow::Item(item) => {
            sqlx::query(schema.insert_sql())
                .bind(item.asin)
                .bind(item.title)
                .bind(item.image_url)
                .bind(item.categories)
                .bind(item.description)
                .execute(pool)
                .await?;
        }
        MappedRow::Review(review) => {
            sqlx::query(schema.insert_sql())
                .bind(review.reviewer_id)
                .bind(review.time)
                .bind(review.asin)
                .bind(review.reviewer_name)
                .bind(review.rating)
                .bind(review.summary)
                .bind(review.review_text)
                .execute(pool)
                .await?;
        }
    }

    Ok(())
}

fn line_preview(line: &str) -> String {
    if line.chars().count() <= LINE_PREVIEW_CHARS {
        line.to_string()
    } else {
        let head: String = line.chars().take(LINE_PREVIEW_CHARS).collect();
        format!("{head}...")
    }
}
