//! Concurrent bulk-load pipeline.
//!
//! This module ingests line-delimited JSON datasets (catalog items and user
//! reviews) into the store's denormalized tables.
//!
//! # Architecture Overview
//!
//! - **`dispatcher`**: Streams a source file line by line, converts each
//!   line into one or more insert units (a review fans out to two tables),
//!   and blocks on the completion barrier before returning a summary.
//!
//! - **`worker`**: Fixed-size pool of executors over a bounded channel.
//!   Submission blocks when the queue is full, so the source self-limits
//!   against the store instead of buffering unbounded pending work.
//!
//! - **`task`**: One insert unit: parse, map, upsert, classify the outcome.
//!   Failures are isolated per unit; one bad record never halts the batch.
//!
//! - **`schema`**: The write targets, each owning its table, upsert SQL, and
//!   bind mapping.
//!
//! - **`mapper`**: Pure field mapping with placeholder defaults, so no
//!   missing field ever reaches the store as a null key.
//!
//! - **`progress`**: Per-table atomic write counters and per-unit outcome
//!   totals, instantiated per caller rather than process-global.
//!
//! # Data Flow
//!
//! file lines → dispatcher → worker pool → insert units (map + upsert) →
//! progress counters. Control returns to the caller only after every
//! submitted unit has completed, successfully or not.
//!
//! # Guarantees (and non-guarantees)
//!
//! Writes are idempotent per primary key (last write wins). There is no
//! ordering between units: the two rows of one review commit in either
//! order, and a failure between them leaves the tables mutually
//! inconsistent for that review. No retries, no cancellation, no timeouts;
//! a hung store call holds its worker and the barrier waits for it.

pub mod dispatcher;
pub mod mapper;
pub mod progress;
pub mod schema;
pub mod task;
pub mod worker;

pub use dispatcher::LoadDispatcher;
pub use progress::{LoadSummary, ProgressCounters, ProgressSnapshot, UnitOutcome};
pub use schema::TargetSchema;

use std::env;
use std::time::Duration;

fn env_usize(key: &str, default: usize) -> usize {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<usize>().ok())
        .unwrap_or(default)
}

fn env_duration_millis(key: &str, default_millis: u64) -> Duration {
    env::var(key)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or_else(|| Duration::from_millis(default_millis))
}

/// Tuning knobs for a load run.
///
/// Items and reviews get separate worker counts so their concurrency can be
/// tuned independently; the throttle caps the per-worker write rate on top
/// of that.
#[derive(Debug, Clone)]
pub struct LoadConfig {
    pub item_workers: usize,
    pub review_workers: usize,
    pub queue_depth: usize,
    pub throttle: Duration,
}

impl LoadConfig {
    pub fn from_env() -> Self {
        Self {
            item_workers: env_usize("ITEM_LOAD_WORKERS", 250),
            review_workers: env_usize("REVIEW_LOAD_WORKERS", 200),
            queue_depth: env_usize("LOAD_QUEUE_DEPTH", 1024),
            throttle: env_duration_millis("LOAD_THROTTLE_MS", 10),
        }
    }
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            item_workers: 250,
            review_workers: 200,
            queue_depth: 1024,
            throttle: Duration::from_millis(10),
        }
    }
}
