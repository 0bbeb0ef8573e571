//! Load metrics: per-table progress counters and per-unit outcome totals.
//!
//! Both recorders are plain atomic counters behind an `Arc`, created per
//! load (or shared across loads by the caller) and passed explicitly into
//! the dispatcher and its insert units. Nothing here is process-global, so
//! tests can assert on isolated instances.

use crate::ingest::schema::TargetSchema;
use std::sync::atomic::{AtomicU64, Ordering};

/// Result of one insert unit. Exactly one of these is recorded per
/// submitted unit, whatever happened to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitOutcome {
    /// The row reached the store and the matching progress counter moved.
    Written,
    /// The raw line was not valid JSON; nothing was written.
    ParseError,
    /// The store rejected the write; nothing was retried or rolled back.
    StoreError,
}

/// Per-table monotonically increasing write counters.
///
/// Incremented once per successful write with relaxed ordering; lost updates
/// are not possible, lost *reads* (a snapshot racing a writer) are fine for
/// the coarse visibility these provide.
#[derive(Debug, Default)]
pub struct ProgressCounters {
    items: AtomicU64,
    user_reviews: AtomicU64,
    item_reviews: AtomicU64,
}

impl ProgressCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one successful write and return the new per-table total.
    pub fn record_write(&self, schema: TargetSchema) -> u64 {
        self.counter(schema).fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Current total for one table.
    pub fn count(&self, schema: TargetSchema) -> u64 {
        self.counter(schema).load(Ordering::Relaxed)
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            items: self.items.load(Ordering::Relaxed),
            user_reviews: self.user_reviews.load(Ordering::Relaxed),
            item_reviews: self.item_reviews.load(Ordering::Relaxed),
        }
    }

    fn counter(&self, schema: TargetSchema) -> &AtomicU64 {
        match schema {
            TargetSchema::Item => &self.items,
            TargetSchema::UserReview => &self.user_reviews,
            TargetSchema::ItemReview => &self.item_reviews,
        }
    }
}

/// Plain-integer view of the progress counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub items: u64,
    pub user_reviews: u64,
    pub item_reviews: u64,
}

/// Outcome totals for one load, filled in by workers as units finish.
#[derive(Debug, Default)]
pub struct OutcomeCounters {
    written: AtomicU64,
    parse_errors: AtomicU64,
    store_errors: AtomicU64,
}

impl OutcomeCounters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, outcome: UnitOutcome) {
        let counter = match outcome {
            UnitOutcome::Written => &self.written,
            UnitOutcome::ParseError => &self.parse_errors,
            UnitOutcome::StoreError => &self.store_errors,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Fold the totals into a summary once the completion barrier has been
    /// satisfied and no more units can report.
    pub fn summarize(&self, submitted: u64) -> LoadSummary {
        LoadSummary {
            submitted,
            written: self.written.load(Ordering::Relaxed),
            parse_errors: self.parse_errors.load(Ordering::Relaxed),
            store_errors: self.store_errors.load(Ordering::Relaxed),
        }
    }
}

/// What happened to a load, unit by unit. `submitted` counts insert units,
/// not source lines; a review line submits two units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadSummary {
    pub submitted: u64,
    pub written: u64,
    pub parse_errors: u64,
    pub store_errors: u64,
}
