//! Fixed-size worker pool over a bounded submission channel.

use crate::error::StoreError;
use crate::ingest::progress::{OutcomeCounters, ProgressCounters};
use crate::ingest::task::InsertTask;
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;

/// A bounded set of concurrent executors for insert units.
///
/// One pool is spawned per load call, so items and reviews can run with
/// independently tuned worker counts. Submission blocks once `queue_depth`
/// units are pending, which keeps a fast source from enqueueing unbounded
/// work ahead of the store. There is no cancellation: a submitted unit
/// always runs to completion or isolated failure.
pub struct WorkerPool {
    tx: mpsc::Sender<InsertTask>,
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Start `workers` executors draining a channel of depth `queue_depth`.
    ///
    /// Workers share the store pool handle without locking; counter updates
    /// are the only shared mutable state and they are atomic.
    pub fn spawn(
        pool: PgPool,
        workers: usize,
        queue_depth: usize,
        throttle: Duration,
        progress: Arc<ProgressCounters>,
        outcomes: Arc<OutcomeCounters>,
    ) -> Self {
        let (tx, rx) = mpsc::channel::<InsertTask>(queue_depth.max(1));
        let rx = Arc::new(Mutex::new(rx));

        let mut handles = Vec::with_capacity(workers);
        for _ in 0..workers.max(1) {
            let rx = Arc::clone(&rx);
            let pool = pool.clone();
            let progress = Arc::clone(&progress);
            let outcomes = Arc::clone(&outcomes);

            handles.push(tokio::spawn(async move {
                loop {
                    // Hold the receiver lock only while dequeueing, never
                    // across the write itself.
                    let task = { rx.lock().await.recv().await };
                    let Some(task) = task else { break };

                    let outcome = task.run(&pool, &progress, throttle).await;
                    outcomes.record(outcome);
                }
            }));
        }

        Self { tx, handles }
    }

    /// Enqueue one unit, waiting for queue space when the pool is behind.
    pub async fn submit(&self, task: InsertTask) -> Result<(), StoreError> {
        self.tx
            .send(task)
            .await
            .map_err(|_| StoreError::WorkersStopped)
    }

    /// Completion barrier: stop accepting submissions and wait for every
    /// previously submitted unit to finish. The wait is unbounded, since
    /// total work size is unknown in advance and must all be drained.
    pub async fn join(self) {
        drop(self.tx);

        for handle in self.handles {
            if let Err(e) = handle.await {
                log::error!("ingest worker panicked: {}", e);
            }
        }
    }
}
