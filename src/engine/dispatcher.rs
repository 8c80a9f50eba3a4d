// * Mining Pool
// * Runs independent per-game / per-player mining tasks with a fixed number in flight.
// * One task failing never cancels another; every task reports its own Result.

use futures::stream::{self, StreamExt};
use std::future::Future;
use std::time::Instant;
use tracing::{info, warn};

use crate::config::MinerConfig;

// * Outcome counts of one pool run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PoolReport {
    pub succeeded: usize,
    pub failed: usize,
}

// * MiningPool bounds the number of concurrently running tasks
#[derive(Debug, Clone)]
pub struct MiningPool {
    workers: usize,
}

impl MiningPool {
    pub fn new(workers: usize) -> Self {
        Self {
            workers: workers.max(1),
        }
    }

    pub fn from_config(config: &MinerConfig) -> Self {
        Self::new(config.worker_count)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    // * Runs every task, at most `workers` at a time.
    // * Results come back in task order regardless of completion order,
    // * alongside the success/failure counts.
    pub async fn run<F, T, E>(&self, tasks: Vec<F>) -> (Vec<Result<T, E>>, PoolReport)
    where
        F: Future<Output = Result<T, E>>,
        E: std::fmt::Display,
    {
        let started = Instant::now();
        let total = tasks.len();

        let mut indexed: Vec<(usize, Result<T, E>)> = stream::iter(
            tasks
                .into_iter()
                .enumerate()
                .map(|(index, task)| async move { (index, task.await) }),
        )
        .buffer_unordered(self.workers)
        .collect()
        .await;

        indexed.sort_by_key(|(index, _)| *index);

        let mut report = PoolReport::default();
        for (index, result) in &indexed {
            match result {
                Ok(_) => report.succeeded += 1,
                Err(e) => {
                    report.failed += 1;
                    warn!(task = index, error = %e, "Mining task failed");
                }
            }
        }

        info!(
            total = total,
            succeeded = report.succeeded,
            failed = report.failed,
            workers = self.workers,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Mining pool finished"
        );

        let results: Vec<Result<T, E>> = indexed.into_iter().map(|(_, result)| result).collect();
        (results, report)
    }
}

impl Default for MiningPool {
    fn default() -> Self {
        Self::from_config(&MinerConfig::default())
    }
}
