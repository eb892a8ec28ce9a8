//! Fixed-interval worker loop.
//!
//! Each worker runs on its own tokio task. A failed tick is logged and the
//! loop waits for the next one.
//!
//! ## Graceful Shutdown
//!
//! The loop listens on a watch channel and returns once it reads `true`. A
//! tick already in progress is allowed to finish.

use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

use crate::domain::foundation::DomainError;

/// One reconciliation job.
#[async_trait]
pub trait PeriodicWorker: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &'static str;

    /// Runs one pass and returns how many rows it touched.
    async fn tick(&self) -> Result<u64, DomainError>;
}

/// Runs `worker` every `interval` until shutdown is signalled.
pub async fn run_worker(
    worker: Arc<dyn PeriodicWorker>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(worker = worker.name(), interval_secs = interval.as_secs(), "Worker started");

    loop {
        tokio::select! {
            changed = shutdown.changed() => {
                if changed.is_err() || *shutdown.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                run_tick(&*worker).await;
            }
        }
    }

    tracing::info!(worker = worker.name(), "Worker stopped");
}

/// Spawns [`run_worker`] on its own task.
pub fn spawn_worker(
    worker: Arc<dyn PeriodicWorker>,
    interval: Duration,
    shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    tokio::spawn(run_worker(worker, interval, shutdown))
}

async fn run_tick(worker: &dyn PeriodicWorker) {
    let started = Instant::now();
    match worker.tick().await {
        Ok(affected) => tracing::debug!(
            worker = worker.name(),
            affected,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tick completed"
        ),
        Err(e) => tracing::error!(
            worker = worker.name(),
            error = %e,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Tick failed"
        ),
    }
}
