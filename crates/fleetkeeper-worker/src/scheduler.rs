//! The global scheduler: owns every configured worker, the cross-instance
//! registry they share, and the daemon tick loop or single-run pass.

use std::sync::Arc;
use std::time::Duration;

use fleetkeeper_config::AppSection;
use fleetkeeper_telemetry::log_task_panic;
use tokio::signal::unix::{signal, SignalKind};
use tokio::time::MissedTickBehavior;
use tracing::{error, info, warn};

use crate::error::WorkerError;
use crate::registry::Registry;
use crate::worker::Worker;

/// Owns every managed worker and runs them on their configured schedules
/// until asked to stop.
pub struct Scheduler {
    workers: Vec<Arc<Worker>>,
    registry: Arc<Registry>,
    tagging_interval: Duration,
    disktasks_interval: Duration,
}

impl Scheduler {
    /// Build a scheduler from a fully-constructed worker set and the
    /// resolved global scheduling intervals.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Config`] if either interval fails to resolve.
    pub fn new(workers: Vec<Arc<Worker>>, app: &AppSection) -> Result<Self, WorkerError> {
        let tagging_interval = app
            .tagging_schedule_interval
            .resolve("app.tagging_schedule_interval")
            .map_err(|source| WorkerError::Config {
                worker: "scheduler".to_string(),
                operation: "tagging_schedule_interval.resolve",
                source,
            })?;
        let disktasks_interval = app
            .disktasks_schedule_interval
            .resolve("app.disktasks_schedule_interval")
            .map_err(|source| WorkerError::Config {
                worker: "scheduler".to_string(),
                operation: "disktasks_schedule_interval.resolve",
                source,
            })?;

        Ok(Self {
            workers,
            registry: Arc::new(Registry::new()),
            tagging_interval,
            disktasks_interval,
        })
    }

    /// Log in and register every worker. Workers whose login fails are
    /// logged and dropped from the active set; the remaining workers still
    /// run.
    #[must_use]
    pub async fn start_all(&self) -> Vec<Arc<Worker>> {
        let mut active = Vec::with_capacity(self.workers.len());
        for worker in &self.workers {
            match worker.start(&self.registry).await {
                Ok(()) => active.push(Arc::clone(worker)),
                Err(error) => error!(worker = worker.name(), %error, "worker failed to start; disabling for this run"),
            }
        }
        active
    }

    /// Run one tag task and, if local, one disk task for every active
    /// worker concurrently, then return.
    pub async fn run_single(&self) {
        let active = self.start_all().await;
        let mut handles = Vec::with_capacity(active.len() * 2);

        for worker in &active {
            let worker = Arc::clone(worker);
            let registry = Arc::clone(&self.registry);
            handles.push(tokio::spawn(supervised_tag_tick(worker, registry)));
        }
        for worker in &active {
            let worker = Arc::clone(worker);
            let registry = Arc::clone(&self.registry);
            handles.push(tokio::spawn(supervised_disk_tick(worker, registry)));
        }

        for handle in handles {
            let _ = handle.await;
        }

        for worker in &active {
            worker.shutdown(&self.registry).await;
        }
    }

    /// Run the tag and disk schedules for every active worker until a
    /// `SIGINT` or `SIGTERM` is received, then log out every worker and
    /// return.
    ///
    /// # Panics
    ///
    /// Panics if the process's `SIGINT`/`SIGTERM` handlers cannot be
    /// installed (only possible if they were already taken by something
    /// else in-process).
    pub async fn run_daemon(&self) {
        let active = self.start_all().await;
        info!(workers = active.len(), "daemon started");

        let mut sigterm = signal(SignalKind::terminate()).expect("install SIGTERM handler");
        let mut sigint = signal(SignalKind::interrupt()).expect("install SIGINT handler");

        let mut tag_tick = tokio::time::interval(self.tagging_interval);
        tag_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut disk_tick = tokio::time::interval(self.disktasks_interval);
        disk_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = sigterm.recv() => {
                    info!("received SIGTERM, shutting down");
                    break;
                }
                _ = sigint.recv() => {
                    info!("received SIGINT, shutting down");
                    break;
                }
                _ = tag_tick.tick() => {
                    for worker in &active {
                        tokio::spawn(supervised_tag_tick(Arc::clone(worker), Arc::clone(&self.registry)));
                    }
                }
                _ = disk_tick.tick() => {
                    for worker in &active {
                        tokio::spawn(supervised_disk_tick(Arc::clone(worker), Arc::clone(&self.registry)));
                    }
                }
            }
        }

        for worker in &active {
            worker.shutdown(&self.registry).await;
        }
    }
}

/// Run a tag tick on a fresh task so a panic inside the rule engine is caught
/// at the task boundary (via the outer `JoinHandle`) and logged, rather than
/// unwinding the scheduler.
async fn supervised_tag_tick(worker: Arc<Worker>, registry: Arc<Registry>) {
    let name = worker.name().to_string();
    let handle = tokio::spawn(async move {
        if let Err(error) = worker.run_tag_tick(&registry).await {
            warn!(worker = worker.name(), %error, "tag tick failed; next tick retries");
        }
    });
    observe_task_panic(&name, handle.await);
}

/// Same as [`supervised_tag_tick`] for the disk task.
async fn supervised_disk_tick(worker: Arc<Worker>, registry: Arc<Registry>) {
    let name = worker.name().to_string();
    let handle = tokio::spawn(async move {
        if let Err(error) = worker.run_disk_tick(&registry).await {
            warn!(worker = worker.name(), %error, "disk tick failed; next tick retries");
        }
    });
    observe_task_panic(&name, handle.await);
}

fn observe_task_panic(worker: &str, result: Result<(), tokio::task::JoinError>) {
    if let Err(join_error) = result {
        match join_error.try_into_panic() {
            Ok(payload) => log_task_panic(worker, payload.as_ref()),
            Err(join_error) => error!(worker, %join_error, "worker task was cancelled"),
        }
    }
}
