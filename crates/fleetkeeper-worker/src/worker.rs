//! A single managed client instance: its connection, accumulated state, and
//! the tag/disk task pair that reconciles it on a schedule.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Duration;

use fleetkeeper_client::ClientCapability;
use fleetkeeper_config::{AppSection, ClientConfig, TrackerDetail};
use fleetkeeper_fsops::PathTranslator;
use fleetkeeper_rules::{run_tag_tick as run_rule_engine_tick, RuleContext};
use fleetkeeper_state::WorkerState;
use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};
use tracing::{info, warn};

use crate::disk;
use crate::error::{WorkerError, WorkerResult};
use crate::phase::{PhaseGuard, WorkerPhase};
use crate::registry::Registry;

/// Total time the disk task waits for the first client sync and a
/// concurrently-running tag task to clear before giving up for this tick.
const DISK_STARTUP_TIMEOUT: Duration = Duration::from_secs(5);
/// Poll interval while waiting out [`DISK_STARTUP_TIMEOUT`].
const DISK_STARTUP_POLL: Duration = Duration::from_millis(250);

/// One managed client instance: its connection, its accumulated
/// [`WorkerState`], and the phase machine mutually excluding its tag and
/// disk tasks.
pub struct Worker {
    name: String,
    client: Arc<dyn ClientCapability>,
    client_config: ClientConfig,
    app: Arc<AppSection>,
    tracker_details: Arc<BTreeMap<String, TrackerDetail>>,
    translator: PathTranslator,
    state: Mutex<WorkerState>,
    phase: PhaseGuard,
}

impl Worker {
    /// Construct a worker for one configured client. Does not connect; call
    /// [`Worker::start`] to log in and register with the coordinator.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        client: Arc<dyn ClientCapability>,
        client_config: ClientConfig,
        app: Arc<AppSection>,
        tracker_details: Arc<BTreeMap<String, TrackerDetail>>,
    ) -> Self {
        let translator = PathTranslator::new(client_config.translation_table.clone());
        Self {
            name: name.into(),
            client,
            client_config,
            app,
            tracker_details,
            translator,
            state: Mutex::new(WorkerState::new()),
            phase: PhaseGuard::new(),
        }
    }

    /// This worker's configured name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this worker's client runs on the same filesystem as this
    /// process (gates the disk task).
    #[must_use]
    pub fn is_local(&self) -> bool {
        self.client_config.local_instance
    }

    /// Log in and register with the cross-instance registry. Called once at
    /// process startup before either task fires.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Auth`] if login is rejected; the caller
    /// disables this worker for the remainder of the process while others
    /// continue.
    pub async fn start(&self, registry: &Registry) -> WorkerResult<()> {
        self.client
            .login()
            .await
            .map_err(|source| WorkerError::Auth {
                worker: self.name.clone(),
                source,
            })?;
        registry.register(&self.name);
        info!(worker = %self.name, "worker started");
        Ok(())
    }

    /// Signal stop, attempt logout, and unregister from the coordinator.
    /// Best-effort: a logout failure is logged, not propagated, since the
    /// process is exiting regardless.
    pub async fn shutdown(&self, registry: &Registry) {
        self.phase.stop();
        if let Err(error) = self.client.logout().await {
            warn!(worker = %self.name, error = %error, "logout failed during shutdown");
        }
        registry.unregister(&self.name);
        info!(worker = %self.name, "worker stopped");
    }

    /// Run one tag-reconciliation tick: sync, merge into state, run the
    /// rule engine to a fixed point, then the share-limit profiler.
    ///
    /// A no-op (logs a warning and returns `Ok(())`) if the disk task is
    /// currently running on this worker.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Transport`] if a client call fails, or
    /// [`WorkerError::Config`] if `app.fullsync_interval` fails to resolve.
    pub async fn run_tag_tick(&self, registry: &Registry) -> WorkerResult<()> {
        let Some(_token) = self.phase.try_enter(WorkerPhase::Tagging) else {
            warn!(worker = %self.name, "tag task fired while another task is running; skipping");
            return Ok(());
        };
        self.run_tag_tick_inner(registry).await
    }

    async fn run_tag_tick_inner(&self, registry: &Registry) -> WorkerResult<()> {
        let fullsync_interval = self
            .app
            .fullsync_interval
            .resolve("app.fullsync_interval")
            .map_err(|source| WorkerError::Config {
                worker: self.name.clone(),
                operation: "fullsync_interval.resolve",
                source,
            })?;

        let full = {
            let state = self.state.lock().await;
            state
                .last_full_sync_time()
                .is_none_or(|last| last.elapsed().unwrap_or_default() >= fullsync_interval)
        };

        let delta = self
            .client
            .sync(full)
            .await
            .map_err(|source| WorkerError::Transport {
                worker: self.name.clone(),
                operation: "sync",
                source,
            })?;

        let mut state = self.state.lock().await;
        state.apply_delta(delta);

        registry.report_hashes(&self.name, state.hashes(), true);
        let should_react = registry.should_react(&self.name);
        let other_hashes = if should_react {
            registry.other_hashes(&self.name)
        } else {
            BTreeSet::new()
        };

        let ctx = RuleContext {
            client: self.client.as_ref(),
            client_config: &self.client_config,
            app: self.app.as_ref(),
            tracker_details: self.tracker_details.as_ref(),
        };

        run_rule_engine_tick(&ctx, &mut state, &other_hashes, should_react)
            .await
            .map_err(|source| WorkerError::Transport {
                worker: self.name.clone(),
                operation: "rule_engine.run_tag_tick",
                source,
            })?;

        if should_react {
            registry.mark_reacted(&self.name);
        }

        Ok(())
    }

    /// Run one disk-hygiene tick: noHL scan, orphan quarantine, prune,
    /// empty-directory sweep. A no-op for non-local clients.
    ///
    /// Waits (bounded, polling every [`DISK_STARTUP_POLL`] up to
    /// [`DISK_STARTUP_TIMEOUT`]) for the first client sync to have landed
    /// and for a concurrently-running tag task to clear, then fires a
    /// one-shot tag tick of its own if it issued any tag mutation.
    ///
    /// # Errors
    ///
    /// Returns [`WorkerError::Transport`], [`WorkerError::Disk`],
    /// [`WorkerError::Config`], or [`WorkerError::Join`] per [`disk::run`].
    pub async fn run_disk_tick(&self, registry: &Registry) -> WorkerResult<()> {
        if !self.is_local() {
            return Ok(());
        }

        if !self.wait_for_disk_preconditions().await {
            warn!(worker = %self.name, "disk task preconditions not met within timeout; skipping this tick");
            return Ok(());
        }

        let Some(token) = self.phase.try_enter(WorkerPhase::Disking) else {
            warn!(worker = %self.name, "disk task fired while another task is running; skipping");
            return Ok(());
        };

        let tag_changed = {
            let mut state = self.state.lock().await;
            disk::run(
                &self.name,
                self.client.as_ref(),
                &self.client_config,
                self.app.as_ref(),
                &self.translator,
                &mut state,
            )
            .await?
        };

        drop(token);

        if tag_changed {
            self.run_tag_tick(registry).await?;
        }

        Ok(())
    }

    async fn wait_for_disk_preconditions(&self) -> bool {
        let deadline = Instant::now() + DISK_STARTUP_TIMEOUT;
        loop {
            let synced = self.state.lock().await.last_full_sync_time().is_some();
            let tag_clear = self.phase.current() != WorkerPhase::Tagging;
            if synced && tag_clear {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            sleep(DISK_STARTUP_POLL).await;
        }
    }
}
