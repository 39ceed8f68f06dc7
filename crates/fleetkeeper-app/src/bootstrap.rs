//! Wires configuration, telemetry, the process lock and every enabled
//! client into a running [`fleetkeeper_worker::Scheduler`].

use std::path::PathBuf;
use std::sync::Arc;

use fleetkeeper_client::{ClientCapability, QBittorrentClient};
use fleetkeeper_telemetry::{FileSinkConfig, LogFormat, LoggingConfig, LoggingGuard, init_logging};
use fleetkeeper_worker::{Scheduler, Worker};
use tracing::warn;

use crate::banner;
use crate::cli::Cli;
use crate::lock::LockGuard;

/// Load configuration, initialise telemetry, acquire the process lock
/// (skipped in single-run mode), build one worker per enabled client, and
/// run the scheduler to completion.
///
/// # Errors
///
/// Returns an error if the configuration file is unreadable or fails
/// validation, if another instance already holds the process lock, if
/// telemetry cannot be initialised, or if a worker-scoped duration fails to
/// resolve while the scheduler is constructed. Any of these aborts startup
/// before a worker is built, per the daemon's error-handling design.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let loaded = fleetkeeper_config::load(&cli.config)?;

    let _logging_guard = init_telemetry()?;

    banner::print_and_log(&loaded.config);

    let _lock = if cli.singlerun {
        None
    } else {
        Some(LockGuard::acquire(&loaded.raw)?)
    };

    let app = Arc::new(loaded.config.app);
    let tracker_details = Arc::new(loaded.config.tracker_details);

    let workers: Vec<Arc<Worker>> = loaded
        .config
        .clients
        .into_iter()
        .filter(|(_, client_config)| client_config.enabled)
        .map(|(name, client_config)| {
            let client: Arc<dyn ClientCapability> = Arc::new(QBittorrentClient::new(
                client_config.url.clone(),
                client_config.user.clone(),
                client_config.password.expose().to_string(),
            ));
            Arc::new(Worker::new(
                name,
                client,
                client_config,
                Arc::clone(&app),
                Arc::clone(&tracker_details),
            ))
        })
        .collect();

    if workers.is_empty() {
        warn!("no enabled clients configured; nothing to reconcile");
        return Ok(());
    }

    let scheduler = Scheduler::new(workers, &app)?;

    if cli.singlerun {
        scheduler.run_single().await;
    } else {
        scheduler.run_daemon().await;
    }

    Ok(())
}

fn init_telemetry() -> fleetkeeper_telemetry::TelemetryResult<LoggingGuard> {
    let level =
        std::env::var("RUST_LOG").unwrap_or_else(|_| fleetkeeper_telemetry::DEFAULT_LOG_LEVEL.to_string());
    let file_sink_dir = PathBuf::from("logs");
    let config = LoggingConfig {
        level: &level,
        format: LogFormat::infer(),
        build_sha: env!("CARGO_PKG_VERSION"),
        file_sink: Some(FileSinkConfig {
            directory: &file_sink_dir,
            file_name_prefix: "fleetkeeper",
        }),
    };
    init_logging(&config)
}
