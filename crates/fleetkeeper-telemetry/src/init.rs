//! Logging initialisation: a console layer plus an optional daily-rotating file sink.
//!
//! # Design
//! - Centralises logging setup (fmt or JSON) behind a single entry point.
//! - Records the build SHA once to avoid inconsistencies across modules.
//! - The file sink uses `tracing-appender`'s non-blocking writer; the returned
//!   `LoggingGuard` must be held for the life of the process or buffered lines
//!   are dropped on exit.

use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::{Result, TelemetryError};

/// Default logging target when `RUST_LOG` is not provided.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Number of rotated log files retained alongside the active one.
pub const LOG_BACKLOG: usize = 5;

static BUILD_SHA: OnceCell<String> = OnceCell::new();

/// Logging configuration.
#[derive(Debug, Clone)]
pub struct LoggingConfig<'a> {
    /// Log level string (e.g., `info`, `debug`).
    pub level: &'a str,
    /// Output format selection for the console layer.
    pub format: LogFormat,
    /// Build identifier recorded in structured logs.
    pub build_sha: &'a str,
    /// Optional rotating file sink configuration.
    pub file_sink: Option<FileSinkConfig<'a>>,
}

impl Default for LoggingConfig<'_> {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL,
            format: LogFormat::infer(),
            build_sha: build_sha(),
            file_sink: None,
        }
    }
}

/// Configuration for the rotating file sink.
#[derive(Debug, Clone)]
pub struct FileSinkConfig<'a> {
    /// Directory the rotated log files live in.
    pub directory: &'a Path,
    /// Base file name; a date suffix is appended by the rotation policy.
    pub file_name_prefix: &'a str,
}

/// Available output formats for the logger.
#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    /// Emit logs as structured JSON objects.
    Json,
    /// Emit human-readable, pretty-printed logs.
    Pretty,
}

impl LogFormat {
    /// Choose a sensible default for the current build.
    #[must_use]
    pub const fn infer() -> Self {
        if cfg!(debug_assertions) {
            Self::Pretty
        } else {
            Self::Json
        }
    }
}

/// Guard returned by [`init_logging`]. Dropping it flushes and stops the
/// background file-writer thread; hold it for the life of the process.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Access the build SHA recorded during logging initialisation.
#[must_use]
pub fn build_sha() -> &'static str {
    BUILD_SHA.get().map_or("dev", String::as_str)
}

type BoxedLayer = Box<dyn Layer<tracing_subscriber::Registry> + Send + Sync>;

/// Configure and install the global tracing subscriber.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created, or if a tracing
/// subscriber has already been installed globally.
pub fn init_logging(config: &LoggingConfig) -> Result<LoggingGuard> {
    BUILD_SHA
        .set(config.build_sha.to_string())
        .ok()
        .or(Some(()));

    let env_filter = build_env_filter(config.level);
    let console_layer: BoxedLayer = match config.format {
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(false)
            .with_thread_ids(false)
            .boxed(),
        LogFormat::Pretty => fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .boxed(),
    };

    let (file_layer, file_guard) = match &config.file_sink {
        Some(sink) => {
            let (layer, guard) = build_file_layer(sink)?;
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|source| TelemetryError::SubscriberInstall { source })?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn build_file_layer(sink: &FileSinkConfig) -> Result<(BoxedLayer, WorkerGuard)> {
    std::fs::create_dir_all(sink.directory).map_err(|source| TelemetryError::LogDirCreate {
        path: PathBuf::from(sink.directory),
        source,
    })?;

    let appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(sink.file_name_prefix)
        .filename_suffix("log")
        .max_log_files(LOG_BACKLOG)
        .build(sink.directory)
        .unwrap_or_else(|_| {
            RollingFileAppender::new(Rotation::DAILY, sink.directory, sink.file_name_prefix)
        });

    let (writer, guard) = tracing_appender::non_blocking(appender);
    let layer: BoxedLayer = fmt::layer()
        .with_writer(writer)
        .with_ansi(false)
        .with_target(false)
        .json()
        .boxed();
    Ok((layer, guard))
}

fn build_env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}
