//! Worker- and scheduler-scoped error type.

use thiserror::Error;

/// Errors raised by worker lifecycle and scheduling code.
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The configured client rejected login; the worker is disabled for the
    /// remainder of the process, but other workers continue.
    #[error("worker {worker}: login failed")]
    Auth {
        /// Worker name.
        worker: String,
        /// Underlying client error.
        #[source]
        source: fleetkeeper_client::ClientError,
    },
    /// A client call failed mid-tick; the current rule/task logs and
    /// continues, the next tick retries.
    #[error("worker {worker}: {operation} failed")]
    Transport {
        /// Worker name.
        worker: String,
        /// Name of the operation that failed.
        operation: &'static str,
        /// Underlying client error.
        #[source]
        source: fleetkeeper_client::ClientError,
    },
    /// A filesystem primitive failed; the disk sweep step is skipped.
    #[error("worker {worker}: disk task {operation} failed")]
    Disk {
        /// Worker name.
        worker: String,
        /// Name of the disk operation that failed.
        operation: &'static str,
        /// Underlying filesystem error.
        #[source]
        source: fleetkeeper_fsops::FsOpsError,
    },
    /// A configuration value failed to resolve at a point startup validation
    /// should already have caught (defensive, should not occur in practice).
    #[error("worker {worker}: {operation} failed")]
    Config {
        /// Worker name.
        worker: String,
        /// Name of the operation that failed.
        operation: &'static str,
        /// Underlying configuration error.
        #[source]
        source: fleetkeeper_config::ConfigError,
    },
    /// A blocking filesystem task panicked.
    #[error("worker {worker}: {operation} panicked")]
    Join {
        /// Worker name.
        worker: String,
        /// Name of the operation that panicked.
        operation: &'static str,
        /// Underlying join error.
        #[source]
        source: tokio::task::JoinError,
    },
}

/// Convenience alias for worker-scoped results.
pub type WorkerResult<T> = Result<T, WorkerError>;
