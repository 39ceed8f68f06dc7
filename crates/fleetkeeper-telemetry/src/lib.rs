#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::cargo,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]

//! Telemetry primitives shared across the fleetkeeper workspace.
//!
//! Layout: `init.rs` (logging setup, console + rotating file sink), `error.rs`
//! (telemetry-specific error type), `panic_guard.rs` (per-task panic capture).

pub mod error;
pub mod init;
pub mod panic_guard;

pub use error::{Result as TelemetryResult, TelemetryError};
pub use init::{
    DEFAULT_LOG_LEVEL, FileSinkConfig, LogFormat, LoggingConfig, LoggingGuard, build_sha,
    init_logging,
};
pub use panic_guard::log_task_panic;
