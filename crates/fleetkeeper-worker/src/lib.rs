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
#![allow(clippy::multiple_crate_versions)]

//! Worker lifecycle and scheduling: one [`worker::Worker`] per configured
//! client instance, a [`registry::Registry`] coordinating cross-instance
//! duplicate detection between them, and a [`scheduler::Scheduler`] driving
//! their tag/disk task pairs on a schedule or for a single run.
//!
//! Layout: `phase.rs` (the mutually-exclusive tag/disk/stop state machine),
//! `registry.rs` (the cross-instance coordinator), `disk.rs` (the disk-task
//! orchestration a worker's disk phase runs), `worker.rs` (one managed
//! client instance), `scheduler.rs` (the daemon tick loop and single-run
//! pass), `error.rs` (the crate's error type).

pub mod disk;
pub mod error;
pub mod phase;
pub mod registry;
pub mod scheduler;
pub mod worker;

pub use error::{WorkerError, WorkerResult};
pub use phase::{PhaseGuard, PhaseToken, WorkerPhase};
pub use registry::Registry;
pub use scheduler::Scheduler;
pub use worker::Worker;
