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

//! Binary entrypoint for the fleet reconciliation daemon: CLI parsing, the
//! startup banner, the process lock guard, and bootstrap wiring of
//! configuration, telemetry and workers into a running scheduler.
//!
//! Layout: `cli.rs` (argument parsing), `lock.rs` (the content-hash-keyed
//! process lock), `banner.rs` (the startup summary), `bootstrap.rs` (wiring
//! everything together and driving the scheduler to completion).

pub mod banner;
pub mod bootstrap;
pub mod cli;
pub mod lock;
