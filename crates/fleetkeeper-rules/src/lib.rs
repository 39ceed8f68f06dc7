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

//! The fleet daemon's rule engine: tag classification rules and the
//! share-limit profiler that runs once they reach a fixed point.
//!
//! Every rule reads the [`fleetkeeper_state::WorkerState`] the Worker owns
//! and issues mutations through a [`fleetkeeper_client::ClientCapability`];
//! none of them know which concrete client backend they are driving.

pub mod context;
pub mod dupe;
pub mod engine;
pub mod hr;
pub mod huno;
pub mod issue;
pub mod lowseeds;
pub mod plan;
pub mod profiler;
pub mod rename;
pub mod tmm;
pub mod tracker_tag;

pub use context::RuleContext;
pub use engine::run_tag_tick;
pub use plan::TagPlan;
