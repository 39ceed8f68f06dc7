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

//! Configuration loading, defaulting and validation for the fleet daemon.
//!
//! A single YAML document describes the daemon-wide schedule, one or more
//! torrent client connections, per-client command toggles and share-limit
//! profiles, and the tracker classification table. Every field the document
//! may omit carries a compiled-in default (see [`defaults`]), so a minimal
//! document with just a client URL and credentials is enough to start the
//! daemon.

pub mod defaults;
pub mod duration;
pub mod error;
pub mod loader;
pub mod model;
pub mod validate;

pub use duration::{DurationSpec, RatioSpec, SeedingTimeSpec};
pub use error::{ConfigError, Result};
pub use loader::{load, LoadedConfig};
pub use model::{
    AppSection, ClientConfig, CommandsConfig, DupesSection, FoldersConfig, HrSection, HrSpec,
    IssueSection, LowSeedsSection, NoHlSection, NoTmmSection, RootConfig, Secret,
    ShareProfileConfig, TrackerDetail,
};
