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

//! Per-instance state store for the fleet daemon.
//!
//! Owns the accumulated torrent catalogue for one client and the merge
//! rules that fold each [`fleetkeeper_client::DeltaView`] into it. The Rule
//! Engine and Worker read this store; nothing downstream talks to the
//! client capability directly to learn the current torrent set.

pub mod merge;
pub mod store;

pub use merge::{FieldDelta, SetPatch};
pub use store::WorkerState;
