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

//! The torrent client capability interface and its concrete adapters.
//!
//! The Rule Engine, State Store and Worker crates depend only on
//! [`ClientCapability`]; they never reference [`QBittorrentClient`] or any
//! other adapter directly, so a second client backend can be added without
//! touching fleet logic.

pub mod capability;
pub mod error;
pub mod model;
pub mod qbittorrent;

pub use capability::{ClientCapability, LIMIT_GLOBAL_DEFAULT, LIMIT_UNSET};
pub use error::{ClientError, ClientResult};
pub use model::{
    DeltaView, FileEntry, TorrentRecord, TorrentRecordDelta, TorrentState, TrackerEntry, TrackerStatus,
};
pub use qbittorrent::QBittorrentClient;
