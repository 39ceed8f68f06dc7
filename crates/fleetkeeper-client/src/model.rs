//! Domain types shared by the client capability trait and its adapters.
//!
//! # Design
//! - Pure data carriers; no network or state-store behavior lives here.
//! - `tags` is modeled as an ordered list of distinct strings even though the
//!   wire format is a single comma-separated string, so that set operations
//!   elsewhere in the daemon never reimplement the split/join dance.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Lifecycle state of a torrent as reported by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TorrentState {
    /// Actively downloading.
    Downloading,
    /// Paused after completing (seeding disabled).
    PausedUp,
    /// Paused before completing.
    PausedDl,
    /// Forced seeding, bypassing share limits.
    ForcedUp,
    /// The client reported an unrecoverable error for this torrent.
    Error,
    /// Stopped after completing.
    StoppedUp,
    /// Queued, waiting to seed.
    QueuedUp,
    /// Any state the client reports that this enum does not model explicitly.
    Unknown,
}

impl TorrentState {
    /// Whether this state should be excluded from rules that only act on
    /// actively-managed torrents (paused, errored, or otherwise inert).
    #[must_use]
    pub const fn is_paused_or_errored(self) -> bool {
        matches!(
            self,
            Self::PausedUp | Self::PausedDl | Self::Error | Self::Unknown
        )
    }
}

/// Health status of an individual tracker entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackerStatus {
    /// The tracker responded successfully.
    Working,
    /// The torrent has not yet contacted this tracker.
    NotContacted,
    /// The torrent is mid-announce to this tracker.
    Updating,
    /// The tracker rejected the announce or returned an error.
    NotWorking,
    /// The tracker entry is disabled.
    Disabled,
}

/// A single tracker entry reported for a torrent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerEntry {
    /// Tracker announce URL.
    pub url: String,
    /// Reported health status.
    pub status: TrackerStatus,
    /// Diagnostic message accompanying the status, if any.
    pub msg: String,
}

/// A single file entry within a torrent's payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileEntry {
    /// Relative file name within the torrent payload.
    pub name: String,
    /// Download priority (0 means skipped).
    pub priority: i32,
    /// Total size in bytes.
    pub size: u64,
    /// Fractional completion, 0.0-1.0.
    pub progress: f64,
}

/// A torrent record as tracked by the state store, keyed by content hash.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TorrentRecord {
    /// Human-readable display name.
    pub name: String,
    /// The first working tracker URL, or empty if none is healthy.
    pub tracker: String,
    /// Assigned category, if any.
    pub category: String,
    /// Ordered set of tags currently attached to the torrent.
    pub tags: BTreeSet<String>,
    /// Current lifecycle state.
    pub state: TorrentState,
    /// Fractional completion, 0.0-1.0.
    pub progress: f64,
    /// Cumulative seeding time in seconds.
    pub seeding_time: u64,
    /// Upload/download ratio.
    pub ratio: f64,
    /// Seed count as reported by the tracker (peer seeders).
    pub num_complete: u32,
    /// Total payload size in bytes.
    pub size: u64,
    /// Bytes downloaded so far.
    pub downloaded: u64,
    /// Path to the torrent's content on disk (file or directory).
    pub content_path: String,
    /// Client-configured save path.
    pub save_path: String,
    /// Whether automatic torrent management is enabled.
    pub auto_tmm: bool,
    /// Seeding time ceiling in minutes; `-1` unset, `-2` client-global default.
    pub max_seeding_time: i64,
    /// Ratio ceiling; `-1` unset, `-2` client-global default.
    pub ratio_limit: f64,
    /// Upload bandwidth cap in bytes/sec; `-1` unset.
    pub up_limit: i64,
}

/// A partial torrent record as reported by one sync call.
///
/// A genuine incremental sync only reports the fields of a torrent that
/// changed since the last call; every other field is `None`, meaning "ask
/// whoever applies this delta to leave the stored value alone" rather than
/// "this field is now empty/zero". Keeping the two apart is the whole point
/// — collapsing an absent key to a zero-valued [`TorrentRecord`] would
/// silently reset every field the client didn't mention.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TorrentRecordDelta {
    /// Human-readable display name, if reported this tick.
    pub name: Option<String>,
    /// The first working tracker URL, if reported this tick.
    pub tracker: Option<String>,
    /// Assigned category, if reported this tick.
    pub category: Option<String>,
    /// Complete replacement tag set, if reported this tick.
    pub tags: Option<BTreeSet<String>>,
    /// Current lifecycle state, if reported this tick.
    pub state: Option<TorrentState>,
    /// Fractional completion, if reported this tick.
    pub progress: Option<f64>,
    /// Cumulative seeding time in seconds, if reported this tick.
    pub seeding_time: Option<u64>,
    /// Upload/download ratio, if reported this tick.
    pub ratio: Option<f64>,
    /// Seed count as reported by the tracker, if reported this tick.
    pub num_complete: Option<u32>,
    /// Total payload size in bytes, if reported this tick.
    pub size: Option<u64>,
    /// Bytes downloaded so far, if reported this tick.
    pub downloaded: Option<u64>,
    /// Path to the torrent's content on disk, if reported this tick.
    pub content_path: Option<String>,
    /// Client-configured save path, if reported this tick.
    pub save_path: Option<String>,
    /// Whether automatic torrent management is enabled, if reported this
    /// tick.
    pub auto_tmm: Option<bool>,
    /// Seeding time ceiling in minutes, if reported this tick.
    pub max_seeding_time: Option<i64>,
    /// Ratio ceiling, if reported this tick.
    pub ratio_limit: Option<f64>,
    /// Upload bandwidth cap in bytes/sec, if reported this tick.
    pub up_limit: Option<i64>,
}

impl TorrentRecordDelta {
    /// Build a complete record for a hash with no prior stored state,
    /// defaulting every field the delta didn't report. A genuine qBittorrent
    /// sync always reports every field the first time a hash appears, so
    /// this only matters for malformed or synthetic deltas.
    #[must_use]
    pub fn into_full_record(self) -> TorrentRecord {
        TorrentRecord {
            name: self.name.unwrap_or_default(),
            tracker: self.tracker.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            tags: self.tags.unwrap_or_default(),
            state: self.state.unwrap_or(TorrentState::Unknown),
            progress: self.progress.unwrap_or_default(),
            seeding_time: self.seeding_time.unwrap_or_default(),
            ratio: self.ratio.unwrap_or_default(),
            num_complete: self.num_complete.unwrap_or_default(),
            size: self.size.unwrap_or_default(),
            downloaded: self.downloaded.unwrap_or_default(),
            content_path: self.content_path.unwrap_or_default(),
            save_path: self.save_path.unwrap_or_default(),
            auto_tmm: self.auto_tmm.unwrap_or_default(),
            max_seeding_time: self.max_seeding_time.unwrap_or(-1),
            ratio_limit: self.ratio_limit.unwrap_or(-1.0),
            up_limit: self.up_limit.unwrap_or(-1),
        }
    }
}

/// The incremental (or full) change set reported by a client sync call.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DeltaView {
    /// Whether this delta is a complete snapshot rather than an increment.
    pub full_update: bool,
    /// New or partially-updated torrent records, keyed by content hash.
    pub torrents: std::collections::BTreeMap<String, TorrentRecordDelta>,
    /// Hashes the client reports as no longer present.
    pub torrents_removed: Vec<String>,
    /// Tags the client reports as deleted instance-wide.
    pub tags_removed: Vec<String>,
    /// Categories the client reports as deleted instance-wide.
    pub categories_removed: Vec<String>,
    /// Response-id; monotonically increasing within a login session.
    pub rid: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paused_and_errored_states_are_flagged() {
        assert!(TorrentState::PausedUp.is_paused_or_errored());
        assert!(TorrentState::Error.is_paused_or_errored());
        assert!(!TorrentState::Downloading.is_paused_or_errored());
    }

    #[test]
    fn partial_delta_defaults_absent_fields_on_a_new_record() {
        let delta = TorrentRecordDelta {
            name: Some("Example".to_string()),
            ratio: Some(1.5),
            ..TorrentRecordDelta::default()
        };
        let record = delta.into_full_record();
        assert_eq!(record.name, "Example");
        assert_eq!(record.ratio, 1.5);
        assert_eq!(record.max_seeding_time, -1);
        assert_eq!(record.state, TorrentState::Unknown);
    }
}
