//! Typed configuration models.
//!
//! # Design
//! - Pure data carriers deserialized from the merged configuration document.
//! - Keeps domain types separate from loading/merging code in `loader.rs`.

use std::collections::BTreeMap;
use std::fmt::{self, Debug, Formatter};

use serde::{Deserialize, Serialize};

use crate::defaults::{default_tag_renamer, default_tracker_details};
use crate::duration::{DurationSpec, RatioSpec, SeedingTimeSpec};

fn default_true() -> bool {
    true
}

/// Root configuration document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RootConfig {
    /// Global scheduling intervals, tag prefixes and feature toggles.
    #[serde(default)]
    pub app: AppSection,
    /// One entry per managed client instance, keyed by name.
    pub clients: BTreeMap<String, ClientConfig>,
    /// Tracker classification table, keyed by `"keyword|keyword"` expression.
    #[serde(default = "default_tracker_details")]
    pub tracker_details: BTreeMap<String, TrackerDetail>,
}

/// The `app` top-level section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    /// Cadence of the tag reconciliation loop.
    #[serde(default = "default_tagging_interval")]
    pub tagging_schedule_interval: DurationSpec,
    /// Cadence of the disk-hygiene loop.
    #[serde(default = "default_disktasks_interval")]
    pub disktasks_schedule_interval: DurationSpec,
    /// Cadence of a full (non-incremental) client resync.
    #[serde(default = "default_fullsync_interval")]
    pub fullsync_interval: DurationSpec,
    /// Prefix applied to every share-limit profile tag.
    #[serde(default = "default_share_limits_prefix")]
    pub share_limits_tag_prefix: String,
    /// Cross-instance duplicate detection settings.
    #[serde(default)]
    pub dupes: DupesSection,
    /// Tracker-health issue tagging settings.
    #[serde(default)]
    pub issue: IssueSection,
    /// Low-seed-count tagging settings.
    #[serde(default)]
    pub lowseeds: LowSeedsSection,
    /// Prefix applied to HUNO seeding-tier tags.
    #[serde(default = "default_huno_prefix")]
    pub huno_tag_prefix: String,
    /// No-hardlink detection settings.
    #[serde(default)]
    pub no_hl: NoHlSection,
    /// Age threshold before quarantined orphans are pruned.
    #[serde(default = "default_prune_orphaned_time")]
    pub prune_orphaned_time: DurationSpec,
    /// Automatic-management tagging settings.
    #[serde(default)]
    pub no_tmm: NoTmmSection,
    /// Tag rename table, `old_tag -> new_tag`.
    #[serde(default = "default_tag_renamer")]
    pub tag_renamer: BTreeMap<String, String>,
    /// Hit-and-run classification settings.
    #[serde(default)]
    pub hr: HrSection,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            tagging_schedule_interval: default_tagging_interval(),
            disktasks_schedule_interval: default_disktasks_interval(),
            fullsync_interval: default_fullsync_interval(),
            share_limits_tag_prefix: default_share_limits_prefix(),
            dupes: DupesSection::default(),
            issue: IssueSection::default(),
            lowseeds: LowSeedsSection::default(),
            huno_tag_prefix: default_huno_prefix(),
            no_hl: NoHlSection::default(),
            prune_orphaned_time: default_prune_orphaned_time(),
            no_tmm: NoTmmSection::default(),
            tag_renamer: default_tag_renamer(),
            hr: HrSection::default(),
        }
    }
}

fn default_tagging_interval() -> DurationSpec {
    DurationSpec::Seconds(30)
}
fn default_disktasks_interval() -> DurationSpec {
    DurationSpec::Human("10m".to_string())
}
fn default_fullsync_interval() -> DurationSpec {
    DurationSpec::Human("60m".to_string())
}
fn default_share_limits_prefix() -> String {
    "~sl.".to_string()
}
fn default_huno_prefix() -> String {
    "!HUNO_".to_string()
}
fn default_prune_orphaned_time() -> DurationSpec {
    DurationSpec::Human("2w".to_string())
}

/// Cross-instance duplicate detection toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DupesSection {
    /// Whether the dupe rule runs at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Tag applied to duplicate torrents.
    #[serde(default = "default_dupe_tag")]
    pub tag: String,
}

impl Default for DupesSection {
    fn default() -> Self {
        Self {
            enabled: true,
            tag: default_dupe_tag(),
        }
    }
}
fn default_dupe_tag() -> String {
    "~DUPE".to_string()
}

/// Tracker-issue tagging toggle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueSection {
    /// Tag applied to torrents with an unhealthy tracker.
    #[serde(default = "default_issue_tag")]
    pub tag: String,
}

impl Default for IssueSection {
    fn default() -> Self {
        Self {
            tag: default_issue_tag(),
        }
    }
}
fn default_issue_tag() -> String {
    "@issue".to_string()
}

/// Low-seed-count tagging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LowSeedsSection {
    /// Minimum acceptable seed count before the low-seeds tag applies.
    #[serde(default = "default_min_seeds")]
    pub min_seeds: u32,
    /// Tag applied to under-seeded torrents.
    #[serde(default = "default_lowseeds_tag")]
    pub tag: String,
}

impl Default for LowSeedsSection {
    fn default() -> Self {
        Self {
            min_seeds: default_min_seeds(),
            tag: default_lowseeds_tag(),
        }
    }
}
fn default_min_seeds() -> u32 {
    3
}
fn default_lowseeds_tag() -> String {
    "~lowSeeds".to_string()
}

/// No-hardlink detection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoHlSection {
    /// Tag applied to torrents without cross-filesystem hard links.
    #[serde(default = "default_nohl_tag")]
    pub tag: String,
    /// Categories the noHL scan applies to.
    #[serde(default = "default_nohl_categories")]
    pub categories: Vec<String>,
}

impl Default for NoHlSection {
    fn default() -> Self {
        Self {
            tag: default_nohl_tag(),
            categories: default_nohl_categories(),
        }
    }
}
fn default_nohl_tag() -> String {
    "~noHL".to_string()
}
fn default_nohl_categories() -> Vec<String> {
    vec![
        "movies".to_string(),
        "tv".to_string(),
        "audiobooks".to_string(),
        "xseed".to_string(),
    ]
}

/// Automatic torrent management (TMM) tagging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoTmmSection {
    /// When set, toggle `auto_tmm` on instead of tagging.
    #[serde(default)]
    pub auto_enable: bool,
    /// Tag applied when automatic management is disabled.
    #[serde(default = "default_notmm_tag")]
    pub tag: String,
    /// Tags that exempt a torrent from this rule.
    #[serde(default)]
    pub ignored_tags: Vec<String>,
    /// Categories that exempt a torrent from this rule.
    #[serde(default = "default_notmm_ignored_categories")]
    pub ignored_categories: Vec<String>,
}

impl Default for NoTmmSection {
    fn default() -> Self {
        Self {
            auto_enable: false,
            tag: default_notmm_tag(),
            ignored_tags: Vec::new(),
            ignored_categories: default_notmm_ignored_categories(),
        }
    }
}
fn default_notmm_tag() -> String {
    "~noTMM".to_string()
}
fn default_notmm_ignored_categories() -> Vec<String> {
    vec!["cross-seed-link".to_string()]
}

/// Hit-and-run classification settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrSection {
    /// Tag applied to torrents that have not met their H&R obligation.
    #[serde(default = "default_hr_tag")]
    pub tag: String,
    /// Extra grace seeding time added to a tracker's required seed time.
    #[serde(default = "default_hr_extra_seed_time")]
    pub extra_seed_time: DurationSpec,
    /// Extra grace ratio added to a tracker's required ratio.
    #[serde(default = "default_hr_extra_ratio")]
    pub extra_ratio: f64,
    /// Whether zero-byte-downloaded cross-seeds are exempt from H&R.
    #[serde(default = "default_true")]
    pub exclude_xseed: bool,
    /// Whether unsatisfied, paused torrents should be auto-resumed.
    #[serde(default)]
    pub autostart: bool,
}

impl Default for HrSection {
    fn default() -> Self {
        Self {
            tag: default_hr_tag(),
            extra_seed_time: default_hr_extra_seed_time(),
            extra_ratio: default_hr_extra_ratio(),
            exclude_xseed: true,
            autostart: false,
        }
    }
}
fn default_hr_tag() -> String {
    "~H&R".to_string()
}
fn default_hr_extra_seed_time() -> DurationSpec {
    DurationSpec::Human("5h".to_string())
}
fn default_hr_extra_ratio() -> f64 {
    0.1
}

/// A secret value whose `Debug` rendering is redacted.
#[derive(Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Secret(pub String);

impl Debug for Secret {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("Secret(\"***\")")
    }
}

impl Secret {
    /// Access the plaintext secret value.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

/// Configuration for a single managed client instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Whether this client is reconciled at all.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of the client's web API.
    pub url: String,
    /// Login username.
    pub user: String,
    /// Login password.
    pub password: Secret,
    /// Whether the client runs on the same filesystem as this process
    /// (gates the disk-hygiene loop).
    #[serde(default = "default_true")]
    pub local_instance: bool,
    /// Whether disk/tag mutations are logged but not issued.
    #[serde(default)]
    pub dryrun: bool,
    /// Per-rule enable flags.
    #[serde(default)]
    pub commands: CommandsConfig,
    /// Local filesystem roots for disk hygiene.
    pub folders: Option<FoldersConfig>,
    /// Client-view-path to real-path rewrite table.
    #[serde(default)]
    pub translation_table: BTreeMap<String, String>,
    /// Ordered share-limit profile table, keyed by profile name.
    #[serde(default)]
    pub share_limits: BTreeMap<String, ShareProfileConfig>,
}

/// Per-rule enable flags for a client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommandsConfig {
    /// Run the tracker-health issue rule.
    #[serde(default = "default_true")]
    pub tag_issues: bool,
    /// Run the tag-rename rule.
    #[serde(default = "default_true")]
    pub tag_rename: bool,
    /// Run the tracker-tag classifier.
    #[serde(default = "default_true")]
    pub tag_trackers: bool,
    /// Run the hit-and-run classifier.
    #[serde(default = "default_true")]
    pub tag_hr: bool,
    /// Run the low-seeds rule.
    #[serde(default)]
    pub tag_lowseeds: bool,
    /// Run the HUNO tiering rule.
    #[serde(default = "default_true")]
    pub tag_huno: bool,
    /// Run the automatic-management tagging rule.
    #[serde(default = "default_true")]
    pub scan_no_tmm: bool,
    /// Run the share-limit profiler.
    #[serde(default = "default_true")]
    pub share_limits: bool,
    /// Run the noHL scan.
    #[serde(default = "default_true")]
    pub tag_no_hl: bool,
    /// Run orphan quarantine.
    #[serde(default = "default_true")]
    pub clean_orphaned: bool,
    /// Run orphan pruning.
    #[serde(default = "default_true")]
    pub prune_orphaned: bool,
    /// Run the empty-directory sweep.
    #[serde(default = "default_true")]
    pub delete_empty_dirs: bool,
}

impl Default for CommandsConfig {
    fn default() -> Self {
        Self {
            tag_issues: true,
            tag_rename: true,
            tag_trackers: true,
            tag_hr: true,
            tag_lowseeds: false,
            tag_huno: true,
            scan_no_tmm: true,
            share_limits: true,
            tag_no_hl: true,
            clean_orphaned: true,
            prune_orphaned: true,
            delete_empty_dirs: true,
        }
    }
}

/// Local filesystem roots used by the disk-hygiene tasks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FoldersConfig {
    /// Root directory the client downloads into.
    pub root_path: String,
    /// Quarantine directory orphans are moved into.
    pub orphaned_path: String,
    /// Optional path excluded from the orphan scan (e.g. a staging area).
    pub orphaned_ignored: Option<String>,
}

/// A single share-limit profile specification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareProfileConfig {
    /// Category selector; the torrent's category must be in this set.
    #[serde(default)]
    pub category: Option<Vec<String>>,
    /// Every listed tag must be present.
    #[serde(default)]
    pub include_all_tags: Vec<String>,
    /// At least one listed tag must be present.
    #[serde(default)]
    pub include_any_tags: Vec<String>,
    /// Not all listed tags may be present simultaneously.
    #[serde(default)]
    pub exclude_all_tags: Vec<String>,
    /// No listed tag may be present.
    #[serde(default)]
    pub exclude_any_tags: Vec<String>,
    /// Ratio ceiling; `-1` no cap, `-2` client-global default.
    #[serde(default = "default_ratio_sentinel")]
    pub max_ratio: RatioSpec,
    /// Seeding-time ceiling; sentinel or human duration.
    #[serde(default = "default_sentinel_minus_two")]
    pub max_seeding_time: SeedingTimeSpec,
    /// Upload bandwidth cap in bytes/sec; `-1` no cap, `-2` client-global default.
    #[serde(default = "default_sentinel_minus_two")]
    pub upload_limit: SeedingTimeSpec,
    /// Explicit tag name; overrides `prefix + profile_name` if set.
    pub custom_tag: Option<String>,
    /// Whether the profile's tag is actually applied to matching torrents.
    #[serde(default = "default_true")]
    pub add_group_to_tag: bool,
    /// Resume paused/stopped torrents that have not hit their limits.
    #[serde(default)]
    pub auto_resume: bool,
    /// Mark paused/stopped, limit-exceeding torrents for deletion.
    #[serde(default)]
    pub auto_delete: bool,
}

fn default_sentinel_minus_two() -> SeedingTimeSpec {
    SeedingTimeSpec::Sentinel(-2)
}

fn default_ratio_sentinel() -> RatioSpec {
    RatioSpec::Sentinel(-2)
}

/// A single tracker classification table entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerDetail {
    /// Tag applied when this entry's keyword expression matches.
    pub tag: String,
    /// Hit-and-run requirements derived from this tracker, if any.
    pub hr: Option<HrSpec>,
    /// Category implied by this tracker (informational).
    pub category: Option<String>,
}

/// Hit-and-run requirement attached to a tracker classification entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrSpec {
    /// Required seeding time before the obligation is satisfied.
    pub time: DurationSpec,
    /// Required ratio, if the tracker enforces one.
    pub ratio: Option<f64>,
    /// Required downloaded-percentage, if the tracker enforces one.
    pub percent: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn secret_debug_is_redacted() {
        let secret = Secret("hunter2".to_string());
        assert_eq!(format!("{secret:?}"), "Secret(\"***\")");
        assert_eq!(secret.expose(), "hunter2");
    }

    #[test]
    fn app_section_default_matches_documented_defaults() {
        let app = AppSection::default();
        assert_eq!(app.share_limits_tag_prefix, "~sl.");
        assert_eq!(app.huno_tag_prefix, "!HUNO_");
        assert!(app.dupes.enabled);
        assert_eq!(app.lowseeds.min_seeds, 3);
        assert_eq!(app.no_hl.categories.len(), 4);
    }

    #[test]
    fn commands_config_default_matches_documented_defaults() {
        let commands = CommandsConfig::default();
        assert!(commands.tag_issues);
        assert!(!commands.tag_lowseeds);
    }
}
