//! Per-instance state store: the accumulated torrent catalogue plus the
//! most recent delta, kept up to date by repeated calls to
//! [`WorkerState::apply_delta`].

use std::collections::BTreeMap;
use std::collections::BTreeSet;
use std::time::SystemTime;

use fleetkeeper_client::{DeltaView, TorrentRecord, TorrentRecordDelta};

use crate::merge::{FieldDelta, SetPatch};

/// The merged view of a single client instance's torrents, tags and
/// categories, plus bookkeeping for the most recent sync.
///
/// Invariants: every hash in [`WorkerState::torrents`] is the same hash
/// reported by the client in the most recent delta or earlier; a hash is
/// only present if the client has not reported it removed; `rid` only ever
/// increases within a login session; a full sync discards every prior
/// record.
#[derive(Debug, Default, Clone)]
pub struct WorkerState {
    torrents: BTreeMap<String, TorrentRecord>,
    known_tags: BTreeSet<String>,
    known_categories: BTreeSet<String>,
    rid: u64,
    last_full_sync_time: Option<SystemTime>,
    changed_last_tick: BTreeSet<String>,
    removed_last_tick: BTreeSet<String>,
}

impl WorkerState {
    /// An empty store, as it exists before the first sync.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Merge a delta into the store.
    ///
    /// A full delta (`full_update`) discards every prior record and
    /// replaces the catalogue wholesale, treating every reported torrent as
    /// complete. An incremental delta merges each named torrent field by
    /// field onto whatever is already stored for that hash — a field the
    /// delta didn't report is left untouched rather than reset to a
    /// default — then applies removals. The merge is infallible by
    /// construction: a malformed delta can only under- or over-populate the
    /// catalogue, never panic.
    pub fn apply_delta(&mut self, delta: DeltaView) {
        self.changed_last_tick = delta.torrents.keys().cloned().collect();
        self.removed_last_tick = delta.torrents_removed.iter().cloned().collect();

        if delta.full_update {
            self.torrents = delta
                .torrents
                .into_iter()
                .map(|(hash, partial)| (hash, partial.into_full_record()))
                .collect();
            self.last_full_sync_time = Some(SystemTime::now());
        } else {
            for (hash, partial) in delta.torrents {
                let merged = match self.torrents.remove(&hash) {
                    Some(current) => merge_record(current, partial),
                    None => partial.into_full_record(),
                };
                self.torrents.insert(hash, merged);
            }
            for hash in &delta.torrents_removed {
                self.torrents.remove(hash);
            }
        }

        self.recompute_known_sets();
        for tag in &delta.tags_removed {
            self.known_tags.remove(tag);
        }
        for category in &delta.categories_removed {
            self.known_categories.remove(category);
        }

        self.rid = delta.rid;
    }

    fn recompute_known_sets(&mut self) {
        self.known_tags = self
            .torrents
            .values()
            .flat_map(|record| record.tags.iter().cloned())
            .collect();
        self.known_categories = self
            .torrents
            .values()
            .map(|record| record.category.clone())
            .filter(|category| !category.is_empty())
            .collect();
    }

    /// All torrents currently tracked, keyed by content hash.
    #[must_use]
    pub const fn torrents(&self) -> &BTreeMap<String, TorrentRecord> {
        &self.torrents
    }

    /// The set of distinct hashes this worker currently tracks.
    #[must_use]
    pub fn hashes(&self) -> BTreeSet<String> {
        self.torrents.keys().cloned().collect()
    }

    /// Every tag attached to at least one currently-tracked torrent.
    #[must_use]
    pub const fn known_tags(&self) -> &BTreeSet<String> {
        &self.known_tags
    }

    /// Every non-empty category assigned to at least one currently-tracked
    /// torrent.
    #[must_use]
    pub const fn known_categories(&self) -> &BTreeSet<String> {
        &self.known_categories
    }

    /// The most recent `rid` observed, monotonically increasing within a
    /// login session.
    #[must_use]
    pub const fn rid(&self) -> u64 {
        self.rid
    }

    /// When the last full sync landed, if any.
    #[must_use]
    pub const fn last_full_sync_time(&self) -> Option<SystemTime> {
        self.last_full_sync_time
    }

    /// Hashes whose record was added or updated by the most recently
    /// applied delta. The Rule Engine reads this to build each rule's
    /// filtered slice instead of re-scanning the whole catalogue every
    /// tick.
    #[must_use]
    pub const fn changed_last_tick(&self) -> &BTreeSet<String> {
        &self.changed_last_tick
    }

    /// Hashes the most recently applied delta reported as removed.
    #[must_use]
    pub const fn removed_last_tick(&self) -> &BTreeSet<String> {
        &self.removed_last_tick
    }

    /// Look up a single torrent record by hash.
    #[must_use]
    pub fn get(&self, hash: &str) -> Option<&TorrentRecord> {
        self.torrents.get(hash)
    }

    /// Look up a single torrent record by hash, mutably.
    ///
    /// The Rule Engine uses this to apply a tag mutation to its own copy of
    /// a record immediately after issuing the matching client call, so a
    /// later rule in the same fixed-point pass observes the change without
    /// waiting for the next sync.
    pub fn get_mut(&mut self, hash: &str) -> Option<&mut TorrentRecord> {
        self.torrents.get_mut(hash)
    }
}

/// Fold a partial delta onto an already-stored record, field by field.
/// `tags` is the one set-valued field; the delta reports a torrent's full
/// current tag list whenever it reports tags at all, so `Set` (wholesale
/// replacement) is the right merge mode rather than `Merged`.
fn merge_record(current: TorrentRecord, partial: TorrentRecordDelta) -> TorrentRecord {
    let tags_delta: FieldDelta<SetPatch<String>> = partial.tags.map(SetPatch::adding).into();
    TorrentRecord {
        name: FieldDelta::from(partial.name).apply_scalar(current.name),
        tracker: FieldDelta::from(partial.tracker).apply_scalar(current.tracker),
        category: FieldDelta::from(partial.category).apply_scalar(current.category),
        tags: tags_delta.apply_set(current.tags),
        state: FieldDelta::from(partial.state).apply_scalar(current.state),
        progress: FieldDelta::from(partial.progress).apply_scalar(current.progress),
        seeding_time: FieldDelta::from(partial.seeding_time).apply_scalar(current.seeding_time),
        ratio: FieldDelta::from(partial.ratio).apply_scalar(current.ratio),
        num_complete: FieldDelta::from(partial.num_complete).apply_scalar(current.num_complete),
        size: FieldDelta::from(partial.size).apply_scalar(current.size),
        downloaded: FieldDelta::from(partial.downloaded).apply_scalar(current.downloaded),
        content_path: FieldDelta::from(partial.content_path).apply_scalar(current.content_path),
        save_path: FieldDelta::from(partial.save_path).apply_scalar(current.save_path),
        auto_tmm: FieldDelta::from(partial.auto_tmm).apply_scalar(current.auto_tmm),
        max_seeding_time: FieldDelta::from(partial.max_seeding_time).apply_scalar(current.max_seeding_time),
        ratio_limit: FieldDelta::from(partial.ratio_limit).apply_scalar(current.ratio_limit),
        up_limit: FieldDelta::from(partial.up_limit).apply_scalar(current.up_limit),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetkeeper_client::TorrentState;

    /// A complete partial delta, as a genuine first-sighting or full sync
    /// would report for every field.
    fn full_record(name: &str) -> TorrentRecordDelta {
        TorrentRecordDelta {
            name: Some(name.to_string()),
            tracker: Some(String::new()),
            category: Some("movies".to_string()),
            tags: Some(BTreeSet::new()),
            state: Some(TorrentState::Downloading),
            progress: Some(0.5),
            seeding_time: Some(0),
            ratio: Some(0.0),
            num_complete: Some(3),
            size: Some(100),
            downloaded: Some(50),
            content_path: Some(String::new()),
            save_path: Some(String::new()),
            auto_tmm: Some(true),
            max_seeding_time: Some(-1),
            ratio_limit: Some(-1.0),
            up_limit: Some(-1),
        }
    }

    fn delta(full_update: bool, torrents: Vec<(&str, TorrentRecordDelta)>) -> DeltaView {
        DeltaView {
            full_update,
            torrents: torrents
                .into_iter()
                .map(|(hash, record)| (hash.to_string(), record))
                .collect(),
            torrents_removed: Vec::new(),
            tags_removed: Vec::new(),
            categories_removed: Vec::new(),
            rid: 1,
        }
    }

    #[test]
    fn full_update_discards_prior_records() {
        let mut state = WorkerState::new();
        state.apply_delta(delta(true, vec![("a", full_record("A"))]));
        assert!(state.get("a").is_some());

        let mut next = delta(true, vec![("b", full_record("B"))]);
        next.rid = 2;
        state.apply_delta(next);

        assert!(state.get("a").is_none());
        assert!(state.get("b").is_some());
        assert_eq!(state.rid(), 2);
    }

    #[test]
    fn incremental_update_merges_without_discarding_others() {
        let mut state = WorkerState::new();
        state.apply_delta(delta(
            true,
            vec![("a", full_record("A")), ("b", full_record("B"))],
        ));

        let mut incremental = delta(
            false,
            vec![(
                "a",
                TorrentRecordDelta {
                    name: Some("A-updated".to_string()),
                    ..TorrentRecordDelta::default()
                },
            )],
        );
        incremental.rid = 2;
        state.apply_delta(incremental);

        assert_eq!(state.get("a").unwrap().name, "A-updated");
        assert!(state.get("b").is_some());
    }

    #[test]
    fn incremental_update_leaves_fields_the_delta_did_not_report_untouched() {
        let mut state = WorkerState::new();
        state.apply_delta(delta(true, vec![("a", full_record("A"))]));
        assert_eq!(state.get("a").unwrap().num_complete, 3);
        assert_eq!(state.get("a").unwrap().category, "movies");

        // A genuine incremental sync only reports the field that changed.
        let mut incremental = delta(
            false,
            vec![(
                "a",
                TorrentRecordDelta {
                    ratio: Some(2.0),
                    ..TorrentRecordDelta::default()
                },
            )],
        );
        incremental.rid = 2;
        state.apply_delta(incremental);

        let record = state.get("a").unwrap();
        assert_eq!(record.ratio, 2.0);
        // Untouched fields must survive, not reset to their defaults.
        assert_eq!(record.name, "A");
        assert_eq!(record.category, "movies");
        assert_eq!(record.num_complete, 3);
    }

    #[test]
    fn removed_hash_drops_the_record() {
        let mut state = WorkerState::new();
        state.apply_delta(delta(true, vec![("a", full_record("A"))]));

        let mut removal = delta(false, vec![]);
        removal.torrents_removed = vec!["a".to_string()];
        state.apply_delta(removal);

        assert!(state.get("a").is_none());
        assert!(state.removed_last_tick().contains("a"));
    }

    #[test]
    fn tags_removed_clears_known_tags_even_if_a_torrent_still_lists_it() {
        let mut with_tag = full_record("A");
        with_tag.tags = Some(["stale".to_string()].into_iter().collect());
        let mut state = WorkerState::new();
        state.apply_delta(delta(true, vec![("a", with_tag)]));
        assert!(state.known_tags().contains("stale"));

        let mut removal = delta(false, vec![]);
        removal.tags_removed = vec!["stale".to_string()];
        state.apply_delta(removal);
        assert!(!state.known_tags().contains("stale"));
    }

    #[test]
    fn changed_last_tick_reflects_only_the_most_recent_delta() {
        let mut state = WorkerState::new();
        state.apply_delta(delta(
            true,
            vec![("a", full_record("A")), ("b", full_record("B"))],
        ));
        assert_eq!(state.changed_last_tick().len(), 2);

        let mut incremental = delta(
            false,
            vec![(
                "a",
                TorrentRecordDelta {
                    name: Some("A-2".to_string()),
                    ..TorrentRecordDelta::default()
                },
            )],
        );
        incremental.rid = 2;
        state.apply_delta(incremental);
        assert_eq!(state.changed_last_tick().len(), 1);
        assert!(state.changed_last_tick().contains("a"));
    }
}
