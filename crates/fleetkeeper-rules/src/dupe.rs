//! Cross-instance duplicate detection.
//!
//! The coordination needed to know *other* workers' hash sets, and the
//! `reacted` convergence flag that skips a worker until it has something
//! new to react to, live in the Worker crate's cross-instance registry —
//! this module is the pure per-tick computation it drives.

use std::collections::BTreeSet;

use fleetkeeper_client::ClientResult;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

/// Tag every hash this worker shares with `other_workers_hashes`, and clear
/// the tag from any hash that no longer qualifies.
///
/// `should_react` is the cross-instance coordinator's convergence guard
/// (fewer than two registered workers, or a peer hasn't completed its first
/// sync yet): when it is `false` this is a complete no-op, not a pass with
/// an empty peer set — an empty `other_workers_hashes` would otherwise read
/// as "this worker shares no torrents with anyone" and strip every existing
/// dupe tag as a false positive.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(
    ctx: &RuleContext<'_>,
    state: &mut WorkerState,
    other_workers_hashes: &BTreeSet<String>,
    should_react: bool,
) -> ClientResult<bool> {
    if !ctx.app.dupes.enabled || !should_react {
        return Ok(false);
    }

    let tag = &ctx.app.dupes.tag;
    let my_hashes = state.hashes();
    let dupes: BTreeSet<String> = my_hashes
        .intersection(other_workers_hashes)
        .cloned()
        .collect();

    let mut plan = TagPlan::default();
    for hash in &my_hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };
        let is_dupe = dupes.contains(hash);
        let has_tag = record.tags.contains(tag);
        if is_dupe && !has_tag {
            plan.add(tag.clone(), hash.clone());
        } else if !is_dupe && has_tag {
            plan.remove(tag.clone(), hash.clone());
        }
    }

    plan.apply(ctx.client, state).await
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use fleetkeeper_client::{ClientCapability, ClientResult, DeltaView, FileEntry, TorrentRecordDelta, TrackerEntry};
    use fleetkeeper_config::{AppSection, ClientConfig};

    use super::*;

    struct NoopClient;

    #[async_trait::async_trait]
    impl ClientCapability for NoopClient {
        async fn login(&self) -> ClientResult<()> {
            Ok(())
        }
        async fn logout(&self) -> ClientResult<()> {
            Ok(())
        }
        async fn sync(&self, _full: bool) -> ClientResult<DeltaView> {
            Ok(DeltaView::default())
        }
        async fn list_files(&self, _hash: &str) -> ClientResult<Vec<FileEntry>> {
            Ok(Vec::new())
        }
        async fn list_trackers(&self, _hash: &str) -> ClientResult<Vec<TrackerEntry>> {
            Ok(Vec::new())
        }
        async fn add_tags(&self, _hashes: &[String], _tag: &str) -> ClientResult<()> {
            panic!("should_react=false must not issue any client mutation");
        }
        async fn remove_tags(&self, _hashes: &[String], _tags: &[String]) -> ClientResult<()> {
            panic!("should_react=false must not issue any client mutation");
        }
        async fn delete_tag(&self, _tag: &str) -> ClientResult<()> {
            Ok(())
        }
        async fn resume(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }
        async fn force_start(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }
        async fn enable_tmm(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }
        async fn set_share_limits(
            &self,
            _hashes: &[String],
            _ratio_limit: f64,
            _seeding_minutes: i64,
            _inactive_seeding_minutes: i64,
        ) -> ClientResult<()> {
            Ok(())
        }
        async fn set_upload_limit(&self, _hashes: &[String], _bytes_per_sec: i64) -> ClientResult<()> {
            Ok(())
        }
    }

    fn client_config() -> ClientConfig {
        let json = serde_json::json!({"url": "http://x", "user": "u", "password": "p"});
        serde_json::from_value(json).unwrap()
    }

    fn state_with_tagged_hash(tag: &str) -> WorkerState {
        let record = TorrentRecordDelta {
            name: Some("A".to_string()),
            tracker: Some(String::new()),
            category: Some(String::new()),
            tags: Some([tag.to_string()].into_iter().collect()),
            state: Some(fleetkeeper_client::TorrentState::Downloading),
            progress: Some(1.0),
            seeding_time: Some(0),
            ratio: Some(0.0),
            num_complete: Some(1),
            size: Some(0),
            downloaded: Some(0),
            content_path: Some(String::new()),
            save_path: Some(String::new()),
            auto_tmm: Some(false),
            max_seeding_time: Some(-1),
            ratio_limit: Some(-1.0),
            up_limit: Some(-1),
        };
        let mut torrents = BTreeMap::new();
        torrents.insert("a".to_string(), record);
        let mut state = WorkerState::new();
        state.apply_delta(DeltaView {
            full_update: true,
            torrents,
            ..DeltaView::default()
        });
        state
    }

    #[tokio::test]
    async fn should_react_false_leaves_existing_dupe_tags_untouched() {
        let app = AppSection::default();
        let client_config = client_config();
        let ctx = RuleContext {
            client: &NoopClient,
            client_config: &client_config,
            app: &app,
            tracker_details: &BTreeMap::new(),
        };
        let mut state = state_with_tagged_hash(&app.dupes.tag);

        // No peer has synced yet: an empty other_workers_hashes must not be
        // read as "no overlap, clear every dupe tag".
        let changed = apply(&ctx, &mut state, &BTreeSet::new(), false)
            .await
            .expect("no-op guard never touches the client");

        assert!(!changed);
        assert!(state.get("a").unwrap().tags.contains(&app.dupes.tag));
    }

    #[tokio::test]
    async fn should_react_true_tags_genuine_overlap() {
        let app = AppSection::default();
        let client_config = client_config();
        let ctx = RuleContext {
            client: &StubClient::default(),
            client_config: &client_config,
            app: &app,
            tracker_details: &BTreeMap::new(),
        };
        let mut state = state_with_tagged_hash("unrelated");
        let other_hashes: BTreeSet<String> = ["a".to_string()].into_iter().collect();

        let changed = apply(&ctx, &mut state, &other_hashes, true)
            .await
            .expect("apply succeeds");

        assert!(changed);
        assert!(state.get("a").unwrap().tags.contains(&app.dupes.tag));
    }

    #[derive(Default)]
    struct StubClient;

    #[async_trait::async_trait]
    impl ClientCapability for StubClient {
        async fn login(&self) -> ClientResult<()> {
            Ok(())
        }
        async fn logout(&self) -> ClientResult<()> {
            Ok(())
        }
        async fn sync(&self, _full: bool) -> ClientResult<DeltaView> {
            Ok(DeltaView::default())
        }
        async fn list_files(&self, _hash: &str) -> ClientResult<Vec<FileEntry>> {
            Ok(Vec::new())
        }
        async fn list_trackers(&self, _hash: &str) -> ClientResult<Vec<TrackerEntry>> {
            Ok(Vec::new())
        }
        async fn add_tags(&self, _hashes: &[String], _tag: &str) -> ClientResult<()> {
            Ok(())
        }
        async fn remove_tags(&self, _hashes: &[String], _tags: &[String]) -> ClientResult<()> {
            Ok(())
        }
        async fn delete_tag(&self, _tag: &str) -> ClientResult<()> {
            Ok(())
        }
        async fn resume(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }
        async fn force_start(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }
        async fn enable_tmm(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }
        async fn set_share_limits(
            &self,
            _hashes: &[String],
            _ratio_limit: f64,
            _seeding_minutes: i64,
            _inactive_seeding_minutes: i64,
        ) -> ClientResult<()> {
            Ok(())
        }
        async fn set_upload_limit(&self, _hashes: &[String], _bytes_per_sec: i64) -> ClientResult<()> {
            Ok(())
        }
    }
}
