//! Shared read-only context threaded through every rule.

use std::collections::BTreeMap;

use fleetkeeper_client::ClientCapability;
use fleetkeeper_config::{AppSection, ClientConfig, TrackerDetail};

/// Everything a rule needs besides the mutable [`fleetkeeper_state::WorkerState`]
/// it is folding its changes into.
pub struct RuleContext<'a> {
    /// The client capability used to issue mutations.
    pub client: &'a dyn ClientCapability,
    /// This worker's client-specific configuration.
    pub client_config: &'a ClientConfig,
    /// The global `app` configuration section.
    pub app: &'a AppSection,
    /// Tracker classification table, keyed by `"keyword|keyword"` expression.
    pub tracker_details: &'a BTreeMap<String, TrackerDetail>,
}

impl RuleContext<'_> {
    /// Find the first tracker classification entry whose OR-keyword
    /// expression has a substring match in `tracker_url`.
    #[must_use]
    pub fn match_tracker<'b>(&'b self, tracker_url: &str) -> Option<(&'b str, &'b TrackerDetail)> {
        if tracker_url.is_empty() {
            return None;
        }
        self.tracker_details.iter().find_map(|(expr, detail)| {
            expr.split('|')
                .any(|keyword| !keyword.is_empty() && tracker_url.contains(keyword))
                .then_some((expr.as_str(), detail))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetkeeper_config::HrSpec;
    use fleetkeeper_config::duration::DurationSpec;

    fn detail(tag: &str) -> TrackerDetail {
        TrackerDetail {
            tag: tag.to_string(),
            hr: Some(HrSpec {
                time: DurationSpec::Human("3d".to_string()),
                ratio: None,
                percent: None,
            }),
            category: None,
        }
    }

    #[test]
    fn matches_any_keyword_in_the_or_expression() {
        let mut table = BTreeMap::new();
        table.insert("torrentleech|tleechreload".to_string(), detail("TL"));
        let app = AppSection::default();
        let client_config_json = serde_json::json!({
            "url": "http://x", "user": "u", "password": "p"
        });
        let client_config: ClientConfig = serde_json::from_value(client_config_json).unwrap();
        let ctx = RuleContext {
            client: &NoopClient,
            client_config: &client_config,
            app: &app,
            tracker_details: &table,
        };
        let matched = ctx.match_tracker("https://tleechreload.org/announce");
        assert_eq!(matched.unwrap().1.tag, "TL");
        assert!(ctx.match_tracker("https://example.org/announce").is_none());
    }

    struct NoopClient;

    #[async_trait::async_trait]
    impl ClientCapability for NoopClient {
        async fn login(&self) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn logout(&self) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn sync(&self, _full: bool) -> fleetkeeper_client::ClientResult<fleetkeeper_client::DeltaView> {
            Ok(fleetkeeper_client::DeltaView::default())
        }
        async fn list_files(
            &self,
            _hash: &str,
        ) -> fleetkeeper_client::ClientResult<Vec<fleetkeeper_client::FileEntry>> {
            Ok(Vec::new())
        }
        async fn list_trackers(
            &self,
            _hash: &str,
        ) -> fleetkeeper_client::ClientResult<Vec<fleetkeeper_client::TrackerEntry>> {
            Ok(Vec::new())
        }
        async fn add_tags(&self, _hashes: &[String], _tag: &str) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn remove_tags(
            &self,
            _hashes: &[String],
            _tags: &[String],
        ) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn delete_tag(&self, _tag: &str) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn resume(&self, _hashes: &[String]) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn force_start(&self, _hashes: &[String]) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn enable_tmm(&self, _hashes: &[String]) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn set_share_limits(
            &self,
            _hashes: &[String],
            _ratio_limit: f64,
            _seeding_minutes: i64,
            _inactive_seeding_minutes: i64,
        ) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
        async fn set_upload_limit(
            &self,
            _hashes: &[String],
            _bytes_per_sec: i64,
        ) -> fleetkeeper_client::ClientResult<()> {
            Ok(())
        }
    }
}
