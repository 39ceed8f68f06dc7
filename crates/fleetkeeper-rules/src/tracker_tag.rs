//! The tracker-tag classifier: the first rule run in every tag tick.

use std::collections::BTreeSet;

use fleetkeeper_client::ClientResult;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

const DEFAULT_KEY: &str = "default";

/// Classify every torrent touched this tick against the tracker table.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<bool> {
    if !ctx.client_config.commands.tag_trackers {
        return Ok(false);
    }

    let hashes: Vec<String> = state.changed_last_tick().iter().cloned().collect();
    let mut plan = TagPlan::default();

    for hash in &hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };
        if record.tracker.is_empty() {
            continue;
        }

        let mut good_tags = BTreeSet::new();
        let mut bad_tags = BTreeSet::new();
        let mut any_non_default_match = false;

        for (expr, detail) in ctx.tracker_details {
            if expr == DEFAULT_KEY {
                continue;
            }
            let matches = expr
                .split('|')
                .any(|keyword| !keyword.is_empty() && record.tracker.contains(keyword));
            if matches {
                good_tags.insert(detail.tag.clone());
                any_non_default_match = true;
            } else if record.tags.contains(&detail.tag) {
                bad_tags.insert(detail.tag.clone());
            }
        }

        for tag in &good_tags {
            if !record.tags.contains(tag) {
                plan.add(tag.clone(), hash.clone());
            }
        }
        for tag in bad_tags.difference(&good_tags) {
            plan.remove(tag.clone(), hash.clone());
        }

        if let Some(default_detail) = ctx.tracker_details.get(DEFAULT_KEY) {
            let has_default = record.tags.contains(&default_detail.tag);
            if any_non_default_match {
                if has_default {
                    plan.remove(default_detail.tag.clone(), hash.clone());
                }
            } else if !has_default {
                plan.add(default_detail.tag.clone(), hash.clone());
            }
        }
    }

    plan.apply(ctx.client, state).await
}
