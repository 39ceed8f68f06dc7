//! Tracker-health issue tagging.

use fleetkeeper_client::{ClientResult, TrackerStatus};
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

/// Query each touched torrent's tracker health and tag/clear accordingly.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<bool> {
    if !ctx.client_config.commands.tag_issues {
        return Ok(false);
    }

    let tag = ctx.app.issue.tag.clone();
    let hashes: Vec<String> = state.changed_last_tick().iter().cloned().collect();
    let mut plan = TagPlan::default();

    for hash in &hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };
        if record.state.is_paused_or_errored() {
            if record.tags.contains(&tag) {
                plan.remove(tag.clone(), hash.clone());
            }
            continue;
        }

        let trackers = ctx.client.list_trackers(hash).await?;
        let healthy = trackers.iter().any(|entry| {
            !matches!(
                entry.status,
                TrackerStatus::NotContacted | TrackerStatus::Disabled
            )
        });

        let has_tag = record.tags.contains(&tag);
        if healthy && has_tag {
            plan.remove(tag.clone(), hash.clone());
        } else if !healthy && !has_tag {
            plan.add(tag.clone(), hash.clone());
        }
    }

    plan.apply(ctx.client, state).await
}
