//! HUNO seeding-tier classifier.

use fleetkeeper_client::ClientResult;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

const HAWKE_UNO_SUBSTRING: &str = "hawke.uno";
const DAY: u64 = 24 * 60 * 60;

const TIERS: [(&str, u64); 5] = [
    ("Legend", 5 * 365 * DAY),
    ("Champion", 365 * DAY),
    ("Knight", 182 * DAY),
    ("Squire", 10 * DAY),
    ("Vanguard", DAY),
];

/// Assign the highest HUNO seeding tier each torrent has reached.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<bool> {
    if !ctx.client_config.commands.tag_huno {
        return Ok(false);
    }

    let prefix = &ctx.app.huno_tag_prefix;
    let hashes: Vec<String> = state.changed_last_tick().iter().cloned().collect();
    let mut plan = TagPlan::default();

    for hash in &hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };
        if !record.tracker.contains(HAWKE_UNO_SUBSTRING) || record.seeding_time < DAY {
            continue;
        }

        let Some((tier, _)) = TIERS
            .iter()
            .find(|(_, threshold)| record.seeding_time >= *threshold)
        else {
            continue;
        };
        let target_tag = format!("{prefix}{tier}");

        for (other_tier, _) in TIERS {
            let tag = format!("{prefix}{other_tier}");
            if tag != target_tag && record.tags.contains(&tag) {
                plan.remove(tag, hash.clone());
            }
        }
        if !record.tags.contains(&target_tag) {
            plan.add(target_tag, hash.clone());
        }
    }

    plan.apply(ctx.client, state).await
}
