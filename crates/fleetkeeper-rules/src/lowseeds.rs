//! Low-seed-count tagging.

use fleetkeeper_client::ClientResult;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

/// Tag or clear the low-seeds tag for every actively-managed torrent
/// touched this tick.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<bool> {
    if !ctx.client_config.commands.tag_lowseeds {
        return Ok(false);
    }

    let section = &ctx.app.lowseeds;
    let hashes: Vec<String> = state.changed_last_tick().iter().cloned().collect();
    let mut plan = TagPlan::default();

    for hash in &hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };
        if record.state.is_paused_or_errored() {
            continue;
        }

        let has_tag = record.tags.contains(&section.tag);
        if record.num_complete < section.min_seeds {
            if !has_tag {
                plan.add(section.tag.clone(), hash.clone());
            }
        } else if has_tag {
            plan.remove(section.tag.clone(), hash.clone());
        }
    }

    plan.apply(ctx.client, state).await
}
