//! Automatic torrent management (TMM) tagging.

use fleetkeeper_client::ClientResult;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

/// Tag torrents with automatic management disabled, or auto-enable it when
/// the client is configured to do so instead of tagging.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<bool> {
    if !ctx.client_config.commands.scan_no_tmm {
        return Ok(false);
    }

    let section = &ctx.app.no_tmm;
    let hashes: Vec<String> = state.changed_last_tick().iter().cloned().collect();
    let mut plan = TagPlan::default();
    let mut enable = Vec::new();

    for hash in &hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };

        let exempt = record.auto_tmm
            || section
                .ignored_categories
                .iter()
                .any(|category| category == &record.category)
            || section
                .ignored_tags
                .iter()
                .any(|tag| record.tags.contains(tag));

        if exempt {
            if record.tags.contains(&section.tag) {
                plan.remove(section.tag.clone(), hash.clone());
            }
            continue;
        }

        if section.auto_enable {
            enable.push(hash.clone());
        } else if !record.tags.contains(&section.tag) {
            plan.add(section.tag.clone(), hash.clone());
        }
    }

    let mut changed = plan.apply(ctx.client, state).await?;
    if !enable.is_empty() {
        ctx.client.enable_tmm(&enable).await?;
        for hash in &enable {
            if let Some(record) = state.get_mut(hash) {
                record.auto_tmm = true;
            }
        }
        changed = true;
    }
    Ok(changed)
}
