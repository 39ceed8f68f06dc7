//! Tag rename table: migrate torrents off a retired tag name.

use fleetkeeper_client::ClientResult;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;

/// For every configured `old_tag -> new_tag` mapping that is still present
/// in the instance's known tag set, migrate every holder and delete
/// `old_tag` client-wide.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<bool> {
    if !ctx.client_config.commands.tag_rename {
        return Ok(false);
    }

    let mut changed = false;

    for (old_tag, new_tag) in ctx.app.tag_renamer.clone() {
        if !state.known_tags().contains(&old_tag) {
            continue;
        }

        let holders: Vec<String> = state
            .torrents()
            .iter()
            .filter(|(_, record)| record.tags.contains(&old_tag))
            .map(|(hash, _)| hash.clone())
            .collect();

        if !holders.is_empty() {
            ctx.client.add_tags(&holders, &new_tag).await?;
            for hash in &holders {
                if let Some(record) = state.get_mut(hash) {
                    record.tags.insert(new_tag.clone());
                }
            }
        }

        ctx.client.delete_tag(&old_tag).await?;
        for hash in &holders {
            if let Some(record) = state.get_mut(hash) {
                record.tags.remove(&old_tag);
            }
        }
        changed = true;
    }

    Ok(changed)
}
