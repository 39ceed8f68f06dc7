//! The hit-and-run classifier.

use fleetkeeper_client::{ClientResult, TorrentState};
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

/// Apply or clear the H&R tag for every torrent touched this tick, and
/// collect paused/errored unsatisfied torrents for auto-resume.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<bool> {
    if !ctx.client_config.commands.tag_hr {
        return Ok(false);
    }

    let hr = &ctx.app.hr;
    let extra_seed_secs = hr
        .extra_seed_time
        .resolve("app.hr.extra_seed_time")
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let hashes: Vec<String> = state.changed_last_tick().iter().cloned().collect();
    let mut plan = TagPlan::default();
    let mut autostart = Vec::new();

    for hash in &hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };

        let spec = ctx
            .match_tracker(&record.tracker)
            .and_then(|(_, detail)| detail.hr.as_ref());

        let satisfied = match spec {
            None => true,
            Some(spec) => {
                let req_secs = spec
                    .time
                    .resolve("tracker_details.*.hr.time")
                    .map(|d| d.as_secs())
                    .unwrap_or(u64::MAX);
                let seeded_enough = record.seeding_time > req_secs.saturating_add(extra_seed_secs);
                let ratio_enough = spec
                    .ratio
                    .is_some_and(|required| record.ratio > required + hr.extra_ratio);
                let xseed_exempt = hr.exclude_xseed && record.downloaded == 0;
                #[allow(clippy::cast_precision_loss)]
                let percent_exempt = spec.percent.is_some_and(|percent| {
                    (record.downloaded as f64) < percent / 100.0 * record.size as f64
                });
                seeded_enough || ratio_enough || xseed_exempt || percent_exempt
            }
        };

        let has_tag = record.tags.contains(&hr.tag);
        if satisfied {
            if has_tag {
                plan.remove(hr.tag.clone(), hash.clone());
            }
        } else {
            if !has_tag {
                plan.add(hr.tag.clone(), hash.clone());
            }
            // Narrower than the general paused-or-errored check: only a
            // torrent actually paused-after-completion or errored is worth
            // force-starting back into seeding.
            if matches!(record.state, TorrentState::PausedUp | TorrentState::Error) {
                autostart.push(hash.clone());
            }
        }
    }

    let mut changed = plan.apply(ctx.client, state).await?;
    if hr.autostart && !autostart.is_empty() {
        ctx.client.resume(&autostart).await?;
        changed = true;
    }
    Ok(changed)
}
