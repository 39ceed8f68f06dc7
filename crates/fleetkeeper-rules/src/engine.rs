//! Orchestration of a single tag tick: the fixed-point tag-rule pass
//! followed by the share-limit profiler.

use std::collections::BTreeSet;

use fleetkeeper_client::ClientResult;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::{dupe, hr, huno, issue, lowseeds, profiler, rename, tmm, tracker_tag};

/// Run every tag rule, in order, until a pass produces no changes, then run
/// the share-limit profiler once.
///
/// `other_workers_hashes` is the union of every other worker's current
/// torrent hashes, supplied by the cross-instance coordinator. `should_react`
/// is that same coordinator's convergence guard: when `false` (fewer than
/// two registered workers, or a peer hasn't completed its first sync yet)
/// the dupe pass is skipped entirely rather than run against an empty peer
/// set, which would read as "no overlap" and strip every existing dupe tag.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered; rule
/// order is not reattempted after an error, matching the "idempotent,
/// converges next tick" cancellation model.
pub async fn run_tag_tick(
    ctx: &RuleContext<'_>,
    state: &mut WorkerState,
    other_workers_hashes: &BTreeSet<String>,
    should_react: bool,
) -> ClientResult<()> {
    loop {
        let mut any_changed = false;
        any_changed |= tracker_tag::apply(ctx, state).await?;
        any_changed |= hr::apply(ctx, state).await?;
        any_changed |= huno::apply(ctx, state).await?;
        any_changed |= lowseeds::apply(ctx, state).await?;
        any_changed |= tmm::apply(ctx, state).await?;
        any_changed |= issue::apply(ctx, state).await?;
        any_changed |= rename::apply(ctx, state).await?;
        any_changed |= dupe::apply(ctx, state, other_workers_hashes, should_react).await?;

        if !any_changed {
            break;
        }
    }

    profiler::apply(ctx, state).await
}
