//! Share-Limit Profiler (runs after the tag rules reach a fixed point).

use std::collections::{BTreeMap, BTreeSet};

use fleetkeeper_client::{ClientResult, TorrentRecord};
use fleetkeeper_config::ShareProfileConfig;
use fleetkeeper_state::WorkerState;

use crate::context::RuleContext;
use crate::plan::TagPlan;

const DELETE_MARK_TAG: &str = "!DELETE";

fn profile_matches(profile: &ShareProfileConfig, record: &TorrentRecord) -> bool {
    if let Some(categories) = &profile.category {
        if !categories.contains(&record.category) {
            return false;
        }
    }
    if !profile
        .include_all_tags
        .iter()
        .all(|tag| record.tags.contains(tag))
    {
        return false;
    }
    if !profile.include_any_tags.is_empty()
        && !profile
            .include_any_tags
            .iter()
            .any(|tag| record.tags.contains(tag))
    {
        return false;
    }
    if !profile.exclude_all_tags.is_empty()
        && profile
            .exclude_all_tags
            .iter()
            .all(|tag| record.tags.contains(tag))
    {
        return false;
    }
    if profile
        .exclude_any_tags
        .iter()
        .any(|tag| record.tags.contains(tag))
    {
        return false;
    }
    true
}

fn profile_tag(prefix: &str, name: &str, profile: &ShareProfileConfig) -> String {
    profile
        .custom_tag
        .clone()
        .unwrap_or_else(|| format!("{prefix}{name}"))
}

/// Run the profiler over the torrents this tick's tag rules touched.
///
/// # Errors
///
/// Returns the first [`fleetkeeper_client::ClientError`] encountered.
pub async fn apply(ctx: &RuleContext<'_>, state: &mut WorkerState) -> ClientResult<()> {
    if !ctx.client_config.commands.share_limits {
        return Ok(());
    }

    let prefix = &ctx.app.share_limits_tag_prefix;

    // Every configured profile's bucket is initialized upfront, even to an
    // empty set, so a profile that matches nobody this tick still has its
    // stale tag purged in the sweep below.
    let mut apply_tag: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for (name, profile) in &ctx.client_config.share_limits {
        if profile.add_group_to_tag {
            apply_tag.insert(profile_tag(prefix, name, profile), BTreeSet::new());
        }
    }

    let hashes: Vec<String> = state.changed_last_tick().iter().cloned().collect();
    let mut plan = TagPlan::default();
    let mut resume = Vec::new();

    for hash in &hashes {
        let Some(record) = state.get(hash) else {
            continue;
        };
        if record.progress < 1.0 {
            continue;
        }

        let matched = ctx
            .client_config
            .share_limits
            .iter()
            .find(|(_, profile)| profile_matches(profile, record));

        let Some((name, profile)) = matched else {
            continue;
        };

        if profile.add_group_to_tag {
            apply_tag
                .entry(profile_tag(prefix, name, profile))
                .or_default()
                .insert(hash.clone());
        }

        let ratio_limit = profile.max_ratio.resolve();
        let seeding_minutes = profile
            .max_seeding_time
            .resolve_minutes("client.share_limits.*.max_seeding_time")
            .unwrap_or(-1);
        let up_limit_bytes = profile
            .upload_limit
            .resolve_minutes("client.share_limits.*.upload_limit")
            .unwrap_or(-1);

        let limits_differ = (record.ratio_limit - ratio_limit).abs() > f64::EPSILON
            || record.max_seeding_time != seeding_minutes
            || record.up_limit != up_limit_bytes;

        if limits_differ {
            ctx.client
                .set_share_limits(
                    std::slice::from_ref(hash),
                    ratio_limit,
                    seeding_minutes,
                    fleetkeeper_client::LIMIT_GLOBAL_DEFAULT,
                )
                .await?;
            ctx.client
                .set_upload_limit(std::slice::from_ref(hash), up_limit_bytes)
                .await?;
            if let Some(record) = state.get_mut(hash) {
                record.ratio_limit = ratio_limit;
                record.max_seeding_time = seeding_minutes;
                record.up_limit = up_limit_bytes;
            }
        }

        let inert = record.state.is_paused_or_errored();
        let hit_max = seeding_minutes > 0
            && i64::try_from(record.seeding_time / 60).unwrap_or(i64::MAX) >= seeding_minutes;

        if profile.auto_resume && inert && !hit_max {
            resume.push(hash.clone());
        }
        if profile.auto_delete && inert && hit_max {
            plan.add(DELETE_MARK_TAG, hash.clone());
        }
    }

    // Purge any currently-present share-limit tag whose torrent isn't in
    // that tag's bucket this tick — this is what clears a stale profile tag
    // when a torrent migrates or stops matching any profile at all.
    for (tag, members) in &apply_tag {
        for (hash, record) in state.torrents() {
            if record.tags.contains(tag) && !members.contains(hash) {
                plan.remove(tag.clone(), hash.clone());
            }
        }
    }
    for (tag, members) in apply_tag {
        for hash in members {
            plan.add(tag.clone(), hash);
        }
    }

    plan.apply(ctx.client, state).await?;

    if !resume.is_empty() {
        ctx.client.resume(&resume).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetkeeper_client::TorrentState::Downloading;
    use fleetkeeper_config::duration::{RatioSpec, SeedingTimeSpec};

    fn record(category: &str, tags: &[&str]) -> TorrentRecord {
        TorrentRecord {
            name: "x".to_string(),
            tracker: String::new(),
            category: category.to_string(),
            tags: tags.iter().map(|t| (*t).to_string()).collect(),
            state: Downloading,
            progress: 1.0,
            seeding_time: 0,
            ratio: 0.0,
            num_complete: 5,
            size: 100,
            downloaded: 100,
            content_path: String::new(),
            save_path: String::new(),
            auto_tmm: true,
            max_seeding_time: -1,
            ratio_limit: -1.0,
            up_limit: -1,
        }
    }

    fn profile() -> ShareProfileConfig {
        ShareProfileConfig {
            category: Some(vec!["movies".to_string()]),
            include_all_tags: Vec::new(),
            include_any_tags: Vec::new(),
            exclude_all_tags: Vec::new(),
            exclude_any_tags: Vec::new(),
            max_ratio: RatioSpec::Sentinel(-2),
            max_seeding_time: SeedingTimeSpec::Sentinel(0),
            upload_limit: SeedingTimeSpec::Sentinel(-1),
            custom_tag: None,
            add_group_to_tag: true,
            auto_resume: false,
            auto_delete: false,
        }
    }

    #[test]
    fn profile_matches_category_selector() {
        assert!(profile_matches(&profile(), &record("movies", &[])));
        assert!(!profile_matches(&profile(), &record("tv", &[])));
    }

    #[test]
    fn profile_matches_respects_exclude_any() {
        let mut profile = profile();
        profile.category = None;
        profile.exclude_any_tags = vec!["~DUPE".to_string()];
        assert!(!profile_matches(&profile, &record("movies", &["~DUPE"])));
        assert!(profile_matches(&profile, &record("movies", &[])));
    }
}
