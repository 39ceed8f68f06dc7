//! Disk-hygiene tasks for local client instances: the noHL scan, orphan
//! quarantine, orphan pruning and empty-directory sweep.
//!
//! Every mutation here honors the per-client `dryrun` flag: when set, the
//! intended action is logged and nothing on disk (or at the client) changes.
//! Filesystem tree walks run via `spawn_blocking` so they never stall the
//! worker's own async task scheduling.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use fleetkeeper_client::ClientCapability;
use fleetkeeper_config::{AppSection, ClientConfig};
use fleetkeeper_fsops::{
    build_inode_map, classify, has_outer_links, move_to_orphan, prune_older_than,
    remove_empty_dirs, PathKind, PathTranslator,
};
use fleetkeeper_rules::TagPlan;
use fleetkeeper_state::WorkerState;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{WorkerError, WorkerResult};

/// Orphan counts above this threshold force dry-run for the whole quarantine
/// pass rather than moving hundreds of files on a single misconfiguration;
/// an addition over the source, which carried the same intent as a
/// disabled/commented check.
const ORPHAN_SAFETY_THRESHOLD: usize = 50;

/// Run every disk task enabled for one local client. Returns whether any
/// tag-affecting mutation was issued (only the noHL tag can do this), so the
/// caller can fire a one-shot tag tick afterward.
///
/// # Errors
///
/// Returns [`WorkerError::Transport`] if a client call fails,
/// [`WorkerError::Disk`] if a filesystem primitive fails outside the
/// per-file sweeps' own logged-and-continue handling, [`WorkerError::Config`]
/// if a duration value fails to resolve, or [`WorkerError::Join`] if a
/// blocking filesystem task panics.
pub async fn run(
    worker: &str,
    client: &dyn ClientCapability,
    client_config: &ClientConfig,
    app: &AppSection,
    translator: &PathTranslator,
    state: &mut WorkerState,
) -> WorkerResult<bool> {
    let Some(folders) = client_config.folders.clone() else {
        return Ok(false);
    };

    let root = translator.translate(&folders.root_path);
    let mut tag_changed = false;

    if client_config.commands.tag_no_hl {
        tag_changed |= run_no_hl_scan(
            worker,
            client,
            app,
            translator,
            &root,
            client_config.dryrun,
            state,
        )
        .await?;
    } else {
        tag_changed |= clear_no_hl_tag(worker, client, app, client_config.dryrun, state).await?;
    }

    if client_config.commands.clean_orphaned {
        quarantine_orphans(
            worker,
            client,
            translator,
            &folders,
            &root,
            client_config.dryrun,
            state,
        )
        .await?;
    }

    if client_config.commands.prune_orphaned {
        run_prune(worker, app, translator, &folders, client_config.dryrun).await?;
    }

    if client_config.commands.delete_empty_dirs {
        if client_config.dryrun {
            info!(worker, path = %root.display(), "dry-run: would sweep empty directories");
        } else {
            let root_owned = root.clone();
            spawn_blocking_disk(worker, "empty_dirs.sweep", move || {
                remove_empty_dirs(&root_owned);
            })
            .await?;
        }
    }

    Ok(tag_changed)
}

async fn run_no_hl_scan(
    worker: &str,
    client: &dyn ClientCapability,
    app: &AppSection,
    translator: &PathTranslator,
    root: &Path,
    dryrun: bool,
    state: &mut WorkerState,
) -> WorkerResult<bool> {
    let root_owned = root.to_path_buf();
    let inode_map = spawn_blocking_disk(worker, "no_hl.build_inode_map", move || {
        build_inode_map(&root_owned)
    })
    .await?;

    let tag = app.no_hl.tag.clone();
    let categories: BTreeSet<&str> = app.no_hl.categories.iter().map(String::as_str).collect();
    let mut plan = TagPlan::default();

    for hash in state.hashes() {
        let Some(record) = state.get(&hash) else {
            continue;
        };
        let has_tag = record.tags.contains(&tag);
        let in_scope =
            categories.contains(record.category.as_str()) && (record.progress - 1.0).abs() < f64::EPSILON;

        if !in_scope {
            if has_tag {
                plan.remove(tag.clone(), hash.clone());
            }
            continue;
        }

        let translated = translator.translate(&record.content_path);
        if classify(&translated) == PathKind::Missing {
            warn!(worker, hash, path = %translated.display(), "noHL scan: content path missing");
            continue;
        }

        let has_outer = has_outer_links(&translated, &inode_map).map_err(|source| WorkerError::Disk {
            worker: worker.to_string(),
            operation: "no_hl.has_outer_links",
            source,
        })?;

        if has_outer && has_tag {
            plan.remove(tag.clone(), hash.clone());
        } else if !has_outer && !has_tag {
            plan.add(tag.clone(), hash.clone());
        }
    }

    apply_tag_plan(worker, client, plan, dryrun, state).await
}

/// Cleanup pass: once the noHL command is disabled, strip any `noHL_tag`
/// still carried by torrents, since the scan that would otherwise keep it
/// current no longer runs.
async fn clear_no_hl_tag(
    worker: &str,
    client: &dyn ClientCapability,
    app: &AppSection,
    dryrun: bool,
    state: &mut WorkerState,
) -> WorkerResult<bool> {
    let tag = app.no_hl.tag.clone();
    let mut plan = TagPlan::default();
    for (hash, record) in state.torrents() {
        if record.tags.contains(&tag) {
            plan.remove(tag.clone(), hash.clone());
        }
    }
    apply_tag_plan(worker, client, plan, dryrun, state).await
}

async fn apply_tag_plan(
    worker: &str,
    client: &dyn ClientCapability,
    plan: TagPlan,
    dryrun: bool,
    state: &mut WorkerState,
) -> WorkerResult<bool> {
    if plan.is_empty() {
        return Ok(false);
    }
    if dryrun {
        info!(worker, "dry-run: would apply noHL tag plan");
        return Ok(false);
    }
    plan.apply(client, state)
        .await
        .map_err(|source| WorkerError::Transport {
            worker: worker.to_string(),
            operation: "no_hl.apply_tags",
            source,
        })
}

async fn quarantine_orphans(
    worker: &str,
    client: &dyn ClientCapability,
    translator: &PathTranslator,
    folders: &fleetkeeper_config::FoldersConfig,
    root: &Path,
    dryrun: bool,
    state: &mut WorkerState,
) -> WorkerResult<()> {
    let orphaned_path = translator.translate(&folders.orphaned_path);
    let ignored_path = folders
        .orphaned_ignored
        .as_ref()
        .map(|path| translator.translate(path));

    let mut referenced: BTreeSet<PathBuf> = BTreeSet::new();
    for (hash, record) in state.torrents() {
        let translated_content = translator.translate(&record.content_path);
        match classify(&translated_content) {
            PathKind::File => {
                referenced.insert(translated_content);
            }
            PathKind::Dir => {
                let files = client.list_files(hash).await.map_err(|source| WorkerError::Transport {
                    worker: worker.to_string(),
                    operation: "orphans.list_files",
                    source,
                })?;
                for file in files {
                    let candidate = format!(
                        "{}/{}",
                        record.content_path.trim_end_matches('/'),
                        file.name
                    );
                    referenced.insert(translator.translate(&candidate));
                }
            }
            PathKind::Missing => {}
        }
    }

    let root_owned = root.to_path_buf();
    let orphaned_owned = orphaned_path.clone();
    let disk_files = spawn_blocking_disk(worker, "orphans.walk_disk", move || {
        list_files_excluding(&root_owned, &orphaned_owned, ignored_path.as_deref())
    })
    .await?;

    let orphans: Vec<PathBuf> = disk_files
        .into_iter()
        .filter(|path| !referenced.contains(path))
        .collect();

    if orphans.is_empty() {
        return Ok(());
    }

    if orphans.len() > ORPHAN_SAFETY_THRESHOLD {
        info!(
            worker,
            count = orphans.len(),
            "Found {} orphans. Enforcing dry-run!",
            orphans.len()
        );
        return Ok(());
    }

    if dryrun {
        info!(worker, count = orphans.len(), "dry-run: would quarantine orphaned files");
        return Ok(());
    }

    for file in orphans {
        let root_owned = root.to_path_buf();
        let orphaned_owned = orphaned_path.clone();
        let file_owned = file.clone();
        spawn_blocking_disk(worker, "orphans.move_to_orphan", move || {
            move_to_orphan(&root_owned, &orphaned_owned, &file_owned)
        })
        .await?
        .map_err(|source| WorkerError::Disk {
            worker: worker.to_string(),
            operation: "orphans.move_to_orphan",
            source,
        })?;
    }

    Ok(())
}

fn list_files_excluding(root: &Path, orphaned: &Path, ignored: Option<&Path>) -> Vec<PathBuf> {
    WalkDir::new(root)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| !path.starts_with(orphaned))
        .filter(|path| ignored.is_none_or(|ignored| !path.starts_with(ignored)))
        .collect()
}

async fn run_prune(
    worker: &str,
    app: &AppSection,
    translator: &PathTranslator,
    folders: &fleetkeeper_config::FoldersConfig,
    dryrun: bool,
) -> WorkerResult<()> {
    let orphaned = translator.translate(&folders.orphaned_path);
    let max_age = app
        .prune_orphaned_time
        .resolve("app.prune_orphaned_time")
        .map_err(|source| WorkerError::Config {
            worker: worker.to_string(),
            operation: "prune.resolve_duration",
            source,
        })?;

    if dryrun {
        info!(worker, path = %orphaned.display(), "dry-run: would prune orphaned files older than threshold");
        return Ok(());
    }

    spawn_blocking_disk(worker, "prune.sweep", move || {
        prune_older_than(&orphaned, max_age);
    })
    .await
}

async fn spawn_blocking_disk<F, T>(worker: &str, operation: &'static str, f: F) -> WorkerResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|source| WorkerError::Join {
            worker: worker.to_string(),
            operation,
            source,
        })
}
