//! Filesystem inspection primitives used by the disk-hygiene tasks.
//!
//! # Design
//! - Pure functions over `std::fs`/`walkdir`; no knowledge of torrent state
//!   or the configured client lives here.
//! - Every sweep logs and continues past per-entry IO errors rather than
//!   aborting the whole operation.

use std::collections::HashMap;
use std::fs;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::error::{FsOpsError, FsOpsResult};

/// What a path resolves to on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// A regular file.
    File,
    /// A directory.
    Dir,
    /// Nothing exists at this path.
    Missing,
}

/// Classify a path as a file, a directory, or missing.
#[must_use]
pub fn classify(path: &Path) -> PathKind {
    match fs::symlink_metadata(path) {
        Ok(meta) if meta.is_dir() => PathKind::Dir,
        Ok(_) => PathKind::File,
        Err(_) => PathKind::Missing,
    }
}

/// Count occurrences of each inode found while walking `root`.
///
/// Entries that disappear mid-walk (race with another process) are skipped
/// silently rather than failing the whole sweep.
#[must_use]
pub fn build_inode_map(root: &Path) -> HashMap<u64, u64> {
    let mut map = HashMap::new();
    for entry in WalkDir::new(root).into_iter().filter_map(Result::ok) {
        if let Ok(meta) = entry.metadata() {
            if meta.is_file() {
                *map.entry(meta.ino()).or_insert(0) += 1;
            }
        }
    }
    map
}

/// Check whether `path` participates in a hard link outside of `root` (as
/// represented by `inode_map`, a count of occurrences of each inode inside
/// the root).
///
/// For a directory, recurses into every contained file and short-circuits
/// true on the first file with outer links.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] if `path` does not exist or cannot be stat'd,
/// or [`FsOpsError::Walkdir`] if a directory traversal fails.
pub fn has_outer_links(path: &Path, inode_map: &HashMap<u64, u64>) -> FsOpsResult<bool> {
    let meta = fs::symlink_metadata(path)
        .map_err(|source| FsOpsError::io("has_outer_links.stat", path, source))?;

    if meta.is_file() {
        let seen_in_root = inode_map.get(&meta.ino()).copied().unwrap_or(0);
        return Ok(meta.nlink() > seen_in_root);
    }

    for entry in WalkDir::new(path) {
        let entry = entry.map_err(|source| FsOpsError::walkdir("has_outer_links.walk", path, source))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let file_meta = entry
            .metadata()
            .map_err(|source| FsOpsError::walkdir("has_outer_links.stat", path, source))?;
        let seen_in_root = inode_map.get(&file_meta.ino()).copied().unwrap_or(0);
        if file_meta.nlink() > seen_in_root {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Move `file` (which must be located under `root`) to the equivalent
/// relative location under `orphan`, creating parent directories as needed
/// and touching its mtime/atime to now.
///
/// If `file` is not under `root`, this is a logged no-op rather than an
/// error, matching the conservative behavior of the rest of the sweep.
///
/// # Errors
///
/// Returns [`FsOpsError::Io`] if directory creation, rename, or the mtime
/// touch fails.
pub fn move_to_orphan(root: &Path, orphan: &Path, file: &Path) -> FsOpsResult<()> {
    let Ok(relative) = file.strip_prefix(root) else {
        warn!(
            file = %file.display(),
            root = %root.display(),
            "move_to_orphan: file is not under root; skipping"
        );
        return Ok(());
    };

    let destination = orphan.join(relative);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)
            .map_err(|source| FsOpsError::io("move_to_orphan.create_parent", parent, source))?;
    }

    fs::rename(file, &destination)
        .map_err(|source| FsOpsError::io("move_to_orphan.rename", &destination, source))?;

    let now = filetime::FileTime::now();
    filetime::set_file_times(&destination, now, now)
        .map_err(|source| FsOpsError::io("move_to_orphan.touch", &destination, source))?;

    Ok(())
}

/// Delete every regular file under `path` whose mtime is older than `now -
/// max_age`. Per-file failures are logged and do not abort the sweep.
pub fn prune_older_than(path: &Path, max_age: Duration) {
    let cutoff = SystemTime::now().checked_sub(max_age);
    let Some(cutoff) = cutoff else {
        warn!("prune_older_than: max_age overflowed the clock; skipping sweep");
        return;
    };

    for entry in WalkDir::new(path).into_iter().filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let modified = match entry.metadata().and_then(|meta| meta.modified()) {
            Ok(modified) => modified,
            Err(error) => {
                warn!(error = %error, path = %entry.path().display(), "failed to stat orphan entry");
                continue;
            }
        };
        if modified >= cutoff {
            continue;
        }
        if let Err(error) = fs::remove_file(entry.path()) {
            warn!(error = %error, path = %entry.path().display(), "failed to prune orphaned file");
        }
    }
}

/// Remove every directory below `path` that is empty after its children
/// have been processed. Never removes `path` itself.
pub fn remove_empty_dirs(path: &Path) {
    let mut directories: Vec<PathBuf> = WalkDir::new(path)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_dir() && entry.path() != path)
        .map(walkdir::DirEntry::into_path)
        .collect();

    directories.sort_by_key(|dir| std::cmp::Reverse(dir.components().count()));

    for dir in directories {
        let is_empty = match fs::read_dir(&dir) {
            Ok(mut iter) => iter.next().is_none(),
            Err(error) => {
                warn!(error = %error, path = %dir.display(), "failed to read directory during empty-dir sweep");
                continue;
            }
        };
        if !is_empty {
            continue;
        }
        match fs::remove_dir(&dir) {
            Ok(()) => info!(path = %dir.display(), "removed empty directory"),
            Err(error) => {
                warn!(error = %error, path = %dir.display(), "failed to remove empty directory");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::tempdir;

    #[test]
    fn classify_distinguishes_file_dir_missing() {
        let dir = tempdir().expect("tempdir");
        let file_path = dir.path().join("file.txt");
        File::create(&file_path).expect("create file");

        assert_eq!(classify(dir.path()), PathKind::Dir);
        assert_eq!(classify(&file_path), PathKind::File);
        assert_eq!(classify(&dir.path().join("missing")), PathKind::Missing);
    }

    #[test]
    fn inode_map_counts_hard_links_inside_root() {
        let dir = tempdir().expect("tempdir");
        let original = dir.path().join("a.bin");
        let linked = dir.path().join("b.bin");
        fs::write(&original, b"data").expect("write");
        fs::hard_link(&original, &linked).expect("hard link");

        let map = build_inode_map(dir.path());
        let ino = fs::metadata(&original).expect("meta").ino();
        assert_eq!(map.get(&ino).copied(), Some(2));
    }

    #[test]
    fn has_outer_links_detects_link_outside_root() {
        let root = tempdir().expect("root");
        let outside = tempdir().expect("outside");
        let inside_file = root.path().join("content.bin");
        fs::write(&inside_file, b"data").expect("write");
        fs::hard_link(&inside_file, outside.path().join("content.bin")).expect("hard link");

        let map = build_inode_map(root.path());
        assert!(has_outer_links(&inside_file, &map).expect("probe"));
    }

    #[test]
    fn has_outer_links_false_when_fully_contained() {
        let root = tempdir().expect("root");
        let inside_file = root.path().join("content.bin");
        fs::write(&inside_file, b"data").expect("write");

        let map = build_inode_map(root.path());
        assert!(!has_outer_links(&inside_file, &map).expect("probe"));
    }

    #[test]
    fn move_to_orphan_relocates_file_preserving_tail() {
        let root = tempdir().expect("root");
        let orphan = tempdir().expect("orphan");
        let nested = root.path().join("movies/film.mkv");
        fs::create_dir_all(nested.parent().unwrap()).expect("mkdir");
        fs::write(&nested, b"data").expect("write");

        move_to_orphan(root.path(), orphan.path(), &nested).expect("move");

        assert!(!nested.exists());
        assert!(orphan.path().join("movies/film.mkv").exists());
    }

    #[test]
    fn move_to_orphan_is_noop_for_file_outside_root() {
        let root = tempdir().expect("root");
        let orphan = tempdir().expect("orphan");
        let outside = tempdir().expect("outside");
        let file = outside.path().join("stray.bin");
        fs::write(&file, b"data").expect("write");

        move_to_orphan(root.path(), orphan.path(), &file).expect("no-op move");
        assert!(file.exists());
    }

    #[test]
    fn remove_empty_dirs_never_removes_root() {
        let root = tempdir().expect("root");
        remove_empty_dirs(root.path());
        assert!(root.path().exists());
    }

    #[test]
    fn remove_empty_dirs_removes_only_empty_leaves() {
        let root = tempdir().expect("root");
        let empty = root.path().join("empty");
        let nonempty = root.path().join("nonempty");
        fs::create_dir_all(&empty).expect("mkdir");
        fs::create_dir_all(&nonempty).expect("mkdir");
        fs::write(nonempty.join("keep.txt"), b"data").expect("write");

        remove_empty_dirs(root.path());

        assert!(!empty.exists());
        assert!(nonempty.exists());
    }
}
