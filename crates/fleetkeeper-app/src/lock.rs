//! Advisory, content-hash-keyed exclusive process lock.
//!
//! Keeps two daemon instances from reconciling the same configuration file
//! concurrently. Single-run mode bypasses this entirely; callers there never
//! construct a [`LockGuard`].

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use nix::fcntl::{flock, FlockArg};
use sha2::{Digest, Sha256};
use thiserror::Error;

/// Errors acquiring the process lock.
#[derive(Debug, Error)]
pub enum LockError {
    /// The lock file could not be opened or created.
    #[error("failed to open lock file {path}", path = path.display())]
    Open {
        /// Path of the lock file.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Another process already holds the exclusive lock.
    #[error("another fleetkeeper instance holds the lock at {path}", path = path.display())]
    Held {
        /// Path of the contended lock file.
        path: PathBuf,
    },
}

/// An acquired exclusive lock, released automatically when dropped.
pub struct LockGuard {
    path: PathBuf,
    _file: File,
}

impl LockGuard {
    /// Path of the held lock file, for diagnostics.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Hash `config_bytes`, derive the lock file path under the system temp
    /// directory as `fleetkeeper_{hash16}.lock`, and acquire an exclusive,
    /// non-blocking `flock(2)` on it.
    ///
    /// # Errors
    ///
    /// Returns [`LockError::Open`] if the file cannot be created, or
    /// [`LockError::Held`] if another process already holds it.
    pub fn acquire(config_bytes: &[u8]) -> Result<Self, LockError> {
        let path = lock_path(config_bytes);

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .open(&path)
            .map_err(|source| LockError::Open {
                path: path.clone(),
                source,
            })?;

        flock(&file, FlockArg::LockExclusiveNonblock).map_err(|_errno| LockError::Held { path: path.clone() })?;

        Ok(Self { path, _file: file })
    }
}

fn lock_path(config_bytes: &[u8]) -> PathBuf {
    let digest = Sha256::digest(config_bytes);
    let hash16: String = digest.iter().take(8).map(|byte| format!("{byte:02x}")).collect();
    std::env::temp_dir().join(format!("fleetkeeper_{hash16}.lock"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_bytes_hash_to_the_same_lock_path() {
        assert_eq!(lock_path(b"hello"), lock_path(b"hello"));
    }

    #[test]
    fn different_bytes_hash_to_different_lock_paths() {
        assert_ne!(lock_path(b"hello"), lock_path(b"goodbye"));
    }

    #[test]
    fn second_acquisition_of_the_same_config_is_rejected() {
        let bytes = b"lock-test-config-contents";
        let _first = LockGuard::acquire(bytes).expect("first acquisition succeeds");
        let second = LockGuard::acquire(bytes);
        assert!(matches!(second, Err(LockError::Held { .. })));
    }

    #[test]
    fn lock_is_released_once_the_guard_drops() {
        let bytes = b"lock-test-released-contents";
        {
            let _guard = LockGuard::acquire(bytes).expect("first acquisition succeeds");
        }
        let second = LockGuard::acquire(bytes);
        assert!(second.is_ok());
    }
}
