//! The `ClientCapability` interface implemented by torrent client adapters.
//!
//! The Rule Engine, State Store and Worker depend only on this trait, never
//! on a concrete client. Every mutation must accept an arbitrarily-sized
//! hash set and is expected to be idempotent at the protocol level;
//! implementations batch internally if the transport imposes length limits.

use async_trait::async_trait;

use crate::error::ClientResult;
use crate::model::{DeltaView, FileEntry, TrackerEntry};

/// Sentinel meaning "no limit" for share-limit and upload-limit values.
pub const LIMIT_UNSET: i64 = -1;
/// Sentinel meaning "use the client's global default" for share-limit values.
pub const LIMIT_GLOBAL_DEFAULT: i64 = -2;

/// Engine-agnostic operations against a torrent client's web API.
///
/// All required; unlike an engine adapter trait that only partially
/// implements a capability, a client that cannot perform one of these
/// operations cannot be managed by the daemon at all.
#[async_trait]
pub trait ClientCapability: Send + Sync {
    /// Establish a session with the client.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Auth`] if the credentials are rejected.
    async fn login(&self) -> ClientResult<()>;

    /// Tear down the session. Best-effort; called during worker shutdown.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] if the logout request fails.
    async fn logout(&self) -> ClientResult<()>;

    /// Fetch a full snapshot (`full = true`) or the incremental change since
    /// the last call (`full = false`).
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] or
    /// [`crate::ClientError::Decode`] on failure.
    async fn sync(&self, full: bool) -> ClientResult<DeltaView>;

    /// List the files belonging to a torrent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] or
    /// [`crate::ClientError::Decode`] on failure.
    async fn list_files(&self, hash: &str) -> ClientResult<Vec<FileEntry>>;

    /// List the trackers configured for a torrent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] or
    /// [`crate::ClientError::Decode`] on failure.
    async fn list_trackers(&self, hash: &str) -> ClientResult<Vec<TrackerEntry>>;

    /// Apply `tag` to every hash in `hashes`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn add_tags(&self, hashes: &[String], tag: &str) -> ClientResult<()>;

    /// Remove `tags` from every hash in `hashes`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn remove_tags(&self, hashes: &[String], tags: &[String]) -> ClientResult<()>;

    /// Delete `tag` client-wide, regardless of which torrents carry it.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn delete_tag(&self, tag: &str) -> ClientResult<()>;

    /// Resume every hash in `hashes`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn resume(&self, hashes: &[String]) -> ClientResult<()>;

    /// Force-start every hash in `hashes`, bypassing queueing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn force_start(&self, hashes: &[String]) -> ClientResult<()>;

    /// Enable automatic torrent management for every hash in `hashes`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn enable_tmm(&self, hashes: &[String]) -> ClientResult<()>;

    /// Set ratio and seeding-time limits. `inactive_seeding_minutes` is
    /// always forwarded as-is (the Share-Limit Profiler fixes it at
    /// [`LIMIT_GLOBAL_DEFAULT`]; no caller overrides that).
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn set_share_limits(
        &self,
        hashes: &[String],
        ratio_limit: f64,
        seeding_minutes: i64,
        inactive_seeding_minutes: i64,
    ) -> ClientResult<()>;

    /// Set the upload rate cap in bytes/sec for every hash in `hashes`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::ClientError::Transport`] on failure.
    async fn set_upload_limit(&self, hashes: &[String], bytes_per_sec: i64) -> ClientResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::DeltaView;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        calls: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ClientCapability for RecordingClient {
        async fn login(&self) -> ClientResult<()> {
            self.calls.lock().unwrap().push("login".to_string());
            Ok(())
        }

        async fn logout(&self) -> ClientResult<()> {
            self.calls.lock().unwrap().push("logout".to_string());
            Ok(())
        }

        async fn sync(&self, full: bool) -> ClientResult<DeltaView> {
            self.calls.lock().unwrap().push(format!("sync({full})"));
            Ok(DeltaView {
                full_update: full,
                ..Default::default()
            })
        }

        async fn list_files(&self, _hash: &str) -> ClientResult<Vec<FileEntry>> {
            Ok(Vec::new())
        }

        async fn list_trackers(&self, _hash: &str) -> ClientResult<Vec<TrackerEntry>> {
            Ok(Vec::new())
        }

        async fn add_tags(&self, hashes: &[String], tag: &str) -> ClientResult<()> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("add_tags({}, {tag})", hashes.len()));
            Ok(())
        }

        async fn remove_tags(&self, _hashes: &[String], _tags: &[String]) -> ClientResult<()> {
            Ok(())
        }

        async fn delete_tag(&self, _tag: &str) -> ClientResult<()> {
            Ok(())
        }

        async fn resume(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }

        async fn force_start(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }

        async fn enable_tmm(&self, _hashes: &[String]) -> ClientResult<()> {
            Ok(())
        }

        async fn set_share_limits(
            &self,
            _hashes: &[String],
            _ratio_limit: f64,
            _seeding_minutes: i64,
            _inactive_seeding_minutes: i64,
        ) -> ClientResult<()> {
            Ok(())
        }

        async fn set_upload_limit(&self, _hashes: &[String], _bytes_per_sec: i64) -> ClientResult<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn sync_reports_requested_full_flag() {
        let client = RecordingClient::default();
        let delta = client.sync(true).await.expect("sync");
        assert!(delta.full_update);
        assert_eq!(client.calls.lock().unwrap().last().unwrap(), "sync(true)");
    }

    #[tokio::test]
    async fn add_tags_records_hash_count() {
        let client = RecordingClient::default();
        client
            .add_tags(&["a".to_string(), "b".to_string()], "~H&R")
            .await
            .expect("add_tags");
        assert_eq!(
            client.calls.lock().unwrap().last().unwrap(),
            "add_tags(2, ~H&R)"
        );
    }
}
