//! A [`crate::ClientCapability`] adapter for the qBittorrent Web API.
//!
//! # Design
//! - Cookie-based session auth: `reqwest`'s cookie jar carries the `SID`
//!   cookie transparently after [`QBittorrentClient::login`].
//! - Mutation endpoints are form-encoded; `sync` and the list endpoints
//!   return JSON.
//! - `rid` (response id) is tracked internally across incremental `sync`
//!   calls so callers only ever ask for "the next delta".

use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

use crate::capability::ClientCapability;
use crate::error::{ClientError, ClientResult};
use crate::model::{DeltaView, FileEntry, TorrentRecordDelta, TrackerEntry, TrackerStatus};

/// qBittorrent API paths are joined against this prefix.
const API_PREFIX: &str = "/api/v2";

/// A concrete [`ClientCapability`] implementation talking to a qBittorrent
/// instance's Web API over HTTP.
pub struct QBittorrentClient {
    base_url: String,
    username: String,
    password: String,
    http: Client,
    rid: AtomicU64,
}

impl QBittorrentClient {
    /// Construct a new adapter. Does not perform any network IO until
    /// [`QBittorrentClient::login`] (or another method) is called.
    ///
    /// # Panics
    ///
    /// Panics if the underlying `reqwest` client cannot be constructed
    /// (e.g. the platform's TLS backend fails to initialize).
    #[must_use]
    pub fn new(base_url: impl Into<String>, username: impl Into<String>, password: impl Into<String>) -> Self {
        let http = Client::builder()
            .cookie_store(true)
            .build()
            .expect("reqwest client with cookie store");
        Self {
            base_url: base_url.into(),
            username: username.into(),
            password: password.into(),
            http,
            rid: AtomicU64::new(0),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{API_PREFIX}{path}", self.base_url.trim_end_matches('/'))
    }

    async fn post_form(
        &self,
        operation: &'static str,
        path: &str,
        form: &[(&str, String)],
    ) -> ClientResult<reqwest::Response> {
        let response = self
            .http
            .post(self.url(path))
            .form(form)
            .send()
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;
        check_status(operation, response).await
    }

    async fn get(&self, operation: &'static str, path: &str, query: &[(&str, String)]) -> ClientResult<reqwest::Response> {
        let response = self
            .http
            .get(self.url(path))
            .query(query)
            .send()
            .await
            .map_err(|source| ClientError::Transport { operation, source })?;
        check_status(operation, response).await
    }
}

async fn check_status(
    operation: &'static str,
    response: reqwest::Response,
) -> ClientResult<reqwest::Response> {
    if response.status().is_success() {
        Ok(response)
    } else {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        Err(ClientError::UnexpectedStatus {
            operation,
            status,
            body,
        })
    }
}

fn join_hashes(hashes: &[String]) -> String {
    hashes.join("|")
}

/// Mirrors the subset of fields qBittorrent's `/sync/maindata` response
/// includes for a given torrent this tick. A genuine incremental response
/// only reports the keys that changed, so every field is optional: an
/// absent key must stay absent all the way through to
/// [`crate::model::TorrentRecordDelta`], never collapse to a zero/empty
/// default, or an untouched field would be clobbered when the delta is
/// merged into stored state.
#[derive(Debug, Default, Deserialize)]
struct RawTorrent {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    tracker: Option<String>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    tags: Option<String>,
    #[serde(default)]
    state: Option<String>,
    #[serde(default)]
    progress: Option<f64>,
    #[serde(default)]
    seeding_time: Option<u64>,
    #[serde(default)]
    ratio: Option<f64>,
    #[serde(default)]
    num_complete: Option<u32>,
    #[serde(default)]
    size: Option<u64>,
    #[serde(default)]
    downloaded: Option<u64>,
    #[serde(default)]
    content_path: Option<String>,
    #[serde(default)]
    save_path: Option<String>,
    #[serde(default)]
    auto_tmm: Option<bool>,
    #[serde(default)]
    max_seeding_time: Option<i64>,
    #[serde(default)]
    ratio_limit: Option<f64>,
    #[serde(default)]
    up_limit: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMainData {
    rid: u64,
    #[serde(default)]
    full_update: bool,
    #[serde(default)]
    torrents: std::collections::BTreeMap<String, RawTorrent>,
    #[serde(default)]
    torrents_removed: Vec<String>,
    #[serde(default)]
    tags_removed: Vec<String>,
    #[serde(default)]
    categories_removed: Vec<String>,
}

fn parse_state(raw: &str) -> crate::model::TorrentState {
    use crate::model::TorrentState::{
        Downloading, Error, ForcedUp, PausedDl, PausedUp, QueuedUp, StoppedUp, Unknown,
    };
    match raw {
        "downloading" | "metaDL" | "stalledDL" | "allocating" | "checkingDL" => Downloading,
        "pausedUP" => PausedUp,
        "pausedDL" => PausedDl,
        "forcedUP" | "stalledUP" | "uploading" | "checkingUP" => ForcedUp,
        "error" | "missingFiles" => Error,
        "stoppedUP" => StoppedUp,
        "queuedUP" | "queuedDL" => QueuedUp,
        _ => Unknown,
    }
}

fn to_record_delta(raw: RawTorrent) -> TorrentRecordDelta {
    TorrentRecordDelta {
        name: raw.name,
        tracker: raw.tracker,
        category: raw.category,
        tags: raw.tags.map(|tags| {
            tags.split(',')
                .map(str::trim)
                .filter(|tag| !tag.is_empty())
                .map(str::to_string)
                .collect()
        }),
        state: raw.state.as_deref().map(parse_state),
        progress: raw.progress,
        seeding_time: raw.seeding_time,
        ratio: raw.ratio,
        num_complete: raw.num_complete,
        size: raw.size,
        downloaded: raw.downloaded,
        content_path: raw.content_path,
        save_path: raw.save_path,
        auto_tmm: raw.auto_tmm,
        max_seeding_time: raw.max_seeding_time,
        ratio_limit: raw.ratio_limit,
        up_limit: raw.up_limit,
    }
}

#[async_trait]
impl ClientCapability for QBittorrentClient {
    async fn login(&self) -> ClientResult<()> {
        let response = self
            .http
            .post(self.url("/auth/login"))
            .form(&[
                ("username", self.username.as_str()),
                ("password", self.password.as_str()),
            ])
            .send()
            .await
            .map_err(|source| ClientError::Transport {
                operation: "login",
                source,
            })?;

        if !response.status().is_success() {
            return Err(ClientError::Auth {
                client: self.base_url.clone(),
                source: None,
            });
        }

        let body = response.text().await.unwrap_or_default();
        if body.trim() != "Ok." {
            return Err(ClientError::Auth {
                client: self.base_url.clone(),
                source: None,
            });
        }
        Ok(())
    }

    async fn logout(&self) -> ClientResult<()> {
        self.post_form("logout", "/auth/logout", &[]).await?;
        Ok(())
    }

    async fn sync(&self, full: bool) -> ClientResult<DeltaView> {
        let rid = if full {
            0
        } else {
            self.rid.load(Ordering::Relaxed)
        };
        let response = self
            .get("sync", "/sync/maindata", &[("rid", rid.to_string())])
            .await?;
        let raw: RawMainData = response
            .json()
            .await
            .map_err(|source| ClientError::Transport {
                operation: "sync.decode",
                source,
            })?;

        self.rid.store(raw.rid, Ordering::Relaxed);

        Ok(DeltaView {
            full_update: full || raw.full_update,
            torrents: raw
                .torrents
                .into_iter()
                .map(|(hash, torrent)| (hash, to_record_delta(torrent)))
                .collect(),
            torrents_removed: raw.torrents_removed,
            tags_removed: raw.tags_removed,
            categories_removed: raw.categories_removed,
            rid: raw.rid,
        })
    }

    async fn list_files(&self, hash: &str) -> ClientResult<Vec<FileEntry>> {
        let response = self
            .get("list_files", "/torrents/files", &[("hash", hash.to_string())])
            .await?;
        response
            .json()
            .await
            .map_err(|source| ClientError::Transport {
                operation: "list_files.decode",
                source,
            })
    }

    async fn list_trackers(&self, hash: &str) -> ClientResult<Vec<TrackerEntry>> {
        #[derive(Deserialize)]
        struct RawTracker {
            url: String,
            status: u8,
            msg: String,
        }

        let response = self
            .get(
                "list_trackers",
                "/torrents/trackers",
                &[("hash", hash.to_string())],
            )
            .await?;
        let raw: Vec<RawTracker> = response
            .json()
            .await
            .map_err(|source| ClientError::Transport {
                operation: "list_trackers.decode",
                source,
            })?;

        Ok(raw
            .into_iter()
            .map(|entry| TrackerEntry {
                url: entry.url,
                status: match entry.status {
                    2 => TrackerStatus::Working,
                    3 => TrackerStatus::Updating,
                    4 => TrackerStatus::NotWorking,
                    1 => TrackerStatus::Disabled,
                    _ => TrackerStatus::NotContacted,
                },
                msg: entry.msg,
            })
            .collect())
    }

    async fn add_tags(&self, hashes: &[String], tag: &str) -> ClientResult<()> {
        self.post_form(
            "add_tags",
            "/torrents/addTags",
            &[
                ("hashes", join_hashes(hashes)),
                ("tags", tag.to_string()),
            ],
        )
        .await?;
        Ok(())
    }

    async fn remove_tags(&self, hashes: &[String], tags: &[String]) -> ClientResult<()> {
        self.post_form(
            "remove_tags",
            "/torrents/removeTags",
            &[
                ("hashes", join_hashes(hashes)),
                ("tags", tags.join(",")),
            ],
        )
        .await?;
        Ok(())
    }

    async fn delete_tag(&self, tag: &str) -> ClientResult<()> {
        self.post_form("delete_tag", "/torrents/deleteTags", &[("tags", tag.to_string())])
            .await?;
        Ok(())
    }

    async fn resume(&self, hashes: &[String]) -> ClientResult<()> {
        self.post_form("resume", "/torrents/resume", &[("hashes", join_hashes(hashes))])
            .await?;
        Ok(())
    }

    async fn force_start(&self, hashes: &[String]) -> ClientResult<()> {
        self.post_form(
            "force_start",
            "/torrents/setForceStart",
            &[("hashes", join_hashes(hashes)), ("value", "true".to_string())],
        )
        .await?;
        Ok(())
    }

    async fn enable_tmm(&self, hashes: &[String]) -> ClientResult<()> {
        self.post_form(
            "enable_tmm",
            "/torrents/setAutoManagement",
            &[("hashes", join_hashes(hashes)), ("enable", "true".to_string())],
        )
        .await?;
        Ok(())
    }

    async fn set_share_limits(
        &self,
        hashes: &[String],
        ratio_limit: f64,
        seeding_minutes: i64,
        inactive_seeding_minutes: i64,
    ) -> ClientResult<()> {
        self.post_form(
            "set_share_limits",
            "/torrents/setShareLimits",
            &[
                ("hashes", join_hashes(hashes)),
                ("ratioLimit", ratio_limit.to_string()),
                ("seedingTimeLimit", seeding_minutes.to_string()),
                (
                    "inactiveSeedingTimeLimit",
                    inactive_seeding_minutes.to_string(),
                ),
            ],
        )
        .await?;
        Ok(())
    }

    async fn set_upload_limit(&self, hashes: &[String], bytes_per_sec: i64) -> ClientResult<()> {
        self.post_form(
            "set_upload_limit",
            "/torrents/setUploadLimit",
            &[
                ("hashes", join_hashes(hashes)),
                ("limit", bytes_per_sec.to_string()),
            ],
        )
        .await?;
        Ok(())
    }
}
