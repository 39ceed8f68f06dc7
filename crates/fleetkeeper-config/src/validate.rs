//! Post-merge validation of the configuration document.
//!
//! Runs once after parsing, before any worker is constructed, so a malformed
//! file never reaches a worker (see `ConfigError` abort-on-startup policy).

use crate::error::{ConfigError, Result};
use crate::model::RootConfig;

/// Validate a fully-merged configuration document.
///
/// # Errors
///
/// Returns the first validation failure encountered: an unparsable duration,
/// a duplicate path-translation prefix, or no enabled clients.
pub fn validate(config: &RootConfig) -> Result<()> {
    config
        .app
        .tagging_schedule_interval
        .resolve("app.tagging_schedule_interval")?;
    config
        .app
        .disktasks_schedule_interval
        .resolve("app.disktasks_schedule_interval")?;
    config
        .app
        .fullsync_interval
        .resolve("app.fullsync_interval")?;
    config
        .app
        .prune_orphaned_time
        .resolve("app.prune_orphaned_time")?;
    config
        .app
        .hr
        .extra_seed_time
        .resolve("app.hr.extra_seed_time")?;

    if config.app.lowseeds.min_seeds > 10_000 {
        return Err(ConfigError::InvalidValue {
            field: "app.lowseeds.min_seeds",
            reason: "implausibly large seed threshold",
            value: config.app.lowseeds.min_seeds.to_string(),
        });
    }

    let mut any_enabled = false;
    for (name, client) in &config.clients {
        if client.enabled {
            any_enabled = true;
        }
        for profile in client.share_limits.values() {
            profile
                .max_seeding_time
                .resolve_minutes("client.share_limits.*.max_seeding_time")?;
            profile
                .upload_limit
                .resolve_minutes("client.share_limits.*.upload_limit")?;
        }
        check_translation_table(name, client)?;
    }

    for (keyword, detail) in &config.tracker_details {
        if let Some(hr) = &detail.hr {
            hr.time.resolve("tracker_details.*.HR.time")?;
        }
        if keyword.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "tracker_details",
                reason: "keyword expression must not be empty",
                value: keyword.clone(),
            });
        }
    }

    if !any_enabled {
        return Err(ConfigError::NoEnabledClients);
    }

    Ok(())
}

fn check_translation_table(
    client_name: &str,
    client: &crate::model::ClientConfig,
) -> Result<()> {
    let mut seen = std::collections::HashSet::new();
    for from in client.translation_table.keys() {
        if !seen.insert(from.as_str()) {
            return Err(ConfigError::DuplicateTranslationPrefix {
                client: client_name.to_string(),
                prefix: from.clone(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClientConfig, CommandsConfig, Secret};
    use std::collections::BTreeMap;

    fn minimal_client(enabled: bool) -> ClientConfig {
        ClientConfig {
            enabled,
            url: "http://localhost:8080".to_string(),
            user: "admin".to_string(),
            password: Secret("adminadmin".to_string()),
            local_instance: true,
            dryrun: false,
            commands: CommandsConfig::default(),
            folders: None,
            translation_table: BTreeMap::new(),
            share_limits: BTreeMap::new(),
        }
    }

    #[test]
    fn rejects_document_with_no_enabled_clients() {
        let mut config = RootConfig {
            app: crate::model::AppSection::default(),
            clients: BTreeMap::new(),
            tracker_details: BTreeMap::new(),
        };
        config
            .clients
            .insert("media".to_string(), minimal_client(false));

        let result = validate(&config);
        assert!(matches!(result, Err(ConfigError::NoEnabledClients)));
    }

    #[test]
    fn accepts_minimal_valid_document() {
        let mut config = RootConfig {
            app: crate::model::AppSection::default(),
            clients: BTreeMap::new(),
            tracker_details: BTreeMap::new(),
        };
        config
            .clients
            .insert("media".to_string(), minimal_client(true));

        assert!(validate(&config).is_ok());
    }
}
