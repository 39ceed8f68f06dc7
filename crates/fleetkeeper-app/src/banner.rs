//! Startup banner: version, license, and a condensed configuration summary,
//! printed to stdout and mirrored into the log sink, matching the source's
//! `print_banner`/`startup_msg` behavior.

use std::fmt::Write as _;

use fleetkeeper_config::{DurationSpec, RootConfig};
use tracing::info;

/// Render the banner text for `config`.
#[must_use]
pub fn render(config: &RootConfig) -> String {
    let enabled_clients = config.clients.values().filter(|client| client.enabled).count();

    let mut summary = String::new();
    let _ = writeln!(summary, "fleetkeeper {} ({})", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_LICENSE"));
    let _ = writeln!(summary, "  clients:        {enabled_clients} enabled");
    let _ = writeln!(
        summary,
        "  tagging every {}, disk sweep every {}, full resync every {}",
        describe(&config.app.tagging_schedule_interval, "app.tagging_schedule_interval"),
        describe(&config.app.disktasks_schedule_interval, "app.disktasks_schedule_interval"),
        describe(&config.app.fullsync_interval, "app.fullsync_interval"),
    );
    let _ = writeln!(
        summary,
        "  dupe detection: {}",
        if config.app.dupes.enabled { "enabled" } else { "disabled" }
    );
    let _ = write!(summary, "  tracker rules:  {}", config.tracker_details.len());
    summary
}

/// Print the banner to stdout and emit an equivalent structured log line.
pub fn print_and_log(config: &RootConfig) {
    let summary = render(config);
    println!("{summary}");
    info!("{summary}");
}

fn describe(spec: &DurationSpec, field: &'static str) -> String {
    spec.resolve(field).map_or_else(|_| "?".to_string(), |duration| format!("{}s", duration.as_secs()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_reports_enabled_client_count() {
        let config: RootConfig = serde_json::from_value(serde_json::json!({
            "clients": {
                "a": { "url": "http://a", "user": "u", "password": "p", "enabled": true },
                "b": { "url": "http://b", "user": "u", "password": "p", "enabled": false },
            }
        }))
        .expect("minimal config");

        let rendered = render(&config);
        assert!(rendered.contains("1 enabled"));
    }
}
