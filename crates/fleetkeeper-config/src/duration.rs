//! Human-readable duration parsing for configuration values.
//!
//! The configuration grammar accepts either a bare integer (seconds) or a
//! string with a single-letter suffix: `s` seconds, `m` minutes, `h` hours,
//! `d` days, `w` weeks (e.g. `"30s"`, `"10m"`, `"5d"`, `"2w"`). This is a
//! small, fixed grammar, so it is parsed by hand rather than pulling in a
//! general-purpose duration crate.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// A duration configuration value as written in YAML: either a bare integer
/// number of seconds, or a suffixed human string.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DurationSpec {
    /// A bare integer, interpreted as seconds.
    Seconds(u64),
    /// A suffixed human duration string, e.g. `"10m"`.
    Human(String),
}

impl DurationSpec {
    /// Resolve this spec into a concrete [`Duration`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] if a human string has no
    /// recognised suffix or its numeric prefix does not parse.
    pub fn resolve(&self, field: &'static str) -> Result<Duration> {
        match self {
            Self::Seconds(seconds) => Ok(Duration::from_secs(*seconds)),
            Self::Human(text) => parse_human_duration(text).ok_or_else(|| {
                ConfigError::InvalidDuration {
                    field,
                    value: text.clone(),
                }
            }),
        }
    }
}

fn parse_human_duration(text: &str) -> Option<Duration> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(seconds) = trimmed.parse::<u64>() {
        return Some(Duration::from_secs(seconds));
    }

    let (digits, suffix) = trimmed.split_at(trimmed.len() - 1);
    let amount: u64 = digits.parse().ok()?;
    let multiplier: u64 = match suffix {
        "s" => 1,
        "m" => 60,
        "h" => 60 * 60,
        "d" => 24 * 60 * 60,
        "w" => 7 * 24 * 60 * 60,
        _ => return None,
    };
    Some(Duration::from_secs(amount.saturating_mul(multiplier)))
}

/// A `max_seeding_time`/`max_ratio`-style value: a sentinel integer
/// (`-1` no cap, `-2` client-global default, `0` instant) or a positive
/// human duration that resolves to minutes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SeedingTimeSpec {
    /// A signed sentinel or an already-in-minutes integer.
    Sentinel(i64),
    /// A positive human duration, e.g. `"5d"`.
    Human(String),
}

impl SeedingTimeSpec {
    /// Resolve into signed minutes. Sentinels (`-1`, `-2`) and zero pass
    /// through untouched; human durations are converted to whole minutes.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidDuration`] if a human string fails to parse.
    pub fn resolve_minutes(&self, field: &'static str) -> Result<i64> {
        match self {
            Self::Sentinel(value) => Ok(*value),
            Self::Human(text) => {
                let duration = parse_human_duration(text).ok_or_else(|| {
                    ConfigError::InvalidDuration {
                        field,
                        value: text.clone(),
                    }
                })?;
                i64::try_from(duration.as_secs() / 60).map_err(|_| ConfigError::InvalidDuration {
                    field,
                    value: text.clone(),
                })
            }
        }
    }
}

/// A `max_ratio`-style value: a signed sentinel (`-1` no cap, `-2`
/// client-global default) or a positive fractional ratio ceiling.
///
/// Kept distinct from [`SeedingTimeSpec`] because a ratio is never a human
/// duration string; collapsing the two into one type would let a YAML
/// author write `"5d"` for a ratio field and have it silently accepted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RatioSpec {
    /// A signed sentinel (`-1`, `-2`) or whole-number ratio.
    Sentinel(i64),
    /// A fractional ratio ceiling, e.g. `2.5`.
    Ratio(f64),
}

impl RatioSpec {
    /// Resolve into a ratio value. Sentinels pass through as their integer
    /// value cast to `f64`; callers compare against `-1.0`/`-2.0` the same
    /// way they would the integer sentinels.
    #[must_use]
    pub fn resolve(&self) -> f64 {
        match self {
            Self::Sentinel(value) => {
                #[allow(clippy::cast_precision_loss)]
                let value = *value as f64;
                value
            }
            Self::Ratio(value) => *value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_suffixed_durations() {
        assert_eq!(parse_human_duration("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_human_duration("10m"), Some(Duration::from_secs(600)));
        assert_eq!(
            parse_human_duration("2w"),
            Some(Duration::from_secs(2 * 7 * 24 * 60 * 60))
        );
        assert_eq!(
            parse_human_duration("5d"),
            Some(Duration::from_secs(5 * 24 * 60 * 60))
        );
    }

    #[test]
    fn bare_integer_is_seconds() {
        assert_eq!(parse_human_duration("45"), Some(Duration::from_secs(45)));
    }

    #[test]
    fn rejects_unknown_suffix() {
        assert_eq!(parse_human_duration("5x"), None);
        assert_eq!(parse_human_duration(""), None);
    }

    #[test]
    fn duration_spec_resolves_both_shapes() {
        let seconds = DurationSpec::Seconds(30);
        assert_eq!(
            seconds.resolve("app.tagging_schedule_interval").unwrap(),
            Duration::from_secs(30)
        );

        let human = DurationSpec::Human("10m".to_string());
        assert_eq!(
            human.resolve("app.disktasks_schedule_interval").unwrap(),
            Duration::from_secs(600)
        );

        let bad = DurationSpec::Human("nope".to_string());
        assert!(bad.resolve("app.fullsync_interval").is_err());
    }

    #[test]
    fn seeding_time_spec_passes_sentinels_through() {
        assert_eq!(
            SeedingTimeSpec::Sentinel(-2)
                .resolve_minutes("profile.max_seeding_time")
                .unwrap(),
            -2
        );
        assert_eq!(
            SeedingTimeSpec::Sentinel(0)
                .resolve_minutes("profile.max_seeding_time")
                .unwrap(),
            0
        );
    }

    #[test]
    fn seeding_time_spec_converts_human_duration_to_minutes() {
        let value = SeedingTimeSpec::Human("90d".to_string())
            .resolve_minutes("profile.max_seeding_time")
            .unwrap();
        assert_eq!(value, 90 * 24 * 60);
    }

    #[test]
    fn ratio_spec_resolves_sentinels_and_fractions() {
        assert_eq!(RatioSpec::Sentinel(-2).resolve(), -2.0);
        assert_eq!(RatioSpec::Ratio(2.5).resolve(), 2.5);
    }
}
