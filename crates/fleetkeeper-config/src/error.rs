//! Error types for configuration loading, merging and validation.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result alias for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while loading or validating the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read from disk.
    #[error("failed to read configuration file")]
    Read {
        /// Path that could not be read.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// The configuration file was not valid YAML.
    #[error("failed to parse configuration file as yaml")]
    Parse {
        /// Path that failed to parse.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
    /// The merged configuration document did not match the expected shape.
    #[error("configuration document does not match the expected schema")]
    Shape {
        /// Underlying deserialization error.
        #[source]
        source: serde_json::Error,
    },
    /// A human-readable duration string could not be parsed.
    #[error("invalid duration value")]
    InvalidDuration {
        /// Field name that failed to parse.
        field: &'static str,
        /// Raw value that failed to parse.
        value: String,
    },
    /// A configuration value failed post-merge validation.
    #[error("invalid configuration value")]
    InvalidValue {
        /// Field name that failed validation.
        field: &'static str,
        /// Machine-readable reason for the failure.
        reason: &'static str,
        /// Offending value, rendered for diagnostics.
        value: String,
    },
    /// The path translation table for a client contained duplicate prefixes.
    #[error("duplicate path translation prefix")]
    DuplicateTranslationPrefix {
        /// Client the table belongs to.
        client: String,
        /// Duplicated `from` prefix.
        prefix: String,
    },
    /// No clients were enabled; there is nothing for the daemon to do.
    #[error("no enabled clients configured")]
    NoEnabledClients,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn config_error_variants_expose_source() {
        let read = ConfigError::Read {
            path: PathBuf::from("config.yml"),
            source: io::Error::other("denied"),
        };
        assert!(read.source().is_some());
        assert_eq!(read.to_string(), "failed to read configuration file");

        let invalid_duration = ConfigError::InvalidDuration {
            field: "app.fullsync_interval",
            value: "banana".to_string(),
        };
        assert!(invalid_duration.source().is_none());

        let dup = ConfigError::DuplicateTranslationPrefix {
            client: "media".to_string(),
            prefix: "/data".to_string(),
        };
        assert_eq!(dup.to_string(), "duplicate path translation prefix");
    }
}
