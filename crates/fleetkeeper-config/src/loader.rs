//! Load the configuration document from disk.
//!
//! # Design
//! - Reads the raw bytes once so the same buffer can be hashed for the lock
//!   file (see `fleetkeeper-app`) without a second disk read.
//! - Defaults for omitted keys are supplied by `#[serde(default = ...)]`
//!   annotations on the model types, not by a separate JSON-merge pass — this
//!   keeps every default colocated with the field it belongs to.

use std::fs;
use std::path::Path;

use crate::error::{ConfigError, Result};
use crate::model::RootConfig;
use crate::validate::validate;

/// Raw bytes of a loaded configuration file, kept around so callers (e.g. the
/// lock-file guard) can hash the exact bytes that were parsed.
pub struct LoadedConfig {
    /// The typed, validated configuration document.
    pub config: RootConfig,
    /// The raw bytes read from disk.
    pub raw: Vec<u8>,
}

/// Load, parse and validate the configuration file at `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Read`] if the file cannot be read, [`ConfigError::Parse`]
/// if it is not valid YAML, or a validation error if the parsed document fails
/// semantic checks (see [`validate`]).
pub fn load(path: &Path) -> Result<LoadedConfig> {
    let raw = fs::read(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;

    let config: RootConfig =
        serde_yaml::from_slice(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

    validate(&config)?;

    Ok(LoadedConfig { config, raw })
}
