//! # Design
//!
//! - Provide structured, constant-message errors for the fsops primitives.
//! - Capture operation context (paths, fields, inputs) to make failures reproducible in tests.
//! - Preserve source errors without interpolating context into error messages.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Result type for filesystem operations.
pub type FsOpsResult<T> = Result<T, FsOpsError>;

/// Errors produced by the path translation and filesystem probe primitives.
#[derive(Debug, Error)]
pub enum FsOpsError {
    /// IO failures while interacting with the filesystem.
    #[error("fsops io failure")]
    Io {
        /// Operation that triggered the IO failure.
        operation: &'static str,
        /// Path involved in the IO failure.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },
    /// Walkdir traversal failures.
    #[error("fsops walkdir failure")]
    Walkdir {
        /// Operation that triggered the walkdir failure.
        operation: &'static str,
        /// Path involved in the walkdir failure.
        path: PathBuf,
        /// Underlying walkdir error.
        #[source]
        source: walkdir::Error,
    },
    /// Input validation failures.
    #[error("fsops invalid input")]
    InvalidInput {
        /// Field that failed validation.
        field: &'static str,
        /// Static reason for the failure.
        reason: &'static str,
        /// Offending value when available.
        value: Option<String>,
    },
}

impl FsOpsError {
    pub(crate) fn io(operation: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            operation,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn walkdir(
        operation: &'static str,
        path: impl Into<PathBuf>,
        source: walkdir::Error,
    ) -> Self {
        Self::Walkdir {
            operation,
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;
    use std::io;

    fn io_error() -> io::Error {
        io::Error::other("io")
    }

    #[test]
    fn fsops_error_helpers_build_variants() {
        let io_err = FsOpsError::io("move_to_orphan", "path", io_error());
        assert!(matches!(io_err, FsOpsError::Io { .. }));
        assert!(io_err.source().is_some());

        let invalid = FsOpsError::InvalidInput {
            field: "file",
            reason: "not_under_root",
            value: Some("/elsewhere".to_string()),
        };
        assert!(invalid.source().is_none());
        assert_eq!(invalid.to_string(), "fsops invalid input");
    }
}
