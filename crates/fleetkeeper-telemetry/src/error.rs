//! Error types for telemetry operations.

use std::error::Error;
use std::fmt::{self, Display, Formatter};
use std::io;
use std::path::PathBuf;

/// Result alias for telemetry operations.
pub type Result<T> = std::result::Result<T, TelemetryError>;

/// Errors raised by telemetry helpers.
#[derive(Debug)]
pub enum TelemetryError {
    /// Installing the tracing subscriber failed.
    SubscriberInstall {
        /// Underlying tracing subscriber error.
        source: tracing_subscriber::util::TryInitError,
    },
    /// Creating the rotating log directory failed.
    LogDirCreate {
        /// Directory path that could not be created.
        path: PathBuf,
        /// Underlying IO error.
        source: io::Error,
    },
}

impl Display for TelemetryError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::SubscriberInstall { .. } => {
                formatter.write_str("failed to install tracing subscriber")
            }
            Self::LogDirCreate { .. } => formatter.write_str("failed to create log directory"),
        }
    }
}

impl Error for TelemetryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::SubscriberInstall { source } => Some(source),
            Self::LogDirCreate { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tracing_subscriber::util::SubscriberInitExt;

    fn try_init_error() -> tracing_subscriber::util::TryInitError {
        match tracing_subscriber::registry().try_init() {
            Ok(()) => tracing_subscriber::registry()
                .try_init()
                .expect_err("second global init must fail"),
            Err(err) => err,
        }
    }

    #[test]
    fn telemetry_error_display_and_source() {
        let init_error = try_init_error();
        let err = TelemetryError::SubscriberInstall { source: init_error };
        assert_eq!(err.to_string(), "failed to install tracing subscriber");
        assert!(err.source().is_some());

        let dir_err = TelemetryError::LogDirCreate {
            path: PathBuf::from("logs"),
            source: io::Error::other("denied"),
        };
        assert_eq!(dir_err.to_string(), "failed to create log directory");
        assert!(dir_err.source().is_some());
    }
}
