//! Error types for the client capability and its adapters.

use thiserror::Error;

/// Result alias for client capability operations.
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised by a [`crate::ClientCapability`] implementation.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The client rejected the configured credentials.
    #[error("authentication with client {client} failed")]
    Auth {
        /// Name of the client instance that rejected login.
        client: String,
        /// Underlying transport failure, if the rejection surfaced as one.
        #[source]
        source: Option<reqwest::Error>,
    },
    /// A request to the client's web API failed at the transport layer.
    #[error("transport failure calling client operation {operation}")]
    Transport {
        /// Operation that failed.
        operation: &'static str,
        /// Underlying HTTP client error.
        #[source]
        source: reqwest::Error,
    },
    /// The client's response body could not be decoded into the expected shape.
    #[error("failed to decode response for operation {operation}")]
    Decode {
        /// Operation whose response failed to decode.
        operation: &'static str,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// The client reported a non-success HTTP status.
    #[error("client operation {operation} returned status {status}")]
    UnexpectedStatus {
        /// Operation that failed.
        operation: &'static str,
        /// HTTP status code returned.
        status: u16,
        /// Response body, if any, for diagnostics.
        body: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn auth_error_without_source_has_no_source() {
        let error = ClientError::Auth {
            client: "media".to_string(),
            source: None,
        };
        assert!(error.source().is_none());
        assert_eq!(
            error.to_string(),
            "authentication with client media failed"
        );
    }

    #[test]
    fn unexpected_status_renders_operation_and_status() {
        let error = ClientError::UnexpectedStatus {
            operation: "sync",
            status: 403,
            body: "forbidden".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "client operation sync returned status 403"
        );
    }
}
