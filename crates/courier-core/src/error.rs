//! Error types for the Courier core library
//!
//! This module defines the error handling system for Courier, using thiserror
//! for ergonomic error definitions and anyhow for flexible error sources.

use std::time::Duration;

use thiserror::Error;

use crate::http::ServiceError;

/// Main error type for Courier operations
#[derive(Error, Debug)]
pub enum Error {
    /// The underlying network call failed outright (connectivity, DNS, TLS)
    #[error("Transport error: {message}")]
    Transport {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// The request did not complete within its deadline
    #[error("Request to {uri} timed out after {elapsed:?}")]
    Timeout { uri: String, elapsed: Duration },

    /// The response body could not be decoded as a JSON object
    #[error("Decode error for {uri}: {message}")]
    Decode {
        uri: String,
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    /// The response classified as an application-level failure
    #[error(transparent)]
    Service(#[from] ServiceError),

    /// Configuration errors (bad header values, missing environment variables)
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Status code of the classified failure, if this is a service error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Service(err) => Some(err.status),
            _ => None,
        }
    }

    /// True when the request failed before a response was classified.
    pub fn is_transport(&self) -> bool {
        matches!(self, Error::Transport { .. } | Error::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_display() {
        let err = Error::Transport {
            message: "connection refused".to_string(),
            source: None,
        };
        assert_eq!(err.to_string(), "Transport error: connection refused");
        assert!(err.is_transport());
        assert!(err.status().is_none());
    }

    #[test]
    fn test_timeout_is_distinct_from_transport() {
        let err = Error::Timeout {
            uri: "https://api.example.com/v1/items".to_string(),
            elapsed: Duration::from_secs(60),
        };
        assert!(matches!(err, Error::Timeout { .. }));
        assert!(err.to_string().contains("timed out"));
    }

    #[test]
    fn test_decode_display() {
        let err = Error::Decode {
            uri: "https://api.example.com/v1/items".to_string(),
            message: "body is not a JSON object".to_string(),
            source: None,
        };
        assert!(err.to_string().contains("body is not a JSON object"));
        assert!(!err.is_transport());
    }

    #[test]
    fn test_service_error_status_passthrough() {
        let err = Error::from(ServiceError {
            status: 404,
            code: "not-found".to_string(),
            message: Some("Could not retrieve resource".to_string()),
            display_message_key: None,
        });
        assert_eq!(err.status(), Some(404));
    }
}
