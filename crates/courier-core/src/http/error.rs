//! Application-level error classification
//!
//! Maps effective status codes onto a static code/message catalog and
//! carries the envelope's error metadata to the caller.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Effective status codes that classify as success
pub const SUCCESS_STATUSES: [u16; 4] = [200, 203, 204, 214];

/// Static status → (code, message) catalog
///
/// Rows are exact; any status missing here classifies with its decimal
/// string as the code and the envelope's own message, if any.
const STATUS_CATALOG: &[(u16, &str, &str)] = &[
    (301, "invalid-credentials", "Credentials are invalid"),
    (400, "bad-request", "The server could not process the request"),
    (401, "unauthorized", "Could not authorize user"),
    (403, "insufficient-permission", "User do not have permission"),
    (404, "not-found", "Could not retrieve resource"),
    (405, "method-not-allowed", "Could not perform action"),
    (406, "not-acceptable", "Could not perform action"),
    (408, "request-timeout", "Request has timed out"),
    (
        422,
        "unprocessable-entity",
        "Could not process due to possible semantic errors",
    ),
    (428, "security-rejections", "Security Rejections"),
    (429, "too-many-requests", "Too many requests"),
    (500, "internal-server-error", "Server has encountered issue"),
    (502, "bad-gateway", "Server received invalid response"),
    (503, "server-unavailable", "Server is not available"),
    (504, "gateway-timeout", "Server has timed out"),
];

/// Check whether an effective status carries a business result
pub fn is_success(status: u16) -> bool {
    SUCCESS_STATUSES.contains(&status)
}

/// Look up the catalog row for a status code
pub fn catalog_entry(status: u16) -> Option<(&'static str, &'static str)> {
    STATUS_CATALOG
        .iter()
        .find(|(code, _, _)| *code == status)
        .map(|(_, slug, message)| (*slug, *message))
}

/// Iterate every catalog row as `(status, code, message)`
pub fn catalog_entries() -> impl Iterator<Item = (u16, &'static str, &'static str)> {
    STATUS_CATALOG.iter().copied()
}

/// Classified application-level failure
///
/// The dominant error path: every non-success effective status becomes one
/// of these, built from the catalog row or, for unmapped codes, from the
/// envelope itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceError {
    /// Effective status code the classification was made from
    pub status: u16,
    /// Machine-readable slug, or the decimal status string for unmapped codes
    pub code: String,
    /// Human-readable message: the catalog's, or the envelope's for unmapped codes
    pub message: Option<String>,
    /// Localization key surfaced from `result.display_message_key`
    pub display_message_key: Option<String>,
}

impl ServiceError {
    /// Classify an effective status, carrying envelope metadata where the
    /// catalog has no row of its own.
    pub fn classify(
        status: u16,
        envelope_message: Option<String>,
        display_message_key: Option<String>,
    ) -> Self {
        match catalog_entry(status) {
            Some((code, message)) => Self {
                status,
                code: code.to_string(),
                message: Some(message.to_string()),
                display_message_key,
            },
            None => Self {
                status,
                code: status.to_string(),
                message: envelope_message,
                display_message_key,
            },
        }
    }
}

impl fmt::Display for ServiceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Service error [{}] {}", self.status, self.code)?;
        if let Some(message) = &self.message {
            write!(f, ": {message}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ServiceError {}
