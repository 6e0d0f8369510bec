//! Response normalization and classification
//!
//! Decodes the gateway's JSON envelope, reconciles the transport status
//! with the envelope's own `status` field, publishes the effective status,
//! and unwraps the payload or classifies the failure.

use serde_json::Value;
use tracing::{debug, warn};

use crate::http::error::{is_success, ServiceError};
use crate::http::events::StatusEvents;
use crate::Result;

/// Decoded response envelope
///
/// A typed view over the gateway's `{ status?, result?, message? }` object.
/// Accessors normalize absent or oddly-shaped fields to `None` instead of
/// failing the response.
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    value: Value,
}

impl Envelope {
    /// Decode a response body
    ///
    /// Empty and whitespace-only bodies decode as an empty object so
    /// bodyless success statuses normalize like any other response.
    pub fn decode(uri: &str, body: &str) -> Result<Self> {
        if body.trim().is_empty() {
            return Ok(Self {
                value: Value::Object(serde_json::Map::new()),
            });
        }

        let value: Value = serde_json::from_str(body).map_err(|e| crate::Error::Decode {
            uri: uri.to_string(),
            message: format!("Response body is not valid JSON: {}", e),
            source: Some(e),
        })?;

        if !value.is_object() {
            return Err(crate::Error::Decode {
                uri: uri.to_string(),
                message: "Response body is not a JSON object".to_string(),
                source: None,
            });
        }

        Ok(Self { value })
    }

    /// The envelope's own numeric status, when present and representable
    pub fn status(&self) -> Option<u16> {
        self.value
            .get("status")
            .and_then(Value::as_u64)
            .and_then(|code| u16::try_from(code).ok())
    }

    /// The business payload
    pub fn result(&self) -> Option<&Value> {
        self.value.get("result")
    }

    /// Error message supplied by the gateway
    pub fn message(&self) -> Option<&str> {
        self.value.get("message").and_then(Value::as_str)
    }

    /// Localization key nested under `result`
    pub fn display_message_key(&self) -> Option<&str> {
        self.value
            .get("result")
            .and_then(|result| result.get("display_message_key"))
            .and_then(Value::as_str)
    }

    /// The whole decoded envelope
    pub fn into_value(self) -> Value {
        self.value
    }
}

/// Reconcile the transport status with the envelope's own status field
///
/// The envelope wins only when the transport said 200 and the envelope
/// carries a different numeric code.
pub fn effective_status(transport_status: u16, envelope: &Envelope) -> u16 {
    if transport_status == 200 {
        if let Some(embedded) = envelope.status() {
            if embedded != 200 {
                return embedded;
            }
        }
    }
    transport_status
}

/// Normalize one response
///
/// Decode, resolve the effective status, publish it, and either unwrap
/// the payload or classify the failure against the status catalog.
pub fn normalize_response(
    uri: &str,
    transport_status: u16,
    body: &str,
    result_only: bool,
    events: &StatusEvents,
) -> Result<Value> {
    let envelope = Envelope::decode(uri, body)?;
    let effective = effective_status(transport_status, &envelope);

    events.emit(effective);

    if is_success(effective) {
        debug!(uri, status = effective, "response normalized");
        return Ok(if result_only {
            envelope.result().cloned().unwrap_or(Value::Null)
        } else {
            envelope.into_value()
        });
    }

    let error = ServiceError::classify(
        effective,
        envelope.message().map(str::to_string),
        envelope.display_message_key().map(str::to_string),
    );
    warn!(
        uri,
        status = effective,
        code = %error.code,
        "response classified as an error"
    );
    Err(error.into())
}
