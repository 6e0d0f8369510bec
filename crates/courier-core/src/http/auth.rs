//! Request signing for the gateway's vendor headers
//!
//! Every dispatched request carries an API key header plus a per-request
//! signed token. Token derivation is an injected collaborator so callers
//! can swap schemes and tests can pin the clock and key.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::{DateTime, Utc};
use rand::Rng;

use crate::Result;

/// Trait for producing the per-request signed token header value
pub trait RequestSigner: Send + Sync {
    /// Produce one token; called once per dispatched request
    fn token(&self) -> Result<String>;
}

/// Timestamp-keyed signer
///
/// Encodes `key:millis:nonce` as base64. The nonce keeps tokens unique
/// when two requests land on the same millisecond.
#[derive(Debug, Clone)]
pub struct TimestampSigner {
    key: String,
}

impl TimestampSigner {
    /// Create with an explicit signing key
    pub fn new(key: String) -> Self {
        Self { key }
    }

    /// Token for an explicit instant and nonce
    ///
    /// `token` delegates here; exposed so tests can derive the expected
    /// value without racing the clock.
    pub fn token_at(&self, at: DateTime<Utc>, nonce: u64) -> String {
        let raw = format!("{}:{}:{}", self.key, at.timestamp_millis(), nonce);
        STANDARD.encode(raw)
    }
}

impl RequestSigner for TimestampSigner {
    fn token(&self) -> Result<String> {
        let nonce = rand::thread_rng().gen::<u64>();
        Ok(self.token_at(Utc::now(), nonce))
    }
}

/// Signer that always returns the same token
///
/// Covers tokens provisioned out of band, and deterministic tests.
#[derive(Debug, Clone)]
pub struct FixedSigner {
    token: String,
}

impl FixedSigner {
    /// Create with the token to hand out verbatim
    pub fn new(token: String) -> Self {
        Self { token }
    }
}

impl RequestSigner for FixedSigner {
    fn token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_timestamp_token_is_keyed_encoding_of_instant_and_nonce() {
        let signer = TimestampSigner::new("secret".to_string());
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();

        let token = signer.token_at(at, 7);

        let decoded = STANDARD.decode(&token).unwrap();
        let decoded = String::from_utf8(decoded).unwrap();
        assert_eq!(decoded, format!("secret:{}:7", at.timestamp_millis()));
    }

    #[test]
    fn test_live_tokens_decode_with_the_key_prefix() {
        let signer = TimestampSigner::new("secret".to_string());

        let token = signer.token().unwrap();

        let decoded = STANDARD.decode(&token).unwrap();
        let decoded = String::from_utf8(decoded).unwrap();
        assert!(decoded.starts_with("secret:"), "got: {decoded}");
        assert_eq!(decoded.split(':').count(), 3);
    }

    #[test]
    fn test_consecutive_tokens_differ() {
        let signer = TimestampSigner::new("secret".to_string());
        assert_ne!(signer.token().unwrap(), signer.token().unwrap());
    }

    #[test]
    fn test_fixed_signer_repeats_its_token() {
        let signer = FixedSigner::new("pinned-token".to_string());
        assert_eq!(signer.token().unwrap(), "pinned-token");
        assert_eq!(signer.token().unwrap(), "pinned-token");
    }

    #[test]
    fn test_signers_are_object_safe() {
        let signers: Vec<Arc<dyn RequestSigner>> = vec![
            Arc::new(TimestampSigner::new("secret".to_string())),
            Arc::new(FixedSigner::new("pinned".to_string())),
        ];
        for signer in signers {
            assert!(signer.token().is_ok());
        }
    }
}
