//! Gateway configuration
//!
//! Everything the dispatcher needs to reach one gateway: base URL, vendor
//! header names and values, the token signer, static metadata headers, and
//! transport knobs. Passed in explicitly at construction, never read from
//! ambient global state.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use url::Url;

use crate::http::auth::{RequestSigner, TimestampSigner};
use crate::Result;

/// Default request timeout applied when a request carries no override
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default broadcast buffer for status events
pub const DEFAULT_EVENT_CAPACITY: usize = 32;

/// Default header carrying the vendor API key
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Default header carrying the per-request signed token
pub const DEFAULT_SIGNATURE_HEADER: &str = "x-request-token";

/// Configuration for one gateway
#[derive(Clone)]
pub struct GatewayConfig {
    /// Base URL relative request paths are joined onto
    pub base_url: Url,
    /// Header name for the vendor API key
    pub api_key_header: String,
    /// Vendor API key; supports `${ENV:VAR}` expansion
    pub api_key: String,
    /// Header name for the per-request signed token
    pub signature_header: String,
    /// Collaborator producing the signed token value
    pub signer: Arc<dyn RequestSigner>,
    /// Static metadata headers sent on every request; values support
    /// `${ENV:VAR}` expansion
    pub static_headers: HashMap<String, String>,
    /// Request timeout applied when the request carries no override
    pub timeout: Duration,
    /// Whether to validate TLS certificates
    pub validate_tls: bool,
    /// Status event buffer per subscriber, clamped to at least 1
    pub event_capacity: usize,
}

impl GatewayConfig {
    /// Create a configuration with default header names, timeout, and
    /// event capacity.
    pub fn new(base_url: Url, api_key: String, signer: Arc<dyn RequestSigner>) -> Self {
        Self {
            base_url,
            api_key_header: DEFAULT_API_KEY_HEADER.to_string(),
            api_key,
            signature_header: DEFAULT_SIGNATURE_HEADER.to_string(),
            signer,
            static_headers: HashMap::new(),
            timeout: DEFAULT_TIMEOUT,
            validate_tls: true,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }

    /// Read configuration from `COURIER_BASE_URL`, `COURIER_API_KEY`, and
    /// `COURIER_SIGNING_KEY`, signing with the timestamp scheme.
    pub fn from_env() -> Result<Self> {
        let base_url = std::env::var("COURIER_BASE_URL").map_err(|_| {
            crate::Error::Configuration {
                message: "COURIER_BASE_URL environment variable not set".to_string(),
                source: None,
            }
        })?;
        let base_url = Url::parse(&base_url).map_err(|e| crate::Error::Configuration {
            message: format!("COURIER_BASE_URL is not a valid URL: {}", e),
            source: Some(anyhow::Error::new(e)),
        })?;
        let api_key = std::env::var("COURIER_API_KEY").map_err(|_| {
            crate::Error::Configuration {
                message: "COURIER_API_KEY environment variable not set".to_string(),
                source: None,
            }
        })?;
        let signing_key = std::env::var("COURIER_SIGNING_KEY").map_err(|_| {
            crate::Error::Configuration {
                message: "COURIER_SIGNING_KEY environment variable not set".to_string(),
                source: None,
            }
        })?;

        Ok(Self::new(
            base_url,
            api_key,
            Arc::new(TimestampSigner::new(signing_key)),
        ))
    }

    /// Set the vendor API key header name
    pub fn with_api_key_header(mut self, name: String) -> Self {
        self.api_key_header = name;
        self
    }

    /// Set the signed token header name
    pub fn with_signature_header(mut self, name: String) -> Self {
        self.signature_header = name;
        self
    }

    /// Add one static metadata header
    pub fn with_static_header(mut self, name: String, value: String) -> Self {
        self.static_headers.insert(name, value);
        self
    }

    /// Set the default request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set TLS certificate validation
    pub fn with_validate_tls(mut self, validate_tls: bool) -> Self {
        self.validate_tls = validate_tls;
        self
    }

    /// Set the status event buffer size
    pub fn with_event_capacity(mut self, capacity: usize) -> Self {
        self.event_capacity = capacity;
        self
    }

    /// Validate header names, the timeout, and that every `${ENV:...}`
    /// reference resolves.
    pub fn validate(&self) -> Result<()> {
        if self.api_key_header.trim().is_empty() {
            return Err(crate::Error::Configuration {
                message: "API key header name is empty".to_string(),
                source: None,
            });
        }
        if self.signature_header.trim().is_empty() {
            return Err(crate::Error::Configuration {
                message: "Signature header name is empty".to_string(),
                source: None,
            });
        }
        if self.timeout.is_zero() {
            return Err(crate::Error::Configuration {
                message: "Request timeout must be non-zero".to_string(),
                source: None,
            });
        }
        for name in self.static_headers.keys() {
            if name.trim().is_empty() {
                return Err(crate::Error::Configuration {
                    message: "Static header name is empty".to_string(),
                    source: None,
                });
            }
        }

        expand_env_vars(&self.api_key)?;
        for value in self.static_headers.values() {
            expand_env_vars(value)?;
        }

        Ok(())
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("base_url", &self.base_url.as_str())
            .field("api_key_header", &self.api_key_header)
            .field("signature_header", &self.signature_header)
            .field("static_headers", &self.static_headers)
            .field("timeout", &self.timeout)
            .field("validate_tls", &self.validate_tls)
            .field("event_capacity", &self.event_capacity)
            .finish_non_exhaustive()
    }
}

/// Expand `${ENV:VAR}` references in a header value
pub(crate) fn expand_env_vars(value: &str) -> Result<String> {
    let mut result = value.to_string();

    let re = regex::Regex::new(r"\$\{ENV:([^}]+)\}").expect("Valid regex pattern");

    for cap in re.captures_iter(value) {
        let var_name = &cap[1];
        let env_value = std::env::var(var_name).map_err(|_| crate::Error::Configuration {
            message: format!("Environment variable {} not found", var_name),
            source: None,
        })?;

        let pattern = format!("${{ENV:{}}}", var_name);
        result = result.replace(&pattern, &env_value);
    }

    Ok(result)
}
