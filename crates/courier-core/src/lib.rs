//! Courier Core - gateway HTTP dispatch and response normalization
//!
//! This crate provides a small client-side request helper for applications
//! talking to a JSON-envelope gateway: it issues authenticated HTTP calls,
//! normalizes the response envelope, classifies failures against a static
//! status catalog, and publishes each response's effective status on a
//! broadcast channel.
//!
//! # Main Components
//!
//! - **Error Handling**: Typed errors using `thiserror` and `anyhow`
//! - **Request Dispatcher**: Verb methods, header assembly, JSON and
//!   multipart bodies, per-request timeouts
//! - **Response Normalizer**: Envelope decoding, effective-status
//!   resolution, classification against the status catalog
//! - **Status Events**: Broadcast stream of effective status codes
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use courier_core::{ApiClient, ApiRequest, GatewayConfig, Result, TimestampSigner};
//! use url::Url;
//!
//! async fn example() -> Result<()> {
//!     let config = GatewayConfig::new(
//!         Url::parse("https://gateway.example.com").expect("valid URL"),
//!         "api-key".to_string(),
//!         Arc::new(TimestampSigner::new("signing-key".to_string())),
//!     );
//!     let client = ApiClient::new(config)?;
//!
//!     let profile = client.get(ApiRequest::new("/v1/profile")).await?;
//!     println!("{profile}");
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod http;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use http::{
    // Client surface
    ApiClient,
    ApiRequest,
    ContentType,
    // Configuration
    GatewayConfig,
    // Signing
    FixedSigner,
    RequestSigner,
    TimestampSigner,
    // Normalization
    Envelope,
    ServiceError,
    // Status events
    StatusEvents,
    StatusStream,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
