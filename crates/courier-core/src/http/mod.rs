//! HTTP dispatch and response normalization for gateway communication
//!
//! This module provides a small request helper with:
//! - Header assembly (vendor API key, signed token, optional bearer auth)
//! - JSON and multipart body encoding
//! - Timeout-bounded dispatch per HTTP verb plus raw byte downloads
//! - Envelope normalization with effective-status resolution
//! - Error classification against a static status catalog
//! - A broadcast channel publishing each response's effective status

pub mod auth;
pub mod builder;
pub mod client;
pub mod config;
pub mod content_type;
pub mod error;
pub mod events;
pub mod normalizer;
pub mod request;


pub use auth::{FixedSigner, RequestSigner, TimestampSigner};
pub use builder::{RequestBody, RequestBuilder};
pub use client::ApiClient;
pub use config::{
    GatewayConfig, DEFAULT_API_KEY_HEADER, DEFAULT_EVENT_CAPACITY, DEFAULT_SIGNATURE_HEADER,
    DEFAULT_TIMEOUT,
};
pub use content_type::ContentType;
pub use error::{catalog_entries, is_success, ServiceError, SUCCESS_STATUSES};
pub use events::{StatusEvents, StatusStream};
pub use normalizer::{effective_status, normalize_response, Envelope};
pub use request::ApiRequest;

// Re-export commonly used types
pub use reqwest::{Method, StatusCode};
