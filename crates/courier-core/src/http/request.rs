//! Per-call request options
//!
//! A request is a stateless value object that exists for the duration of
//! one dispatch. Everything here is optional except the target path.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::http::ContentType;

/// Options for one dispatched request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Path joined onto the gateway base URL, or a full URL
    pub path: String,
    /// Bearer token for the `Authorization` header
    pub auth_token: Option<String>,
    /// JSON body fields
    pub body: Option<Value>,
    /// Field name to file path, attached as multipart parts
    pub files: HashMap<String, PathBuf>,
    /// Body content type; JSON unless set
    pub content_type: ContentType,
    /// Per-request timeout override
    pub timeout: Option<Duration>,
    /// Return only the envelope's `result` instead of the whole envelope
    pub result_only: bool,
}

impl ApiRequest {
    /// Create a request for a path with every option at its default
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            auth_token: None,
            body: None,
            files: HashMap::new(),
            content_type: ContentType::default(),
            timeout: None,
            result_only: true,
        }
    }

    /// Attach a bearer token
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Set the JSON body
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach one file under a multipart field name
    pub fn with_file(mut self, field: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.files.insert(field.into(), path.into());
        self
    }

    /// Set the body content type
    pub fn with_content_type(mut self, content_type: ContentType) -> Self {
        self.content_type = content_type;
        self
    }

    /// Override the configured timeout for this request only
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Choose between the unwrapped `result` and the whole envelope
    pub fn with_result_only(mut self, result_only: bool) -> Self {
        self.result_only = result_only;
        self
    }

    /// True when this request encodes as a multipart form: a non-empty
    /// file map and a form-data content type.
    pub fn is_multipart(&self) -> bool {
        !self.files.is_empty() && self.content_type.is_form_data()
    }
}
