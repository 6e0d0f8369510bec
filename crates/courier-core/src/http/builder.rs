//! Request assembly for the dispatcher
//!
//! Resolves the target URL, assembles the gateway header set, and encodes
//! the body as JSON or a multipart form.

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::{Form, Part};
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tracing::warn;
use url::Url;

use crate::http::config::{expand_env_vars, GatewayConfig};
use crate::http::request::ApiRequest;
use crate::Result;

/// Encoded request body, applied to the transport request just before send
pub enum RequestBody {
    /// No body at all
    None,
    /// JSON-serialized body map
    Json(Value),
    /// Multipart form with stringified fields and file parts
    Multipart(Form),
}

/// Builder for gateway requests
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    config: Arc<GatewayConfig>,
}

impl RequestBuilder {
    /// Create a builder over one gateway configuration
    pub fn new(config: Arc<GatewayConfig>) -> Self {
        Self { config }
    }

    /// Build a ready-to-send transport request
    pub async fn build_request(
        &self,
        client: &reqwest::Client,
        method: Method,
        request: &ApiRequest,
    ) -> Result<reqwest::Request> {
        let url = self.resolve_url(&request.path)?;
        let headers = self.build_headers(request)?;

        let mut builder = client.request(method, url).headers(headers);
        match self.build_body(request).await? {
            RequestBody::None => {}
            RequestBody::Json(body) => builder = builder.json(&body),
            RequestBody::Multipart(form) => builder = builder.multipart(form),
        }

        builder.build().map_err(|e| crate::Error::Transport {
            message: format!("Failed to build request: {}", e),
            source: Some(anyhow::Error::new(e)),
        })
    }

    /// Resolve a request path against the gateway base URL
    ///
    /// Full URLs pass through untouched so callers can follow absolute
    /// links returned by the gateway.
    pub fn resolve_url(&self, path: &str) -> Result<Url> {
        if path.starts_with("http://") || path.starts_with("https://") {
            return Url::parse(path).map_err(|e| crate::Error::Configuration {
                message: format!("Invalid request URL: {}", path),
                source: Some(anyhow::Error::new(e)),
            });
        }

        self.config
            .base_url
            .join(path)
            .map_err(|e| crate::Error::Configuration {
                message: format!("Failed to join path onto base URL: {}", path),
                source: Some(anyhow::Error::new(e)),
            })
    }

    /// Assemble the gateway header set for one request
    ///
    /// Produces `Content-Type`, the vendor API key header, the signed
    /// token header, optional `Authorization`, and the static metadata
    /// headers. Invalid names or values are configuration errors.
    pub fn build_headers(&self, request: &ApiRequest) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        // Multipart bodies get their boundary-laden Content-Type from reqwest.
        if !request.is_multipart() {
            headers.insert(
                CONTENT_TYPE,
                HeaderValue::from_static(request.content_type.as_str()),
            );
        }

        let api_key = expand_env_vars(&self.config.api_key)?;
        insert_header(&mut headers, &self.config.api_key_header, &api_key)?;

        let token = self.config.signer.token()?;
        insert_header(&mut headers, &self.config.signature_header, &token)?;

        if let Some(auth_token) = &request.auth_token {
            let value = format!("Bearer {}", auth_token);
            let value = HeaderValue::from_str(&value).map_err(|e| crate::Error::Configuration {
                message: "Invalid Authorization header value".to_string(),
                source: Some(anyhow::Error::new(e)),
            })?;
            headers.insert(AUTHORIZATION, value);
        }

        for (name, value) in &self.config.static_headers {
            let expanded = expand_env_vars(value)?;
            insert_header(&mut headers, name, &expanded)?;
        }

        Ok(headers)
    }

    /// Encode the request body
    pub async fn build_body(&self, request: &ApiRequest) -> Result<RequestBody> {
        if request.is_multipart() {
            return Ok(RequestBody::Multipart(self.build_form(request).await?));
        }

        if !request.files.is_empty() {
            warn!(
                path = %request.path,
                "file map ignored without form-data content type"
            );
        }

        match &request.body {
            Some(body) => Ok(RequestBody::Json(body.clone())),
            None => Ok(RequestBody::None),
        }
    }

    async fn build_form(&self, request: &ApiRequest) -> Result<Form> {
        let mut form = Form::new();

        if let Some(Value::Object(fields)) = &request.body {
            for (name, value) in fields {
                form = form.text(name.clone(), multipart_text(value));
            }
        }

        for (field, path) in &request.files {
            let bytes =
                tokio::fs::read(path)
                    .await
                    .map_err(|e| crate::Error::Configuration {
                        message: format!("Failed to read upload file {}: {}", path.display(), e),
                        source: Some(anyhow::Error::new(e)),
                    })?;
            let file_name = path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| field.clone());
            form = form.part(field.clone(), Part::bytes(bytes).file_name(file_name));
        }

        Ok(form)
    }
}

fn insert_header(headers: &mut HeaderMap, name: &str, value: &str) -> Result<()> {
    let name =
        HeaderName::from_bytes(name.as_bytes()).map_err(|e| crate::Error::Configuration {
            message: format!("Invalid header name: {}", name),
            source: Some(anyhow::Error::new(e)),
        })?;
    let value = HeaderValue::from_str(value).map_err(|e| crate::Error::Configuration {
        message: format!("Invalid value for header {}", name),
        source: Some(anyhow::Error::new(e)),
    })?;
    headers.insert(name, value);
    Ok(())
}

/// Stringify one multipart form field
///
/// Strings go through raw; everything else is JSON-encoded.
fn multipart_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;
    use crate::http::auth::FixedSigner;
    use crate::http::ContentType;

    fn test_builder() -> RequestBuilder {
        let config = GatewayConfig::new(
            Url::parse("https://api.example.com").unwrap(),
            "key-123".to_string(),
            Arc::new(FixedSigner::new("pinned-token".to_string())),
        )
        .with_static_header("x-app-platform".to_string(), "desktop".to_string());
        RequestBuilder::new(Arc::new(config))
    }

    #[test]
    fn test_relative_paths_join_the_base_url() {
        let builder = test_builder();
        let url = builder.resolve_url("/v1/items").unwrap();
        assert_eq!(url.as_str(), "https://api.example.com/v1/items");
    }

    #[test]
    fn test_full_urls_pass_through() {
        let builder = test_builder();
        let url = builder.resolve_url("https://cdn.example.com/blob/42").unwrap();
        assert_eq!(url.as_str(), "https://cdn.example.com/blob/42");
    }

    #[test]
    fn test_header_set_for_a_json_request() {
        let builder = test_builder();
        let request = ApiRequest::new("/v1/items").with_auth_token("token-abc");

        let headers = builder.build_headers(&request).unwrap();

        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get("x-api-key").unwrap(), "key-123");
        assert_eq!(headers.get("x-request-token").unwrap(), "pinned-token");
        assert_eq!(headers.get(AUTHORIZATION).unwrap(), "Bearer token-abc");
        assert_eq!(headers.get("x-app-platform").unwrap(), "desktop");
    }

    #[test]
    fn test_authorization_is_absent_without_a_token() {
        let builder = test_builder();
        let headers = builder.build_headers(&ApiRequest::new("/v1/items")).unwrap();
        assert!(headers.get(AUTHORIZATION).is_none());
    }

    #[test]
    fn test_multipart_leaves_content_type_to_the_encoder() {
        let builder = test_builder();
        let request = ApiRequest::new("/v1/upload")
            .with_content_type(ContentType::FormData)
            .with_file("avatar", "/tmp/avatar.png");

        let headers = builder.build_headers(&request).unwrap();
        assert!(headers.get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_invalid_header_name_is_a_configuration_error() {
        let config = GatewayConfig::new(
            Url::parse("https://api.example.com").unwrap(),
            "key".to_string(),
            Arc::new(FixedSigner::new("t".to_string())),
        )
        .with_api_key_header("not a header".to_string());
        let builder = RequestBuilder::new(Arc::new(config));

        let result = builder.build_headers(&ApiRequest::new("/v1/items"));
        assert!(matches!(
            result,
            Err(crate::Error::Configuration { .. })
        ));
    }

    #[tokio::test]
    async fn test_json_body_is_cloned_through() {
        let builder = test_builder();
        let request = ApiRequest::new("/v1/items").with_body(json!({"name": "widget"}));

        match builder.build_body(&request).await.unwrap() {
            RequestBody::Json(body) => assert_eq!(body, json!({"name": "widget"})),
            _ => panic!("expected a JSON body"),
        }
    }

    #[tokio::test]
    async fn test_bodyless_request_sends_nothing() {
        let builder = test_builder();
        match builder.build_body(&ApiRequest::new("/v1/items")).await.unwrap() {
            RequestBody::None => {}
            _ => panic!("expected no body"),
        }
    }

    #[tokio::test]
    async fn test_multipart_form_reads_files_and_stringifies_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"file-bytes").unwrap();

        let builder = test_builder();
        let request = ApiRequest::new("/v1/upload")
            .with_body(json!({"label": "avatar", "weight": 3}))
            .with_content_type(ContentType::FormData)
            .with_file("upload", file.path());

        match builder.build_body(&request).await.unwrap() {
            RequestBody::Multipart(_) => {}
            _ => panic!("expected a multipart body"),
        }
    }

    #[tokio::test]
    async fn test_missing_upload_file_is_a_configuration_error() {
        let builder = test_builder();
        let request = ApiRequest::new("/v1/upload")
            .with_content_type(ContentType::FormData)
            .with_file("upload", "/definitely/not/a/file");

        let result = builder.build_body(&request).await;
        assert!(matches!(
            result,
            Err(crate::Error::Configuration { .. })
        ));
    }

    #[test]
    fn test_multipart_text_keeps_strings_raw() {
        assert_eq!(multipart_text(&json!("plain")), "plain");
        assert_eq!(multipart_text(&json!(3)), "3");
        assert_eq!(multipart_text(&json!(true)), "true");
        assert_eq!(multipart_text(&json!({"a": 1})), r#"{"a":1}"#);
    }
}
