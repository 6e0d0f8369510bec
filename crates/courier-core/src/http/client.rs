//! Gateway client orchestrating all components
//!
//! Provides the verb surface for authenticated gateway requests: headers
//! and body from the builder, one timeout-bounded transport call, and
//! normalization of whatever comes back.

use std::sync::Arc;
use std::time::Duration;

use reqwest::{Client as ReqwestClient, Method, Response};
use serde_json::Value;
use tracing::debug;

use crate::http::builder::RequestBuilder;
use crate::http::config::GatewayConfig;
use crate::http::error::ServiceError;
use crate::http::events::{StatusEvents, StatusStream};
use crate::http::normalizer::normalize_response;
use crate::http::request::ApiRequest;
use crate::Result;

/// Client for one gateway
///
/// Cheap to clone: clones share the transport connection pool and the
/// status channel, so `close` on any clone closes the channel for all.
#[derive(Clone)]
pub struct ApiClient {
    /// Underlying reqwest client
    client: ReqwestClient,
    /// Request builder for constructing requests
    builder: RequestBuilder,
    /// Gateway configuration
    config: Arc<GatewayConfig>,
    /// Status channel shared by every response this client normalizes
    events: StatusEvents,
}

impl ApiClient {
    /// Create a client for a gateway
    pub fn new(config: GatewayConfig) -> Result<Self> {
        let client = ReqwestClient::builder()
            .danger_accept_invalid_certs(!config.validate_tls)
            .build()
            .map_err(|e| crate::Error::Transport {
                message: format!("Failed to create HTTP client: {}", e),
                source: Some(anyhow::Error::new(e)),
            })?;

        let events = StatusEvents::new(config.event_capacity);
        let config = Arc::new(config);
        let builder = RequestBuilder::new(Arc::clone(&config));

        Ok(Self {
            client,
            builder,
            config,
            events,
        })
    }

    /// Create a client from `COURIER_*` environment variables
    pub fn from_env() -> Result<Self> {
        Self::new(GatewayConfig::from_env()?)
    }

    /// Send a GET request
    pub async fn get(&self, request: ApiRequest) -> Result<Value> {
        self.dispatch(Method::GET, request).await
    }

    /// Send a POST request
    pub async fn post(&self, request: ApiRequest) -> Result<Value> {
        self.dispatch(Method::POST, request).await
    }

    /// Send a PUT request
    pub async fn put(&self, request: ApiRequest) -> Result<Value> {
        self.dispatch(Method::PUT, request).await
    }

    /// Send a PATCH request
    pub async fn patch(&self, request: ApiRequest) -> Result<Value> {
        self.dispatch(Method::PATCH, request).await
    }

    /// Send a DELETE request
    pub async fn delete(&self, request: ApiRequest) -> Result<Value> {
        self.dispatch(Method::DELETE, request).await
    }

    /// Fetch raw bytes, skipping envelope processing
    ///
    /// Non-2xx statuses still classify against the status catalog, but no
    /// status event is emitted and the body is never decoded.
    pub async fn download_bytes(&self, path: &str, auth_token: Option<String>) -> Result<Vec<u8>> {
        let mut request = ApiRequest::new(path);
        if let Some(token) = auth_token {
            request = request.with_auth_token(token);
        }

        let transport_request = self
            .builder
            .build_request(&self.client, Method::GET, &request)
            .await?;
        let uri = transport_request.url().to_string();

        debug!(uri = %uri, "downloading bytes");
        let response = self.send(transport_request, &uri, self.config.timeout).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ServiceError::classify(status.as_u16(), None, None).into());
        }

        let bytes = response.bytes().await.map_err(|e| crate::Error::Transport {
            message: format!("Failed to read response body: {}", e),
            source: Some(anyhow::Error::new(e)),
        })?;
        Ok(bytes.to_vec())
    }

    /// Subscribe to effective statuses of responses normalized after this call
    pub fn subscribe(&self) -> StatusStream {
        self.events.subscribe()
    }

    /// Close the status channel; subscribers observe end-of-stream
    pub fn close(&self) {
        self.events.close();
    }

    /// Validate the gateway configuration
    pub fn validate(&self) -> Result<()> {
        self.config.validate()
    }

    /// The gateway configuration this client was built with
    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    /// One dispatch path shared by every verb
    async fn dispatch(&self, method: Method, request: ApiRequest) -> Result<Value> {
        let transport_request = self
            .builder
            .build_request(&self.client, method.clone(), &request)
            .await?;
        let uri = transport_request.url().to_string();
        let timeout = request.timeout.unwrap_or(self.config.timeout);

        debug!(method = %method, uri = %uri, "dispatching request");
        let response = self.send(transport_request, &uri, timeout).await?;

        let transport_status = response.status().as_u16();
        let body = response.text().await.map_err(|e| crate::Error::Transport {
            message: format!("Failed to read response body: {}", e),
            source: Some(anyhow::Error::new(e)),
        })?;

        normalize_response(&uri, transport_status, &body, request.result_only, &self.events)
    }

    /// Execute one transport call bounded by the effective timeout
    async fn send(
        &self,
        transport_request: reqwest::Request,
        uri: &str,
        timeout: Duration,
    ) -> Result<Response> {
        match tokio::time::timeout(timeout, self.client.execute(transport_request)).await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(e)) if e.is_timeout() => Err(crate::Error::Timeout {
                uri: uri.to_string(),
                elapsed: timeout,
            }),
            Ok(Err(e)) => Err(crate::Error::Transport {
                message: format!("Request to {} failed: {}", uri, e),
                source: Some(anyhow::Error::new(e)),
            }),
            Err(_) => Err(crate::Error::Timeout {
                uri: uri.to_string(),
                elapsed: timeout,
            }),
        }
    }
}
