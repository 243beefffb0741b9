//! Thin reqwest wrapper for JSON services
//!
//! One client per backing service: base URL, request timeout, optional
//! bearer token. Every failure is normalized into the workspace error
//! taxonomy before it leaves this module.

use crate::envelope::unwrap_envelope;
use remsync_core::SyncError;
use serde_json::Value;
use std::time::Duration;

/// Request timeout used when the config does not override it
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for one backing service
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Service root, e.g. `http://localhost:3001`
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Bearer token added to every request when present
    pub bearer_token: Option<String>,
}

impl ClientConfig {
    /// Config with default timeout and no auth
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: DEFAULT_TIMEOUT,
            bearer_token: None,
        }
    }

    /// Override the request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Attach a bearer token
    #[inline]
    #[must_use]
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.bearer_token = Some(token.into());
        self
    }
}

/// JSON client for one backing service
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    config: ClientConfig,
}

impl ApiClient {
    /// Build a client from config
    ///
    /// # Errors
    /// - `Network` error if the underlying client cannot be constructed
    pub fn new(config: ClientConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SyncError::network(format!("client construction failed: {e}")))?;
        Ok(Self { http, config })
    }

    /// Service root this client talks to
    #[inline]
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// GET a JSON payload
    ///
    /// # Errors
    /// - `Network`, `Service`, or `Shape` per the normalization rules
    pub async fn get_json(&self, path: &str) -> Result<Value, SyncError> {
        let request = self.http.get(self.url(path));
        self.execute(request).await
    }

    /// POST a JSON body and return the JSON payload
    ///
    /// # Errors
    /// - `Network`, `Service`, or `Shape` per the normalization rules
    pub async fn post_json(&self, path: &str, body: &Value) -> Result<Value, SyncError> {
        let request = self.http.post(self.url(path)).json(body);
        self.execute(request).await
    }

    async fn execute(&self, mut request: reqwest::RequestBuilder) -> Result<Value, SyncError> {
        if let Some(token) = &self.config.bearer_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        if !status.is_success() {
            tracing::debug!("request to {} answered {}", self.config.base_url, status);
            return Err(SyncError::service(format!("status {status}")));
        }

        let body: Value = response.json().await.map_err(body_error)?;
        unwrap_envelope(body)
    }

    fn url(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// The request never completed
fn transport_error(err: reqwest::Error) -> SyncError {
    if err.is_timeout() {
        SyncError::network("request timed out")
    } else {
        SyncError::network(err.to_string())
    }
}

/// The response completed but its body was unusable
fn body_error(err: reqwest::Error) -> SyncError {
    if err.is_decode() {
        SyncError::shape(format!("response body is not JSON: {err}"))
    } else if err.is_timeout() {
        SyncError::network("request timed out")
    } else {
        SyncError::network(err.to_string())
    }
}
