//! HTTP-backed fetchers
//!
//! Adapts [`ApiClient`] requests to the core fetcher contract so a view can
//! mix HTTP sections with any other read operation in one synchronizer.

use crate::client::ApiClient;
use remsync_core::{Fetcher, SyncError};
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
enum Route {
    Get { path: String },
    Post { path: String, body: Value },
}

/// Fetcher that reads one endpoint of a backing service
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    name: String,
    client: Arc<ApiClient>,
    route: Route,
}

impl HttpFetcher {
    /// Fetcher issuing a GET
    #[must_use]
    pub fn get(name: impl Into<String>, client: Arc<ApiClient>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            client,
            route: Route::Get { path: path.into() },
        }
    }

    /// Fetcher issuing a POST with a fixed JSON body
    #[must_use]
    pub fn post(
        name: impl Into<String>,
        client: Arc<ApiClient>,
        path: impl Into<String>,
        body: Value,
    ) -> Self {
        Self {
            name: name.into(),
            client,
            route: Route::Post {
                path: path.into(),
                body,
            },
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for HttpFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Value, SyncError> {
        match &self.route {
            Route::Get { path } => self.client.get_json(path).await,
            Route::Post { path, body } => self.client.post_json(path, body).await,
        }
    }
}
