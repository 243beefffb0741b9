//! Fetcher contract and combined results
//!
//! A fetcher is a named, zero-argument asynchronous read operation. The
//! synchronizer runs a set of them concurrently and combines their payloads
//! into a [`SectionMap`] keyed by fetcher name.

use crate::error::SyncError;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

/// Zero-argument asynchronous read operation
///
/// Implementations normalize their own failures into [`SyncError`]; the
/// synchronizer never inspects payloads beyond success/failure.
#[async_trait::async_trait]
pub trait Fetcher: Send + Sync {
    /// Section name this fetcher's payload is keyed under
    fn name(&self) -> &str;

    /// Perform one read
    async fn fetch(&self) -> Result<Value, SyncError>;
}

/// Combined result of one load, keyed by fetcher name
pub type SectionMap = HashMap<String, Value>;

/// Deserialize one section of a combined result
///
/// # Errors
/// - `Shape` error if the section is missing or does not deserialize
pub fn section<T: DeserializeOwned>(map: &SectionMap, name: &str) -> Result<T, SyncError> {
    let value = map
        .get(name)
        .ok_or_else(|| SyncError::shape(format!("missing section '{name}'")))?;
    serde_json::from_value(value.clone())
        .map_err(|e| SyncError::shape(e.to_string()).for_fetcher(name))
}

type BoxedFetch =
    Box<dyn Fn() -> Pin<Box<dyn Future<Output = Result<Value, SyncError>> + Send>> + Send + Sync>;

/// Fetcher built from a name and an async closure
///
/// The adapter most views use: wrap a service call in a closure and give it
/// the section name the view wants the payload keyed under.
pub struct FnFetcher {
    name: String,
    run: BoxedFetch,
}

impl FnFetcher {
    /// Wrap an async closure as a named fetcher
    pub fn new<F, Fut>(name: impl Into<String>, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, SyncError>> + Send + 'static,
    {
        Self {
            name: name.into(),
            run: Box::new(move || Box::pin(fetch())),
        }
    }
}

impl std::fmt::Debug for FnFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FnFetcher").field("name", &self.name).finish()
    }
}

#[async_trait::async_trait]
impl Fetcher for FnFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Value, SyncError> {
        (self.run)().await
    }
}
