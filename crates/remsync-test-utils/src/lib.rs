//! Testing utilities for the remsync workspace
//!
//! Shared scripted fetchers, fixtures, and assertions.

#![allow(missing_docs)]

use parking_lot::Mutex;
use remsync_core::{Fetcher, SyncError, Synchronizer};
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fetcher that always resolves with the same payload
pub struct StaticFetcher {
    name: String,
    value: Value,
}

impl StaticFetcher {
    pub fn new(name: &str, value: Value) -> Self {
        Self {
            name: name.to_string(),
            value,
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for StaticFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Value, SyncError> {
        Ok(self.value.clone())
    }
}

/// Fetcher that always fails with the same error
pub struct FailingFetcher {
    name: String,
    error: SyncError,
}

impl FailingFetcher {
    pub fn new(name: &str, error: SyncError) -> Self {
        Self {
            name: name.to_string(),
            error,
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for FailingFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Value, SyncError> {
        Err(self.error.clone())
    }
}

/// Fetcher that sleeps before resolving
pub struct SlowFetcher {
    name: String,
    delay: Duration,
    value: Value,
}

impl SlowFetcher {
    pub fn new(name: &str, delay: Duration, value: Value) -> Self {
        Self {
            name: name.to_string(),
            delay,
            value,
        }
    }
}

#[async_trait::async_trait]
impl Fetcher for SlowFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Value, SyncError> {
        tokio::time::sleep(self.delay).await;
        Ok(self.value.clone())
    }
}

/// Fetcher that replays a scripted sequence of outcomes
///
/// Calls past the end of the script repeat the final outcome. Also counts
/// invocations, which most timing assertions need.
pub struct SequenceFetcher {
    name: String,
    script: Mutex<VecDeque<Result<Value, SyncError>>>,
    last: Mutex<Option<Result<Value, SyncError>>>,
    calls: AtomicUsize,
}

impl SequenceFetcher {
    pub fn new(name: &str, outcomes: Vec<Result<Value, SyncError>>) -> Self {
        Self {
            name: name.to_string(),
            script: Mutex::new(outcomes.into()),
            last: Mutex::new(None),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `fetch` has been invoked
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetcher for SequenceFetcher {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch(&self) -> Result<Value, SyncError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front();
        match next {
            Some(outcome) => {
                *self.last.lock() = Some(outcome.clone());
                outcome
            }
            None => self
                .last
                .lock()
                .clone()
                .unwrap_or_else(|| Err(SyncError::shape("sequence fetcher script is empty"))),
        }
    }
}

/// Build a synchronizer over any set of fetchers
pub fn synchronizer_with(fetchers: Vec<Arc<dyn Fetcher>>) -> Arc<Synchronizer> {
    Arc::new(Synchronizer::new(fetchers).unwrap())
}

/// Install a tracing subscriber for test diagnostics
///
/// Respects `RUST_LOG`; safe to call from every test since repeat
/// installs are ignored.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use remsync_core::{ErrorKind, FetchStatus};
    use serde_json::json;

    #[tokio::test]
    async fn static_and_failing_fetchers() {
        let sync = synchronizer_with(vec![
            Arc::new(StaticFetcher::new("a", json!(1))),
            Arc::new(FailingFetcher::new("b", SyncError::service("down"))),
        ]);

        let state = sync.load().await;
        assert_eq!(state.status(), FetchStatus::Error);
        assert_eq!(state.error().unwrap().kind, ErrorKind::Service);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_fetcher_waits_for_its_delay() {
        let fetcher = SlowFetcher::new("slow", Duration::from_secs(45), json!("late"));
        let started = tokio::time::Instant::now();
        let value = fetcher.fetch().await.unwrap();
        assert_eq!(value, json!("late"));
        assert_eq!(started.elapsed(), Duration::from_secs(45));
    }

    #[tokio::test]
    async fn sequence_fetcher_replays_then_repeats_last() {
        let fetcher = SequenceFetcher::new(
            "seq",
            vec![Err(SyncError::network("first")), Ok(json!("second"))],
        );

        assert!(fetcher.fetch().await.is_err());
        assert_eq!(fetcher.fetch().await.unwrap(), json!("second"));
        assert_eq!(fetcher.fetch().await.unwrap(), json!("second"));
        assert_eq!(fetcher.calls(), 3);
    }
}
