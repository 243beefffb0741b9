//! Scenario tests for combined loads
//!
//! Covers the all-or-nothing combination policy and the ordering guarantee
//! for overlapping loads.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use remsync_core::{ErrorKind, FetchStatus, Fetcher, FnFetcher, SyncError, Synchronizer};
use serde_json::json;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn ok_fetcher(name: &str, value: serde_json::Value) -> Arc<dyn Fetcher> {
    Arc::new(FnFetcher::new(name, move || {
        let value = value.clone();
        async move { Ok(value) }
    }))
}

fn failing_fetcher(name: &str, error: SyncError) -> Arc<dyn Fetcher> {
    Arc::new(FnFetcher::new(name, move || {
        let error = error.clone();
        async move { Err(error) }
    }))
}

#[tokio::test]
async fn three_fetchers_all_succeed() {
    let sync = Synchronizer::new(vec![
        ok_fetcher("customers", json!([{"id": 1}, {"id": 2}])),
        ok_fetcher("metrics", json!({"completion_rate": 0.82})),
        ok_fetcher("health", json!({"status": "ok"})),
    ])
    .unwrap();

    let state = sync.load().await;
    assert_eq!(state.status(), FetchStatus::Success);
    assert!(state.error().is_none());

    let data = state.data().unwrap();
    assert_eq!(data.len(), 3);
    assert!(data.contains_key("customers"));
    assert!(data.contains_key("metrics"));
    assert!(data.contains_key("health"));
    assert!(state.last_updated_at().is_some());
}

#[tokio::test]
async fn one_network_failure_fails_the_whole_load() {
    let sync = Synchronizer::new(vec![
        ok_fetcher("customers", json!([])),
        failing_fetcher("metrics", SyncError::network("request timed out")),
        ok_fetcher("health", json!({"status": "ok"})),
    ])
    .unwrap();

    let state = sync.load().await;
    assert_eq!(state.status(), FetchStatus::Error);
    assert!(state.data().is_none());

    let error = state.error().unwrap();
    assert_eq!(error.kind, ErrorKind::Network);
    assert_eq!(error.fetcher.as_deref(), Some("metrics"));
}

#[tokio::test(start_paused = true)]
async fn newer_load_supersedes_slower_older_load() {
    let calls = Arc::new(AtomicUsize::new(0));
    let fetcher_calls = calls.clone();
    let fetcher: Arc<dyn Fetcher> = Arc::new(FnFetcher::new("feed", move || {
        let n = fetcher_calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if n == 0 {
                // First load is slow and must lose to the refresh below.
                tokio::time::sleep(Duration::from_secs(20)).await;
                Ok(json!("old"))
            } else {
                Ok(json!("new"))
            }
        }
    }));

    let sync = Arc::new(Synchronizer::new(vec![fetcher]).unwrap());

    let older = {
        let sync = sync.clone();
        tokio::spawn(async move { sync.load().await })
    };
    tokio::task::yield_now().await;
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let state = sync.load().await;
    assert_eq!(state.data().unwrap()["feed"], json!("new"));

    tokio::time::advance(Duration::from_secs(21)).await;
    older.await.unwrap();

    // The older result settled after the newer one applied and was discarded.
    assert_eq!(sync.state().data().unwrap()["feed"], json!("new"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

proptest! {
    /// `load()` succeeds iff every fetcher succeeded, never a partial merge.
    #[test]
    fn load_is_all_or_nothing(outcomes in proptest::collection::vec(any::<bool>(), 0..8)) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let fetchers: Vec<Arc<dyn Fetcher>> = outcomes
                .iter()
                .enumerate()
                .map(|(i, &succeeds)| {
                    let name = format!("section-{i}");
                    if succeeds {
                        ok_fetcher(&name, json!(i))
                    } else {
                        failing_fetcher(&name, SyncError::service(format!("step {i} failed")))
                    }
                })
                .collect();

            let sync = Synchronizer::new(fetchers).unwrap();
            let state = sync.load().await;

            if outcomes.iter().all(|&ok| ok) {
                prop_assert_eq!(state.status(), FetchStatus::Success);
                prop_assert_eq!(state.data().unwrap().len(), outcomes.len());
                prop_assert!(state.error().is_none());
            } else {
                prop_assert_eq!(state.status(), FetchStatus::Error);
                prop_assert!(state.data().is_none());
                let expected = outcomes.iter().position(|&ok| !ok).unwrap();
                let expected_name = format!("section-{expected}");
                prop_assert_eq!(
                    state.error().unwrap().fetcher.as_deref(),
                    Some(expected_name.as_str())
                );
            }
            Ok(())
        })?;
    }
}
