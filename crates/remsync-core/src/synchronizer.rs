//! Combined concurrent loads with stale-response discarding
//!
//! One `Synchronizer` instance backs one view. It runs the view's fetchers
//! concurrently, combines their payloads all-or-nothing, and publishes the
//! resulting [`FetchState`] through a watch channel. A monotonically
//! increasing generation counter guarantees that a slow load settling after
//! a newer one never overwrites fresher state.

use crate::error::{ConfigError, SyncError};
use crate::fetcher::{Fetcher, SectionMap};
use crate::state::FetchState;
use chrono::Utc;
use futures::future::join_all;
use parking_lot::Mutex;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Remote-state synchronizer for one view instance
///
/// Holds the view's fetcher set for the lifetime of the view, so a retry or
/// poll tick always re-invokes the same configuration.
pub struct Synchronizer {
    fetchers: Vec<Arc<dyn Fetcher>>,
    tx: watch::Sender<FetchState<SectionMap>>,
    /// Generation of the most recently started (or invalidated) load
    generation: AtomicU64,
    /// Generation currently in flight; zero when none
    inflight: AtomicU64,
    /// Makes generation checks atomic with state publication
    apply_lock: Mutex<()>,
}

impl Synchronizer {
    /// Create a synchronizer over an ordered fetcher set
    ///
    /// # Errors
    /// - `ConfigError::DuplicateFetcher` if two fetchers share a name
    pub fn new(fetchers: Vec<Arc<dyn Fetcher>>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for fetcher in &fetchers {
            if !seen.insert(fetcher.name().to_string()) {
                return Err(ConfigError::DuplicateFetcher(fetcher.name().to_string()));
            }
        }

        let (tx, _rx) = watch::channel(FetchState::Idle);
        Ok(Self {
            fetchers,
            tx,
            generation: AtomicU64::new(0),
            inflight: AtomicU64::new(0),
            apply_lock: Mutex::new(()),
        })
    }

    /// Current state snapshot
    #[inline]
    #[must_use]
    pub fn state(&self) -> FetchState<SectionMap> {
        self.tx.borrow().clone()
    }

    /// Subscribe to state changes
    ///
    /// Each view renders from its own receiver; the sender side is owned by
    /// this synchronizer exclusively.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<FetchState<SectionMap>> {
        self.tx.subscribe()
    }

    /// Run every fetcher concurrently and publish the combined result
    ///
    /// All-or-nothing: the load succeeds iff every fetcher succeeded;
    /// otherwise the error of the first failing fetcher in registration
    /// order is published. The result is discarded if a newer load (or an
    /// invalidation) superseded this one while it was in flight.
    pub async fn load(&self) -> FetchState<SectionMap> {
        let generation = self.begin();
        self.run(generation).await
    }

    /// Like [`load`](Self::load), but a no-op while a load is in flight
    ///
    /// Used by polling ticks and [`retry`](Self::retry) so a slow network
    /// never accumulates overlapping requests.
    pub async fn try_load(&self) -> FetchState<SectionMap> {
        match self.try_begin() {
            Some(generation) => self.run(generation).await,
            None => {
                tracing::debug!("load already in flight, skipping");
                self.state()
            }
        }
    }

    /// Re-invoke the current fetcher set once
    ///
    /// A no-op when a load is already in flight, so a retry button mashed
    /// during `Loading` spawns no second request.
    pub async fn retry(&self) -> FetchState<SectionMap> {
        self.try_load().await
    }

    /// Supersede any in-flight load
    ///
    /// The pending result, if any, is discarded when it settles instead of
    /// being applied. Subscription teardown calls this so a destroyed view
    /// never observes a late response.
    pub fn invalidate(&self) {
        let _guard = self.apply_lock.lock();
        self.generation.fetch_add(1, Ordering::SeqCst);
    }

    /// Number of fetchers in this configuration
    #[inline]
    #[must_use]
    pub fn fetcher_count(&self) -> usize {
        self.fetchers.len()
    }

    /// Start a load unconditionally: bump the generation and publish `Loading`
    fn begin(&self) -> u64 {
        let _guard = self.apply_lock.lock();
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inflight.store(generation, Ordering::SeqCst);
        let loading = self.tx.borrow().clone().into_loading();
        self.tx.send_replace(loading);
        generation
    }

    /// Start a load only when none is in flight
    fn try_begin(&self) -> Option<u64> {
        let _guard = self.apply_lock.lock();
        if self.inflight.load(Ordering::SeqCst) != 0 {
            return None;
        }
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.inflight.store(generation, Ordering::SeqCst);
        let loading = self.tx.borrow().clone().into_loading();
        self.tx.send_replace(loading);
        Some(generation)
    }

    async fn run(&self, generation: u64) -> FetchState<SectionMap> {
        let results = join_all(self.fetchers.iter().map(|fetcher| async move {
            (fetcher.name().to_string(), fetcher.fetch().await)
        }))
        .await;

        self.apply(generation, combine(results));
        self.state()
    }

    /// Publish a settled outcome unless it has been superseded
    fn apply(&self, generation: u64, outcome: Result<SectionMap, SyncError>) -> bool {
        let _guard = self.apply_lock.lock();

        // This generation is no longer in flight regardless of staleness.
        let _ = self
            .inflight
            .compare_exchange(generation, 0, Ordering::SeqCst, Ordering::SeqCst);

        if self.generation.load(Ordering::SeqCst) != generation {
            tracing::debug!("discarding stale result for load generation {}", generation);
            return false;
        }

        let last_updated_at = self.tx.borrow().last_updated_at();
        let state = match outcome {
            Ok(data) => FetchState::Success {
                data,
                last_updated_at: Utc::now(),
            },
            Err(error) => {
                tracing::warn!("load failed: {}", error);
                FetchState::Error {
                    error,
                    last_updated_at,
                }
            }
        };
        self.tx.send_replace(state);
        true
    }
}

impl std::fmt::Debug for Synchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Synchronizer")
            .field(
                "fetchers",
                &self.fetchers.iter().map(|f| f.name()).collect::<Vec<_>>(),
            )
            .field("generation", &self.generation.load(Ordering::SeqCst))
            .finish()
    }
}

/// Combine settled fetcher results all-or-nothing
fn combine(results: Vec<(String, Result<serde_json::Value, SyncError>)>) -> Result<SectionMap, SyncError> {
    let mut map = SectionMap::with_capacity(results.len());
    for (name, result) in results {
        match result {
            Ok(value) => {
                map.insert(name, value);
            }
            Err(mut error) => {
                if error.fetcher.is_none() {
                    error.fetcher = Some(name);
                }
                return Err(error);
            }
        }
    }
    Ok(map)
}
