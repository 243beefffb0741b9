//! Interval polling with teardown guarantees
//!
//! A view that wants its data kept fresh starts a polling subscription:
//! one immediate load, then one attempt per interval tick. Ticks that fire
//! while a previous load is still in flight are skipped, and stopping the
//! subscription both clears the timer and invalidates any in-flight load so
//! its late result is never applied.

use crate::error::ConfigError;
use crate::synchronizer::Synchronizer;
use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::MissedTickBehavior;
use ulid::Ulid;

/// Cadence used by the dashboard screens when none is given
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Unique identifier of the view instance that owns a subscription
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct OwnerId(pub Ulid);

impl OwnerId {
    /// Generate new owner ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// State shared between a subscription handle and its polling task
struct SubscriptionShared {
    owner_id: OwnerId,
    interval: Duration,
    active: AtomicBool,
    stopper: Notify,
}

/// Handle to an active polling timer
///
/// Dropping the handle stops the timer, so a view that simply goes away
/// gets the same teardown as one that calls [`stop`](Self::stop).
pub struct PollingSubscription {
    shared: Arc<SubscriptionShared>,
    sync: Arc<Synchronizer>,
}

impl PollingSubscription {
    /// Stop polling
    ///
    /// Idempotent. Clears the timer and invalidates the synchronizer
    /// generation, so a load that was in flight at the time of the call has
    /// its eventual result discarded rather than applied.
    pub fn stop(&self) {
        if self.shared.active.swap(false, Ordering::SeqCst) {
            self.sync.invalidate();
            self.shared.stopper.notify_one();
            tracing::info!("stopped polling for owner {}", self.shared.owner_id);
        }
    }

    /// Whether the timer is still scheduled
    #[inline]
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    /// Owning view instance
    #[inline]
    #[must_use]
    pub fn owner_id(&self) -> OwnerId {
        self.shared.owner_id
    }

    /// Re-fetch cadence
    #[inline]
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.shared.interval
    }
}

impl Drop for PollingSubscription {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for PollingSubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PollingSubscription")
            .field("owner_id", &self.shared.owner_id)
            .field("interval", &self.shared.interval)
            .field("active", &self.is_active())
            .finish()
    }
}

/// Start polling a synchronizer on a fixed cadence
///
/// Loads once immediately, then once per tick. A tick firing while a prior
/// load is still in flight is skipped rather than overlapped, and missed
/// ticks are not replayed.
///
/// # Errors
/// - `ConfigError::ZeroInterval` if `every` is zero
pub fn start_polling(
    sync: Arc<Synchronizer>,
    every: Duration,
    owner_id: OwnerId,
) -> Result<PollingSubscription, ConfigError> {
    if every.is_zero() {
        return Err(ConfigError::ZeroInterval);
    }

    let shared = Arc::new(SubscriptionShared {
        owner_id,
        interval: every,
        active: AtomicBool::new(true),
        stopper: Notify::new(),
    });

    let task_shared = shared.clone();
    let task_sync = sync.clone();
    tokio::spawn(async move {
        // The first tick completes immediately, giving the initial load.
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = task_shared.stopper.notified() => break,
                _ = ticker.tick() => {
                    if !task_shared.active.load(Ordering::SeqCst) {
                        break;
                    }
                    task_sync.try_load().await;
                }
            }
        }
        tracing::debug!("polling task exited for owner {}", task_shared.owner_id);
    });

    tracing::info!(
        "started polling for owner {} every {:?}",
        shared.owner_id,
        every
    );
    Ok(PollingSubscription { shared, sync })
}

/// Owner-keyed registry of polling subscriptions
///
/// Enforces the one-timer-per-owner invariant: starting a subscription for
/// an owner that already has one stops and replaces the old timer.
#[derive(Debug, Default)]
pub struct PollingRegistry {
    entries: DashMap<OwnerId, PollingSubscription>,
}

impl PollingRegistry {
    /// Create an empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start (or restart) polling for an owner
    ///
    /// # Errors
    /// - `ConfigError::ZeroInterval` if `every` is zero
    pub fn start(
        &self,
        owner_id: OwnerId,
        sync: Arc<Synchronizer>,
        every: Duration,
    ) -> Result<(), ConfigError> {
        if let Some((_, previous)) = self.entries.remove(&owner_id) {
            tracing::warn!("owner {} was already polling, replacing timer", owner_id);
            previous.stop();
        }
        let subscription = start_polling(sync, every, owner_id)?;
        self.entries.insert(owner_id, subscription);
        Ok(())
    }

    /// Stop and remove an owner's subscription
    ///
    /// Returns whether a subscription existed.
    pub fn stop(&self, owner_id: OwnerId) -> bool {
        match self.entries.remove(&owner_id) {
            Some((_, subscription)) => {
                subscription.stop();
                true
            }
            None => false,
        }
    }

    /// Stop every subscription
    pub fn stop_all(&self) {
        self.entries.clear();
    }

    /// Whether an owner currently has an active timer
    #[must_use]
    pub fn is_active(&self, owner_id: OwnerId) -> bool {
        self.entries
            .get(&owner_id)
            .map(|entry| entry.is_active())
            .unwrap_or(false)
    }

    /// Number of registered subscriptions
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
