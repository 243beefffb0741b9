//! remsync core - remote-state synchronization for polling views
//!
//! A view registers a set of named asynchronous read operations and gets
//! back an observable [`FetchState`]:
//! - Combined concurrent loads (all-or-nothing, keyed by fetcher name)
//! - Fixed-interval polling with skipped ticks under slow networks
//! - Stale-response discarding via a request generation counter
//! - Idempotent teardown that never applies a late result
//!
//! # Example
//!
//! ```rust,ignore
//! use remsync_core::{FnFetcher, OwnerId, Synchronizer, start_polling};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let sync = Arc::new(Synchronizer::new(vec![
//!     Arc::new(FnFetcher::new("health", || async { todo!() })),
//! ])?);
//!
//! let subscription = start_polling(sync.clone(), Duration::from_secs(30), OwnerId::new())?;
//!
//! let state = sync.state();
//! println!("status: {:?}", state.status());
//!
//! subscription.stop();
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

// Core modules
pub mod error;
pub mod fetcher;
pub mod polling;
pub mod state;
pub mod synchronizer;

// Re-exports for convenience
pub use error::{ConfigError, ErrorKind, SyncError};
pub use fetcher::{section, Fetcher, FnFetcher, SectionMap};
pub use polling::{
    start_polling, OwnerId, PollingRegistry, PollingSubscription, DEFAULT_POLL_INTERVAL,
};
pub use state::{FetchState, FetchStatus};
pub use synchronizer::Synchronizer;

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with remsync
    pub use crate::{
        start_polling, ErrorKind, FetchState, FetchStatus, Fetcher, FnFetcher, OwnerId,
        PollingRegistry, PollingSubscription, SectionMap, SyncError, Synchronizer,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
