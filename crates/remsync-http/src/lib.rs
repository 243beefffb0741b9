//! remsync http - HTTP boundary for the remote-state synchronizer
//!
//! Wraps the backing services' JSON endpoints as core fetchers:
//! - [`ApiClient`]: base URL, request timeout, optional bearer token
//! - [`unwrap_envelope`]: `{ success, data?, error? }` normalization
//! - [`HttpFetcher`]: GET/POST adapters implementing the fetcher contract
//!
//! Transport failures, non-2xx statuses, `success: false` envelopes, and
//! malformed bodies all surface as the single normalized error shape from
//! `remsync-core`.

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod client;
pub mod envelope;
pub mod fetcher;

// Re-exports for convenience
pub use client::{ApiClient, ClientConfig, DEFAULT_TIMEOUT};
pub use envelope::unwrap_envelope;
pub use fetcher::HttpFetcher;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
