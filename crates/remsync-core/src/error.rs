//! Error types for the synchronizer
//!
//! Every failure a fetcher can produce is normalized into one shape:
//! - Network failures (request never completed)
//! - Service failures (remote answered but signaled an error)
//! - Shape failures (response did not match the expected structure)
//!
//! Views always branch on a single `SyncError`; the kind and originating
//! fetcher are metadata for display and logging, not control flow.

/// Classification of a normalized fetch failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Request could not be sent or timed out
    Network,
    /// Remote responded but signaled failure (non-2xx or `success: false`)
    Service,
    /// Response body did not match the expected structure
    Shape,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Service => write!(f, "service"),
            Self::Shape => write!(f, "shape"),
        }
    }
}

/// Normalized fetch error
///
/// The single error record a `FetchState` carries. `fetcher` names the
/// failing step when the error surfaced inside a combined load.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} error{}: {message}", fetcher_suffix(.fetcher))]
pub struct SyncError {
    /// Failure classification
    pub kind: ErrorKind,
    /// Name of the fetcher that produced the failure, when known
    pub fetcher: Option<String>,
    /// Human-readable message
    pub message: String,
}

impl SyncError {
    /// Create an error of the given kind
    #[inline]
    #[must_use]
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            fetcher: None,
            message: message.into(),
        }
    }

    /// Request could not be sent or timed out
    #[inline]
    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Network, message)
    }

    /// Remote responded but signaled failure
    #[inline]
    #[must_use]
    pub fn service(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Service, message)
    }

    /// Response body did not match the expected structure
    #[inline]
    #[must_use]
    pub fn shape(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Shape, message)
    }

    /// Attach the originating fetcher name
    #[inline]
    #[must_use]
    pub fn for_fetcher(mut self, name: impl Into<String>) -> Self {
        self.fetcher = Some(name.into());
        self
    }
}

fn fetcher_suffix(fetcher: &Option<String>) -> String {
    match fetcher {
        Some(name) => format!(" in fetcher '{name}'"),
        None => String::new(),
    }
}

/// Errors from synchronizer and subscription construction
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Two fetchers share a section name; the keyed combination would drop one
    #[error("duplicate fetcher name: {0}")]
    DuplicateFetcher(String),

    /// Polling cadence must be positive
    #[error("polling interval must be positive")]
    ZeroInterval,
}
