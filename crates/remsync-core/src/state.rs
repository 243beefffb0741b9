//! Observable fetch state
//!
//! The status/data/error triple a view renders from. The enum encodes the
//! core invariant structurally: data exists only in `Success`, an error only
//! in `Error`, and neither while `Idle` or `Loading`.

use crate::error::SyncError;
use chrono::{DateTime, Utc};

/// Discriminant of a [`FetchState`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchStatus {
    /// No load has been requested yet
    Idle,
    /// A load is in flight
    Loading,
    /// The last load settled with data
    Success,
    /// The last load settled with an error
    Error,
}

/// Observable state of one view's remote data
///
/// `last_updated_at` records the completion time of the most recent
/// successful load. It survives the `Loading` and `Error` states so a view
/// can keep showing "last refreshed at ..." while a reload is in flight or
/// after a failed one.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchState<T> {
    /// No load requested yet
    Idle,
    /// Load in flight; previous success timestamp retained
    Loading {
        /// Completion time of the last successful load, if any
        last_updated_at: Option<DateTime<Utc>>,
    },
    /// Load settled with data
    Success {
        /// Combined result of the load
        data: T,
        /// When this load settled
        last_updated_at: DateTime<Utc>,
    },
    /// Load settled with a normalized error
    Error {
        /// The single error record for the view to branch on
        error: SyncError,
        /// Completion time of the last successful load, if any
        last_updated_at: Option<DateTime<Utc>>,
    },
}

impl<T> FetchState<T> {
    /// Status discriminant
    #[inline]
    #[must_use]
    pub fn status(&self) -> FetchStatus {
        match self {
            Self::Idle => FetchStatus::Idle,
            Self::Loading { .. } => FetchStatus::Loading,
            Self::Success { .. } => FetchStatus::Success,
            Self::Error { .. } => FetchStatus::Error,
        }
    }

    /// Data, present only on success
    #[inline]
    #[must_use]
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Success { data, .. } => Some(data),
            _ => None,
        }
    }

    /// Error, present only on failure
    #[inline]
    #[must_use]
    pub fn error(&self) -> Option<&SyncError> {
        match self {
            Self::Error { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Completion time of the most recent successful load
    #[inline]
    #[must_use]
    pub fn last_updated_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Idle => None,
            Self::Loading { last_updated_at } | Self::Error { last_updated_at, .. } => {
                *last_updated_at
            }
            Self::Success {
                last_updated_at, ..
            } => Some(*last_updated_at),
        }
    }

    /// Whether a load is currently in flight
    #[inline]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading { .. })
    }

    /// Whether the last requested load has settled (success or error)
    #[inline]
    #[must_use]
    pub fn is_settled(&self) -> bool {
        matches!(self, Self::Success { .. } | Self::Error { .. })
    }

    /// Transition into `Loading`, retaining the last success timestamp
    #[must_use]
    pub(crate) fn into_loading(self) -> Self {
        FetchState::Loading {
            last_updated_at: self.last_updated_at(),
        }
    }
}

impl<T> Default for FetchState<T> {
    fn default() -> Self {
        Self::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_has_nothing() {
        let state: FetchState<u32> = FetchState::Idle;
        assert_eq!(state.status(), FetchStatus::Idle);
        assert!(state.data().is_none());
        assert!(state.error().is_none());
        assert!(state.last_updated_at().is_none());
        assert!(!state.is_settled());
    }

    #[test]
    fn success_exposes_data_only() {
        let state = FetchState::Success {
            data: 42u32,
            last_updated_at: Utc::now(),
        };
        assert_eq!(state.status(), FetchStatus::Success);
        assert_eq!(state.data(), Some(&42));
        assert!(state.error().is_none());
        assert!(state.last_updated_at().is_some());
        assert!(state.is_settled());
    }

    #[test]
    fn error_exposes_error_only() {
        let state: FetchState<u32> = FetchState::Error {
            error: SyncError::service("boom"),
            last_updated_at: None,
        };
        assert_eq!(state.status(), FetchStatus::Error);
        assert!(state.data().is_none());
        assert!(state.error().is_some());
    }

    #[test]
    fn loading_retains_success_timestamp() {
        let at = Utc::now();
        let state = FetchState::Success {
            data: 1u32,
            last_updated_at: at,
        };
        let loading = state.into_loading();
        assert!(loading.is_loading());
        assert_eq!(loading.last_updated_at(), Some(at));
        assert!(loading.data().is_none());
    }

    #[test]
    fn default_is_idle() {
        assert_eq!(FetchState::<u32>::default().status(), FetchStatus::Idle);
    }
}
