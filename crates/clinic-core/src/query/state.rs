// ── Query state snapshots ──
//
// Entries store their payload type-erased so one cache can hold every
// resource. Typed views downcast on read; a key is always fetched with
// the same payload type, so the downcast only fails on programmer error.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

/// Error shared between every waiter of one fetch.
pub type QueryError = Arc<clinic_api::Error>;

pub(crate) type AnyData = Arc<dyn Any + Send + Sync>;

/// Untyped state published by a cache entry on every transition.
#[derive(Clone, Default)]
pub(crate) struct RawState {
    pub data: Option<AnyData>,
    pub error: Option<QueryError>,
    /// When `data` was last written.
    pub updated_at: Option<Instant>,
    pub is_fetching: bool,
    pub invalidated: bool,
}

impl RawState {
    /// Data present, not invalidated, and younger than `stale_time`.
    pub fn is_fresh(&self, stale_time: Duration) -> bool {
        if self.data.is_none() || self.invalidated {
            return false;
        }
        self.updated_at
            .is_some_and(|at| at.elapsed() < stale_time)
    }
}

impl std::fmt::Debug for RawState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RawState")
            .field("has_data", &self.data.is_some())
            .field("error", &self.error)
            .field("is_fetching", &self.is_fetching)
            .field("invalidated", &self.invalidated)
            .finish_non_exhaustive()
    }
}

/// What a view sees for one query: `{data, is_loading, error}` plus
/// background-fetch status.
#[derive(Debug)]
pub struct QueryState<T> {
    /// Last successfully fetched value. Kept across refetch failures.
    pub data: Option<Arc<T>>,
    /// Error of the most recent fetch, cleared by the next success.
    pub error: Option<QueryError>,
    /// No data and no error yet: the first fetch is pending.
    pub is_loading: bool,
    /// A fetch for this key is in flight (initial or background).
    pub is_fetching: bool,
    pub updated_at: Option<Instant>,
}

impl<T> Clone for QueryState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
            is_fetching: self.is_fetching,
            updated_at: self.updated_at,
        }
    }
}

/// A key that has never been requested: nothing loaded, nothing running.
impl<T> Default for QueryState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: true,
            is_fetching: false,
            updated_at: None,
        }
    }
}

impl<T: Send + Sync + 'static> QueryState<T> {
    pub(crate) fn from_raw(raw: &RawState) -> Self {
        let data = raw.data.clone().and_then(|d| d.downcast::<T>().ok());
        Self {
            is_loading: raw.data.is_none() && raw.error.is_none(),
            data,
            error: raw.error.clone(),
            is_fetching: raw.is_fetching,
            updated_at: raw.updated_at,
        }
    }
}

impl<T> QueryState<T> {
    /// Neither loading nor fetching: the state will not change on its own.
    pub fn is_settled(&self) -> bool {
        !self.is_loading && !self.is_fetching
    }

    pub fn is_success(&self) -> bool {
        self.data.is_some() && self.error.is_none()
    }
}
