// ── Query observers ──
//
// An observer follows exactly one key at a time. Switching keys swaps
// the underlying watch receiver, so a late result for the previous key
// lands in that key's slot and never reaches this observer.

use std::sync::Arc;

use tokio::sync::watch;

use super::cache::CacheEntry;
use super::definition::Query;
use super::key::QueryKey;
use super::state::{QueryState, RawState};
use super::stream::QueryStream;

/// Live view of one query that can be re-pointed at another key.
pub struct QueryObserver<T> {
    query: Query<T>,
    entry: Arc<CacheEntry>,
    receiver: watch::Receiver<RawState>,
}

impl<T> std::fmt::Debug for QueryObserver<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryObserver")
            .field("key", &self.query.key)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> QueryObserver<T> {
    pub(crate) fn new(query: Query<T>) -> Self {
        let entry = query.cache.entry(&query.key);
        let receiver = entry.subscribe();
        let mut observer = Self {
            query,
            entry,
            receiver,
        };
        observer.ensure();
        observer
    }

    /// Follow the live slot for the key if the old one was removed.
    fn reattach(&mut self) {
        let current = self.query.cache.entry(&self.query.key);
        if !Arc::ptr_eq(&current, &self.entry) {
            self.receiver = current.subscribe();
            self.entry = current;
        }
    }

    /// Fetch unless the data is fresh.
    fn ensure(&mut self) {
        self.reattach();
        self.query.cache.ensure_raw(
            &self.query.key,
            &self.entry,
            &self.query.fetcher,
            self.query.effective_stale_time(),
        );
    }

    pub fn key(&self) -> &QueryKey {
        &self.query.key
    }

    pub fn state(&self) -> QueryState<T> {
        QueryState::from_raw(&self.receiver.borrow())
    }

    /// Wait for the next state change. `None` once the slot is gone.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.receiver.changed().await.ok()?;
        Some(QueryState::from_raw(&self.receiver.borrow_and_update()))
    }

    /// Wait until no fetch is pending for the current key.
    pub async fn settled(&mut self) -> QueryState<T> {
        self.reattach();
        let idle = {
            let raw = self.receiver.borrow();
            !raw.is_fetching && (raw.invalidated || (raw.data.is_none() && raw.error.is_none()))
        };
        if idle {
            self.ensure();
        }
        loop {
            let state = QueryState::from_raw(&self.receiver.borrow_and_update());
            if state.is_settled() {
                return state;
            }
            if self.receiver.changed().await.is_err() {
                return self.state();
            }
        }
    }

    /// Fetch again now and return the resulting state.
    pub async fn refetch(&mut self) -> QueryState<T> {
        // The outcome is recorded in the slot; the state carries it.
        let _ = self.query.refetch().await;
        self.settled().await
    }

    /// Follow a different query (typically new parameters).
    pub fn set_query(&mut self, query: Query<T>) {
        let same_key = query.key == self.query.key;
        self.query = query;
        if !same_key {
            self.entry = self.query.cache.entry(&self.query.key);
            self.receiver = self.entry.subscribe();
        }
        self.ensure();
    }

    /// Hand the subscription over as a [`QueryStream`].
    pub fn into_stream(self) -> QueryStream<T> {
        QueryStream::new(self.receiver)
    }
}
