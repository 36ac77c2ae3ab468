// ── Query definitions ──
//
// A `Query<T>` binds a key to the function that produces its data. View
// models build them from parameters; callers then fetch once or observe.

use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;

use super::cache::{Fetcher, QueryCache};
use super::key::{KeyFilter, QueryKey};
use super::observer::QueryObserver;
use super::state::{AnyData, QueryError, QueryState};

pub struct Query<T> {
    pub(crate) cache: QueryCache,
    pub(crate) key: QueryKey,
    pub(crate) fetcher: Fetcher,
    stale_time: Option<Duration>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for Query<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            key: self.key.clone(),
            fetcher: Arc::clone(&self.fetcher),
            stale_time: self.stale_time,
            _marker: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query")
            .field("key", &self.key)
            .field("stale_time", &self.stale_time)
            .finish_non_exhaustive()
    }
}

impl<T: Send + Sync + 'static> Query<T> {
    pub fn new<F, Fut>(cache: &QueryCache, key: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, clinic_api::Error>> + Send + 'static,
    {
        let fetcher: Fetcher = Arc::new(move || {
            let fut = fetch();
            async move {
                fut.await
                    .map(|value| Arc::new(value) as AnyData)
                    .map_err(Arc::new)
            }
            .boxed()
        });
        Self {
            cache: cache.clone(),
            key,
            fetcher,
            stale_time: None,
            _marker: PhantomData,
        }
    }

    /// Override the cache-wide staleness window for this query.
    pub fn stale_time(mut self, stale_time: Duration) -> Self {
        self.stale_time = Some(stale_time);
        self
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    pub(crate) fn effective_stale_time(&self) -> Duration {
        self.stale_time
            .unwrap_or_else(|| self.cache.config().stale_time)
    }

    /// Resolve through the cache (see [`QueryCache`] for the rules).
    pub async fn fetch(&self) -> Result<Arc<T>, QueryError> {
        let data = self
            .cache
            .get_raw(&self.key, &self.fetcher, self.effective_stale_time())
            .await?;
        self.downcast(data)
    }

    /// Fetch now, ignoring freshness.
    pub async fn refetch(&self) -> Result<Arc<T>, QueryError> {
        let data = self
            .cache
            .refetch_raw(&self.key, &self.fetcher)
            .await?;
        self.downcast(data)
    }

    /// Current cached state, without fetching.
    pub fn peek(&self) -> Option<QueryState<T>> {
        self.cache.peek(&self.key)
    }

    pub fn invalidate(&self) {
        self.cache
            .invalidate(KeyFilter::Exact(self.key.clone()));
    }

    /// Start observing; fetches if the key is not fresh.
    pub fn observe(self) -> QueryObserver<T> {
        QueryObserver::new(self)
    }

    fn downcast(&self, data: AnyData) -> Result<Arc<T>, QueryError> {
        data.downcast::<T>().map_err(|_| {
            Arc::new(clinic_api::Error::Deserialization {
                message: format!("cached value for '{}' has an unexpected type", self.key),
                body: String::new(),
            })
        })
    }
}
