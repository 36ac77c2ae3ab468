// ── Query cache service ──
//
// One slot per `QueryKey` in a `DashMap`. Each slot publishes its state
// through a `watch` channel, allows at most one in-flight fetch, and
// carries a generation counter. Invalidation bumps the generation, so a
// fetch started earlier still resolves for its own awaiters but never
// writes into the slot.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use dashmap::DashMap;
use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::key::{KeyFilter, QueryKey};
use super::state::{AnyData, QueryError, QueryState, RawState};
use super::{Query, QueryObserver};

/// Type-erased fetch function stored per slot for background refetches.
pub(crate) type Fetcher =
    Arc<dyn Fn() -> BoxFuture<'static, Result<AnyData, QueryError>> + Send + Sync>;

type SharedFetch = Shared<BoxFuture<'static, Result<AnyData, QueryError>>>;

/// Default retention of unobserved entries.
pub const DEFAULT_GC_TIME: Duration = Duration::from_secs(5 * 60);

/// Cache-wide timing defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long fetched data counts as fresh. Zero means every access
    /// past the first triggers a background refetch.
    pub stale_time: Duration,
    /// How long an entry with no observers survives before collection.
    pub gc_time: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            stale_time: Duration::ZERO,
            gc_time: DEFAULT_GC_TIME,
        }
    }
}

// ── Entries ─────────────────────────────────────────────────────────

struct InFlight {
    generation: u64,
    future: SharedFetch,
}

pub(crate) struct CacheEntry {
    state: watch::Sender<RawState>,
    generation: AtomicU64,
    /// Also guards generation bumps so settle/invalidate never interleave.
    inflight: Mutex<Option<InFlight>>,
    fetcher: Mutex<Option<Fetcher>>,
    last_used: Mutex<Instant>,
}

impl CacheEntry {
    fn new() -> Self {
        let (state, _) = watch::channel(RawState::default());
        Self {
            state,
            generation: AtomicU64::new(0),
            inflight: Mutex::new(None),
            fetcher: Mutex::new(None),
            last_used: Mutex::new(Instant::now()),
        }
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<RawState> {
        self.state.subscribe()
    }

    fn snapshot(&self) -> RawState {
        self.state.borrow().clone()
    }

    fn is_observed(&self) -> bool {
        self.state.receiver_count() > 0
    }

    fn touch(&self) {
        *self.last_used.lock().expect("last_used lock poisoned") = Instant::now();
    }

    fn fetcher(&self) -> Option<Fetcher> {
        self.fetcher
            .lock()
            .expect("fetcher lock poisoned")
            .clone()
    }

    fn set_fetcher(&self, fetcher: &Fetcher) {
        *self.fetcher.lock().expect("fetcher lock poisoned") = Some(Arc::clone(fetcher));
    }

    fn is_collectable(&self, gc_time: Duration) -> bool {
        if self.is_observed() {
            return false;
        }
        if self
            .inflight
            .lock()
            .expect("in-flight lock poisoned")
            .is_some()
        {
            return false;
        }
        self.last_used
            .lock()
            .expect("last_used lock poisoned")
            .elapsed()
            >= gc_time
    }

    fn invalidate(&self) {
        let mut slot = self.inflight.lock().expect("in-flight lock poisoned");
        self.generation.fetch_add(1, Ordering::AcqRel);
        *slot = None;
        self.state.send_modify(|s| {
            s.invalidated = true;
            s.is_fetching = false;
        });
    }

    /// Back to "never requested": drop data and any running fetch.
    fn reset(&self) {
        let mut slot = self.inflight.lock().expect("in-flight lock poisoned");
        self.generation.fetch_add(1, Ordering::AcqRel);
        *slot = None;
        self.state.send_replace(RawState::default());
    }

    /// Apply a fetch result if its generation is still current.
    fn settle(&self, key: &QueryKey, generation: u64, result: Result<AnyData, QueryError>) {
        let mut slot = self.inflight.lock().expect("in-flight lock poisoned");
        if self.generation.load(Ordering::Acquire) != generation {
            trace!(%key, generation, "discarding result of superseded fetch");
            return;
        }
        *slot = None;
        self.state.send_modify(|s| {
            s.is_fetching = false;
            match result {
                Ok(data) => {
                    s.data = Some(data);
                    s.error = None;
                    s.updated_at = Some(Instant::now());
                    s.invalidated = false;
                }
                Err(error) => {
                    debug!(%key, %error, "fetch failed");
                    s.error = Some(error);
                }
            }
        });
    }
}

// ── Cache ───────────────────────────────────────────────────────────

struct CacheInner {
    entries: DashMap<QueryKey, Arc<CacheEntry>>,
    config: CacheConfig,
}

/// Keyed store of server state with request deduplication, staleness,
/// invalidation and change subscriptions.
///
/// Cheap to clone; clones share the same entries.
#[derive(Clone)]
pub struct QueryCache {
    inner: Arc<CacheInner>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(CacheConfig::default())
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.inner.entries.len())
            .field("config", &self.inner.config)
            .finish()
    }
}

impl QueryCache {
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Arc::new(CacheInner {
                entries: DashMap::new(),
                config,
            }),
        }
    }

    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    pub fn len(&self) -> usize {
        self.inner.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.entries.is_empty()
    }

    pub(crate) fn entry(&self, key: &QueryKey) -> Arc<CacheEntry> {
        let slot = self
            .inner
            .entries
            .entry(key.clone())
            .or_insert_with(|| Arc::new(CacheEntry::new()));
        Arc::clone(slot.value())
    }

    // ── Reads ────────────────────────────────────────────────────────

    /// Resolve `key` with the cache-wide staleness window.
    ///
    /// Shorthand for `Query::new(cache, key, fetch).fetch()`.
    pub async fn get<T, F, Fut>(&self, key: QueryKey, fetch: F) -> Result<Arc<T>, QueryError>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, clinic_api::Error>> + Send + 'static,
    {
        Query::new(self, key, fetch).fetch().await
    }

    /// Start observing `key`; see [`QueryObserver`].
    pub fn observe<T, F, Fut>(&self, key: QueryKey, fetch: F) -> QueryObserver<T>
    where
        T: Send + Sync + 'static,
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, clinic_api::Error>> + Send + 'static,
    {
        Query::new(self, key, fetch).observe()
    }

    /// Resolve a key, fetching only when needed.
    ///
    /// Fresh data returns at once. Time-stale data also returns at once
    /// while a background refetch starts. Absent, errored or invalidated
    /// keys are fetched and awaited; concurrent callers share one fetch.
    pub(crate) async fn get_raw(
        &self,
        key: &QueryKey,
        fetcher: &Fetcher,
        stale_time: Duration,
    ) -> Result<AnyData, QueryError> {
        let entry = self.entry(key);
        entry.touch();
        entry.set_fetcher(fetcher);

        let snapshot = entry.snapshot();
        if let (Some(data), false) = (snapshot.data.clone(), snapshot.invalidated) {
            if !snapshot.is_fresh(stale_time) {
                trace!(%key, "serving stale data, refetching in background");
                drop(self.start_fetch(key, &entry, fetcher));
            }
            return Ok(data);
        }

        self.start_fetch(key, &entry, fetcher).await
    }

    /// Fetch regardless of freshness, joining any fetch already running.
    pub(crate) async fn refetch_raw(
        &self,
        key: &QueryKey,
        fetcher: &Fetcher,
    ) -> Result<AnyData, QueryError> {
        let entry = self.entry(key);
        entry.touch();
        entry.set_fetcher(fetcher);
        self.start_fetch(key, &entry, fetcher).await
    }

    /// Start a fetch for `entry` unless its data is fresh. Does not wait.
    pub(crate) fn ensure_raw(
        &self,
        key: &QueryKey,
        entry: &Arc<CacheEntry>,
        fetcher: &Fetcher,
        stale_time: Duration,
    ) {
        entry.touch();
        entry.set_fetcher(fetcher);
        if !entry.snapshot().is_fresh(stale_time) {
            drop(self.start_fetch(key, entry, fetcher));
        }
    }

    fn start_fetch(
        &self,
        key: &QueryKey,
        entry: &Arc<CacheEntry>,
        fetcher: &Fetcher,
    ) -> SharedFetch {
        let mut slot = entry.inflight.lock().expect("in-flight lock poisoned");
        let generation = entry.generation.load(Ordering::Acquire);

        if let Some(running) = slot.as_ref().filter(|f| f.generation == generation) {
            trace!(%key, "joining in-flight fetch");
            return running.future.clone();
        }

        debug!(%key, generation, "fetching");
        // The slot is written before any awaiter resumes.
        let settle_entry = Arc::clone(entry);
        let settle_key = key.clone();
        let fetch = fetcher();
        let future = async move {
            let result = fetch.await;
            settle_entry.settle(&settle_key, generation, result.clone());
            result
        }
        .boxed()
        .shared();
        *slot = Some(InFlight {
            generation,
            future: future.clone(),
        });
        entry.state.send_modify(|s| {
            s.is_fetching = true;
            if s.data.is_none() {
                s.error = None;
            }
        });
        drop(slot);

        // Runs to completion even if every caller goes away.
        tokio::spawn(future.clone().map(drop));

        future
    }

    /// Typed snapshot of a key without fetching. `None` if never requested.
    pub fn peek<T: Send + Sync + 'static>(&self, key: &QueryKey) -> Option<QueryState<T>> {
        self.inner
            .entries
            .get(key)
            .map(|entry| QueryState::from_raw(&entry.state.borrow()))
    }

    /// Write data directly, as if a fetch had just returned it.
    pub fn set_data<T: Send + Sync + 'static>(&self, key: &QueryKey, value: T) {
        let entry = self.entry(key);
        entry.touch();
        let data: AnyData = Arc::new(value);
        entry.state.send_modify(|s| {
            s.data = Some(data);
            s.error = None;
            s.updated_at = Some(Instant::now());
            s.invalidated = false;
        });
    }

    // ── Invalidation ─────────────────────────────────────────────────

    /// Mark matching keys stale and drop their in-flight fetches.
    ///
    /// Observed keys refetch immediately; the rest refetch on next access.
    /// Returns the number of keys invalidated.
    pub fn invalidate(&self, filter: impl Into<KeyFilter>) -> usize {
        let filter = filter.into();
        let matched: Vec<(QueryKey, Arc<CacheEntry>)> = self
            .inner
            .entries
            .iter()
            .filter(|e| filter.matches(e.key()))
            .map(|e| (e.key().clone(), Arc::clone(e.value())))
            .collect();

        let can_spawn = Handle::try_current().is_ok();
        for (key, entry) in &matched {
            entry.invalidate();
            if !(can_spawn && entry.is_observed()) {
                continue;
            }
            if let Some(fetcher) = entry.fetcher() {
                trace!(%key, "refetching observed query");
                drop(self.start_fetch(key, entry, &fetcher));
            }
        }

        if !matched.is_empty() {
            debug!(?filter, count = matched.len(), "invalidated queries");
        }
        matched.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    /// Subscribe to state changes of one key.
    ///
    /// Holding the subscription marks the key as observed: invalidation
    /// refetches it eagerly and garbage collection skips it.
    pub fn subscribe<T: Send + Sync + 'static>(&self, key: &QueryKey) -> super::QueryStream<T> {
        super::QueryStream::new(self.entry(key).subscribe())
    }

    /// Invoke `callback` with every new state of `key` until the returned
    /// guard is dropped.
    pub fn on_change<T, F>(&self, key: &QueryKey, callback: F) -> ChangeGuard
    where
        T: Send + Sync + 'static,
        F: Fn(QueryState<T>) + Send + 'static,
    {
        let mut stream = self.subscribe::<T>(key);
        let task = tokio::spawn(async move {
            while let Some(state) = stream.changed().await {
                callback(state);
            }
        });
        ChangeGuard { task }
    }

    // ── Removal ──────────────────────────────────────────────────────

    /// Forget one key. Its observers keep their last state.
    pub fn remove(&self, key: &QueryKey) -> bool {
        self.inner.entries.remove(key).is_some()
    }

    /// Forget every key.
    ///
    /// Observed entries are reset in place rather than dropped, so their
    /// observers see the empty state and follow later fetches of the key.
    pub fn clear(&self) {
        let mut kept = 0_usize;
        self.inner.entries.retain(|_, entry| {
            if entry.is_observed() {
                entry.reset();
                kept += 1;
                true
            } else {
                false
            }
        });
        debug!(kept, "cleared query cache");
    }

    /// Drop entries nobody observes that were last used more than
    /// `gc_time` ago. Returns how many were dropped.
    pub fn collect_garbage(&self) -> usize {
        let gc_time = self.inner.config.gc_time;
        let before = self.inner.entries.len();
        self.inner
            .entries
            .retain(|_, entry| !entry.is_collectable(gc_time));
        let dropped = before.saturating_sub(self.inner.entries.len());
        if dropped > 0 {
            trace!(dropped, "collected idle queries");
        }
        dropped
    }

    /// Run [`collect_garbage`](Self::collect_garbage) every `every` until
    /// the cache is dropped.
    pub fn spawn_collector(&self, every: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(&self.inner);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    break;
                };
                QueryCache { inner }.collect_garbage();
            }
        })
    }
}

/// Keeps an [`on_change`](QueryCache::on_change) callback registered.
/// Dropping it stops delivery.
#[derive(Debug)]
pub struct ChangeGuard {
    task: JoinHandle<()>,
}

impl Drop for ChangeGuard {
    fn drop(&mut self) {
        self.task.abort();
    }
}
