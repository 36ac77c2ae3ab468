// ── Mutations ──
//
// A mutation runs one write against the backend. On success it
// invalidates its declared dependents; on failure the cache is left
// untouched. No retries.

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use tracing::debug;

use crate::query::{KeyFilter, QueryCache, Resource};

type Runner<I, O> =
    Arc<dyn Fn(I) -> BoxFuture<'static, Result<O, clinic_api::Error>> + Send + Sync>;

/// A backend write bound to the resources it invalidates.
pub struct Mutation<I, O> {
    cache: QueryCache,
    run: Runner<I, O>,
    invalidates: Vec<Resource>,
    pending: Arc<AtomicUsize>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            run: Arc::clone(&self.run),
            invalidates: self.invalidates.clone(),
            pending: Arc::clone(&self.pending),
        }
    }
}

impl<I, O> std::fmt::Debug for Mutation<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation")
            .field("invalidates", &self.invalidates)
            .field("pending", &self.pending.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

/// Decrements the pending counter even if the mutate future is dropped.
struct PendingGuard(Arc<AtomicUsize>);

impl Drop for PendingGuard {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl<I: Send + 'static, O: Send + 'static> Mutation<I, O> {
    pub fn new<F, Fut>(cache: &QueryCache, invalidates: &[Resource], run: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, clinic_api::Error>> + Send + 'static,
    {
        Self {
            cache: cache.clone(),
            run: Arc::new(move |input| run(input).boxed()),
            invalidates: invalidates.to_vec(),
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub async fn mutate(&self, input: I) -> Result<O, clinic_api::Error> {
        self.pending.fetch_add(1, Ordering::AcqRel);
        let _guard = PendingGuard(Arc::clone(&self.pending));

        let output = (self.run)(input).await?;
        for resource in &self.invalidates {
            self.cache.invalidate(KeyFilter::Resource(*resource));
        }
        debug!(invalidated = ?self.invalidates, "mutation succeeded");
        Ok(output)
    }

    /// `true` while at least one `mutate` call is running.
    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire) > 0
    }

    pub fn invalidates(&self) -> &[Resource] {
        &self.invalidates
    }
}
