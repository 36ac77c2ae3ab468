// ── Query state streams ──
//
// Subscription handles for consuming state changes of one cache slot.

use std::marker::PhantomData;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use tokio::sync::watch;
use tokio_stream::wrappers::WatchStream;

use super::state::{QueryState, RawState};

/// A subscription to one query key.
///
/// Provides point-in-time access and change notification via
/// `changed()` or by converting to a `Stream`.
pub struct QueryStream<T> {
    receiver: watch::Receiver<RawState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> QueryStream<T> {
    pub(crate) fn new(receiver: watch::Receiver<RawState>) -> Self {
        Self {
            receiver,
            _marker: PhantomData,
        }
    }

    /// Get the latest state.
    pub fn latest(&self) -> QueryState<T> {
        QueryState::from_raw(&self.receiver.borrow())
    }

    /// Wait for the next change, returning the new state.
    /// Returns `None` if the slot has been dropped from the cache.
    pub async fn changed(&mut self) -> Option<QueryState<T>> {
        self.receiver.changed().await.ok()?;
        Some(QueryState::from_raw(&self.receiver.borrow_and_update()))
    }

    /// Convert into a `Stream` for use with `StreamExt` combinators.
    pub fn into_stream(self) -> QueryWatchStream<T> {
        QueryWatchStream {
            inner: WatchStream::new(self.receiver),
            _marker: PhantomData,
        }
    }
}

/// `Stream` adapter backed by a `watch::Receiver`. Yields the current
/// state first, then every subsequent one.
pub struct QueryWatchStream<T> {
    inner: WatchStream<RawState>,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Stream for QueryWatchStream<T> {
    type Item = QueryState<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner)
            .poll_next(cx)
            .map(|raw| raw.map(|raw| QueryState::from_raw(&raw)))
    }
}
