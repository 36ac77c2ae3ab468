// ── Query layer ──
//
// Server-state caching for view-models: keys, the cache service,
// query definitions, observers and state streams.

mod cache;
mod definition;
mod key;
mod observer;
mod state;
mod stream;

pub use cache::{CacheConfig, ChangeGuard, DEFAULT_GC_TIME, QueryCache};
pub use definition::Query;
pub use key::{KeyFilter, QueryKey, Resource};
pub use observer::QueryObserver;
pub use state::{QueryError, QueryState};
pub use stream::{QueryStream, QueryWatchStream};
