//! Server-state layer between `clinic-api` and its consumers.
//!
//! - **[`Clinic`]**: facade owning the API client, the query cache and
//!   the invalidation table; vends one view-model per feature.
//!
//! - **[`QueryCache`]**: keyed server-state store. Deduplicates
//!   concurrent fetches, serves stale data while refreshing, discards
//!   results made obsolete by invalidation, and publishes every state
//!   change through `tokio::sync::watch`.
//!
//! - **[`Query`] / [`QueryObserver`]**: a key bound to its fetcher, and a
//!   live view that follows one key at a time.
//!
//! - **[`Mutation`]**: one backend write that invalidates its declared
//!   dependents on success, per the [`DependencyTable`].

pub mod clinic;
pub mod config;
pub mod invalidation;
pub mod mutation;
pub mod query;
pub mod viewmodel;

pub use clinic::Clinic;
pub use config::ClinicConfig;
pub use invalidation::{DependencyTable, Entity};
pub use mutation::Mutation;
pub use query::{
    CacheConfig, KeyFilter, Query, QueryCache, QueryError, QueryKey, QueryObserver, QueryState,
    QueryStream, Resource,
};
pub use viewmodel::{DashboardState, DashboardStats};
