// Session context
//
// Holds the JWT credential pair for the lifetime of a login. The pair is
// persisted through a pluggable `TokenStore` under the `access_token` and
// `refresh_token` keys; absence of both means unauthenticated.

use std::sync::Arc;

use dashmap::DashMap;
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;

/// Storage key for the access credential.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Storage key for the refresh credential.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";

/// Key/value backend for session credentials.
///
/// Implementations swallow their own I/O failures (logging them) so that
/// a broken keyring degrades to "not logged in" instead of failing requests.
pub trait TokenStore: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn store(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

/// Process-local token store. Forgets everything on exit.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    values: DashMap<String, String>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        self.values.get(key).map(|v| v.value().clone())
    }

    fn store(&self, key: &str, value: &str) {
        self.values.insert(key.to_owned(), value.to_owned());
    }

    fn remove(&self, key: &str) {
        self.values.remove(key);
    }
}

/// An access/refresh credential pair.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: SecretString,
    pub refresh: SecretString,
}

/// Explicit session context injected into the [`ApiClient`](crate::ApiClient).
///
/// Lifecycle: [`begin`](Self::begin) on login, [`replace_access`](Self::replace_access)
/// on refresh, [`end`](Self::end) on logout or irrecoverable refresh failure.
#[derive(Clone)]
pub struct Session {
    store: Arc<dyn TokenStore>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl Session {
    pub fn new(store: Arc<dyn TokenStore>) -> Self {
        Self { store }
    }

    /// A session backed by a fresh [`MemoryTokenStore`].
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryTokenStore::new()))
    }

    pub fn access_token(&self) -> Option<SecretString> {
        self.store.load(ACCESS_TOKEN_KEY).map(SecretString::from)
    }

    pub fn refresh_token(&self) -> Option<SecretString> {
        self.store.load(REFRESH_TOKEN_KEY).map(SecretString::from)
    }

    /// `true` if an access credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.store.load(ACCESS_TOKEN_KEY).is_some()
    }

    /// Start a session with a freshly issued pair.
    pub fn begin(&self, pair: &TokenPair) {
        debug!("session started");
        self.store
            .store(ACCESS_TOKEN_KEY, pair.access.expose_secret());
        self.store
            .store(REFRESH_TOKEN_KEY, pair.refresh.expose_secret());
    }

    /// Swap in a refreshed access credential, keeping the refresh credential.
    pub fn replace_access(&self, access: &SecretString) {
        debug!("access credential refreshed");
        self.store.store(ACCESS_TOKEN_KEY, access.expose_secret());
    }

    /// Tear the session down, removing both credentials.
    pub fn end(&self) {
        debug!("session cleared");
        self.store.remove(ACCESS_TOKEN_KEY);
        self.store.remove(REFRESH_TOKEN_KEY);
    }
}
