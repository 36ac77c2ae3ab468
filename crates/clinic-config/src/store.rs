// Session credential persistence
//
// `TokenStore` backends for the CLI: the system keyring (default) and a
// JSON file for hosts without a secret service. Failures are logged and
// degrade to "no credential" rather than aborting the command.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use clinic_api::TokenStore;
use tracing::warn;

use crate::{Profile, project_dirs};

/// Keyring service name for every clinicly secret.
pub const KEYRING_SERVICE: &str = "clinicly";

/// Credentials in the system keyring under `{profile}/{key}`.
#[derive(Debug, Clone)]
pub struct KeyringTokenStore {
    profile: String,
}

impl KeyringTokenStore {
    pub fn new(profile: impl Into<String>) -> Self {
        Self {
            profile: profile.into(),
        }
    }

    fn entry(&self, key: &str) -> Option<keyring::Entry> {
        keyring::Entry::new(KEYRING_SERVICE, &format!("{}/{key}", self.profile))
            .inspect_err(|e| warn!(error = %e, key, "keyring unavailable"))
            .ok()
    }
}

impl TokenStore for KeyringTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        self.entry(key)?.get_password().ok()
    }

    fn store(&self, key: &str, value: &str) {
        if let Some(entry) = self.entry(key) {
            if let Err(e) = entry.set_password(value) {
                warn!(error = %e, key, "failed to write keyring entry");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(entry) = self.entry(key) {
            match entry.delete_credential() {
                Ok(()) | Err(keyring::Error::NoEntry) => {}
                Err(e) => warn!(error = %e, key, "failed to delete keyring entry"),
            }
        }
    }
}

/// Credentials in a JSON object on disk, one file per profile.
#[derive(Debug)]
pub struct FileTokenStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> BTreeMap<String, String> {
        match std::fs::read_to_string(&self.path) {
            Ok(text) => serde_json::from_str(&text).unwrap_or_else(|e| {
                warn!(error = %e, path = %self.path.display(), "ignoring corrupt session file");
                BTreeMap::new()
            }),
            Err(_) => BTreeMap::new(),
        }
    }

    fn write(&self, values: &BTreeMap<String, String>) {
        let result = (|| -> std::io::Result<()> {
            if values.is_empty() {
                return match std::fs::remove_file(&self.path) {
                    Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
                    _ => Ok(()),
                };
            }
            if let Some(parent) = self.path.parent() {
                create_private_dir(parent)?;
            }
            write_private(&self.path, serde_json::to_string_pretty(values)?.as_bytes())
        })();
        if let Err(e) = result {
            warn!(error = %e, path = %self.path.display(), "failed to write session file");
        }
    }
}

/// Create `dir` and its missing ancestors, owner-only on unix.
fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        std::fs::DirBuilder::new().recursive(true).mode(0o700).create(dir)
    }
    #[cfg(not(unix))]
    {
        std::fs::create_dir_all(dir)
    }
}

/// Replace the contents of `path`, readable by the owner only on unix.
fn write_private(path: &Path, contents: &[u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .mode(0o600)
            .open(path)?;
        // `mode` only applies on creation; tighten files left by older builds.
        file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        file.write_all(contents)
    }
    #[cfg(not(unix))]
    {
        std::fs::write(path, contents)
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self, key: &str) -> Option<String> {
        let _guard = self.lock.lock().expect("session file lock poisoned");
        self.read().remove(key)
    }

    fn store(&self, key: &str, value: &str) {
        let _guard = self.lock.lock().expect("session file lock poisoned");
        let mut values = self.read();
        values.insert(key.to_owned(), value.to_owned());
        self.write(&values);
    }

    fn remove(&self, key: &str) {
        let _guard = self.lock.lock().expect("session file lock poisoned");
        let mut values = self.read();
        if values.remove(key).is_some() {
            self.write(&values);
        }
    }
}

/// Session file for a profile: `$CLINIC_SESSION_DIR/{profile}.json`, or
/// `sessions/{profile}.json` under the platform data directory.
pub fn session_path(profile_name: &str) -> PathBuf {
    let dir = std::env::var_os("CLINIC_SESSION_DIR").map_or_else(
        || {
            project_dirs().map_or_else(
                || PathBuf::from(".clinicly"),
                |dirs| dirs.data_local_dir().to_path_buf(),
            )
            .join("sessions")
        },
        PathBuf::from,
    );
    dir.join(format!("{profile_name}.json"))
}

/// The token store a profile asks for.
pub fn token_store(profile: &Profile, profile_name: &str) -> Arc<dyn TokenStore> {
    match profile.token_store.as_deref() {
        Some("file") => Arc::new(FileTokenStore::new(session_path(profile_name))),
        _ => Arc::new(KeyringTokenStore::new(profile_name)),
    }
}
