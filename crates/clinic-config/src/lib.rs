//! Shared configuration for the clinic CLI.
//!
//! TOML profiles with environment overrides, password resolution
//! (env + keyring + plaintext), session credential persistence, and
//! translation to `clinic_core::ClinicConfig`.

mod store;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clinic_api::TlsMode;
use clinic_core::ClinicConfig;
use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use store::{FileTokenStore, KeyringTokenStore, KEYRING_SERVICE, session_path, token_store};

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("no credentials configured for profile '{profile}'")]
    NoCredentials { profile: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    /// Default profile name.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Named server profiles.
    #[serde(default)]
    pub profiles: HashMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some("default".into()),
            defaults: Defaults::default(),
            profiles: HashMap::new(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Query staleness window in seconds.
    #[serde(default)]
    pub stale_time: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            stale_time: 0,
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}

/// A named server profile.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Profile {
    /// Server base URL (e.g., "https://clinic.example.com").
    pub server: String,

    /// Login email.
    pub email: Option<String>,

    /// Password (plaintext; prefer keyring or `CLINIC_PASSWORD`).
    pub password: Option<String>,

    /// Path to custom CA certificate.
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    pub insecure: Option<bool>,

    /// Override timeout.
    pub timeout: Option<u64>,

    /// Override query staleness window.
    pub stale_time: Option<u64>,

    /// Where session credentials live: "keyring" (default) or "file".
    pub token_store: Option<String>,
}

// ── Config file path ────────────────────────────────────────────────

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "clinicly", "clinicly")
}

/// Resolve the config file path via XDG / platform conventions.
///
/// `CLINIC_CONFIG` overrides the location.
pub fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("CLINIC_CONFIG") {
        return PathBuf::from(path);
    }
    project_dirs().map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("clinicly");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from `path`, then apply `CLINIC_*` environment overrides
/// (`CLINIC_DEFAULTS_TIMEOUT=60`, `CLINIC_DEFAULT_PROFILE=staging`).
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CLINIC_").split("__").ignore(&["config", "password", "session_dir"]));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<(), ConfigError> {
    save_config_to(&config_path(), cfg)
}

pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Credential resolution ───────────────────────────────────────────

/// Resolve the login password without prompting:
/// `CLINIC_PASSWORD`, then the keyring, then plaintext in the profile.
pub fn resolve_password(
    profile: &Profile,
    profile_name: &str,
) -> Result<SecretString, ConfigError> {
    // 1. Env var
    if let Ok(pw) = std::env::var("CLINIC_PASSWORD") {
        return Ok(SecretString::from(pw));
    }

    // 2. Keyring
    if let Ok(entry) = keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password")) {
        if let Ok(pw) = entry.get_password() {
            return Ok(SecretString::from(pw));
        }
    }

    // 3. Plaintext in config
    if let Some(ref pw) = profile.password {
        return Ok(SecretString::from(pw.clone()));
    }

    Err(ConfigError::NoCredentials {
        profile: profile_name.into(),
    })
}

/// Store a password in the system keyring for later logins.
pub fn store_password(profile_name: &str, password: &str) -> Result<(), ConfigError> {
    keyring::Entry::new(KEYRING_SERVICE, &format!("{profile_name}/password"))
        .and_then(|entry| entry.set_password(password))
        .map_err(|e| ConfigError::Validation {
            field: "keyring".into(),
            reason: e.to_string(),
        })
}

/// Build a `ClinicConfig` from a profile and the global defaults.
pub fn profile_to_clinic_config(
    profile: &Profile,
    defaults: &Defaults,
) -> Result<ClinicConfig, ConfigError> {
    let url: url::Url = profile
        .server
        .parse()
        .map_err(|_| ConfigError::Validation {
            field: "server".into(),
            reason: format!("invalid URL: {}", profile.server),
        })?;

    let tls = if profile.insecure.unwrap_or(defaults.insecure) {
        TlsMode::DangerAcceptInvalid
    } else if let Some(ref ca_path) = profile.ca_cert {
        TlsMode::CustomCa(ca_path.clone())
    } else {
        TlsMode::System
    };

    let mut config = ClinicConfig::new(url);
    config.tls = tls;
    config.timeout = Duration::from_secs(profile.timeout.unwrap_or(defaults.timeout));
    config.stale_time = Duration::from_secs(profile.stale_time.unwrap_or(defaults.stale_time));
    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.profiles.insert(
            "default".into(),
            Profile {
                server: "https://clinic.example.com".into(),
                email: Some("doc@clinic.test".into()),
                ..Profile::default()
            },
        );
        save_config_to(&path, &cfg).unwrap();

        let loaded = load_config_from(&path).unwrap();
        assert_eq!(loaded.default_profile.as_deref(), Some("default"));
        assert_eq!(loaded.defaults.timeout, 30);
        let profile = &loaded.profiles["default"];
        assert_eq!(profile.server, "https://clinic.example.com");
        assert_eq!(profile.email.as_deref(), Some("doc@clinic.test"));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_from(&dir.path().join("absent.toml")).unwrap();
        assert!(loaded.profiles.is_empty());
        assert_eq!(loaded.defaults.output, "table");
    }

    #[test]
    fn profile_translates_to_clinic_config() {
        let defaults = Defaults::default();
        let profile = Profile {
            server: "https://clinic.example.com".into(),
            timeout: Some(5),
            stale_time: Some(60),
            ca_cert: Some(PathBuf::from("/etc/clinic/ca.pem")),
            ..Profile::default()
        };

        let config = profile_to_clinic_config(&profile, &defaults).unwrap();
        assert_eq!(config.timeout, Duration::from_secs(5));
        assert_eq!(config.stale_time, Duration::from_secs(60));
        assert_eq!(config.tls, TlsMode::CustomCa(PathBuf::from("/etc/clinic/ca.pem")));

        let insecure = Profile {
            insecure: Some(true),
            ..profile
        };
        let config = profile_to_clinic_config(&insecure, &defaults).unwrap();
        assert_eq!(config.tls, TlsMode::DangerAcceptInvalid);
    }

    #[test]
    fn rejects_invalid_server_url() {
        let profile = Profile {
            server: "not a url".into(),
            ..Profile::default()
        };
        let err = profile_to_clinic_config(&profile, &Defaults::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref field, .. } if field == "server"));
    }
}
