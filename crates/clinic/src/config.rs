//! CLI configuration: a thin wrapper around the `clinic_config` shared types.
//!
//! Re-exports the shared types and adds CLI-specific resolution that
//! respects `GlobalOpts` flag overrides (--server, --insecure, --timeout).

use std::sync::Arc;

use clinic_api::TokenStore;
use clinic_core::ClinicConfig;

use crate::cli::GlobalOpts;
use crate::error::CliError;

// ── Re-exports from shared crate ────────────────────────────────────

pub use clinic_config::{
    Config, Defaults, Profile, config_path, load_config_or_default, save_config,
};

// ── CLI-specific helpers ────────────────────────────────────────────

/// Resolve the active profile name from CLI flags and config.
pub fn active_profile_name(global: &GlobalOpts, config: &Config) -> String {
    global
        .profile
        .clone()
        .or_else(|| config.default_profile.clone())
        .unwrap_or_else(|| "default".into())
}

/// Everything needed to talk to the server for one invocation.
pub struct Resolved {
    pub profile_name: String,
    pub profile: Profile,
    pub clinic: ClinicConfig,
    pub store: Arc<dyn TokenStore>,
}

/// Resolve the active profile with CLI flag overrides applied.
///
/// Without a matching profile, `--server` alone is enough.
pub fn resolve(global: &GlobalOpts) -> Result<Resolved, CliError> {
    let cfg = load_config_or_default();
    let profile_name = active_profile_name(global, &cfg);

    let mut profile = match cfg.profiles.get(&profile_name) {
        Some(profile) => profile.clone(),
        None if global.server.is_some() => Profile::default(),
        None if global.profile.is_some() => {
            let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
            available.sort();
            return Err(CliError::ProfileNotFound {
                name: profile_name,
                available: if available.is_empty() {
                    "(none)".into()
                } else {
                    available.join(", ")
                },
            });
        }
        None => {
            return Err(CliError::NoConfig {
                path: config_path().display().to_string(),
            });
        }
    };

    // Flag > env > profile
    if let Some(ref server) = global.server {
        profile.server.clone_from(server);
    }
    if global.insecure {
        profile.insecure = Some(true);
    }
    if let Some(timeout) = global.timeout {
        profile.timeout = Some(timeout);
    }

    let clinic = clinic_config::profile_to_clinic_config(&profile, &cfg.defaults)?;
    let store = clinic_config::token_store(&profile, &profile_name);

    Ok(Resolved {
        profile_name,
        profile,
        clinic,
        store,
    })
}
