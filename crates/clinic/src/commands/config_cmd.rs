//! Config subcommand handlers.

use std::collections::HashMap;

use dialoguer::{Input, Select};

use crate::cli::{ConfigArgs, ConfigCommand, GlobalOpts};
use crate::config::{self, Config, Defaults, Profile};
use crate::error::CliError;
use crate::output;

// ── Helpers ─────────────────────────────────────────────────────────

/// Format config for display, masking sensitive fields.
fn format_config_redacted(cfg: &Config) -> String {
    use std::fmt::Write;
    let mut out = String::new();

    if let Some(ref default) = cfg.default_profile {
        let _ = writeln!(out, "default_profile = \"{default}\"");
    }
    let _ = writeln!(out);
    let _ = writeln!(out, "[defaults]");
    let _ = writeln!(out, "output = \"{}\"", cfg.defaults.output);
    let _ = writeln!(out, "color = \"{}\"", cfg.defaults.color);
    let _ = writeln!(out, "insecure = {}", cfg.defaults.insecure);
    let _ = writeln!(out, "timeout = {}", cfg.defaults.timeout);
    let _ = writeln!(out, "stale_time = {}", cfg.defaults.stale_time);

    let mut names: Vec<_> = cfg.profiles.keys().collect();
    names.sort();
    for name in names {
        let p = &cfg.profiles[name];
        let _ = writeln!(out);
        let _ = writeln!(out, "[profiles.{name}]");
        let _ = writeln!(out, "server = \"{}\"", p.server);
        if let Some(ref email) = p.email {
            let _ = writeln!(out, "email = \"{email}\"");
        }
        if p.password.is_some() {
            let _ = writeln!(out, "password = \"****\"");
        }
        if let Some(ref ca) = p.ca_cert {
            let _ = writeln!(out, "ca_cert = \"{}\"", ca.display());
        }
        if let Some(insecure) = p.insecure {
            let _ = writeln!(out, "insecure = {insecure}");
        }
        if let Some(timeout) = p.timeout {
            let _ = writeln!(out, "timeout = {timeout}");
        }
        if let Some(stale_time) = p.stale_time {
            let _ = writeln!(out, "stale_time = {stale_time}");
        }
        if let Some(ref store) = p.token_store {
            let _ = writeln!(out, "token_store = \"{store}\"");
        }
    }

    out
}

/// Delegate to the shared config crate's save function.
fn save_config(cfg: &Config) -> Result<(), CliError> {
    config::save_config(cfg)?;
    Ok(())
}

/// Map a dialoguer / interactive I/O failure into CliError.
fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

fn available_profiles(cfg: &Config) -> String {
    let mut available: Vec<_> = cfg.profiles.keys().cloned().collect();
    available.sort();
    if available.is_empty() {
        "(none)".into()
    } else {
        available.join(", ")
    }
}

fn parse_secs(field: &str, value: &str) -> Result<u64, CliError> {
    value.parse().map_err(|_| CliError::Validation {
        field: field.into(),
        reason: "must be a number (seconds)".into(),
    })
}

/// Offer to store the password in the system keyring or return it for plaintext config.
///
/// Returns `Some(secret)` if the user chose plaintext, `None` if stored in keyring.
fn prompt_password_storage(profile_name: &str, secret: &str) -> Result<Option<String>, CliError> {
    let choices = &[
        "Store in system keyring (recommended)",
        "Save to config file (plaintext)",
        "Don't store; ask at login",
    ];
    let selection = Select::new()
        .with_prompt("Where to store the password?")
        .items(choices)
        .default(0)
        .interact()
        .map_err(prompt_err)?;

    match selection {
        0 => {
            clinic_config::store_password(profile_name, secret)?;
            eprintln!("   ✓ Password stored in system keyring");
            Ok(None)
        }
        1 => Ok(Some(secret.to_owned())),
        _ => Ok(None),
    }
}

// ── Handler ─────────────────────────────────────────────────────────

#[allow(clippy::too_many_lines)]
pub fn handle(args: ConfigArgs, global: &GlobalOpts) -> Result<(), CliError> {
    match args.command {
        // ── Init: interactive wizard ────────────────────────────────
        ConfigCommand::Init => {
            let config_path = config::config_path();
            eprintln!("Clinic CLI configuration wizard");
            eprintln!("   Config path: {}\n", config_path.display());

            // 1. Profile name
            let profile_name: String = Input::new()
                .with_prompt("Profile name")
                .default("default".into())
                .interact_text()
                .map_err(prompt_err)?;

            // 2. Server URL
            let server: String = Input::new()
                .with_prompt("Server URL")
                .default("http://localhost:8000".into())
                .interact_text()
                .map_err(prompt_err)?;
            if server.parse::<url::Url>().is_err() {
                return Err(CliError::Validation {
                    field: "server".into(),
                    reason: format!("invalid URL: {server}"),
                });
            }

            // 3. Email
            let email: String = Input::new()
                .with_prompt("Email")
                .interact_text()
                .map_err(prompt_err)?;

            // 4. Password (optional)
            let pass = rpassword::prompt_password("Password (leave empty to ask at login): ")
                .map_err(prompt_err)?;
            let password = if pass.is_empty() {
                None
            } else {
                prompt_password_storage(&profile_name, &pass)?
            };

            // 5. Session credential storage
            let store_choices = &["System keyring (recommended)", "File in the data directory"];
            let store_selection = Select::new()
                .with_prompt("Where to keep session credentials?")
                .items(store_choices)
                .default(0)
                .interact()
                .map_err(prompt_err)?;
            let token_store = (store_selection == 1).then(|| "file".to_string());

            // 6. Build profile and merge into the existing config
            let profile = Profile {
                server,
                email: Some(email),
                password,
                token_store,
                ..Profile::default()
            };

            let mut cfg = config::load_config_or_default();
            if cfg.profiles.is_empty() {
                cfg = Config {
                    default_profile: Some(profile_name.clone()),
                    defaults: Defaults::default(),
                    profiles: HashMap::new(),
                };
            }
            cfg.profiles.insert(profile_name.clone(), profile);

            // 7. Write config
            save_config(&cfg)?;

            eprintln!("\n✓ Configuration written to {}", config_path.display());
            eprintln!("  Profile: {profile_name}");
            eprintln!("\n  Sign in: clinic login --profile {profile_name}");

            Ok(())
        }

        // ── Show ────────────────────────────────────────────────────
        ConfigCommand::Show => {
            let cfg = config::load_config_or_default();
            let out = output::render_single(&global.output, &cfg, format_config_redacted, |_| {
                "config".into()
            });
            output::print_output(&out, global.quiet);
            Ok(())
        }

        // ── Set <key> <value> ───────────────────────────────────────
        ConfigCommand::Set { key, value } => {
            let mut cfg = config::load_config_or_default();
            let profile_name = config::active_profile_name(global, &cfg);

            let profile = cfg.profiles.entry(profile_name.clone()).or_default();

            match key.as_str() {
                "server" => {
                    if value.parse::<url::Url>().is_err() {
                        return Err(CliError::Validation {
                            field: "server".into(),
                            reason: format!("invalid URL: {value}"),
                        });
                    }
                    profile.server = value;
                }
                "email" => profile.email = Some(value),
                "insecure" => {
                    profile.insecure = Some(value.parse().map_err(|_| CliError::Validation {
                        field: "insecure".into(),
                        reason: "must be 'true' or 'false'".into(),
                    })?);
                }
                "timeout" => profile.timeout = Some(parse_secs("timeout", &value)?),
                "stale_time" | "stale-time" => {
                    profile.stale_time = Some(parse_secs("stale_time", &value)?);
                }
                "ca_cert" | "ca-cert" => profile.ca_cert = Some(value.into()),
                "token_store" | "token-store" => {
                    if !matches!(value.as_str(), "keyring" | "file") {
                        return Err(CliError::Validation {
                            field: "token_store".into(),
                            reason: "must be 'keyring' or 'file'".into(),
                        });
                    }
                    profile.token_store = Some(value);
                }
                other => {
                    return Err(CliError::Validation {
                        field: other.into(),
                        reason: format!(
                            "unknown config key '{other}'. Valid keys: server, email, \
                             insecure, timeout, stale_time, ca_cert, token_store"
                        ),
                    });
                }
            }

            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Set {key} on profile '{profile_name}'");
            }
            Ok(())
        }

        // ── Profiles ────────────────────────────────────────────────
        ConfigCommand::Profiles => {
            let cfg = config::load_config_or_default();
            let default = cfg.default_profile.as_deref().unwrap_or("default");
            if cfg.profiles.is_empty() {
                eprintln!("No profiles configured. Run: clinic config init");
            } else {
                let mut names: Vec<_> = cfg.profiles.keys().collect();
                names.sort();
                for name in names {
                    let marker = if name == default { " *" } else { "" };
                    println!("{name}{marker}");
                }
            }
            Ok(())
        }

        // ── Use <name> ─────────────────────────────────────────────
        ConfigCommand::Use { name } => {
            let mut cfg = config::load_config_or_default();

            if !cfg.profiles.contains_key(&name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name,
                });
            }

            cfg.default_profile = Some(name.clone());
            save_config(&cfg)?;
            if !global.quiet {
                eprintln!("✓ Default profile set to '{name}'");
            }
            Ok(())
        }

        // ── SetPassword ─────────────────────────────────────────────
        ConfigCommand::SetPassword { profile } => {
            let cfg = config::load_config_or_default();
            let profile_name = profile.unwrap_or_else(|| config::active_profile_name(global, &cfg));

            if !cfg.profiles.contains_key(&profile_name) {
                return Err(CliError::ProfileNotFound {
                    available: available_profiles(&cfg),
                    name: profile_name,
                });
            }

            let secret = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            if secret.is_empty() {
                return Err(CliError::Validation {
                    field: "password".into(),
                    reason: "value cannot be empty".into(),
                });
            }
            clinic_config::store_password(&profile_name, &secret)?;

            eprintln!("✓ Password stored in system keyring for profile '{profile_name}'");
            Ok(())
        }
    }
}
