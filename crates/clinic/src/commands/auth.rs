//! Session command handlers: login, logout, whoami.

use std::io::IsTerminal;

use secrecy::{ExposeSecret, SecretString};

use clinic_core::Clinic;
use clinic_config::ConfigError;

use crate::cli::{GlobalOpts, LoginArgs};
use crate::config::Resolved;
use crate::error::CliError;

use super::util;

fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Password from env / keyring / profile, else an interactive prompt.
fn password_for(resolved: &Resolved) -> Result<SecretString, CliError> {
    match clinic_config::resolve_password(&resolved.profile, &resolved.profile_name) {
        Ok(pw) => Ok(pw),
        Err(ConfigError::NoCredentials { .. }) if std::io::stdin().is_terminal() => {
            let pw = rpassword::prompt_password("Password: ").map_err(prompt_err)?;
            Ok(SecretString::from(pw))
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn login(
    clinic: &Clinic,
    resolved: &Resolved,
    args: LoginArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let email = args
        .email
        .or_else(|| resolved.profile.email.clone())
        .ok_or_else(|| CliError::Validation {
            field: "email".into(),
            reason: "pass --email or set `email` on the profile".into(),
        })?;
    let password = password_for(resolved)?;

    util::with_spinner("Signing in", global, clinic.login(&email, &password))
        .await
        .map_err(|e| {
            if e.is_unauthorized() || e.status() == Some(400) {
                CliError::AuthFailed {
                    profile: resolved.profile_name.clone(),
                    reason: e
                        .detail()
                        .unwrap_or("invalid email or password")
                        .to_owned(),
                }
            } else {
                e.into()
            }
        })?;

    if args.remember {
        clinic_config::store_password(&resolved.profile_name, password.expose_secret())?;
    }

    util::done(global, &format!("Signed in as {email}"));
    Ok(())
}

#[allow(clippy::unnecessary_wraps)]
pub fn logout(clinic: &Clinic, global: &GlobalOpts) -> Result<(), CliError> {
    clinic.logout();
    util::done(global, "Signed out");
    Ok(())
}

pub async fn whoami(clinic: &Clinic, global: &GlobalOpts) -> Result<(), CliError> {
    let me = clinic.account().current_user().fetch().await?;
    util::print_record(global, &me);
    Ok(())
}
