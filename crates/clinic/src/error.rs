//! CLI error types with miette diagnostics.
//!
//! Maps `clinic_api::Error` and `ConfigError` into user-facing errors
//! with actionable help text.

use std::sync::Arc;

use clinic_config::ConfigError;
use miette::Diagnostic;
use thiserror::Error;

/// Process exit codes.
pub mod exit_code {
    #[allow(dead_code)]
    pub const SUCCESS: i32 = 0;
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const PERMISSION: i32 = 5;
    pub const CONNECTION: i32 = 7;
    pub const TIMEOUT: i32 = 8;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Connection ───────────────────────────────────────────────────

    #[error("Could not connect to server at {url}")]
    #[diagnostic(
        code(clinic::connection_failed),
        help(
            "Check that the server is running and reachable.\n\
             URL: {url}"
        )
    )]
    ConnectionFailed {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("TLS setup failed: {reason}")]
    #[diagnostic(
        code(clinic::tls_error),
        help(
            "Use --insecure (-k) to accept a self-signed certificate,\n\
             or configure ca_cert in your profile."
        )
    )]
    TlsError { reason: String },

    #[error("Request timed out")]
    #[diagnostic(
        code(clinic::timeout),
        help("Increase the timeout with --timeout or check server responsiveness.")
    )]
    Timeout,

    // ── Authentication ───────────────────────────────────────────────

    #[error("Authentication failed: {reason}")]
    #[diagnostic(
        code(clinic::auth_failed),
        help(
            "Verify your email and password.\n\
             Run: clinic login --profile {profile}"
        )
    )]
    AuthFailed { profile: String, reason: String },

    #[error("Not signed in")]
    #[diagnostic(
        code(clinic::not_signed_in),
        help("Your session is missing or has expired. Run: clinic login --profile {profile}")
    )]
    NotSignedIn { profile: String },

    #[error("No credentials configured for profile '{profile}'")]
    #[diagnostic(
        code(clinic::no_credentials),
        help(
            "Store a password with: clinic config set-password\n\
             Or set the CLINIC_PASSWORD environment variable."
        )
    )]
    NoCredentials { profile: String },

    #[error("Permission denied: {message}")]
    #[diagnostic(
        code(clinic::permission_denied),
        help("Your account role does not allow this operation.")
    )]
    PermissionDenied { message: String },

    // ── Resources ────────────────────────────────────────────────────

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(clinic::not_found),
        help("Run: clinic {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── API ──────────────────────────────────────────────────────────

    #[error("API error ({status}): {message}")]
    #[diagnostic(code(clinic::api_error))]
    ApiError { status: u16, message: String },

    #[error("Unexpected server response: {message}")]
    #[diagnostic(
        code(clinic::decode),
        help("Re-run with -vv to log the raw response.")
    )]
    Decode { message: String },

    // ── Validation ───────────────────────────────────────────────────

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(clinic::validation))]
    Validation { field: String, reason: String },

    // ── Configuration ────────────────────────────────────────────────

    #[error("Profile '{name}' not found in configuration")]
    #[diagnostic(
        code(clinic::profile_not_found),
        help(
            "Available profiles: {available}\n\
             Create one with: clinic config init"
        )
    )]
    ProfileNotFound { name: String, available: String },

    #[error("No server configured")]
    #[diagnostic(
        code(clinic::no_config),
        help(
            "Create a profile with: clinic config init\n\
             Or pass --server. Expected config at: {path}"
        )
    )]
    NoConfig { path: String },

    #[error(transparent)]
    #[diagnostic(code(clinic::config))]
    Config(Box<ConfigError>),

    // ── Interactive ──────────────────────────────────────────────────

    #[error("Destructive operation '{action}' requires confirmation")]
    #[diagnostic(
        code(clinic::confirmation_required),
        help("Use --yes (-y) to skip confirmation in non-interactive contexts.")
    )]
    NonInteractiveRequiresYes { action: String },

    // ── IO / Serialization ────────────────────────────────────────────

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("CSV export failed: {0}")]
    #[diagnostic(code(clinic::csv))]
    Csv(#[from] csv::Error),

    #[error("Invalid JSON payload: {0}")]
    #[diagnostic(code(clinic::json), help("Check the JSON file contents and try again."))]
    Json(#[from] serde_json::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ConnectionFailed { .. } | Self::TlsError { .. } => exit_code::CONNECTION,
            Self::Timeout => exit_code::TIMEOUT,
            Self::AuthFailed { .. } | Self::NotSignedIn { .. } | Self::NoCredentials { .. } => {
                exit_code::AUTH
            }
            Self::PermissionDenied { .. } => exit_code::PERMISSION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Validation { .. } | Self::NonInteractiveRequiresYes { .. } => exit_code::USAGE,
            _ => exit_code::GENERAL,
        }
    }

    /// Name the missing resource on a 404; other errors pass through.
    pub fn not_found_as(
        self,
        resource_type: &str,
        identifier: impl ToString,
        list_command: &str,
    ) -> Self {
        match self {
            Self::NotFound { .. } => Self::NotFound {
                resource_type: resource_type.into(),
                identifier: identifier.to_string(),
                list_command: list_command.into(),
            },
            other => other,
        }
    }

    /// Attach the active profile name to authentication errors.
    pub fn for_profile(self, profile_name: &str) -> Self {
        match self {
            Self::NotSignedIn { .. } => Self::NotSignedIn {
                profile: profile_name.into(),
            },
            Self::AuthFailed { reason, .. } => Self::AuthFailed {
                profile: profile_name.into(),
                reason,
            },
            other => other,
        }
    }
}

// ── clinic_api::Error → CliError mapping ─────────────────────────────

fn from_api(err: &clinic_api::Error) -> CliError {
    use clinic_api::Error;

    if err.is_timeout() {
        return CliError::Timeout;
    }

    match err {
        Error::Network(e) => CliError::ConnectionFailed {
            url: e
                .url()
                .map_or_else(|| "(unknown)".into(), ToString::to_string),
            source: e.to_string().into(),
        },
        Error::Tls(reason) => CliError::TlsError {
            reason: reason.clone(),
        },
        Error::InvalidUrl(e) => CliError::Validation {
            field: "server".into(),
            reason: e.to_string(),
        },
        Error::AuthExpired { .. } => CliError::NotSignedIn {
            profile: "current".into(),
        },
        Error::Http { status, .. } => {
            let message = err
                .detail()
                .map_or_else(|| err.to_string(), str::to_owned);
            match *status {
                401 => CliError::NotSignedIn {
                    profile: "current".into(),
                },
                403 => CliError::PermissionDenied { message },
                404 => CliError::NotFound {
                    resource_type: "resource".into(),
                    identifier: message,
                    list_command: "--help".into(),
                },
                _ => CliError::ApiError {
                    status: *status,
                    message,
                },
            }
        }
        Error::Serialization(e) => CliError::Decode {
            message: e.to_string(),
        },
        Error::Deserialization { message, .. } => CliError::Decode {
            message: message.clone(),
        },
    }
}

impl From<clinic_api::Error> for CliError {
    fn from(err: clinic_api::Error) -> Self {
        from_api(&err)
    }
}

impl From<Arc<clinic_api::Error>> for CliError {
    fn from(err: Arc<clinic_api::Error>) -> Self {
        from_api(&err)
    }
}

impl From<ConfigError> for CliError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::NoCredentials { profile } => Self::NoCredentials { profile },
            ConfigError::Validation { field, reason } => Self::Validation { field, reason },
            other => Self::Config(Box::new(other)),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn http(status: u16) -> clinic_api::Error {
        clinic_api::Error::Http {
            status,
            body: json!({ "detail": "nope" }),
        }
    }

    #[test]
    fn http_statuses_map_to_exit_codes() {
        assert_eq!(CliError::from(http(401)).exit_code(), exit_code::AUTH);
        assert_eq!(CliError::from(http(403)).exit_code(), exit_code::PERMISSION);
        assert_eq!(CliError::from(http(404)).exit_code(), exit_code::NOT_FOUND);
        assert_eq!(CliError::from(http(500)).exit_code(), exit_code::GENERAL);
    }

    #[test]
    fn expired_session_is_an_auth_error() {
        let err = clinic_api::Error::AuthExpired {
            source: Box::new(http(401)),
        };
        let cli = CliError::from(Arc::new(err)).for_profile("ward");
        assert!(matches!(cli, CliError::NotSignedIn { ref profile } if profile == "ward"));
    }

    #[test]
    fn not_found_is_named_by_the_caller() {
        let cli = CliError::from(http(404)).not_found_as("patient", 42, "patients list");
        assert_eq!(cli.to_string(), "patient '42' not found");

        let other = CliError::from(http(500)).not_found_as("patient", 42, "patients list");
        assert!(matches!(other, CliError::ApiError { status: 500, .. }));
    }
}
