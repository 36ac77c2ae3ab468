use serde_json::Value;
use thiserror::Error;

/// Top-level error type for the `clinic-api` crate.
///
/// The transport adapter recovers exactly one failure class locally (a
/// single credential refresh on HTTP 401). Everything else surfaces here
/// unchanged, and `clinic-core` hands it to callers as-is.
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// No response reached the client (connection refused, DNS, timeout).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// TLS setup or HTTP client construction failed.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Server responses ────────────────────────────────────────────
    /// The server answered with a failure status.
    ///
    /// `body` holds the decoded JSON body, or the raw text as a JSON
    /// string when the body was not JSON (`Null` when empty).
    #[error("HTTP {status}: {}", summarize(.body))]
    Http { status: u16, body: Value },

    // ── Authentication ──────────────────────────────────────────────
    /// The credential refresh cycle was exhausted. Both stored
    /// credentials have been cleared; `source` is the refresh failure.
    #[error("Authentication expired: {source}")]
    AuthExpired {
        #[source]
        source: Box<Error>,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// A request body could not be encoded as JSON.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// HTTP status of the failure, if the server responded.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            Self::AuthExpired { source } => source.status(),
            Self::Network(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// The server-provided `detail` message (DRF convention), if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Http { body, .. } => body
                .get("detail")
                .and_then(Value::as_str)
                .or_else(|| body.as_str()),
            Self::AuthExpired { source } => source.detail(),
            _ => None,
        }
    }

    /// Returns `true` for HTTP 401 responses and exhausted refresh cycles.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::AuthExpired { .. }) || self.status() == Some(401)
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    pub fn is_forbidden(&self) -> bool {
        self.status() == Some(403)
    }

    /// Returns `true` if no response reached the client.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network(_))
    }

    /// Returns `true` if the request timed out in the HTTP client.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Network(e) if e.is_timeout())
    }
}

/// Short, single-line rendering of an error body for `Display`.
fn summarize(body: &Value) -> String {
    if let Some(detail) = body.get("detail").and_then(Value::as_str) {
        return detail.to_owned();
    }
    let text = match body {
        Value::Null => return "(empty body)".into(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    text.chars().take(200).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn detail_prefers_drf_detail_field() {
        let err = Error::Http {
            status: 401,
            body: json!({ "detail": "No active account found with the given credentials" }),
        };
        assert_eq!(
            err.detail(),
            Some("No active account found with the given credentials")
        );
        assert!(err.is_unauthorized());
        assert_eq!(
            err.to_string(),
            "HTTP 401: No active account found with the given credentials"
        );
    }

    #[test]
    fn auth_expired_exposes_refresh_failure() {
        let err = Error::AuthExpired {
            source: Box::new(Error::Http {
                status: 401,
                body: json!({ "detail": "Token is invalid or expired" }),
            }),
        };
        assert_eq!(err.status(), Some(401));
        assert_eq!(err.detail(), Some("Token is invalid or expired"));
        assert!(err.is_unauthorized());
    }

    #[test]
    fn field_errors_are_summarized() {
        let err = Error::Http {
            status: 400,
            body: json!({ "name": ["This field is required."] }),
        };
        assert!(err.to_string().contains("This field is required."));
        assert_eq!(err.detail(), None);
        assert!(!err.is_not_found());
    }
}
