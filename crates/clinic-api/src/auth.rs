// JWT credential endpoints
//
// Login and refresh talk to the server directly through the raw HTTP
// client. They never carry a bearer credential and never enter the
// refresh-and-retry cycle in `client.rs`.

use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tracing::{debug, info};

use crate::client::{ApiClient, check_status, decode};
use crate::error::Error;
use crate::models::{RefreshResponse, TokenResponse};
use crate::session::TokenPair;

impl ApiClient {
    /// Exchange email and password for a credential pair and start a session.
    ///
    /// `POST /auth/jwt/create/` with `{"email", "password"}`
    ///
    /// On failure any previously stored pair is cleared and the server's
    /// error is returned; its message is available via [`Error::detail`].
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<TokenPair, Error> {
        let url = self.url("auth/jwt/create/")?;
        debug!(email, "logging in");

        let outcome = async {
            let resp = self
                .http()
                .post(url)
                .json(&json!({
                    "email": email,
                    "password": password.expose_secret(),
                }))
                .send()
                .await?;
            let resp = check_status(resp).await?;
            decode::<TokenResponse>(resp).await
        }
        .await;

        match outcome {
            Ok(tokens) => {
                let pair = TokenPair {
                    access: SecretString::from(tokens.access),
                    refresh: SecretString::from(tokens.refresh),
                };
                self.session().begin(&pair);
                info!(email, "login succeeded");
                Ok(pair)
            }
            Err(e) => {
                self.session().end();
                Err(e)
            }
        }
    }

    /// Trade a refresh credential for a new access credential.
    ///
    /// `POST /auth/jwt/refresh/` with `{"refresh"}`
    ///
    /// Does not touch the session; the caller decides what to store.
    pub async fn refresh_access(&self, refresh: &SecretString) -> Result<SecretString, Error> {
        let url = self.url("auth/jwt/refresh/")?;
        debug!("refreshing access credential");

        let resp = self
            .http()
            .post(url)
            .json(&json!({ "refresh": refresh.expose_secret() }))
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let body: RefreshResponse = decode(resp).await?;
        Ok(SecretString::from(body.access))
    }

    /// Drop the stored credential pair. Purely local.
    pub fn logout(&self) {
        debug!("logging out");
        self.session().end();
    }

    /// `true` iff an access credential is present.
    pub fn is_authenticated(&self) -> bool {
        self.session().is_authenticated()
    }
}
