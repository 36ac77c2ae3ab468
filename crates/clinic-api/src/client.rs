// Clinic REST API HTTP client
//
// The single point of outbound traffic. Wraps `reqwest::Client` with
// base-path URL construction, per-request bearer credentials, one
// transparent refresh-and-retry on HTTP 401, and body decoding. Endpoint
// functions live in `resources/` as inherent methods so this module stays
// focused on transport mechanics.

use std::sync::Arc;

use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};
use url::Url;

use crate::error::Error;
use crate::models::Attachment;
use crate::session::Session;
use crate::transport::TransportConfig;

/// One outbound call: `request(method, path, body?, params?)`.
///
/// The body is held in owned form so the request can be re-issued after
/// a credential refresh.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<RequestBody>,
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum RequestBody {
    /// `application/json`
    Json(Value),
    /// `multipart/form-data`, rebuilt on every send.
    Form(Vec<FormPart>),
}

/// One field of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormPart {
    Text { name: String, value: String },
    File { name: String, file: Attachment },
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn with_query<K: Into<String>>(
        mut self,
        params: impl IntoIterator<Item = (K, String)>,
    ) -> Self {
        self.query.extend(params.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    pub fn with_json(mut self, body: &(impl Serialize + ?Sized)) -> Result<Self, Error> {
        self.body = Some(RequestBody::Json(serde_json::to_value(body)?));
        Ok(self)
    }

    pub fn with_form(mut self, parts: Vec<FormPart>) -> Self {
        self.body = Some(RequestBody::Form(parts));
        self
    }
}

/// Async client for the clinic REST API.
///
/// Cheap to clone: the HTTP pool, session, and refresh lock are shared.
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    session: Session,
    /// Serialises refresh attempts so concurrent 401s trigger one refresh.
    refresh_lock: Arc<Mutex<()>>,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("base_url", &self.base_url.as_str())
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client for the server at `base_url`.
    ///
    /// `https://host` and `https://host/api` both resolve to the `/api/`
    /// base path.
    pub fn new(
        base_url: &str,
        transport: &TransportConfig,
        session: Session,
    ) -> Result<Self, Error> {
        let http = transport.build_client()?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self::with_client(http, base_url, session))
    }

    /// Wrap an existing `reqwest::Client`. `base_url` is normalised.
    pub fn with_client(http: reqwest::Client, base_url: Url, session: Session) -> Self {
        let base_url = Self::normalize_base_url(base_url.as_str()).unwrap_or(base_url);
        Self {
            http,
            base_url,
            session,
            refresh_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Append the `/api/` base path unless it is already present.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }
        Ok(url)
    }

    // ── Accessors ────────────────────────────────────────────────────

    /// The API base URL (always ends with `/api/`).
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// The session context holding the credential pair.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// The underlying HTTP client (for auth flows that bypass the refresh cycle).
    pub(crate) fn http(&self) -> &reqwest::Client {
        &self.http
    }

    /// Join a relative path (e.g. `"patients/patients/"`) onto the base URL.
    pub(crate) fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path.trim_start_matches('/'))?)
    }

    // ── Request pipeline ─────────────────────────────────────────────

    /// Execute a request and decode the response body.
    ///
    /// An absent body decodes as JSON `null`, so `Option<T>`, `()`, and
    /// [`Record`](crate::Record) targets get their natural empty value.
    pub async fn request<T: DeserializeOwned>(&self, request: &ApiRequest) -> Result<T, Error> {
        let resp = self.execute(request).await?;
        decode(resp).await
    }

    /// Execute a request, discarding any response body.
    pub async fn request_empty(&self, request: &ApiRequest) -> Result<(), Error> {
        self.execute(request).await?;
        Ok(())
    }

    /// Send with the current access credential; on 401 run the refresh
    /// cycle once and re-issue. A 401 on the re-issued request propagates.
    async fn execute(&self, request: &ApiRequest) -> Result<reqwest::Response, Error> {
        let sent_with = self.session.access_token();
        let resp = self.send(request, sent_with.as_ref()).await?;

        if resp.status() != StatusCode::UNAUTHORIZED {
            return check_status(resp).await;
        }

        debug!(
            method = %request.method,
            path = %request.path,
            "unauthorized, attempting credential refresh"
        );
        let original = http_error(resp).await;
        let access = self.refresh_once(sent_with.as_ref(), original).await?;

        let retry = self.send(request, Some(&access)).await?;
        check_status(retry).await
    }

    /// Obtain a usable access credential after a 401, or fail with the
    /// session cleared.
    async fn refresh_once(
        &self,
        sent_with: Option<&SecretString>,
        original: Error,
    ) -> Result<SecretString, Error> {
        let _guard = self.refresh_lock.lock().await;

        // Another request may have refreshed while we waited on the lock.
        if let Some(current) = self.session.access_token() {
            let rotated = sent_with.is_none_or(|s| s.expose_secret() != current.expose_secret());
            if rotated {
                trace!("access credential already rotated by a concurrent request");
                return Ok(current);
            }
        }

        let Some(refresh) = self.session.refresh_token() else {
            debug!("no refresh credential, clearing session");
            self.session.end();
            return Err(original);
        };

        match self.refresh_access(&refresh).await {
            Ok(access) => {
                self.session.replace_access(&access);
                Ok(access)
            }
            Err(e) => {
                warn!(error = %e, "credential refresh failed, clearing session");
                self.session.end();
                Err(Error::AuthExpired {
                    source: Box::new(e),
                })
            }
        }
    }

    async fn send(
        &self,
        request: &ApiRequest,
        access: Option<&SecretString>,
    ) -> Result<reqwest::Response, Error> {
        let url = self.url(&request.path)?;
        debug!("{} {url}", request.method);

        let mut builder = self.http.request(request.method.clone(), url);
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        match &request.body {
            Some(RequestBody::Json(body)) => builder = builder.json(body),
            Some(RequestBody::Form(parts)) => builder = builder.multipart(build_form(parts)?),
            None => {}
        }
        if let Some(token) = access {
            builder = builder.header(AUTHORIZATION, format!("JWT {}", token.expose_secret()));
        }

        Ok(builder.send().await?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    pub(crate) async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(&ApiRequest::new(Method::GET, path)).await
    }

    pub(crate) async fn get_with_params<T: DeserializeOwned>(
        &self,
        path: &str,
        params: Vec<(&'static str, String)>,
    ) -> Result<T, Error> {
        self.request(&ApiRequest::new(Method::GET, path).with_query(params)).await
    }

    pub(crate) async fn post<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(&ApiRequest::new(Method::POST, path).with_json(body)?).await
    }

    /// POST with no body, used for state-transition actions.
    pub(crate) async fn post_action<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        self.request(&ApiRequest::new(Method::POST, path)).await
    }

    pub(crate) async fn put<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(&ApiRequest::new(Method::PUT, path).with_json(body)?).await
    }

    pub(crate) async fn put_form<T: DeserializeOwned>(
        &self,
        path: &str,
        parts: Vec<FormPart>,
    ) -> Result<T, Error> {
        self.request(&ApiRequest::new(Method::PUT, path).with_form(parts)).await
    }

    pub(crate) async fn patch<T: DeserializeOwned, B: Serialize + Sync + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        self.request(&ApiRequest::new(Method::PATCH, path).with_json(body)?).await
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), Error> {
        self.request_empty(&ApiRequest::new(Method::DELETE, path)).await
    }
}

fn build_form(parts: &[FormPart]) -> Result<Form, Error> {
    parts.iter().try_fold(Form::new(), |form, part| match part {
        FormPart::Text { name, value } => Ok(form.text(name.clone(), value.clone())),
        FormPart::File { name, file } => {
            let mut body = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
            if let Some(mime) = &file.content_type {
                body = body.mime_str(mime)?;
            }
            Ok(form.part(name.clone(), body))
        }
    })
}

// ── Response handling ────────────────────────────────────────────────

pub(crate) async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, Error> {
    if resp.status().is_success() {
        Ok(resp)
    } else {
        Err(http_error(resp).await)
    }
}

/// Convert a failed response into `Error::Http`, keeping the body.
pub(crate) async fn http_error(resp: reqwest::Response) -> Error {
    let status = resp.status().as_u16();
    let text = resp.text().await.unwrap_or_default();
    let body = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_json::from_str(&text).unwrap_or(Value::String(text))
    };
    Error::Http { status, body }
}

pub(crate) async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, Error> {
    let body = resp.text().await?;
    let parsed = if body.trim().is_empty() {
        serde_json::from_value(Value::Null)
    } else {
        serde_json::from_str(&body)
    };
    parsed.map_err(|e| {
        let preview: String = body.chars().take(200).collect();
        Error::Deserialization {
            message: format!("{e} (body preview: {preview:?})"),
            body: body.clone(),
        }
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn base_url_gains_api_prefix() {
        let url = ApiClient::normalize_base_url("https://clinic.example.com").unwrap();
        assert_eq!(url.as_str(), "https://clinic.example.com/api/");

        let url = ApiClient::normalize_base_url("https://clinic.example.com/api/").unwrap();
        assert_eq!(url.as_str(), "https://clinic.example.com/api/");

        let url = ApiClient::normalize_base_url("http://localhost:8000/v2/api").unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/v2/api/");
    }

    #[test]
    fn paths_join_under_base() {
        let client = ApiClient::with_client(
            reqwest::Client::new(),
            Url::parse("http://localhost:8000").unwrap(),
            Session::in_memory(),
        );
        assert_eq!(
            client.url("/patients/patients/3/").unwrap().as_str(),
            "http://localhost:8000/api/patients/patients/3/"
        );
    }
}
