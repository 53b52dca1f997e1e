//! REST gateway for the report service.
//!
//! Every call funnels through [`ApiClient::send`], which attaches the bearer
//! token read from the [`TokenStore`] and reacts uniformly to a 401: the
//! persisted token is dropped, every hook registered with
//! [`ApiClient::on_unauthorized`] runs, the navigator is sent to the login
//! route, and the caller still receives [`ApiError::Unauthorized`].
//!
//! ERROR HANDLING
//! ==============
//! Non-success statuses keep the server's `detail` string (when it is one) so
//! the UI layer can show it, falling back to its own static message.
//! There are no retries and no timeouts; each call is fire-once.

#[cfg(test)]
#[path = "api_test.rs"]
mod api_test;

use std::sync::{Arc, Mutex, PoisonError};

use reqwest::{IntoUrl, Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;

use super::types::{
    AuthResponse, GenerateReportRequest, GeneratedReport, LoginRequest, SignupRequest, User, error_detail,
};
use crate::util::nav::{Navigator, Route};
use crate::util::token_store::TokenStore;

/// Errors produced by gateway calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// The server rejected the credentials or bearer token.
    #[error("not authenticated")]
    Unauthorized { detail: Option<String> },

    /// The server answered with a non-success status other than 401.
    #[error("request failed with status {status}")]
    Status { status: u16, detail: Option<String> },

    /// The request never produced a response (DNS, connect, TLS, body read).
    #[error("http request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// A success response body did not match the expected shape.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// A request URL could not be built from the base URL.
    #[error("invalid request url: {0}")]
    InvalidUrl(String),
}

impl ApiError {
    /// The server-provided `detail` message, if any.
    #[must_use]
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { detail } | Self::Status { detail, .. } => detail.as_deref(),
            Self::Request(_) | Self::Decode(_) | Self::InvalidUrl(_) => None,
        }
    }

    /// Best-effort text for the user: server detail, else `fallback`.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.detail().unwrap_or(fallback).to_owned()
    }

    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized { .. })
    }
}

fn endpoint(base_url: &str, path: &str) -> String {
    format!("{base_url}{path}")
}

/// `{base_url}/download/{filename}` with `filename` encoded as one path
/// segment, so `?`, `#` and `/` reach the server as part of the name.
fn download_url(base_url: &str, filename: &str) -> Result<Url, ApiError> {
    let mut url = Url::parse(&endpoint(base_url, "/download")).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
    url.path_segments_mut()
        .map_err(|()| ApiError::InvalidUrl(format!("{base_url} cannot carry a path")))?
        .pop_if_empty()
        .push(filename);
    Ok(url)
}

type UnauthorizedHook = Box<dyn Fn() + Send + Sync>;

/// HTTP client bound to one service base URL.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    tokens: Arc<dyn TokenStore>,
    navigator: Arc<dyn Navigator>,
    unauthorized_hooks: Mutex<Vec<UnauthorizedHook>>,
}

impl ApiClient {
    /// Build a gateway for `base_url` (trailing `/` ignored).
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(
        base_url: &str,
        tokens: Arc<dyn TokenStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder().build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            tokens,
            navigator,
            unauthorized_hooks: Mutex::new(Vec::new()),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The token accessor shared with the session store.
    #[must_use]
    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    #[must_use]
    pub fn navigator(&self) -> &Arc<dyn Navigator> {
        &self.navigator
    }

    /// Run `hook` after every 401, once the persisted token is gone and
    /// before the login redirect.
    pub fn on_unauthorized(&self, hook: impl Fn() + Send + Sync + 'static) {
        self.unauthorized_hooks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Box::new(hook));
    }

    // =========================================================================
    // TYPED OPERATIONS
    // =========================================================================

    /// `POST /auth/login`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a
    /// malformed body.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self.request(Method::POST, "/auth/login").json(&LoginRequest { email, password });
        let resp = self.send(req, "/auth/login").await?;
        decode_json(resp).await
    }

    /// `POST /auth/signup`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a
    /// malformed body.
    pub async fn signup(&self, email: &str, username: &str, password: &str) -> Result<AuthResponse, ApiError> {
        let req = self.request(Method::POST, "/auth/signup").json(&SignupRequest { email, username, password });
        let resp = self.send(req, "/auth/signup").await?;
        decode_json(resp).await
    }

    /// `GET /auth/me` — resolve the user behind the current token.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Unauthorized`] when the token is missing or stale.
    pub async fn current_user(&self) -> Result<User, ApiError> {
        let resp = self.send(self.request(Method::GET, "/auth/me"), "/auth/me").await?;
        decode_json(resp).await
    }

    /// `POST /generate-report`.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure, non-success status, or a
    /// malformed body.
    pub async fn generate_report(&self, topic: &str) -> Result<GeneratedReport, ApiError> {
        let req = self.request(Method::POST, "/generate-report").json(&GenerateReportRequest { topic });
        let resp = self.send(req, "/generate-report").await?;
        decode_json(resp).await
    }

    /// `GET /download/{filename}` — raw PDF bytes.
    ///
    /// # Errors
    ///
    /// Returns an error on transport failure or non-success status.
    pub async fn download_report(&self, filename: &str) -> Result<Vec<u8>, ApiError> {
        let url = download_url(&self.base_url, filename)?;
        let path = url.path().to_owned();
        let resp = self.send(self.request_url(Method::GET, url, &path), &path).await?;
        Ok(resp.bytes().await?.to_vec())
    }

    // =========================================================================
    // INTERCEPTION
    // =========================================================================

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.request_url(method, endpoint(&self.base_url, path), path)
    }

    fn request_url(&self, method: Method, url: impl IntoUrl, path: &str) -> RequestBuilder {
        tracing::debug!(%method, path, "api request");
        self.http.request(method, url)
    }

    async fn send(&self, request: RequestBuilder, path: &str) -> Result<Response, ApiError> {
        let request = match self.tokens.load() {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        tracing::debug!(path, status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let detail = error_detail(&body);
        if status == StatusCode::UNAUTHORIZED {
            self.handle_unauthorized(path);
            return Err(ApiError::Unauthorized { detail });
        }
        Err(ApiError::Status { status: status.as_u16(), detail })
    }

    fn handle_unauthorized(&self, path: &str) {
        tracing::warn!(path, "401 from server; clearing token and redirecting to login");
        if let Err(e) = self.tokens.remove() {
            tracing::warn!(error = %e, "failed to clear persisted token");
        }
        for hook in self.unauthorized_hooks.lock().unwrap_or_else(PoisonError::into_inner).iter() {
            hook();
        }
        self.navigator.navigate(Route::Login);
    }
}

async fn decode_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response.text().await?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode(e.to_string()))
}
