//! In-process stand-in for the report service, bound to an ephemeral port.

use std::sync::{Arc, Mutex};

use axum::Router;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Json, Response};
use axum::routing::{get, post};
use serde_json::{Value, json};

use crate::net::api::ApiClient;
use crate::util::nav::{Navigator, Route};
use crate::util::token_store::{MemoryTokenStore, TokenStore};

pub const VALID_TOKEN: &str = "tok-valid";
pub const LOGIN_TOKEN: &str = "tok-login";
pub const SIGNUP_TOKEN: &str = "tok-signup";
pub const PASSWORD: &str = "secret";
pub const TAKEN_EMAIL: &str = "taken@example.com";
pub const PDF_BYTES: &[u8] = b"%PDF-1.4 fake report";

/// One request as seen by the fake server.
#[derive(Debug, Clone)]
pub struct Hit {
    pub path: String,
    pub authorization: Option<String>,
    pub body: Option<Value>,
}

#[derive(Clone, Default)]
struct Shared {
    hits: Arc<Mutex<Vec<Hit>>>,
}

/// Navigator that only remembers where it was sent.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    #[must_use]
    pub fn history(&self) -> Vec<Route> {
        self.history.lock().map(|h| h.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn last(&self) -> Option<Route> {
        self.history.lock().ok().and_then(|h| h.last().copied())
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::debug!(%route, "navigate");
        if let Ok(mut history) = self.history.lock() {
            history.push(route);
        }
    }
}

pub struct FakeBackend {
    pub base_url: String,
    hits: Arc<Mutex<Vec<Hit>>>,
}

impl FakeBackend {
    pub async fn start() -> Self {
        let shared = Shared::default();
        let hits = shared.hits.clone();
        let app = Router::new()
            .route("/auth/login", post(login))
            .route("/auth/signup", post(signup))
            .route("/auth/me", get(me))
            .route("/generate-report", post(generate_report))
            .route("/download/{filename}", get(download))
            .with_state(shared);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.expect("bind fake backend");
        let addr = listener.local_addr().expect("fake backend addr");
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("fake backend serve");
        });
        Self { base_url: format!("http://{addr}"), hits }
    }

    pub fn hits(&self) -> Vec<Hit> {
        self.hits.lock().expect("hits mutex").clone()
    }

    pub fn hit_paths(&self) -> Vec<String> {
        self.hits().into_iter().map(|h| h.path).collect()
    }

    /// Gateway wired to this backend with an in-memory token store.
    pub fn client(&self, token: Option<&str>) -> (ApiClient, Arc<MemoryTokenStore>, Arc<RecordingNavigator>) {
        let tokens = Arc::new(token.map_or_else(MemoryTokenStore::default, MemoryTokenStore::with_token));
        let navigator = Arc::new(RecordingNavigator::default());
        let store: Arc<dyn TokenStore> = tokens.clone();
        let api = ApiClient::new(&self.base_url, store, navigator.clone()).expect("api client");
        (api, tokens, navigator)
    }
}

pub fn alice() -> Value {
    json!({ "id": 1, "email": "alice@example.com", "username": "alice" })
}

fn record(state: &Shared, path: &str, headers: &HeaderMap, body: Option<Value>) {
    let authorization = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned);
    state.hits.lock().expect("hits mutex").push(Hit { path: path.to_owned(), authorization, body });
}

fn authorized(headers: &HeaderMap) -> bool {
    let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) else {
        return false;
    };
    [VALID_TOKEN, LOGIN_TOKEN, SIGNUP_TOKEN]
        .iter()
        .any(|token| value == format!("Bearer {token}"))
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Could not validate credentials" }))).into_response()
}

async fn login(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "/auth/login", &headers, Some(body.clone()));
    if body.get("password").and_then(Value::as_str) != Some(PASSWORD) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "detail": "Incorrect email or password" }))).into_response();
    }
    Json(json!({ "access_token": LOGIN_TOKEN, "token_type": "bearer", "user": alice() })).into_response()
}

async fn signup(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "/auth/signup", &headers, Some(body.clone()));
    let email = body.get("email").and_then(Value::as_str).unwrap_or_default();
    if email == TAKEN_EMAIL {
        return (StatusCode::BAD_REQUEST, Json(json!({ "detail": "Email already registered" }))).into_response();
    }
    let username = body.get("username").and_then(Value::as_str).unwrap_or_default();
    Json(json!({
        "access_token": SIGNUP_TOKEN,
        "token_type": "bearer",
        "user": { "id": 2, "email": email, "username": username }
    }))
    .into_response()
}

async fn me(State(state): State<Shared>, headers: HeaderMap) -> Response {
    record(&state, "/auth/me", &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    Json(alice()).into_response()
}

async fn generate_report(State(state): State<Shared>, headers: HeaderMap, Json(body): Json<Value>) -> Response {
    record(&state, "/generate-report", &headers, Some(body.clone()));
    if !authorized(&headers) {
        return unauthorized();
    }
    match body.get("topic").and_then(Value::as_str).unwrap_or_default() {
        "explode" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "detail": "LLM quota exceeded" }))).into_response(),
        "plain-500" => (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response(),
        _ => Json(json!({
            "filename": "report.pdf",
            "download_url": "/download/report.pdf",
            "message": "Report generated successfully"
        }))
        .into_response(),
    }
}

async fn download(State(state): State<Shared>, headers: HeaderMap, Path(filename): Path<String>) -> Response {
    record(&state, &format!("/download/{filename}"), &headers, None);
    if !authorized(&headers) {
        return unauthorized();
    }
    if filename == "missing.pdf" {
        return (StatusCode::NOT_FOUND, Json(json!({ "detail": "Report not found" }))).into_response();
    }
    ([(header::CONTENT_TYPE, "application/pdf")], PDF_BYTES).into_response()
}
