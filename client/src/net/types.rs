//! Wire DTOs for the report service REST API.
//!
//! DESIGN
//! ======
//! Field names mirror the server's JSON bodies so serde handles the boundary
//! without per-field renames.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::{Deserialize, Serialize};

/// An authenticated account as returned by the auth endpoints.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Server-assigned numeric identifier.
    pub id: i64,
    pub email: String,
    pub username: String,
}

/// Body returned by `POST /auth/login` and `POST /auth/signup`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Always `"bearer"` for this service; kept for completeness.
    pub token_type: String,
    pub user: User,
}

/// A report produced by `POST /generate-report`.
///
/// Only held in memory for the lifetime of a dashboard interaction.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct GeneratedReport {
    /// Name to pass to `GET /download/{filename}`.
    pub filename: String,
    pub download_url: String,
    /// Human-readable status line from the server.
    pub message: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct SignupRequest<'a> {
    pub email: &'a str,
    pub username: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct GenerateReportRequest<'a> {
    pub topic: &'a str,
}

/// Extract the server's `detail` field from an error body, if it is a string.
///
/// Validation errors carry a structured `detail` array instead; those are not
/// meant for display and yield `None`.
pub(crate) fn error_detail(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    value
        .get("detail")
        .and_then(serde_json::Value::as_str)
        .map(ToOwned::to_owned)
}
