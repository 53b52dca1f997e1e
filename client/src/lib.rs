//! Client library for the AI report service.
//!
//! SYSTEM CONTEXT
//! ==============
//! Front ends build one [`net::api::ApiClient`] (base URL, token store,
//! navigator), share it between a [`state::session::SessionStore`] and any
//! number of [`state::report::ReportDesk`]s, and call
//! [`state::session::SessionStore::restore`] once at startup.

pub mod config;
pub mod net;
pub mod state;
pub mod util;

#[cfg(test)]
mod test_helpers;

pub use config::ClientConfig;
pub use net::api::{ApiClient, ApiError};
pub use net::types::{AuthResponse, GeneratedReport, User};
pub use state::report::{ReportDesk, ReportError};
pub use state::session::{SessionAction, SessionState, SessionStore};
pub use util::nav::{Navigator, Route};
pub use util::token_store::{FileTokenStore, MemoryTokenStore, TokenStore};
