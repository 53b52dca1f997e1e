//! Auth-session state for the current user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The session is the client's belief about who is logged in. It is driven by
//! a closed set of [`SessionAction`]s fed through the pure [`reduce`]
//! function; [`SessionStore`] wraps that with the two side effects the
//! transitions imply (persisting the token on `Succeed`, removing it on
//! `Clear`) and with the async login/signup/restore flows.
//!
//! Only the token is persisted. The user is re-derived from `GET /auth/me`
//! at startup, and a token that fails that check clears both fields in one
//! transition.
//!
//! A 401 on any gateway call, including one made by the report desk, resets
//! the in-memory state too: the store registers an unauthorized hook on its
//! [`ApiClient`] so the session never outlives a rejected token.
//!
//! CONCURRENCY
//! ===========
//! The state mutex is never held across an `.await`. Concurrent operations
//! are not serialized; the last transition to land wins.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::net::api::{ApiClient, ApiError};
use crate::net::types::{AuthResponse, User};
use crate::util::nav::Route;
use crate::util::token_store::TokenStore;

pub const LOGIN_FAILED_MESSAGE: &str = "Invalid credentials";
pub const SIGNUP_FAILED_MESSAGE: &str = "Signup failed";

/// Snapshot of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionState {
    pub user: Option<User>,
    pub token: Option<String>,
    /// An auth call (or startup validation) is in flight.
    pub loading: bool,
    pub error: Option<String>,
}

impl SessionState {
    /// Startup state: token from storage, no user yet.
    #[must_use]
    pub fn initial(tokens: &dyn TokenStore) -> Self {
        Self { token: tokens.load(), ..Self::default() }
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

/// Every transition the session can make.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionAction {
    Start,
    Succeed { user: User, token: String },
    Fail(String),
    Clear,
    SetLoading(bool),
    SetError(Option<String>),
}

/// Apply `action` to `state`. Pure; persistence is the store's job.
#[must_use]
pub fn reduce(state: SessionState, action: SessionAction) -> SessionState {
    match action {
        SessionAction::Start => SessionState { loading: true, error: None, ..state },
        SessionAction::Succeed { user, token } => {
            SessionState { user: Some(user), token: Some(token), loading: false, error: None }
        }
        SessionAction::Fail(message) => SessionState { loading: false, error: Some(message), ..state },
        SessionAction::Clear => SessionState::default(),
        SessionAction::SetLoading(loading) => SessionState { loading, ..state },
        SessionAction::SetError(error) => SessionState { error, ..state },
    }
}

/// A failed login or signup, re-signaled to the caller.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct SessionError {
    /// The message stored in the session's `error` field.
    pub message: String,
    #[source]
    pub source: ApiError,
}

/// Session state plus the operations that drive it.
pub struct SessionStore {
    api: Arc<ApiClient>,
    state: Arc<Mutex<SessionState>>,
}

impl SessionStore {
    #[must_use]
    pub fn new(api: Arc<ApiClient>) -> Self {
        let state = Arc::new(Mutex::new(SessionState::initial(api.tokens().as_ref())));
        let on_401 = Arc::clone(&state);
        api.on_unauthorized(move || {
            // The gateway already dropped the persisted token.
            *on_401.lock().unwrap_or_else(PoisonError::into_inner) = SessionState::default();
        });
        Self { api, state }
    }

    #[must_use]
    pub fn api(&self) -> &Arc<ApiClient> {
        &self.api
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.lock().clone()
    }

    /// Persist what `action` implies, then apply it.
    pub fn dispatch(&self, action: SessionAction) {
        let tokens = self.api.tokens();
        let persisted = match &action {
            SessionAction::Succeed { token, .. } => tokens.save(token),
            SessionAction::Clear => tokens.remove(),
            _ => Ok(()),
        };
        if let Err(e) = persisted {
            tracing::warn!(error = %e, "session token storage failed; continuing in memory");
        }

        let mut state = self.lock();
        let current = std::mem::take(&mut *state);
        *state = reduce(current, action);
    }

    /// Re-validate a persisted token at startup.
    ///
    /// Without a token this does nothing. Any failure of the `who am I` call
    /// discards the token; there is no retry.
    pub async fn restore(&self) -> Option<User> {
        let token = self.api.tokens().load()?;
        self.dispatch(SessionAction::SetLoading(true));
        match self.api.current_user().await {
            Ok(user) => {
                tracing::info!(user_id = user.id, "session restored");
                self.dispatch(SessionAction::Succeed { user: user.clone(), token });
                Some(user)
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored token rejected; clearing session");
                self.dispatch(SessionAction::Clear);
                None
            }
        }
    }

    /// Log in with email and password.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] carrying `Invalid credentials` when the call
    /// fails for any reason.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        self.dispatch(SessionAction::Start);
        let result = self.api.login(email, password).await;
        self.finish(result, LOGIN_FAILED_MESSAGE)
    }

    /// Create an account and log in as it.
    ///
    /// # Errors
    ///
    /// Returns a [`SessionError`] carrying `Signup failed` when the call fails
    /// for any reason.
    pub async fn signup(&self, email: &str, username: &str, password: &str) -> Result<User, SessionError> {
        self.dispatch(SessionAction::Start);
        let result = self.api.signup(email, username, password).await;
        self.finish(result, SIGNUP_FAILED_MESSAGE)
    }

    /// Forget the session locally and go back to the landing page. No
    /// network call.
    pub fn logout(&self) {
        tracing::info!("logged out");
        self.dispatch(SessionAction::Clear);
        self.api.navigator().navigate(Route::Home);
    }

    fn finish(
        &self,
        result: Result<AuthResponse, ApiError>,
        failure_message: &str,
    ) -> Result<User, SessionError> {
        match result {
            Ok(resp) => {
                tracing::info!(user_id = resp.user.id, "authenticated");
                self.dispatch(SessionAction::Succeed { user: resp.user.clone(), token: resp.access_token });
                Ok(resp.user)
            }
            Err(source) => {
                tracing::info!(error = %source, "authentication failed");
                self.dispatch(SessionAction::Fail(failure_message.to_owned()));
                Err(SessionError { message: failure_message.to_owned(), source })
            }
        }
    }

    fn lock(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
