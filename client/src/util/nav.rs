//! Route table and navigation seam.
//!
//! SYSTEM CONTEXT
//! ==============
//! The gateway must be able to force the login entry point on a 401 without
//! knowing what front end is driving it. Front ends implement [`Navigator`];
//! the route guard decides when an unauthenticated user is bounced.

#[cfg(test)]
#[path = "nav_test.rs"]
mod tests;

use std::fmt;

use crate::state::session::SessionState;

/// Client-side pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Route {
    Home,
    Login,
    Signup,
    Dashboard,
}

impl Route {
    /// Path component for this route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Home => "/",
            Self::Login => "/login",
            Self::Signup => "/signup",
            Self::Dashboard => "/dashboard",
        }
    }

    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        match path {
            "/" | "" => Some(Self::Home),
            "/login" => Some(Self::Login),
            "/signup" => Some(Self::Signup),
            "/dashboard" => Some(Self::Dashboard),
            _ => None,
        }
    }

    /// Whether visiting this route needs an authenticated session.
    #[must_use]
    pub const fn requires_auth(self) -> bool {
        matches!(self, Self::Dashboard)
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// Receives forced navigations (401 redirect, logout).
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// True once the session has settled without a user.
#[must_use]
pub fn should_redirect_unauth(state: &SessionState) -> bool {
    !state.loading && state.user.is_none()
}

/// Resolve the route actually shown when `requested` is visited.
#[must_use]
pub fn guard(requested: Route, state: &SessionState) -> Route {
    if requested.requires_auth() && should_redirect_unauth(state) {
        Route::Login
    } else {
        requested
    }
}
