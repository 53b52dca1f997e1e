//! Client configuration parsed from environment variables.

use std::path::{Path, PathBuf};

pub const DEFAULT_API_URL: &str = "http://localhost:8000";
pub const API_URL_VAR: &str = "REPORT_API_URL";
pub const TOKEN_FILE_VAR: &str = "REPORT_TOKEN_FILE";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {message}")]
    InvalidValue { var: &'static str, message: String },

    #[error("no per-user config directory on this platform; set REPORT_TOKEN_FILE")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Service base URL without a trailing `/`.
    pub api_url: String,
    /// Where the bearer token is persisted.
    pub token_file: PathBuf,
}

impl ClientConfig {
    /// Build config from the environment.
    ///
    /// Optional:
    /// - `REPORT_API_URL`: default `http://localhost:8000`
    /// - `REPORT_TOKEN_FILE`: default `<config dir>/report-client/session.json`
    ///
    /// A `.env` file in the working directory is honored outside tests.
    ///
    /// # Errors
    ///
    /// Returns an error for a non-HTTP base URL or when no token path can be
    /// determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::resolve(None, None)
    }

    /// Like [`ClientConfig::from_env`], but an explicit value (a command-line
    /// flag) wins over the environment for each field.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn resolve(api_url: Option<&str>, token_file: Option<&Path>) -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        let env_api_url = std::env::var(API_URL_VAR).ok();
        let env_token_file = std::env::var_os(TOKEN_FILE_VAR).map(PathBuf::from);
        Self::from_values(api_url.or(env_api_url.as_deref()), token_file.or(env_token_file.as_deref()))
    }

    /// Build config from explicit values, applying defaults for `None`.
    ///
    /// # Errors
    ///
    /// See [`ClientConfig::from_env`].
    pub fn from_values(api_url: Option<&str>, token_file: Option<&Path>) -> Result<Self, ConfigError> {
        let api_url = normalize_base_url(api_url.unwrap_or(DEFAULT_API_URL))?;
        let token_file = match token_file {
            Some(path) => path.to_path_buf(),
            None => default_token_file().ok_or(ConfigError::NoConfigDir)?,
        };
        Ok(Self { api_url, token_file })
    }
}

fn normalize_base_url(raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim().trim_end_matches('/');
    if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
        return Err(ConfigError::InvalidValue {
            var: API_URL_VAR,
            message: format!("'{raw}' must start with http:// or https://"),
        });
    }
    Ok(trimmed.to_owned())
}

/// `<config dir>/report-client/session.json`, when the platform has one.
#[must_use]
pub fn default_token_file() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("report-client").join("session.json"))
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
