//! Durable storage for the bearer token.
//!
//! SYSTEM CONTEXT
//! ==============
//! The token is the only client state that survives a restart. Every read and
//! write goes through a [`TokenStore`] so the gateway (which reads it per
//! request and clears it on 401) and the session store (which writes it on
//! login and clears it on logout) share one source of truth.
//!
//! The file layout is a flat JSON object, like browser local storage: the
//! token lives under [`TOKEN_KEY`] and unrelated keys are preserved.

#[cfg(test)]
#[path = "token_store_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// Key under which the bearer token is persisted.
pub const TOKEN_KEY: &str = "token";

/// Errors raised while persisting or clearing the token.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("token storage is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Accessor for the persisted bearer token.
pub trait TokenStore: Send + Sync {
    /// Current token, or `None` when logged out.
    fn load(&self) -> Option<String>;

    /// Persist `token`, replacing any previous value.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn save(&self, token: &str) -> Result<(), StorageError>;

    /// Forget the token. Removing an absent token is not an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn remove(&self) -> Result<(), StorageError>;
}

// =============================================================================
// FILE STORE
// =============================================================================

/// Token store backed by a JSON file on disk.
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_entries(&self) -> Result<BTreeMap<String, String>, StorageError> {
        match std::fs::read_to_string(&self.path) {
            Ok(raw) if raw.trim().is_empty() => Ok(BTreeMap::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn write_entries(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let raw = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, raw)?;
        Ok(())
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        match self.read_entries() {
            Ok(mut entries) => entries.remove(TOKEN_KEY).filter(|token| !token.is_empty()),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "unreadable token storage; treating as logged out");
                None
            }
        }
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        // A corrupt file is replaced rather than blocking login.
        let mut entries = self.read_entries().unwrap_or_default();
        entries.insert(TOKEN_KEY.to_owned(), token.to_owned());
        self.write_entries(&entries)
    }

    fn remove(&self) -> Result<(), StorageError> {
        if !self.path.exists() {
            return Ok(());
        }
        let mut entries = self.read_entries().unwrap_or_default();
        entries.remove(TOKEN_KEY);
        self.write_entries(&entries)
    }
}

// =============================================================================
// MEMORY STORE
// =============================================================================

/// Process-local token store, for tests and one-shot sessions.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    #[must_use]
    pub fn with_token(token: &str) -> Self {
        Self { token: Mutex::new(Some(token.to_owned())) }
    }

    fn slot(&self) -> std::sync::MutexGuard<'_, Option<String>> {
        self.token.lock().unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.slot().clone()
    }

    fn save(&self, token: &str) -> Result<(), StorageError> {
        *self.slot() = Some(token.to_owned());
        Ok(())
    }

    fn remove(&self) -> Result<(), StorageError> {
        *self.slot() = None;
        Ok(())
    }
}
