//! Mapping-provider credential management.
//!
//! The key lives in an injectable [`KeyStore`] (file-backed in production,
//! in-memory in tests). [`KeyManager`] gates changes behind format validation
//! and a sliding-window rate limit, and signals when a change only takes
//! effect after the provider client is rebuilt.
//!
//! The key value itself must never reach logs or `Debug` output; [`ApiKey`]
//! redacts itself everywhere it is rendered.

use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::rate_limit::RateLimitWindow;

#[derive(Debug, Error)]
pub enum CredentialError {
    #[error("credential does not match the provider key format")]
    InvalidFormat,

    #[error("too many credential changes; retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("key store error: {reason}")]
    Store { reason: String },
}

/// Outcome of a successful [`KeyManager::set_key`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyUpdate {
    /// The new key is persisted and no live provider session holds an older one.
    Applied,
    /// The new key is persisted, but a provider client built with the previous
    /// key is still live. The caller must rebuild that client before the new
    /// key takes effect — the provider session binds its key at construction.
    ReloadRequired,
}

/// An opaque mapping-provider API token.
///
/// `Debug` and `Display` render only the fixed provider prefix followed by a
/// redaction marker, so the value cannot leak through logging or error paths.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

fn key_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^AIza[A-Za-z0-9_-]+$").expect("valid literal pattern"))
}

impl ApiKey {
    /// Validates `raw` against the provider key format.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::InvalidFormat`] when the value is empty or
    /// does not match `^AIza[A-Za-z0-9_-]+$`.
    pub fn parse(raw: &str) -> Result<Self, CredentialError> {
        let trimmed = raw.trim();
        if key_pattern().is_match(trimmed) {
            Ok(Self(trimmed.to_string()))
        } else {
            Err(CredentialError::InvalidFormat)
        }
    }

    /// The raw token, for request signing only. Callers must not log this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ApiKey(AIza…[redacted])")
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AIza…[redacted]")
    }
}

/// Persistence port for the credential.
///
/// Production uses [`FileKeyStore`]; tests substitute [`MemoryKeyStore`].
pub trait KeyStore: Send + Sync {
    /// Reads the persisted value, `None` when nothing is stored.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Store`] on storage failure.
    fn load(&self) -> Result<Option<String>, CredentialError>;

    /// Persists `value`, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Store`] on storage failure.
    fn save(&self, value: &str) -> Result<(), CredentialError>;

    /// Removes the persisted value if present.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Store`] on storage failure.
    fn clear(&self) -> Result<(), CredentialError>;
}

/// In-memory store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryKeyStore {
    value: Mutex<Option<String>>,
}

impl MemoryKeyStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyStore for MemoryKeyStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        Ok(self.value.lock().expect("store lock poisoned").clone())
    }

    fn save(&self, value: &str) -> Result<(), CredentialError> {
        *self.value.lock().expect("store lock poisoned") = Some(value.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), CredentialError> {
        *self.value.lock().expect("store lock poisoned") = None;
        Ok(())
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct PersistedKey {
    key: String,
    updated_at: DateTime<Utc>,
}

/// JSON-file-backed store. No cross-process locking; single-process callers
/// only.
pub struct FileKeyStore {
    path: PathBuf,
}

impl FileKeyStore {
    #[must_use]
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn store_err(&self, e: &dyn std::fmt::Display) -> CredentialError {
        CredentialError::Store {
            reason: format!("{}: {e}", self.path.display()),
        }
    }
}

impl KeyStore for FileKeyStore {
    fn load(&self) -> Result<Option<String>, CredentialError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&self.path).map_err(|e| self.store_err(&e))?;
        let persisted: PersistedKey =
            serde_json::from_str(&content).map_err(|e| self.store_err(&e))?;
        Ok(Some(persisted.key))
    }

    fn save(&self, value: &str) -> Result<(), CredentialError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| self.store_err(&e))?;
        }
        let persisted = PersistedKey {
            key: value.to_string(),
            updated_at: Utc::now(),
        };
        let content =
            serde_json::to_string_pretty(&persisted).map_err(|e| self.store_err(&e))?;
        std::fs::write(&self.path, content).map_err(|e| self.store_err(&e))
    }

    fn clear(&self) -> Result<(), CredentialError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path).map_err(|e| self.store_err(&e))?;
        }
        Ok(())
    }
}

/// Owns the credential lifecycle: read-with-fallback, validated and
/// rate-limited changes, and reload signaling for live provider sessions.
pub struct KeyManager {
    store: Box<dyn KeyStore>,
    fallback: Option<ApiKey>,
    window: Mutex<RateLimitWindow>,
    active: Mutex<Option<String>>,
}

impl KeyManager {
    #[must_use]
    pub fn new(store: Box<dyn KeyStore>, fallback: Option<ApiKey>) -> Self {
        Self::with_limits(store, fallback, 5, Duration::from_secs(300))
    }

    #[must_use]
    pub fn with_limits(
        store: Box<dyn KeyStore>,
        fallback: Option<ApiKey>,
        max_changes: usize,
        window: Duration,
    ) -> Self {
        Self {
            store,
            fallback,
            window: Mutex::new(RateLimitWindow::new(max_changes, window)),
            active: Mutex::new(None),
        }
    }

    /// The current credential: the persisted value when present and
    /// non-empty, otherwise the configured fallback, otherwise `None`.
    ///
    /// # Errors
    ///
    /// Returns [`CredentialError::Store`] if the store fails, or
    /// [`CredentialError::InvalidFormat`] if a persisted value no longer
    /// matches the key format (e.g. the store file was hand-edited).
    pub fn key(&self) -> Result<Option<ApiKey>, CredentialError> {
        match self.store.load()? {
            Some(raw) if !raw.trim().is_empty() => ApiKey::parse(&raw).map(Some),
            _ => Ok(self.fallback.clone()),
        }
    }

    /// Records which key a live provider client was built with, so later
    /// changes can signal [`KeyUpdate::ReloadRequired`].
    pub fn mark_active(&self, key: &ApiKey) {
        *self.active.lock().expect("active lock poisoned") = Some(key.expose().to_string());
    }

    /// Validates, rate-limits, and persists a new credential for `caller`.
    ///
    /// # Errors
    ///
    /// - [`CredentialError::InvalidFormat`] — value fails the format check;
    ///   nothing is persisted and no rate-limit slot is consumed.
    /// - [`CredentialError::RateLimited`] — the caller exceeded the change
    ///   budget for the trailing window; nothing is persisted.
    /// - [`CredentialError::Store`] — persistence failed.
    pub fn set_key(&self, caller: &str, raw: &str) -> Result<KeyUpdate, CredentialError> {
        let key = ApiKey::parse(raw)?;

        self.window
            .lock()
            .expect("window lock poisoned")
            .check(caller, Instant::now())
            .map_err(|retry| CredentialError::RateLimited {
                retry_after_secs: retry.secs,
            })?;

        self.store.save(key.expose())?;
        tracing::info!(caller, "provider credential updated");

        let active = self.active.lock().expect("active lock poisoned");
        match active.as_deref() {
            Some(current) if current != key.expose() => Ok(KeyUpdate::ReloadRequired),
            _ => Ok(KeyUpdate::Applied),
        }
    }
}

#[cfg(test)]
#[path = "credential_test.rs"]
mod tests;
