//! Per-user profile preferences.
//!
//! The identity subsystem owns users; this directory stores only the slice
//! of profile the task list reads and writes: the language preference. Like
//! the task collection, it can mirror itself to a JSON file so one-shot CLI
//! invocations see each other's writes.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use huddle_core::UserId;
use huddle_store_mem::StoreError;

/// Profile fields this system manages for a user.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserProfile {
    /// Preferred UI language, if the user ever picked one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Directory of user profiles, keyed by user id.
#[derive(Debug, Default)]
pub struct UserDirectory {
    profiles: RwLock<BTreeMap<UserId, UserProfile>>,
    path: Option<PathBuf>,
}

impl UserDirectory {
    /// Create a purely in-memory directory (used by tests and demos).
    #[must_use]
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Open a file-backed directory, loading the document if it exists.
    ///
    /// A missing file is an empty directory, not an error; it is created on
    /// the first write.
    ///
    /// # Errors
    /// Returns an error when the file cannot be read or parsed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref().to_path_buf();
        let mut profiles = BTreeMap::new();
        if path.exists() {
            let contents = fs::read_to_string(&path)?;
            profiles = serde_json::from_str(&contents)
                .map_err(|err| StoreError::ParseError(err.to_string()))?;
            debug!(count = profiles.len(), path = %path.display(), "Loaded profile document");
        }
        Ok(Self {
            profiles: RwLock::new(profiles),
            path: Some(path),
        })
    }

    /// Persist a user's language preference.
    ///
    /// # Errors
    /// Returns an error when persisting the document fails.
    pub fn set_language(
        &self,
        user: &UserId,
        language: impl Into<String>,
    ) -> Result<(), StoreError> {
        let mut profiles = self.write_guard();
        info!(user = %user, "Setting language preference");
        profiles.entry(user.clone()).or_default().language = Some(language.into());
        self.flush(&profiles)
    }

    /// The user's persisted language preference, if any.
    #[must_use]
    pub fn language(&self, user: &UserId) -> Option<String> {
        self.read_guard()
            .get(user)
            .and_then(|profile| profile.language.clone())
    }

    fn flush(&self, profiles: &BTreeMap<UserId, UserProfile>) -> Result<(), StoreError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let body = serde_json::to_string_pretty(profiles)
            .map_err(|err| StoreError::SerializeError(err.to_string()))?;
        fs::write(path, body)?;
        Ok(())
    }

    fn read_guard(&self) -> RwLockReadGuard<'_, BTreeMap<UserId, UserProfile>> {
        self.profiles.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_guard(&self) -> RwLockWriteGuard<'_, BTreeMap<UserId, UserProfile>> {
        self.profiles.write().unwrap_or_else(PoisonError::into_inner)
    }
}
