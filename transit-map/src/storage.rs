//! Key-value persistence seam.
//!
//! The UI host owns the real store (browser cookies or local storage); the
//! pipeline only depends on this trait. Values are JSON-serialized strings
//! with an optional expiry.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};

/// Storage keys used by the pipeline.
pub mod keys {
    /// Filter tree selection snapshot.
    pub const SELECTED_SOURCES: &str = "selectedSources";

    /// Geo filter radius in kilometres.
    pub const NUMBER_INPUT_VALUE: &str = "numberInputValue";

    /// Serialized favourites mapping.
    pub const FAVOURITES: &str = "favourites";
}

/// Expiry applied to everything the pipeline persists.
pub fn default_ttl() -> Duration {
    Duration::days(7)
}

/// Errors from a storage backend.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(String),
}

/// A key-value store with expiry.
///
/// All values are JSON-serialized strings. `get` on an expired or missing
/// key returns `Ok(None)`.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;

    fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StorageError>;

    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

struct Entry {
    value: String,
    expires_at: Option<DateTime<Utc>>,
}

/// In-memory store for tests and headless use.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, Entry>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("poisoned lock".into()))?;

        let expired = entries
            .get(key)
            .is_some_and(|e| e.expires_at.is_some_and(|t| t <= Utc::now()));
        if expired {
            entries.remove(key);
            return Ok(None);
        }

        Ok(entries.get(key).map(|e| e.value.clone()))
    }

    fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("poisoned lock".into()))?;

        entries.insert(
            key.to_string(),
            Entry {
                value,
                expires_at: ttl.map(|d| Utc::now() + d),
            },
        );
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| StorageError::Backend("poisoned lock".into()))?;

        entries.remove(key);
        Ok(())
    }
}
