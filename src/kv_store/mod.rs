//! Local key-value persistence for the three application slots.
//!
//! Values are stored as JSON text. Anything that fails to parse on load is
//! treated as if it had never been written.

mod memory_kv_store;
mod sqlite_kv_store;

pub use memory_kv_store::MemoryKvStore;
pub use sqlite_kv_store::SqliteKvStore;

use anyhow::{Context, Result};
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageKey {
    Users,
    Videos,
    CurrentUser,
}

impl StorageKey {
    pub fn as_str(self) -> &'static str {
        match self {
            StorageKey::Users => "vs_users",
            StorageKey::Videos => "vs_videos",
            StorageKey::CurrentUser => "vs_current_user",
        }
    }
}

pub trait KvStore: Send + Sync {
    /// Returns the raw value stored under `key`, or None if nothing was saved.
    fn load(&self, key: &str) -> Result<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    fn save(&self, key: &str, value: &str) -> Result<()>;
}

/// Loads and deserializes the value under `key`.
/// Missing, unreadable and malformed values all come back as None.
pub fn load_json<T: DeserializeOwned>(store: &dyn KvStore, key: StorageKey) -> Option<T> {
    let raw = match store.load(key.as_str()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(err) => {
            warn!("Could not read {} from store: {}", key.as_str(), err);
            return None;
        }
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!("Ignoring malformed value under {}: {}", key.as_str(), err);
            None
        }
    }
}

pub fn save_json<T: Serialize + ?Sized>(
    store: &dyn KvStore,
    key: StorageKey,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string(value)
        .with_context(|| format!("Failed to serialize {}", key.as_str()))?;
    store.save(key.as_str(), &raw)
}
