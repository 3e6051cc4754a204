//! Opaque key-value persistence
//!
//! Every record is stored as a JSON string under its own key. Reads are
//! tolerant: a missing or corrupt record falls back to a default value and
//! is logged, never surfaced to the caller.

mod file_storage;
mod memory;
mod models;

use serde::de::DeserializeOwned;
use serde::Serialize;

pub use file_storage::{FileKeyValueStore, Result, StorageError};
pub use memory::MemoryKeyValueStore;
pub use models::StorageKey;

/// A string-valued key-value store
pub trait KeyValueStore: Send + Sync {
    fn load(&self, key: &str) -> Result<Option<String>>;
    fn save(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Load and decode a record, or None when it is absent or unreadable
pub fn load_json<T: DeserializeOwned>(kv: &dyn KeyValueStore, key: &StorageKey) -> Option<T> {
    let raw = match kv.load(&key.as_key()) {
        Ok(Some(raw)) => raw,
        Ok(None) => return None,
        Err(e) => {
            log::warn!("Failed to read {}: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&raw) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Discarding corrupt record {}: {}", key, e);
            None
        }
    }
}

/// Load a record, falling back to its default value
pub fn load_json_or_default<T: DeserializeOwned + Default>(
    kv: &dyn KeyValueStore,
    key: &StorageKey,
) -> T {
    load_json(kv, key).unwrap_or_default()
}

/// Encode and write a record
pub fn save_json<T: Serialize + ?Sized>(
    kv: &dyn KeyValueStore,
    key: &StorageKey,
    value: &T,
) -> Result<()> {
    let json = serde_json::to_string(value)?;
    kv.save(&key.as_key(), &json)
}

/// Encode and write a record, logging instead of returning failures
pub fn persist<T: Serialize + ?Sized>(kv: &dyn KeyValueStore, key: &StorageKey, value: &T) {
    if let Err(e) = save_json(kv, key, value) {
        log::error!("Failed to persist {}: {}", key, e);
    }
}
