//! # Key/Value Store Contract
//!
//! The seam between the cart and whatever storage the device offers.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    KeyValueStore                                        │
//! │                                                                         │
//! │  get(key)        → Ok(Some(value)) | Ok(None) when absent              │
//! │  set(key, value) → overwrites any prior value                          │
//! │  remove(key)     → deleting an absent key is not an error              │
//! │                                                                         │
//! │  Implementations:                                                      │
//! │  • Database     - SQLite kv_store table (on device)                    │
//! │  • MemoryStore  - HashMap behind a RwLock (tests, previews)            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Values are opaque strings. Encoding (JSON) is the caller's job.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::DbResult;

/// Async key/value storage used to save and restore the cart.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value under `key`, or `None` when nothing is stored.
    async fn get(&self, key: &str) -> DbResult<Option<String>>;

    /// Writes `value` under `key`, replacing any prior value.
    async fn set(&self, key: &str, value: &str) -> DbResult<()>;

    /// Removes `key`.
    async fn remove(&self, key: &str) -> DbResult<()>;
}

/// In-process key/value store.
///
/// Contents live only as long as the value. Share it through `Arc`.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-seeded with one entry.
    pub fn with_entry(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut entries = HashMap::new();
        entries.insert(key.into(), value.into());
        MemoryStore {
            entries: RwLock::new(entries),
        }
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        self.entries
            .write()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> DbResult<()> {
        self.entries.write().await.remove(key);
        Ok(())
    }
}
