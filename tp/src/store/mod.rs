//! Durable key-value storage for completed phase results
//!
//! The coordinator treats every storage failure as non-fatal. Stores still
//! report errors so callers can log them.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

mod file;

pub use file::FileStore;

/// Key holding the serialized activities-phase result
pub const ACTIVITY_SUGGESTIONS_KEY: &str = "activity_suggestions";

/// Key holding the serialized itinerary-phase result
pub const GENERATED_ITINERARY_KEY: &str = "generated_itinerary";

/// Every key the coordinator writes
pub const ALL_KEYS: [&str; 2] = [ACTIVITY_SUGGESTIONS_KEY, GENERATED_ITINERARY_KEY];

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Byte-oriented key-value store
#[async_trait]
pub trait ResultStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Remove a key; removing a missing key is not an error
    async fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// In-memory store for tests and throwaway sessions
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl ResultStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        debug!(%key, "MemoryStore::get: called");
        Ok(self.entries.read().await.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), StoreError> {
        debug!(%key, len = value.len(), "MemoryStore::put: called");
        self.entries.write().await.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), StoreError> {
        debug!(%key, "MemoryStore::remove: called");
        self.entries.write().await.remove(key);
        Ok(())
    }
}
