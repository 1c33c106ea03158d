//! Persistent key/value storage for small session state.
//!
//! Values are strings; structured values (the favorite list) are stored as
//! JSON. A missing key always means "empty".

mod memory;
mod sqlite;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

use thiserror::Error;

use crate::remote_catalog::CatalogId;

/// Key holding the favorite identifiers as a JSON array.
pub const FAVORITES_KEY: &str = "favorites";

/// Key holding the last committed search text.
pub const LAST_SEARCH_KEY: &str = "lastSearch";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Durable string key/value storage.
pub trait KeyValueStore: Send + Sync {
    /// Read a value. `Ok(None)` when the key was never written.
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Write a value, replacing any previous one.
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;

    /// Remove a key. Removing a missing key is not an error.
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Load the persisted favorite identifiers.
pub fn load_favorites(store: &dyn KeyValueStore) -> Result<Vec<CatalogId>, StoreError> {
    match store.get(FAVORITES_KEY)? {
        Some(json) if !json.trim().is_empty() => serde_json::from_str(&json)
            .map_err(|e| StoreError::Serialization(format!("invalid favorites: {}", e))),
        _ => Ok(vec![]),
    }
}

/// Persist the favorite identifiers.
pub fn save_favorites(store: &dyn KeyValueStore, ids: &[CatalogId]) -> Result<(), StoreError> {
    let json = serde_json::to_string(ids).map_err(|e| StoreError::Serialization(e.to_string()))?;
    store.set(FAVORITES_KEY, &json)
}

/// Load the last committed search text ("" when absent).
pub fn load_last_search(store: &dyn KeyValueStore) -> Result<String, StoreError> {
    Ok(store.get(LAST_SEARCH_KEY)?.unwrap_or_default())
}

/// Persist the last committed search text.
pub fn save_last_search(store: &dyn KeyValueStore, query: &str) -> Result<(), StoreError> {
    store.set(LAST_SEARCH_KEY, query)
}
