//! Favorite set manager.
//!
//! The in-memory set is authoritative for the session. Every mutation is
//! mirrored to the persistent store; if the store cannot be read at startup
//! or fails a write, the set degrades to memory-only for the rest of the
//! session.

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::metrics;
use crate::remote_catalog::CatalogId;
use crate::store::{self, KeyValueStore, StoreError};

/// Result of a toggle.
#[derive(Debug)]
pub struct Toggled {
    /// Membership after the toggle.
    pub favorite: bool,
    /// Whether the updated set reached the persistent store.
    pub persisted: bool,
    /// Write failure that degraded the set during this toggle.
    pub error: Option<StoreError>,
}

pub struct FavoriteSet {
    ids: Mutex<BTreeSet<CatalogId>>,
    store: Arc<dyn KeyValueStore>,
    persistent: AtomicBool,
}

impl FavoriteSet {
    /// Load the set from the store. Never fails: an empty or unreadable
    /// store yields an empty set. A read error is handed back alongside the
    /// memory-only set.
    pub fn load(store: Arc<dyn KeyValueStore>) -> (Self, Option<StoreError>) {
        let (ids, error) = match store::load_favorites(store.as_ref()) {
            Ok(ids) => {
                debug!("Loaded {} favorites", ids.len());
                (ids.into_iter().collect(), None)
            }
            Err(e) => {
                warn!("Favorites unavailable, keeping them in memory only: {}", e);
                (BTreeSet::new(), Some(e))
            }
        };

        let set = Self {
            ids: Mutex::new(ids),
            store,
            persistent: AtomicBool::new(error.is_none()),
        };
        (set, error)
    }

    pub fn is_favorite(&self, id: CatalogId) -> bool {
        self.ids.lock().unwrap().contains(&id)
    }

    /// Add `id` if absent, remove it if present, then persist.
    pub fn toggle(&self, id: CatalogId) -> Toggled {
        // The lock is held through the write so stored order matches mutation order.
        let mut ids = self.ids.lock().unwrap();
        let favorite = if ids.remove(&id) {
            metrics::FAVORITE_TOGGLES.with_label_values(&["removed"]).inc();
            false
        } else {
            ids.insert(id);
            metrics::FAVORITE_TOGGLES.with_label_values(&["added"]).inc();
            true
        };

        let (persisted, error) = match self.persist(&ids) {
            Ok(persisted) => (persisted, None),
            Err(e) => {
                warn!("Failed to persist favorites, continuing in memory: {}", e);
                self.persistent.store(false, Ordering::SeqCst);
                (false, Some(e))
            }
        };

        Toggled {
            favorite,
            persisted,
            error,
        }
    }

    /// Favorite identifiers in ascending order.
    pub fn ids(&self) -> Vec<CatalogId> {
        self.ids.lock().unwrap().iter().copied().collect()
    }

    /// Whether mutations are still mirrored to the store.
    pub fn is_persistent(&self) -> bool {
        self.persistent.load(Ordering::SeqCst)
    }

    fn persist(&self, ids: &BTreeSet<CatalogId>) -> Result<bool, StoreError> {
        if !self.is_persistent() {
            return Ok(false);
        }
        let ids: Vec<CatalogId> = ids.iter().copied().collect();
        store::save_favorites(self.store.as_ref(), &ids)?;
        Ok(true)
    }
}
