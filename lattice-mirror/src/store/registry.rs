//! In-process store directory.

use std::sync::{Arc, OnceLock};

use dashmap::DashMap;
use tracing::debug;

use super::{Store, StoreDirectory, StoreId};
use crate::error::BindError;

/// A concurrent map from identity to store handle.
///
/// Bindings never reach for a global instance on their own; callers pass a
/// directory in. [`StoreRegistry::global`] exists for applications that want
/// one process-wide registry.
#[derive(Default)]
pub struct StoreRegistry {
    stores: DashMap<StoreId, Arc<dyn Store>>,
}

static GLOBAL: OnceLock<StoreRegistry> = OnceLock::new();

impl StoreRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide registry, created on first use.
    pub fn global() -> &'static StoreRegistry {
        GLOBAL.get_or_init(StoreRegistry::new)
    }

    /// Register a store under its own identity, replacing any previous
    /// store with the same identity.
    pub fn register(&self, store: Arc<dyn Store>) -> Result<StoreId, BindError> {
        let id = store.identity().ok_or(BindError::UnidentifiableHandle)?;
        debug!(store = %id, "registering store");
        self.stores.insert(id.clone(), store);
        Ok(id)
    }

    /// Remove a store.
    pub fn remove(&self, id: &StoreId) -> Option<Arc<dyn Store>> {
        self.stores.remove(id).map(|(_, store)| store)
    }

    /// Number of registered stores.
    pub fn len(&self) -> usize {
        self.stores.len()
    }

    /// Check if no stores are registered.
    pub fn is_empty(&self) -> bool {
        self.stores.is_empty()
    }
}

impl StoreDirectory for StoreRegistry {
    fn resolve(&self, id: &StoreId) -> Option<Arc<dyn Store>> {
        self.stores.get(id).map(|entry| Arc::clone(entry.value()))
    }
}
