//! Store descriptors and their resolution.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::error::{BindError, Result};
use crate::store::{Store, StoreDirectory, StoreId};

/// How a binding names its store.
#[derive(Clone)]
pub enum StoreDescriptor {
    /// Look the store up by identity.
    Id(StoreId),
    /// Use a handle directly. `None` stands for a missing handle.
    Handle(Option<Arc<dyn Store>>),
}

impl From<StoreId> for StoreDescriptor {
    fn from(id: StoreId) -> Self {
        StoreDescriptor::Id(id)
    }
}

impl From<&str> for StoreDescriptor {
    fn from(id: &str) -> Self {
        StoreDescriptor::Id(StoreId::from(id))
    }
}

impl From<Arc<dyn Store>> for StoreDescriptor {
    fn from(store: Arc<dyn Store>) -> Self {
        StoreDescriptor::Handle(Some(store))
    }
}

impl<S: Store + 'static> From<Arc<S>> for StoreDescriptor {
    fn from(store: Arc<S>) -> Self {
        let store: Arc<dyn Store> = store;
        StoreDescriptor::Handle(Some(store))
    }
}

impl fmt::Debug for StoreDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreDescriptor::Id(id) => f.debug_tuple("Id").field(id).finish(),
            StoreDescriptor::Handle(Some(store)) => f
                .debug_tuple("Handle")
                .field(&store.identity())
                .finish(),
            StoreDescriptor::Handle(None) => f.write_str("Handle(None)"),
        }
    }
}

/// A store handle together with its canonical identity.
#[derive(Clone)]
pub struct ResolvedStore {
    /// The store handle.
    pub handle: Arc<dyn Store>,
    /// Identity used for namespacing and subscription keys.
    pub identity: StoreId,
}

impl fmt::Debug for ResolvedStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedStore")
            .field("identity", &self.identity)
            .finish_non_exhaustive()
    }
}

/// Resolve a descriptor to a handle and identity.
///
/// An identity must be registered in `directory`; a direct handle must be
/// present and expose an identity.
pub fn resolve_descriptor(
    descriptor: &StoreDescriptor,
    directory: &dyn StoreDirectory,
) -> Result<ResolvedStore> {
    let resolved = match descriptor {
        StoreDescriptor::Id(id) => ResolvedStore {
            handle: directory
                .resolve(id)
                .ok_or_else(|| BindError::StoreNotFound { id: id.clone() })?,
            identity: id.clone(),
        },
        StoreDescriptor::Handle(None) => return Err(BindError::MissingHandle),
        StoreDescriptor::Handle(Some(handle)) => ResolvedStore {
            identity: handle.identity().ok_or(BindError::UnidentifiableHandle)?,
            handle: Arc::clone(handle),
        },
    };
    debug!(store = %resolved.identity, "resolved store");
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{MemoryStore, StoreRegistry};
    use serde_json::json;

    #[test]
    fn resolves_by_identity() {
        let registry = StoreRegistry::new();
        registry
            .register(Arc::new(MemoryStore::new("app", json!({}))))
            .unwrap();

        let resolved = resolve_descriptor(&"app".into(), &registry).unwrap();
        assert_eq!(resolved.identity, StoreId::from("app"));
    }

    #[test]
    fn unknown_identity_fails() {
        let err = resolve_descriptor(&"nope".into(), &StoreRegistry::new()).unwrap_err();
        assert_eq!(err, BindError::StoreNotFound { id: StoreId::from("nope") });
    }

    #[test]
    fn resolves_direct_handle() {
        let store = Arc::new(MemoryStore::new("direct", json!({})));
        let resolved = resolve_descriptor(&store.into(), &StoreRegistry::new()).unwrap();
        assert_eq!(resolved.identity, StoreId::from("direct"));
    }

    #[test]
    fn missing_handle_fails() {
        let err = resolve_descriptor(&StoreDescriptor::Handle(None), &StoreRegistry::new()).unwrap_err();
        assert_eq!(err, BindError::MissingHandle);
    }

    #[test]
    fn anonymous_handle_fails() {
        let store = Arc::new(MemoryStore::anonymous(json!({})));
        let err = resolve_descriptor(&store.into(), &StoreRegistry::new()).unwrap_err();
        assert_eq!(err, BindError::UnidentifiableHandle);
    }
}
