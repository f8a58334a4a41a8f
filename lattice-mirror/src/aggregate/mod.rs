//! Multi-Store Aggregation
//!
//! A [`MultiBinding`] runs the single-store pipeline for several dependency
//! groups, each naming its own store. Internally the mirror is namespaced by
//! store identity:
//!
//! ```text
//! { "app": {count: 1}, "cart": {items: 3} }
//! ```
//!
//! Consumers see a flattened view with all namespaces merged (later groups
//! win on key collisions), optionally layered on top of their own inputs
//! with [`MultiBinding::props`].
//!
//! Every group is resolved before any snapshot is read or any listener is
//! attached, so a missing store leaves nothing behind. Subscription keys
//! include the store identity, so identical paths on two stores never
//! share a registration.

use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::binding::{resolve_descriptor, MirrorCell, Observer, ResolvedStore, StoreDescriptor};
use crate::config::MirrorConfig;
use crate::error::Result;
use crate::patch::{apply_namespaced, EventPayload};
use crate::path::{normalize_all, Dependency, PathSpec};
use crate::snapshot::build_snapshot_into;
use crate::store::{Store, StoreDirectory, StoreId};
use crate::subscription::{Handler, SubscriptionRegistry};
use crate::tree::{Node, NodeMap};

/// A store and the dependencies declared against it.
#[derive(Debug, Clone)]
pub struct StoreGroup {
    /// The store.
    pub store: StoreDescriptor,
    /// Declarations against that store.
    pub dependencies: Vec<Dependency>,
}

impl StoreGroup {
    /// Create a group.
    pub fn new(store: impl Into<StoreDescriptor>, dependencies: Vec<Dependency>) -> Self {
        Self {
            store: store.into(),
            dependencies,
        }
    }
}

/// A serializable group definition that names its store by identity.
///
/// ```json
/// {"store": "cart", "dependencies": ["items", ["totals", "net"]]}
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupDefinition {
    /// Identity of the store.
    pub store: StoreId,
    /// Declarations against that store.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

impl GroupDefinition {
    /// Parse a list of definitions from JSON.
    pub fn list_from_json(json: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(json)
    }
}

impl From<GroupDefinition> for StoreGroup {
    fn from(definition: GroupDefinition) -> Self {
        StoreGroup::new(definition.store, definition.dependencies)
    }
}

/// A live mirror over several stores.
pub struct MultiBinding {
    stores: IndexMap<StoreId, Arc<dyn Store>>,
    cell: Arc<MirrorCell>,
    subscriptions: SubscriptionRegistry,
}

impl MultiBinding {
    /// Resolve every group, build the namespaced mirror and attach
    /// listeners.
    pub fn mount<I>(groups: I, directory: &dyn StoreDirectory, config: &MirrorConfig) -> Result<Self>
    where
        I: IntoIterator,
        I::Item: Into<StoreGroup>,
    {
        let groups: Vec<StoreGroup> = groups.into_iter().map(Into::into).collect();

        let resolved = groups
            .iter()
            .map(|group| -> Result<(ResolvedStore, Vec<PathSpec>)> {
                let store = resolve_descriptor(&group.store, directory)?;
                Ok((store, normalize_all(&group.dependencies, config)))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut stores = IndexMap::new();
        let mut mirror = Node::empty();
        for (store, specs) in &resolved {
            let base = mirror
                .get(store.identity.as_str())
                .cloned()
                .unwrap_or_else(Node::empty);
            let namespace = build_snapshot_into(base, store.handle.as_ref(), specs);
            mirror = mirror.with_key(store.identity.as_str(), namespace);
            stores
                .entry(store.identity.clone())
                .or_insert_with(|| Arc::clone(&store.handle));
        }

        let cell = MirrorCell::new(mirror);
        let handler: Handler = {
            let cell = Arc::clone(&cell);
            Arc::new(move |identity: &StoreId, spec: &PathSpec, payload: &EventPayload| {
                cell.update(|prev| apply_namespaced(identity, spec, prev, payload));
            })
        };

        let mut subscriptions = SubscriptionRegistry::new();
        for (store, specs) in &resolved {
            for spec in specs {
                subscriptions.attach(&store.handle, &store.identity, spec, &config.topics, &handler);
            }
        }
        debug!(
            stores = stores.len(),
            subscriptions = subscriptions.len(),
            "multi-store binding mounted"
        );

        Ok(Self {
            stores,
            cell,
            subscriptions,
        })
    }

    /// The internal mirror, one namespace per store identity.
    pub fn namespaced(&self) -> Node {
        self.cell.get()
    }

    /// The mirror for one store.
    pub fn namespace(&self, store: &StoreId) -> Option<Node> {
        self.cell.get().get(store.as_str()).cloned()
    }

    /// All namespaces merged into one mapping.
    pub fn merged_view(&self) -> Node {
        flatten(&self.cell.get())
    }

    /// The consumer's own inputs with the merged view layered on top.
    pub fn props(&self, inputs: &Node) -> Node {
        let mut merged = inputs.as_map().cloned().unwrap_or_default();
        if let Some(view) = self.merged_view().as_map() {
            merged.extend(view.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
        Node::Map(Arc::new(merged))
    }

    /// Number of patches applied since mount.
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    /// A resolved store handle.
    pub fn store(&self, id: &StoreId) -> Option<&Arc<dyn Store>> {
        self.stores.get(id)
    }

    /// Identities of the resolved stores, in declaration order.
    pub fn store_ids(&self) -> impl Iterator<Item = &StoreId> {
        self.stores.keys()
    }

    /// Register an observer called with the merged view after every
    /// applied patch.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(&Node) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(move |mirror: &Node| observer(&flatten(mirror)));
        self.cell.observe(observer);
    }

    /// Number of live store registrations.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Remove every listener on every store. Later calls return 0.
    pub fn unmount(&mut self) -> usize {
        self.subscriptions.detach_all()
    }
}

fn flatten(namespaced: &Node) -> Node {
    let mut merged = NodeMap::new();
    if let Some(namespaces) = namespaced.as_map() {
        for mirror in namespaces.values().filter_map(Node::as_map) {
            merged.extend(mirror.iter().map(|(key, value)| (key.clone(), value.clone())));
        }
    }
    Node::Map(Arc::new(merged))
}
