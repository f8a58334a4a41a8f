//! Single-store binding.

use std::sync::Arc;

use tracing::debug;

use super::cell::{MirrorCell, Observer};
use super::descriptor::{resolve_descriptor, StoreDescriptor};
use crate::config::MirrorConfig;
use crate::error::Result;
use crate::patch::{apply_patch, EventPayload};
use crate::path::{normalize_all, Dependency, PathSpec};
use crate::snapshot::build_snapshot;
use crate::store::{Store, StoreDirectory, StoreId};
use crate::subscription::{Handler, SubscriptionRegistry};
use crate::tree::Node;

/// A live mirror of selected paths in one store.
pub struct Binding {
    store: Arc<dyn Store>,
    identity: StoreId,
    dependencies: Vec<PathSpec>,
    cell: Arc<MirrorCell>,
    subscriptions: SubscriptionRegistry,
    mounted: bool,
}

impl Binding {
    /// Resolve the store, build the initial mirror and attach listeners.
    ///
    /// Fails before any store access if the store cannot be resolved.
    pub fn mount(
        descriptor: impl Into<StoreDescriptor>,
        dependencies: &[Dependency],
        directory: &dyn StoreDirectory,
        config: &MirrorConfig,
    ) -> Result<Self> {
        let resolved = resolve_descriptor(&descriptor.into(), directory)?;
        let specs = normalize_all(dependencies, config);

        let cell = MirrorCell::new(build_snapshot(resolved.handle.as_ref(), &specs));

        let handler: Handler = {
            let cell = Arc::clone(&cell);
            Arc::new(move |_: &StoreId, spec: &PathSpec, payload: &EventPayload| {
                cell.update(|prev| apply_patch(spec, prev, payload));
            })
        };

        let mut subscriptions = SubscriptionRegistry::new();
        for spec in &specs {
            subscriptions.attach(&resolved.handle, &resolved.identity, spec, &config.topics, &handler);
        }
        debug!(
            store = %resolved.identity,
            dependencies = specs.len(),
            subscriptions = subscriptions.len(),
            "binding mounted"
        );

        Ok(Self {
            store: resolved.handle,
            identity: resolved.identity,
            dependencies: specs,
            cell,
            subscriptions,
            mounted: true,
        })
    }

    /// The current mirror.
    pub fn state(&self) -> Node {
        self.cell.get()
    }

    /// Number of patches applied since mount.
    pub fn version(&self) -> u64 {
        self.cell.version()
    }

    /// The resolved store handle.
    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// The resolved store identity.
    pub fn identity(&self) -> &StoreId {
        &self.identity
    }

    /// The normalized dependencies, in declaration order.
    pub fn dependencies(&self) -> &[PathSpec] {
        &self.dependencies
    }

    /// Register an observer called with the next mirror after every
    /// applied patch.
    pub fn on_change<F>(&self, observer: F)
    where
        F: Fn(&Node) + Send + Sync + 'static,
    {
        let observer: Observer = Arc::new(observer);
        self.cell.observe(observer);
    }

    /// Number of live store registrations.
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Check whether [`Binding::unmount`] has not been called yet.
    ///
    /// A binding whose dependencies were all skipped is mounted with no
    /// subscriptions.
    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    /// Remove every listener this binding attached.
    ///
    /// Returns the number removed; later calls return 0. The mirror keeps
    /// its last value.
    pub fn unmount(&mut self) -> usize {
        self.mounted = false;
        let count = self.subscriptions.detach_all();
        if count > 0 {
            debug!(store = %self.identity, count, "binding unmounted");
        }
        count
    }
}
