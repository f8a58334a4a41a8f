//! Subscription Registry
//!
//! A binding attaches one listener per resolved topic at mount and removes
//! all of them at unmount. The registry records each registration under an
//! explicit [`SubscriptionKey`] (store identity plus topic) together with the
//! exact [`ListenerId`] handed to the store, so teardown removes precisely
//! the listener that was registered.
//!
//! # Guarantees
//!
//! - Two dependencies resolving to the same topic on the same store share one
//!   registration.
//! - Identically shaped topics on different stores never collide.
//! - `detach_all` unsubscribes every entry exactly once and is idempotent.
//! - Dropping the registry detaches anything still attached.

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, warn};

use crate::config::TopicConvention;
use crate::patch::EventPayload;
use crate::path::PathSpec;
use crate::store::{Listener, ListenerId, Store, StoreId};
use crate::topic::{resolve_topic, Topic};

/// Handler shared by every listener a binding attaches.
///
/// It receives the identity of the notifying store and the spec the
/// subscription was made for.
pub type Handler = Arc<dyn Fn(&StoreId, &PathSpec, &EventPayload) + Send + Sync>;

/// Composite key for a registration.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SubscriptionKey {
    /// Identity of the store the listener was registered with.
    pub store: StoreId,
    /// Topic the listener was registered on.
    pub topic: Topic,
}

struct Registration {
    store: Arc<dyn Store>,
    listener: ListenerId,
}

/// Registrations owned by one binding instance.
#[derive(Default)]
pub struct SubscriptionRegistry {
    entries: IndexMap<SubscriptionKey, Registration>,
}

impl SubscriptionRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the topic for `spec`, register a listener for it on `store`,
    /// and record the registration.
    ///
    /// If the same store and topic are already attached, nothing new is
    /// registered and the existing key is returned.
    pub fn attach(
        &mut self,
        store: &Arc<dyn Store>,
        identity: &StoreId,
        spec: &PathSpec,
        convention: &TopicConvention,
        handler: &Handler,
    ) -> SubscriptionKey {
        let key = SubscriptionKey {
            store: identity.clone(),
            topic: resolve_topic(spec, convention),
        };
        if self.entries.contains_key(&key) {
            debug!(store = %key.store, topic = %key.topic, "topic already attached");
            return key;
        }

        let listener = {
            let handler = Arc::clone(handler);
            let identity = identity.clone();
            let spec = spec.clone();
            Listener::new(move |payload| handler(&identity, &spec, payload))
        };
        let listener_id = listener.id();
        store.subscribe(&key.topic, listener);
        debug!(store = %key.store, topic = %key.topic, "attached");

        self.entries.insert(
            key.clone(),
            Registration {
                store: Arc::clone(store),
                listener: listener_id,
            },
        );
        key
    }

    /// Unsubscribe every recorded listener and clear the registry.
    ///
    /// Returns the number of registrations removed. Calling it again is a
    /// no-op.
    pub fn detach_all(&mut self) -> usize {
        let count = self.entries.len();
        for (key, registration) in self.entries.drain(..) {
            if !registration.store.unsubscribe(&key.topic, registration.listener) {
                warn!(store = %key.store, topic = %key.topic, "listener was already gone");
            }
        }
        if count > 0 {
            debug!(count, "detached");
        }
        count
    }

    /// Check whether a key is attached.
    pub fn contains(&self, key: &SubscriptionKey) -> bool {
        self.entries.contains_key(key)
    }

    /// Attached keys, in attach order.
    pub fn keys(&self) -> impl Iterator<Item = &SubscriptionKey> {
        self.entries.keys()
    }

    /// Number of registrations.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if nothing is attached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for SubscriptionRegistry {
    fn drop(&mut self) {
        self.detach_all();
    }
}
