//! Reference in-memory store.
//!
//! Writes are copy-on-write on a [`Node`] tree. A write at `a.b.c` notifies,
//! in order:
//!
//! 1. each structural topic `[a]`, `[a.b]`, `[a.b.c]` with the subtree now
//!    at that prefix,
//! 2. each registered structural topic below `a.b.c` whose value changed,
//!    with the value now there (`null` once it is gone),
//! 3. the key-scoped topic for `a` with the new value of `a`,
//! 4. the global topic with the full state.
//!
//! Replacing the whole state notifies every registered structural topic and
//! every key, present before or after, whose value changed, then the global
//! topic.

use std::slice;

use indexmap::IndexMap;
use parking_lot::RwLock;
use tracing::trace;

use super::{Listener, ListenerId, Store, StoreId};
use crate::config::TopicConvention;
use crate::patch::EventPayload;
use crate::path::Path;
use crate::topic::Topic;
use crate::tree::Node;

/// A store that keeps its state in memory.
pub struct MemoryStore {
    id: Option<StoreId>,
    convention: TopicConvention,
    state: RwLock<Node>,
    listeners: RwLock<IndexMap<Topic, Vec<Listener>>>,
}

impl MemoryStore {
    /// Create a store with an identity and an initial state.
    pub fn new(id: impl Into<StoreId>, initial: impl Into<Node>) -> Self {
        Self::build(Some(id.into()), initial.into())
    }

    /// Create a store without an identity.
    pub fn anonymous(initial: impl Into<Node>) -> Self {
        Self::build(None, initial.into())
    }

    fn build(id: Option<StoreId>, state: Node) -> Self {
        Self {
            id,
            convention: TopicConvention::default(),
            state: RwLock::new(state),
            listeners: RwLock::new(IndexMap::new()),
        }
    }

    /// Use a custom key-scoped topic naming convention.
    pub fn with_convention(mut self, convention: TopicConvention) -> Self {
        self.convention = convention;
        self
    }

    /// Write `value` at `path` and notify listeners.
    ///
    /// Missing intermediate mappings are created. An empty path is ignored.
    pub fn set_path(&self, path: impl Into<Path>, value: impl Into<Node>) {
        let path = path.into();
        let Some(first) = path.first() else {
            return;
        };

        let (prev, next) = {
            let mut state = self.state.write();
            let next = state.with_path_creating(&path, value.into());
            (std::mem::replace(&mut *state, next.clone()), next)
        };

        for len in 1..=path.len() {
            let prefix = path.prefix(len);
            let value = value_at(&next, &prefix);
            self.dispatch(&Topic::Path(prefix.clone()), &EventPayload::scoped(prefix, value));
        }
        self.dispatch_changed_paths(&path, &prev, &next);

        let value = value_at(&next, slice::from_ref(first));
        self.dispatch(
            &Topic::Named(self.convention.key_topic(first)),
            &EventPayload::scoped(Path::single(first.clone()), value),
        );
        self.dispatch(&Topic::Global, &EventPayload::global(next));
    }

    /// Replace the whole state and notify listeners.
    ///
    /// Structural and key-scoped topics fire only for values that changed,
    /// removed keys included, then the global topic fires.
    pub fn set_state(&self, state: impl Into<Node>) {
        let next = state.into();
        let prev = std::mem::replace(&mut *self.state.write(), next.clone());

        self.dispatch_changed_paths(&[], &prev, &next);

        let mut keys: Vec<&String> = Vec::new();
        for key in [prev.as_map(), next.as_map()].into_iter().flatten().flat_map(|map| map.keys()) {
            if !keys.contains(&key) {
                keys.push(key);
            }
        }
        for key in keys {
            let key_path = slice::from_ref(key);
            if !changed(&prev, &next, key_path) {
                continue;
            }
            self.dispatch(
                &Topic::Named(self.convention.key_topic(key)),
                &EventPayload::scoped(Path::single(key.clone()), value_at(&next, key_path)),
            );
        }
        self.dispatch(&Topic::Global, &EventPayload::global(next));
    }

    /// Number of listeners on a topic.
    pub fn listener_count(&self, topic: &Topic) -> usize {
        self.listeners.read().get(topic).map_or(0, Vec::len)
    }

    /// Number of listeners across all topics.
    pub fn total_listeners(&self) -> usize {
        self.listeners.read().values().map(Vec::len).sum()
    }

    /// Notify structural topics strictly below `written` whose value moved.
    fn dispatch_changed_paths(&self, written: &[String], prev: &Node, next: &Node) {
        let below: Vec<Path> = self
            .listeners
            .read()
            .keys()
            .filter_map(|topic| match topic {
                Topic::Path(path) if path.len() > written.len() && path.starts_with(written) => {
                    Some(path.clone())
                }
                _ => None,
            })
            .collect();

        for path in below {
            if changed(prev, next, &path) {
                let value = value_at(next, &path);
                self.dispatch(&Topic::Path(path.clone()), &EventPayload::scoped(path, value));
            }
        }
    }

    fn dispatch(&self, topic: &Topic, payload: &EventPayload) {
        // Release the lock before calling out so listeners may re-enter.
        let listeners = match self.listeners.read().get(topic) {
            Some(listeners) => listeners.clone(),
            None => return,
        };
        trace!(%topic, count = listeners.len(), "dispatching");
        for listener in &listeners {
            listener.notify(payload);
        }
    }
}

fn value_at(state: &Node, path: &[String]) -> Node {
    state.get_path(path).cloned().unwrap_or_else(Node::null)
}

fn changed(prev: &Node, next: &Node, path: &[String]) -> bool {
    match (prev.get_path(path), next.get_path(path)) {
        (Some(a), Some(b)) => !a.ptr_eq(b) && a != b,
        (None, None) => false,
        _ => true,
    }
}

impl Store for MemoryStore {
    fn identity(&self) -> Option<StoreId> {
        self.id.clone()
    }

    fn state(&self) -> Node {
        self.state.read().clone()
    }

    fn read_path(&self, path: &[String]) -> Option<Node> {
        self.state.read().get_path(path).cloned()
    }

    fn subscribe(&self, topic: &Topic, listener: Listener) {
        self.listeners
            .write()
            .entry(topic.clone())
            .or_default()
            .push(listener);
    }

    fn unsubscribe(&self, topic: &Topic, listener: ListenerId) -> bool {
        let mut listeners = self.listeners.write();
        let Some(registered) = listeners.get_mut(topic) else {
            return false;
        };
        let before = registered.len();
        registered.retain(|l| l.id() != listener);
        let removed = registered.len() != before;
        if registered.is_empty() {
            listeners.shift_remove(topic);
        }
        removed
    }
}
