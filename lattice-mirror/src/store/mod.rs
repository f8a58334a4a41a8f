//! Store Interface
//!
//! The engine observes an externally owned, path-addressable store through
//! the [`Store`] trait. It only ever reads and subscribes; it never writes.
//!
//! # Contract
//!
//! - [`Store::identity`] returns a stable identity, if the handle has one.
//! - [`Store::read_path`] reads synchronously at any depth.
//! - [`Store::subscribe`] / [`Store::unsubscribe`] manage listeners per
//!   [`Topic`]. A listener is removed by the [`ListenerId`] it was registered
//!   with, so two listeners that merely look alike are never confused.
//! - Global topics deliver `{state}` payloads; named and path topics deliver
//!   `{path, value}` payloads.
//! - A store must not hold its own locks while invoking listeners.
//!
//! Stores are looked up by identity through an injected [`StoreDirectory`].
//! [`StoreRegistry`] is the in-process implementation; [`MemoryStore`] is a
//! complete reference store.

mod memory;
mod registry;

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::patch::EventPayload;
use crate::topic::Topic;
use crate::tree::Node;

pub use memory::MemoryStore;
pub use registry::StoreRegistry;

/// Stable identity of a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoreId(String);

impl StoreId {
    /// Borrow the identity as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for StoreId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for StoreId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for StoreId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Unique identifier for a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Generate a new unique listener ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for ListenerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Callback invoked with each notification.
pub type Callback = Arc<dyn Fn(&EventPayload) + Send + Sync>;

/// A notification callback paired with the identity it was registered under.
#[derive(Clone)]
pub struct Listener {
    id: ListenerId,
    callback: Callback,
}

impl Listener {
    /// Wrap a callback under a fresh listener ID.
    pub fn new<F>(callback: F) -> Self
    where
        F: Fn(&EventPayload) + Send + Sync + 'static,
    {
        Self {
            id: ListenerId::new(),
            callback: Arc::new(callback),
        }
    }

    /// The listener's ID.
    pub fn id(&self) -> ListenerId {
        self.id
    }

    /// Deliver a notification.
    pub fn notify(&self, payload: &EventPayload) {
        (self.callback)(payload);
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("id", &self.id).finish()
    }
}

/// A path-addressable reactive store.
pub trait Store: Send + Sync {
    /// The store's identity, if derivable.
    fn identity(&self) -> Option<StoreId>;

    /// The full current state.
    fn state(&self) -> Node;

    /// Read the value at `path`.
    fn read_path(&self, path: &[String]) -> Option<Node> {
        self.state().get_path(path).cloned()
    }

    /// Register a listener on a topic.
    fn subscribe(&self, topic: &Topic, listener: Listener);

    /// Remove a listener. Returns `false` if it was not registered.
    fn unsubscribe(&self, topic: &Topic, listener: ListenerId) -> bool;
}

/// Looks stores up by identity.
pub trait StoreDirectory: Send + Sync {
    /// Find the store registered under `id`.
    fn resolve(&self, id: &StoreId) -> Option<Arc<dyn Store>>;
}
