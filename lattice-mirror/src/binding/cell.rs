//! Shared mirror state.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, RwLock};
use tracing::{trace, warn};

use crate::error::PatchError;
use crate::tree::Node;

/// Callback invoked with the next mirror after each applied patch.
pub type Observer = Arc<dyn Fn(&Node) + Send + Sync>;

/// The mirror a binding owns, shared with the listeners it attached.
pub(crate) struct MirrorCell {
    state: Mutex<Node>,
    version: AtomicU64,
    observers: RwLock<Vec<Observer>>,
}

impl MirrorCell {
    pub(crate) fn new(initial: Node) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(initial),
            version: AtomicU64::new(0),
            observers: RwLock::new(Vec::new()),
        })
    }

    pub(crate) fn get(&self) -> Node {
        self.state.lock().clone()
    }

    pub(crate) fn version(&self) -> u64 {
        self.version.load(Ordering::SeqCst)
    }

    pub(crate) fn observe(&self, observer: Observer) {
        self.observers.write().push(observer);
    }

    /// Replace the mirror with `patch(previous)`.
    ///
    /// The patch always sees the latest committed mirror. Observers run after
    /// the lock is released. Returns whether the mirror changed.
    pub(crate) fn update<F>(&self, patch: F) -> bool
    where
        F: FnOnce(&Node) -> Result<Option<Node>, PatchError>,
    {
        let next = {
            let mut state = self.state.lock();
            match patch(&*state) {
                Ok(Some(next)) => {
                    *state = next.clone();
                    next
                }
                Ok(None) => {
                    trace!("payload does not apply to this subscription");
                    return false;
                }
                Err(err) => {
                    warn!(%err, "dropping patch outside tracked structure");
                    return false;
                }
            }
        };

        let version = self.version.fetch_add(1, Ordering::SeqCst) + 1;
        trace!(version, "mirror patched");

        let observers = self.observers.read().clone();
        for observer in &observers {
            observer(&next);
        }
        true
    }
}
