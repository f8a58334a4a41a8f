//! Lattice Mirror
//!
//! This crate connects the Lattice UI layer to externally owned,
//! path-addressable reactive stores. A component declares a few paths it
//! depends on and receives a locally held mirror of just those paths, kept
//! current by the store's change notifications.
//!
//! It implements:
//!
//! - Normalization of heterogeneous dependency declarations
//! - Initial snapshots shaped like the declared paths
//! - Topic resolution and symmetric, exactly-once subscription teardown
//! - Copy-on-write patch merging that preserves sibling identity
//! - Aggregation of several stores into one namespaced mirror
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `tree`: persistent state tree shared by stores and mirrors
//! - `path`: dependency declarations and their normalized form
//! - `topic`: mapping from dependencies to notification topics
//! - `store`: the store interface, a store directory and an in-memory store
//! - `snapshot`: initial mirror construction
//! - `subscription`: per-binding listener registry
//! - `patch`: notification payloads and merge policies
//! - `binding`: single-store bindings
//! - `aggregate`: multi-store bindings
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use lattice_mirror::{Binding, MemoryStore, MirrorConfig, Node, StoreRegistry};
//!
//! let store = Arc::new(MemoryStore::new("app", serde_json::json!({
//!     "count": 1,
//!     "user": {"name": "Ann", "age": 9}
//! })));
//! let registry = StoreRegistry::new();
//! registry.register(store.clone())?;
//!
//! let binding = Binding::mount(
//!     "app",
//!     &["count".into(), vec!["user", "name"].into()],
//!     &registry,
//!     &MirrorConfig::default(),
//! )?;
//! // {count: 1, user: {name: "Ann"}}
//!
//! store.set_path(vec!["user", "name"], Node::from_json("Bea"));
//! // {count: 1, user: {name: "Bea"}}
//! ```

pub mod aggregate;
pub mod binding;
pub mod config;
pub mod error;
pub mod patch;
pub mod path;
pub mod snapshot;
pub mod store;
pub mod subscription;
pub mod topic;
pub mod tree;

pub use aggregate::{GroupDefinition, MultiBinding, StoreGroup};
pub use binding::{Binding, StoreDescriptor};
pub use config::{MirrorConfig, TopicConvention};
pub use error::{BindError, PatchError, Result};
pub use patch::EventPayload;
pub use path::{Dependency, Path, PathHandle, PathSpec};
pub use store::{MemoryStore, Store, StoreDirectory, StoreId, StoreRegistry};
pub use topic::Topic;
pub use tree::Node;
