//! Snapshot Building
//!
//! At mount, a binding reads the current value of every declared dependency
//! and assembles the initial mirror. The mirror's nesting follows each
//! dependency's depth, so later scoped patches find the same locations:
//!
//! ```text
//! dependencies: ["count", ["user", "name"]]
//! store:        {count: 1, user: {name: "Ann", age: 9}}
//! mirror:       {count: 1, user: {name: "Ann"}}
//! ```
//!
//! Building a snapshot only reads from the store.

use std::slice;

use crate::path::PathSpec;
use crate::store::Store;
use crate::tree::Node;

/// Build a mirror for `specs`, starting from an empty mapping.
pub fn build_snapshot(store: &dyn Store, specs: &[PathSpec]) -> Node {
    build_snapshot_into(Node::empty(), store, specs)
}

/// Build a mirror for `specs` on top of an existing one.
///
/// Specs are applied in declaration order. A wildcard shares the store's
/// current state as the new base; missing leaves read as `null`. Sequences
/// that share a prefix share the intermediate mapping.
pub fn build_snapshot_into(base: Node, store: &dyn Store, specs: &[PathSpec]) -> Node {
    specs.iter().fold(base, |mirror, spec| match spec {
        PathSpec::Wildcard => store.state(),
        PathSpec::SingleKey(key) => {
            let value = store.read_path(slice::from_ref(key)).unwrap_or_else(Node::null);
            mirror.with_key(key, value)
        }
        PathSpec::PathSequence(path) => {
            let value = store.read_path(path).unwrap_or_else(Node::null);
            mirror.with_path_creating(path, value)
        }
    })
}
