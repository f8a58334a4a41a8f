//! Merge policies.

use crate::error::PatchError;
use crate::path::PathSpec;
use crate::store::StoreId;
use crate::tree::Node;

use super::payload::{EventPayload, GlobalEvent, ScopedEvent};

/// Replace the whole mirror with a notified state, or `{}` if absent.
pub fn replace_all(state: Option<&Node>) -> Node {
    state.cloned().unwrap_or_else(Node::empty)
}

/// Set one top-level key, leaving every other key's identity intact.
pub fn merge_key(mirror: &Node, key: &str, value: Node) -> Node {
    mirror.with_key(key, value)
}

/// Set a nested value along a path the snapshot already built.
pub fn merge_nested(mirror: &Node, path: &[String], value: Node) -> Result<Node, PatchError> {
    mirror.with_path(path, value)
}

/// Compute the next mirror for a payload delivered to a subscription
/// made for `spec`.
///
/// Returns `Ok(None)` when the payload does not apply to this subscription.
pub fn apply_patch(
    spec: &PathSpec,
    mirror: &Node,
    payload: &EventPayload,
) -> Result<Option<Node>, PatchError> {
    match (spec, payload) {
        (PathSpec::Wildcard, EventPayload::Global(GlobalEvent { state })) => {
            Ok(Some(replace_all(state.as_ref())))
        }
        (PathSpec::Wildcard, EventPayload::Scoped(_)) => Ok(None),
        (_, EventPayload::Global(_)) => Ok(None),
        (_, EventPayload::Scoped(ScopedEvent { path, value })) => match path.as_slice() {
            [] => Ok(None),
            [key] => Ok(Some(merge_key(mirror, key, value.clone()))),
            keys => merge_nested(mirror, keys, value.clone()).map(Some),
        },
    }
}

/// Like [`apply_patch`], but for a mirror namespaced by store identity.
///
/// Only the `store` namespace is patched; other namespaces keep their
/// identity.
pub fn apply_namespaced(
    store: &StoreId,
    spec: &PathSpec,
    mirror: &Node,
    payload: &EventPayload,
) -> Result<Option<Node>, PatchError> {
    let empty = Node::empty();
    let namespace = mirror.get(store.as_str()).unwrap_or(&empty);
    let next = apply_patch(spec, namespace, payload)?;
    Ok(next.map(|next| mirror.with_key(store.as_str(), next)))
}
