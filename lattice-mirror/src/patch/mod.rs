//! Patch Application
//!
//! Every store notification carries an [`EventPayload`]. The applier turns
//! `(previous mirror, payload)` into the next mirror, choosing a merge policy
//! by the shape of the event:
//!
//! - `{state}` replaces the whole mirror (an absent state becomes `{}`).
//! - `{path: [k], value}` sets one top-level key, copying one level.
//! - `{path: [a, .., z], value}` walks the tracked structure, sets the leaf,
//!   and re-allocates only the nodes on the walked path.
//!
//! All merges are pure. Back-to-back notifications are applied to whatever
//! the previous merge returned, never to a stale external snapshot.
//!
//! # Shape Mismatches
//!
//! A wildcard subscription ignores scoped payloads and a scoped subscription
//! ignores global payloads. Both are reported as "no change" rather than an
//! error. An event path that leaves the structure built at snapshot time is a
//! caller precondition violation and returns [`PatchError::UntrackedPath`].
//!
//! [`PatchError::UntrackedPath`]: crate::error::PatchError::UntrackedPath

mod apply;
mod payload;

pub use apply::{apply_namespaced, apply_patch, merge_key, merge_nested, replace_all};
pub use payload::{EventPayload, GlobalEvent, ScopedEvent};
