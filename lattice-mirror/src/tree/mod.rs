//! State Trees
//!
//! Both the store's state and a binding's mirror are represented as a
//! persistent tree of [`Node`]s. Branches are reference-counted ordered maps;
//! leaves are reference-counted JSON values.
//!
//! # Structural Identity
//!
//! Every write produces a new tree that shares all untouched subtrees with
//! the previous one. Only the nodes on the written path are re-allocated, so
//! a consumer can compare two versions with [`Node::ptr_eq`] and skip any
//! subtree whose identity did not change.
//!
//! ```text
//!   before            write user.name = "Bea"        after
//!   root ─┬ count      ───────────────────────▶      root' ─┬ count      (shared)
//!         └ user ─ name                                      └ user' ─ name'
//! ```
//!
//! # Writes
//!
//! - [`Node::with_key`] copies exactly one level.
//! - [`Node::with_path`] requires every intermediate segment to exist already
//!   and fails otherwise. Mirrors use it so a patch can only land where the
//!   snapshot prepared structure.
//! - [`Node::with_path_creating`] creates missing intermediate mappings. The
//!   snapshot builder and stores use it.
//!
//! Arrays are leaves. Path segments only address object keys.

mod node;

pub use node::{Node, NodeMap};
