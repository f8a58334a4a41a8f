//! Dependency Paths
//!
//! A component declares the parts of a store it cares about as a list of
//! [`Dependency`] values. Declarations come in several shapes:
//!
//! - a bare key: `"count"`
//! - a key sequence: `["user", "name"]`
//! - an opaque [`PathHandle`] built by navigating from the root
//! - the wildcard token: `"*"` or `["*"]`
//!
//! The normalizer resolves each declaration once, at mount, into a
//! [`PathSpec`]. Nothing downstream inspects the raw declaration again.
//!
//! # Permissive Inputs
//!
//! An empty key sequence is not an error. It is skipped with a debug log
//! and produces no mirror entry and no subscription.

mod normalize;
mod sequence;

pub use normalize::{normalize, normalize_all, Dependency, PathSpec};
pub use sequence::{Path, PathHandle};
