//! Dependency normalization.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::sequence::{Path, PathHandle};
use crate::config::MirrorConfig;

/// A dependency as declared by a component.
///
/// On the wire a declaration is a string, an array of strings, or a
/// `{"$path": [...]}` handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    /// A bare top-level key (or the wildcard token).
    Key(String),
    /// An ordered key sequence.
    Sequence(Vec<String>),
    /// An opaque path handle.
    Handle(PathHandle),
}

impl From<&str> for Dependency {
    fn from(key: &str) -> Self {
        Dependency::Key(key.to_string())
    }
}

impl From<String> for Dependency {
    fn from(key: String) -> Self {
        Dependency::Key(key)
    }
}

impl<S: Into<String>> From<Vec<S>> for Dependency {
    fn from(keys: Vec<S>) -> Self {
        Dependency::Sequence(keys.into_iter().map(Into::into).collect())
    }
}

impl From<PathHandle> for Dependency {
    fn from(handle: PathHandle) -> Self {
        Dependency::Handle(handle)
    }
}

/// A normalized dependency.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSpec {
    /// The whole state tree.
    Wildcard,
    /// One top-level key.
    SingleKey(String),
    /// A key sequence of length one or more.
    PathSequence(Path),
}

impl PathSpec {
    /// Check if this spec covers the whole tree.
    pub fn is_wildcard(&self) -> bool {
        matches!(self, PathSpec::Wildcard)
    }

    /// Number of keys addressed (0 for the wildcard).
    pub fn depth(&self) -> usize {
        match self {
            PathSpec::Wildcard => 0,
            PathSpec::SingleKey(_) => 1,
            PathSpec::PathSequence(path) => path.len(),
        }
    }
}

/// The wildcard prints as `<wildcard>` whatever token the config uses.
impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSpec::Wildcard => f.write_str("<wildcard>"),
            PathSpec::SingleKey(key) => f.write_str(key),
            PathSpec::PathSequence(path) => write!(f, "[{path}]"),
        }
    }
}

/// Normalize one declaration.
///
/// Returns `None` for an empty key sequence.
pub fn normalize(dependency: &Dependency, config: &MirrorConfig) -> Option<PathSpec> {
    match dependency {
        Dependency::Key(key) if config.is_wildcard(key) => Some(PathSpec::Wildcard),
        Dependency::Key(key) => Some(PathSpec::SingleKey(key.clone())),
        Dependency::Sequence(keys) => classify_sequence(keys, config),
        Dependency::Handle(handle) => classify_sequence(handle.path(), config),
    }
}

fn classify_sequence(keys: &[String], config: &MirrorConfig) -> Option<PathSpec> {
    match keys {
        [] => None,
        [only] if config.is_wildcard(only) => Some(PathSpec::Wildcard),
        keys => Some(PathSpec::PathSequence(Path::from(keys))),
    }
}

/// Normalize a dependency list, preserving declaration order and skipping
/// empty sequences.
pub fn normalize_all(dependencies: &[Dependency], config: &MirrorConfig) -> Vec<PathSpec> {
    dependencies
        .iter()
        .filter_map(|dependency| {
            let spec = normalize(dependency, config);
            if spec.is_none() {
                debug!(?dependency, "skipping empty dependency path");
            }
            spec
        })
        .collect()
}
