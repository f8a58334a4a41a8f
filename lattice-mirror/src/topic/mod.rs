//! Topic Resolution
//!
//! Maps a normalized dependency to the notification topic a store expects:
//!
//! | Spec                | Topic                                   |
//! |---------------------|-----------------------------------------|
//! | `Wildcard`          | `Topic::Global`, the "any change" topic |
//! | `SingleKey(k)`      | `Topic::Named`, e.g. `on_k_update`      |
//! | `PathSequence(p)`   | `Topic::Path(p)`, subscribed structurally |
//!
//! Resolution is a pure function of the spec and the naming convention.

use std::fmt;

use crate::config::TopicConvention;
use crate::path::{Path, PathSpec};

/// A notification topic on a store.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Topic {
    /// Fires on every change with the full state.
    Global,
    /// A key-scoped topic name.
    Named(String),
    /// A structural topic for a key sequence.
    Path(Path),
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Topic::Global => f.write_str("<global>"),
            Topic::Named(name) => f.write_str(name),
            Topic::Path(path) => write!(f, "[{path}]"),
        }
    }
}

/// Resolve the topic for a normalized dependency.
pub fn resolve_topic(spec: &PathSpec, convention: &TopicConvention) -> Topic {
    match spec {
        PathSpec::Wildcard => Topic::Global,
        PathSpec::SingleKey(key) => Topic::Named(convention.key_topic(key)),
        PathSpec::PathSequence(path) => Topic::Path(path.clone()),
    }
}
