//! Notification payloads.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

use crate::path::Path;
use crate::tree::Node;

/// A change notification produced by a store.
///
/// On the wire a payload is either `{"state": ...}` or
/// `{"path": [...], "value": ...}`. Any object with a `path` is scoped and
/// must carry a `value`; anything else is global. Unknown fields are ignored.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum EventPayload {
    /// A change at a specific path.
    Scoped(ScopedEvent),
    /// A full-state notification.
    Global(GlobalEvent),
}

/// Body of a scoped notification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScopedEvent {
    /// Location of the change.
    pub path: Path,
    /// New value at `path`.
    pub value: Node,
}

/// Body of a global notification.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct GlobalEvent {
    /// The store's full state, if provided.
    #[serde(default)]
    pub state: Option<Node>,
}

#[derive(Deserialize)]
struct RawPayload {
    #[serde(default)]
    path: Option<Path>,
    #[serde(default, deserialize_with = "present")]
    value: Option<Node>,
    #[serde(default)]
    state: Option<Node>,
}

// Keeps an explicit `null` value distinct from a missing one.
fn present<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<Node>, D::Error> {
    Node::deserialize(deserializer).map(Some)
}

impl<'de> Deserialize<'de> for EventPayload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawPayload::deserialize(deserializer)?;
        match (raw.path, raw.value) {
            (Some(path), Some(value)) => Ok(EventPayload::Scoped(ScopedEvent { path, value })),
            (Some(path), None) => Err(D::Error::custom(format!(
                "scoped payload at `{path}` has no value"
            ))),
            (None, _) => Ok(EventPayload::Global(GlobalEvent { state: raw.state })),
        }
    }
}

impl EventPayload {
    /// A global notification carrying the full state.
    pub fn global(state: Node) -> Self {
        EventPayload::Global(GlobalEvent { state: Some(state) })
    }

    /// A global notification without a state.
    pub fn global_empty() -> Self {
        EventPayload::Global(GlobalEvent::default())
    }

    /// A scoped notification.
    pub fn scoped(path: impl Into<Path>, value: impl Into<Node>) -> Self {
        EventPayload::Scoped(ScopedEvent {
            path: path.into(),
            value: value.into(),
        })
    }

    /// The path of a scoped notification.
    pub fn path(&self) -> Option<&Path> {
        match self {
            EventPayload::Scoped(event) => Some(&event.path),
            EventPayload::Global(_) => None,
        }
    }
}
