//! Persistent tree nodes.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::PatchError;
use crate::path::Path;

/// Ordered map of child nodes.
pub type NodeMap = IndexMap<String, Node>;

/// A node in a persistent state tree.
///
/// Cloning a node is cheap: it only bumps a reference count.
#[derive(Clone, Serialize, Deserialize)]
#[serde(from = "Value", into = "Value")]
pub enum Node {
    /// A terminal JSON value (never an object when built through `From<Value>`).
    Leaf(Arc<Value>),
    /// A mapping from key to child node.
    Map(Arc<NodeMap>),
}

impl Node {
    /// An empty mapping.
    pub fn empty() -> Self {
        Node::Map(Arc::new(NodeMap::new()))
    }

    /// A `null` leaf.
    pub fn null() -> Self {
        Node::Leaf(Arc::new(Value::Null))
    }

    /// Build a node from anything convertible to JSON.
    ///
    /// Objects become mappings, recursively.
    pub fn from_json(value: impl Into<Value>) -> Self {
        Node::from(value.into())
    }

    /// Convert back to a JSON value (deep copy).
    pub fn to_json(&self) -> Value {
        match self {
            Node::Leaf(value) => Value::clone(value),
            Node::Map(map) => Value::Object(
                map.iter()
                    .map(|(key, child)| (key.clone(), child.to_json()))
                    .collect(),
            ),
        }
    }

    /// Check if this node is a mapping.
    pub fn is_map(&self) -> bool {
        matches!(self, Node::Map(_))
    }

    /// Borrow the child mapping, if this node is one.
    pub fn as_map(&self) -> Option<&NodeMap> {
        match self {
            Node::Map(map) => Some(map),
            Node::Leaf(_) => None,
        }
    }

    /// Borrow the leaf value, if this node is one.
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Node::Leaf(value) => Some(value),
            Node::Map(_) => None,
        }
    }

    /// Number of children (0 for leaves).
    pub fn len(&self) -> usize {
        self.as_map().map_or(0, NodeMap::len)
    }

    /// Check if this node has no children.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Look up a direct child.
    pub fn get(&self, key: &str) -> Option<&Node> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Look up a descendant. An empty path returns `self`.
    pub fn get_path(&self, path: &[String]) -> Option<&Node> {
        path.iter().try_fold(self, |node, key| node.get(key))
    }

    /// Check whether two nodes are the same allocation.
    ///
    /// This is the identity the rendering layer uses for change detection.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        match (self, other) {
            (Node::Leaf(a), Node::Leaf(b)) => Arc::ptr_eq(a, b),
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// Return a copy of this mapping with `key` set to `value`.
    ///
    /// Exactly one level is copied; sibling children keep their identity.
    /// A leaf is treated as an empty mapping.
    pub fn with_key(&self, key: &str, value: Node) -> Node {
        let mut map = match self {
            Node::Map(map) => NodeMap::clone(map),
            Node::Leaf(_) => NodeMap::new(),
        };
        map.insert(key.to_string(), value);
        Node::Map(Arc::new(map))
    }

    /// Return a copy of this tree with `value` at `path`.
    ///
    /// Every intermediate segment must already exist as a mapping. Nodes on
    /// the walked path get a fresh identity; everything else is shared.
    pub fn with_path(&self, path: &[String], value: Node) -> Result<Node, PatchError> {
        if path.is_empty() {
            return Err(PatchError::EmptyPath);
        }
        set_in(self, path, 0, value).map_err(|depth| PatchError::UntrackedPath {
            path: Path::from(path.to_vec()),
            depth,
        })
    }

    /// Like [`Node::with_path`], but creates (or replaces non-mapping)
    /// intermediate segments with empty mappings. An empty path replaces
    /// the whole tree.
    pub fn with_path_creating(&self, path: &[String], value: Node) -> Node {
        match path {
            [] => value,
            [key] => self.with_key(key, value),
            [key, rest @ ..] => {
                let child = self
                    .get(key)
                    .filter(|child| child.is_map())
                    .cloned()
                    .unwrap_or_else(Node::empty);
                self.with_key(key, child.with_path_creating(rest, value))
            }
        }
    }
}

fn set_in(node: &Node, path: &[String], depth: usize, value: Node) -> Result<Node, usize> {
    let key = &path[depth];
    if depth + 1 == path.len() {
        return Ok(node.with_key(key, value));
    }

    let child = node
        .get(key)
        .filter(|child| child.is_map())
        .ok_or(depth)?;
    let next = set_in(child, path, depth + 1, value)?;
    Ok(node.with_key(key, next))
}

impl Default for Node {
    fn default() -> Self {
        Node::empty()
    }
}

impl From<Value> for Node {
    fn from(value: Value) -> Self {
        match value {
            Value::Object(object) => Node::Map(Arc::new(
                object
                    .into_iter()
                    .map(|(key, child)| (key, Node::from(child)))
                    .collect(),
            )),
            other => Node::Leaf(Arc::new(other)),
        }
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        node.to_json()
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Node::Leaf(a), Node::Leaf(b)) => Arc::ptr_eq(a, b) || a == b,
            (Node::Map(a), Node::Map(b)) => Arc::ptr_eq(a, b) || a == b,
            _ => false,
        }
    }
}

impl PartialEq<Value> for Node {
    fn eq(&self, other: &Value) -> bool {
        self.to_json() == *other
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Node::Leaf(value) => write!(f, "{value}"),
            Node::Map(map) => f.debug_map().entries(map.iter()).finish(),
        }
    }
}
