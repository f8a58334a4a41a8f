//! Key sequences and path handles.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// An ordered sequence of keys into a state tree.
///
/// Most declared paths are shallow, so the keys are stored inline up to
/// depth four.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Path(SmallVec<[String; 4]>);

impl Path {
    /// A path with a single key.
    pub fn single(key: impl Into<String>) -> Self {
        let mut keys = SmallVec::new();
        keys.push(key.into());
        Self(keys)
    }

    /// Append a key.
    pub fn push(&mut self, key: impl Into<String>) {
        self.0.push(key.into());
    }

    /// The first `len` keys of this path.
    pub fn prefix(&self, len: usize) -> Path {
        Self(self.0.iter().take(len).cloned().collect())
    }

    /// Borrow the keys.
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl Deref for Path {
    type Target = [String];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S: Into<String>> From<Vec<S>> for Path {
    fn from(keys: Vec<S>) -> Self {
        keys.into_iter().collect()
    }
}

impl From<&[String]> for Path {
    fn from(keys: &[String]) -> Self {
        Self(keys.iter().cloned().collect())
    }
}

impl From<Path> for Vec<String> {
    fn from(path: Path) -> Self {
        path.0.into_vec()
    }
}

impl<S: Into<String>> FromIterator<S> for Path {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            f.write_str(key)?;
        }
        Ok(())
    }
}

/// An opaque handle to a location in a state tree.
///
/// Handles are built by navigating from the root and only expose their
/// underlying key sequence through [`PathHandle::path`]. On the wire they
/// are written as `{"$path": [...]}`.
///
/// ```rust,ignore
/// let name = PathHandle::root().child("user").child("name");
/// assert_eq!(name.path().to_string(), "user.name");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PathHandle {
    #[serde(rename = "$path")]
    path: Path,
}

impl PathHandle {
    /// The handle for the root of the tree (an empty path).
    pub fn root() -> Self {
        Self::default()
    }

    /// The handle for a child of this location.
    pub fn child(&self, key: impl Into<String>) -> Self {
        let mut path = self.path.clone();
        path.push(key);
        Self { path }
    }

    /// The underlying key sequence.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the handle, returning its key sequence.
    pub fn into_path(self) -> Path {
        self.path
    }
}

impl From<Path> for PathHandle {
    fn from(path: Path) -> Self {
        Self { path }
    }
}
