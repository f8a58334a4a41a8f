//! Engine Configuration
//!
//! The configuration controls the two naming conventions the engine shares
//! with a store: the wildcard token used in dependency declarations, and the
//! rule that derives a key-scoped topic name from a top-level key.
//!
//! Configurations are plain serde types and can be loaded from JSON. Every
//! field is optional; missing fields take their defaults.
//!
//! ```rust,ignore
//! let config = MirrorConfig::from_json(r#"{"topics": {"prefix": "changed:"}}"#)?;
//! assert_eq!(config.topics.key_topic("count"), "changed:count_update");
//! ```

use serde::{Deserialize, Serialize};

/// Default wildcard token.
pub const DEFAULT_WILDCARD: &str = "*";

/// Naming convention for key-scoped topics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TopicConvention {
    /// Text placed before the key.
    pub prefix: String,
    /// Text placed after the key.
    pub suffix: String,
}

impl TopicConvention {
    /// Derive the scoped topic name for a top-level key.
    pub fn key_topic(&self, key: &str) -> String {
        let mut name = String::with_capacity(self.prefix.len() + key.len() + self.suffix.len());
        name.push_str(&self.prefix);
        name.push_str(key);
        name.push_str(&self.suffix);
        name
    }
}

impl Default for TopicConvention {
    fn default() -> Self {
        Self {
            prefix: "on_".to_string(),
            suffix: "_update".to_string(),
        }
    }
}

/// Configuration shared by normalization, topic resolution and the
/// reference store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MirrorConfig {
    /// Token that stands for "the whole state tree".
    pub wildcard: String,
    /// Key-scoped topic naming.
    pub topics: TopicConvention,
}

impl MirrorConfig {
    /// Parse a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Check whether a declaration segment is the wildcard token.
    pub fn is_wildcard(&self, key: &str) -> bool {
        key == self.wildcard
    }
}

impl Default for MirrorConfig {
    fn default() -> Self {
        Self {
            wildcard: DEFAULT_WILDCARD.to_string(),
            topics: TopicConvention::default(),
        }
    }
}
