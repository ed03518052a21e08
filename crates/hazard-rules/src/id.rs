//! Namespaced rule identifiers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Namespaced identifier such as `hazardous:solar_burn`.
///
/// Used for hazard types, sources and effects, and for the world-side names
/// rules refer to (levels, biomes, entity kinds, voxel kinds and tags).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleId(String);

impl RuleId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Namespace part, empty when the id carries none
    pub fn namespace(&self) -> &str {
        self.0.split_once(':').map(|(ns, _)| ns).unwrap_or("")
    }

    /// Path part after the namespace separator
    pub fn path(&self) -> &str {
        self.0.split_once(':').map(|(_, path)| path).unwrap_or(&self.0)
    }
}

impl fmt::Display for RuleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RuleId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for RuleId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for RuleId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
