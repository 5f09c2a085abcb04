use serde::{Deserialize, Serialize};
use std::fmt;

/// Cheap identity digest of a chart unit
///
/// Derived from file names, sizes and modification times only, never from
/// file contents. Two fingerprints are compared for equality and nothing
/// else.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Wrap an already computed digest
    pub fn new(digest: impl Into<String>) -> Self {
        Self(digest.into())
    }

    /// The digest as stored in the catalog
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Fingerprint {
    fn from(digest: String) -> Self {
        Self(digest)
    }
}
