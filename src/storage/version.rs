//! Content versions for optimistic concurrency control.
//!
//! A version is derived deterministically from the stored JSON content using
//! SHA-256, so any backend can compute it without keeping a separate counter.
//! Write batches carry the version observed at read time; the commit fails
//! with a concurrent modification error if the stored content has changed.
//!
//! ```rust
//! use runtime_registry::storage::ContentVersion;
//! use serde_json::json;
//!
//! let v1 = ContentVersion::from_value(&json!({"id": "1", "name": "r1"}));
//! let v2 = ContentVersion::from_value(&json!({"name": "r1", "id": "1"}));
//! assert_eq!(v1, v2);
//! ```

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Opaque version identifier of a stored record.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentVersion {
    opaque: String,
}

impl ContentVersion {
    /// Create a version from raw content bytes.
    pub fn from_content(content: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(content);
        let hash = hasher.finalize();
        // First 12 bytes keep versions short while collisions stay negligible
        Self {
            opaque: BASE64.encode(&hash[..12]),
        }
    }

    /// Create a version from a JSON document.
    ///
    /// Object keys are serialized in sorted order, so two documents with the
    /// same content always produce the same version.
    pub fn from_value(value: &Value) -> Self {
        Self::from_content(value.to_string().as_bytes())
    }

    /// Get the opaque version string.
    pub fn as_str(&self) -> &str {
        &self.opaque
    }
}

impl fmt::Display for ContentVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.opaque)
    }
}
