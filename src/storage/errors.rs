//! Storage-level errors.
//!
//! Most of these report a write-batch precondition that did not hold at
//! commit time. The layer knows nothing about runtimes or applications; the
//! registry maps each variant onto its own error kinds.

use std::fmt;

/// Errors raised by a [`StorageProvider`](super::StorageProvider).
#[derive(Debug)]
pub enum StorageError {
    /// A record required by a write batch is absent.
    ResourceNotFound {
        tenant_id: String,
        resource_type: String,
        id: String,
    },

    /// Another record of the same type already holds the attribute value.
    DuplicateAttribute {
        tenant_id: String,
        resource_type: String,
        attribute: String,
        value: String,
    },

    /// A record no longer has the version the batch was built against.
    ConcurrentModification {
        tenant_id: String,
        resource_type: String,
        id: String,
        expected_version: Option<String>,
        actual_version: Option<String>,
    },

    /// A stored document could not be encoded or decoded.
    Codec(serde_json::Error),
}

fn version_or_absent(version: &Option<String>) -> &str {
    version.as_deref().unwrap_or("<absent>")
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::ResourceNotFound {
                tenant_id,
                resource_type,
                id,
            } => write!(f, "no {} '{}' in tenant {}", resource_type, id, tenant_id),
            StorageError::DuplicateAttribute {
                tenant_id,
                resource_type,
                attribute,
                value,
            } => write!(
                f,
                "{} with {} '{}' already stored in tenant {}",
                resource_type, attribute, value, tenant_id
            ),
            StorageError::ConcurrentModification {
                tenant_id,
                resource_type,
                id,
                expected_version,
                actual_version,
            } => write!(
                f,
                "{} '{}' in tenant {} changed: expected version {}, found {}",
                resource_type,
                id,
                tenant_id,
                version_or_absent(expected_version),
                version_or_absent(actual_version)
            ),
            StorageError::Codec(err) => write!(f, "stored document codec failure: {}", err),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl StorageError {
    pub fn resource_not_found(
        tenant_id: impl Into<String>,
        resource_type: impl Into<String>,
        id: impl Into<String>,
    ) -> Self {
        Self::ResourceNotFound {
            tenant_id: tenant_id.into(),
            resource_type: resource_type.into(),
            id: id.into(),
        }
    }

    pub fn duplicate_attribute(
        tenant_id: impl Into<String>,
        resource_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self::DuplicateAttribute {
            tenant_id: tenant_id.into(),
            resource_type: resource_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// A version precondition failed. `None` means the record was absent
    /// (expected) or has since been deleted (actual).
    pub fn version_mismatch(
        tenant_id: impl Into<String>,
        resource_type: impl Into<String>,
        id: impl Into<String>,
        expected_version: Option<String>,
        actual_version: Option<String>,
    ) -> Self {
        Self::ConcurrentModification {
            tenant_id: tenant_id.into(),
            resource_type: resource_type.into(),
            id: id.into(),
            expected_version,
            actual_version,
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Codec(err)
    }
}
