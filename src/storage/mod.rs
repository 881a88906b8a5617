//! Storage abstraction layer for registry records.
//!
//! This module separates persistence from registry semantics. The
//! [`StorageProvider`] trait defines protocol-agnostic operations on JSON
//! documents organized as `tenant_id` → `resource_type` → `resource_id`.
//!
//! # Architecture
//!
//! The storage layer is responsible for:
//! - Pure PUT/GET/DELETE operations on JSON data
//! - Tenant isolation through the hierarchical key
//! - Ordered listing and attribute lookups
//! - Atomic [`WriteBatch`] commits with preconditions
//!
//! The storage layer is NOT responsible for:
//! - Label validation or label definitions
//! - ID generation and timestamps
//! - Mapping failures to registry error kinds
//!
//! # Write batches
//!
//! Every registry mutation is expressed as one batch scoped to a single
//! tenant. A batch lists preconditions (a record exists, a record still has
//! the version that was read, an attribute value is unique) followed by the
//! writes to apply. Implementations must check all preconditions and apply
//! all writes as one atomic step, so a uniqueness check can never race with a
//! concurrent insert.
//!
//! ```rust
//! use runtime_registry::storage::{InMemoryStorage, StorageKey, StorageProvider, WriteBatch};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let batch = WriteBatch::new("tenant1")
//!     .require_unique("Runtime", "name", "r1", None)
//!     .put("Runtime", "123", json!({"id": "123", "name": "r1"}));
//! storage.commit(batch).await?;
//!
//! let stored = storage.get(StorageKey::new("tenant1", "Runtime", "123")).await?;
//! assert!(stored.is_some());
//! # Ok(())
//! # }
//! ```

pub mod errors;
pub mod in_memory;
pub mod version;


pub use errors::StorageError;
pub use in_memory::{InMemoryStorage, InMemoryStorageStats};
pub use version::ContentVersion;

use serde_json::Value;
use std::fmt;
use std::future::Future;

/// A hierarchical key for identifying records in storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StorageKey {
    tenant_id: String,
    resource_type: String,
    resource_id: String,
}

impl StorageKey {
    /// Create a new storage key.
    pub fn new(
        tenant_id: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }

    /// Get the tenant ID.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Get the resource type.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }

    /// Get the resource ID.
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }

    /// Create a prefix key for listing records of a type within a tenant.
    pub fn prefix(tenant_id: impl Into<String>, resource_type: impl Into<String>) -> StoragePrefix {
        StoragePrefix {
            tenant_id: tenant_id.into(),
            resource_type: resource_type.into(),
        }
    }
}

impl fmt::Display for StorageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}",
            self.tenant_id, self.resource_type, self.resource_id
        )
    }
}

/// A prefix for querying records by tenant and type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoragePrefix {
    tenant_id: String,
    resource_type: String,
}

impl StoragePrefix {
    /// Get the tenant ID.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Get the resource type.
    pub fn resource_type(&self) -> &str {
        &self.resource_type
    }
}

impl fmt::Display for StoragePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.tenant_id, self.resource_type)
    }
}

/// A condition that must hold when a [`WriteBatch`] is committed.
#[derive(Debug, Clone, PartialEq)]
pub enum Precondition {
    /// The record must exist.
    Exists { resource_type: String, id: String },
    /// The record must still have the given version; `None` means it must be absent.
    Version {
        resource_type: String,
        id: String,
        expected: Option<ContentVersion>,
    },
    /// No record of the type other than `exclude_id` may hold `value` at `attribute`.
    Unique {
        resource_type: String,
        attribute: String,
        value: String,
        exclude_id: Option<String>,
    },
}

/// A write applied by a [`WriteBatch`].
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOperation {
    /// Store a document, replacing any previous one.
    Put {
        resource_type: String,
        id: String,
        data: Value,
    },
    /// Remove a document if present.
    Delete { resource_type: String, id: String },
    /// Remove every document of the type whose `attribute` equals `value`.
    DeleteMatching {
        resource_type: String,
        attribute: String,
        value: String,
    },
}

/// An atomic set of preconditions and writes within one tenant.
#[derive(Debug, Clone, PartialEq)]
pub struct WriteBatch {
    tenant_id: String,
    preconditions: Vec<Precondition>,
    operations: Vec<WriteOperation>,
}

impl WriteBatch {
    /// Create an empty batch for a tenant.
    pub fn new(tenant_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            preconditions: Vec::new(),
            operations: Vec::new(),
        }
    }

    /// Require a record to exist at commit time.
    pub fn require_exists(mut self, resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        self.preconditions.push(Precondition::Exists {
            resource_type: resource_type.into(),
            id: id.into(),
        });
        self
    }

    /// Require a record to be unchanged since it was read (or still absent).
    pub fn require_version(
        mut self,
        resource_type: impl Into<String>,
        id: impl Into<String>,
        expected: Option<ContentVersion>,
    ) -> Self {
        self.preconditions.push(Precondition::Version {
            resource_type: resource_type.into(),
            id: id.into(),
            expected,
        });
        self
    }

    /// Require an attribute value to be unique among records of a type.
    pub fn require_unique(
        mut self,
        resource_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
        exclude_id: Option<&str>,
    ) -> Self {
        self.preconditions.push(Precondition::Unique {
            resource_type: resource_type.into(),
            attribute: attribute.into(),
            value: value.into(),
            exclude_id: exclude_id.map(str::to_string),
        });
        self
    }

    /// Store a document.
    pub fn put(mut self, resource_type: impl Into<String>, id: impl Into<String>, data: Value) -> Self {
        self.operations.push(WriteOperation::Put {
            resource_type: resource_type.into(),
            id: id.into(),
            data,
        });
        self
    }

    /// Delete a document.
    pub fn delete(mut self, resource_type: impl Into<String>, id: impl Into<String>) -> Self {
        self.operations.push(WriteOperation::Delete {
            resource_type: resource_type.into(),
            id: id.into(),
        });
        self
    }

    /// Delete every document of a type whose attribute matches a value.
    pub fn delete_matching(
        mut self,
        resource_type: impl Into<String>,
        attribute: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.operations.push(WriteOperation::DeleteMatching {
            resource_type: resource_type.into(),
            attribute: attribute.into(),
            value: value.into(),
        });
        self
    }

    /// Get the tenant ID.
    pub fn tenant_id(&self) -> &str {
        &self.tenant_id
    }

    /// Get the preconditions in insertion order.
    pub fn preconditions(&self) -> &[Precondition] {
        &self.preconditions
    }

    /// Get the writes in insertion order.
    pub fn operations(&self) -> &[WriteOperation] {
        &self.operations
    }

    /// Check whether the batch has no writes.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

/// Extract a nested attribute value from JSON data using dot notation.
///
/// Scalars are converted to strings for comparison; arrays and objects never
/// match.
pub fn extract_attribute_value(data: &Value, attribute_path: &str) -> Option<String> {
    let mut current = data;

    for part in attribute_path.split('.') {
        current = match part.parse::<usize>() {
            Ok(index) => current.get(index)?,
            Err(_) => current.get(part)?,
        };
    }

    match current {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Core trait for storage providers that handle pure data persistence.
///
/// # Design Principles
///
/// - **PUT/GET/DELETE Model**: simple, fundamental operations
/// - **Tenant Isolation**: all operations are scoped via [`StorageKey`] or [`WriteBatch`]
/// - **Ordered Listing**: lists are ordered by resource ID
/// - **Atomic Batches**: [`commit`](Self::commit) checks preconditions and applies writes as one step
/// - **Per-tenant Locking**: operations on different tenants must not contend
pub trait StorageProvider: Send + Sync {
    /// The error type returned by storage operations.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Store data at the specified key and return the stored data.
    fn put(
        &self,
        key: StorageKey,
        data: Value,
    ) -> impl Future<Output = Result<Value, Self::Error>> + Send;

    /// Retrieve data by key.
    fn get(
        &self,
        key: StorageKey,
    ) -> impl Future<Output = Result<Option<Value>, Self::Error>> + Send;

    /// Delete data by key, returning whether it existed.
    fn delete(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// List records matching a prefix, ordered by resource ID.
    ///
    /// The returned slice is taken from a single consistent view of the
    /// prefix. If `offset` exceeds the total count or `limit` is 0, an empty
    /// vector is returned.
    fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    /// Find records whose attribute (dot notation) equals `value`, ordered by resource ID.
    fn find_by_attribute(
        &self,
        prefix: StoragePrefix,
        attribute: &str,
        value: &str,
    ) -> impl Future<Output = Result<Vec<(StorageKey, Value)>, Self::Error>> + Send;

    /// Check if a record exists.
    fn exists(&self, key: StorageKey) -> impl Future<Output = Result<bool, Self::Error>> + Send;

    /// Count the records matching a prefix.
    fn count(
        &self,
        prefix: StoragePrefix,
    ) -> impl Future<Output = Result<usize, Self::Error>> + Send;

    /// List all tenant IDs that currently hold at least one record.
    fn list_tenants(&self) -> impl Future<Output = Result<Vec<String>, Self::Error>> + Send;

    /// Atomically check the batch preconditions and apply its writes.
    ///
    /// Either every write becomes visible or none does. Precondition failures
    /// are reported as `ResourceNotFound`, `ConcurrentModification` or
    /// `DuplicateAttribute` storage errors.
    fn commit(&self, batch: WriteBatch) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Clear all data from storage.
    fn clear(&self) -> impl Future<Output = Result<(), Self::Error>> + Send;
}
