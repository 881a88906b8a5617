//! In-memory storage implementation for registry records.
//!
//! Data is sharded by tenant: the outer map only hands out per-tenant shards,
//! and each shard has its own async `RwLock`. Operations on different
//! tenants therefore never wait on the same data lock, while all writes of a
//! [`WriteBatch`] within a tenant are applied under one shard write guard.
//!
//! # Performance Characteristics
//!
//! * PUT/GET/DELETE: O(log n) within a resource type
//! * LIST with pagination: O(offset + limit), ordered by resource ID
//! * FIND_BY_ATTRIBUTE and unique checks: O(n) over the resource type
//!
//! # Example Usage
//!
//! ```rust
//! use runtime_registry::storage::{InMemoryStorage, StorageProvider, StorageKey};
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//!
//! let key = StorageKey::new("tenant1", "Runtime", "rt-1");
//! storage.put(key.clone(), json!({"id": "rt-1", "name": "runtime-1"})).await?;
//!
//! let prefix = StorageKey::prefix("tenant1", "Runtime");
//! let found = storage.find_by_attribute(prefix, "name", "runtime-1").await?;
//! assert_eq!(found.len(), 1);
//! # Ok(())
//! # }
//! ```

use crate::storage::{
    ContentVersion, Precondition, StorageError, StorageKey, StoragePrefix, StorageProvider,
    WriteBatch, WriteOperation, extract_attribute_value,
};
use log::trace;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;

// resource_type -> resource_id -> data, ids kept sorted for stable listing
type TenantShard = HashMap<String, BTreeMap<String, Value>>;

/// Thread-safe in-memory storage with one lock per tenant.
#[derive(Debug, Clone)]
pub struct InMemoryStorage {
    shards: Arc<RwLock<HashMap<String, Arc<RwLock<TenantShard>>>>>,
}

impl InMemoryStorage {
    /// Create a new empty in-memory storage instance.
    pub fn new() -> Self {
        Self {
            shards: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get storage statistics for debugging and monitoring.
    pub async fn stats(&self) -> InMemoryStorageStats {
        let shards: Vec<_> = self.shards.read().await.values().cloned().collect();
        let mut stats = InMemoryStorageStats {
            tenant_count: 0,
            resource_type_count: 0,
            total_resources: 0,
        };

        for shard in shards {
            let guard = shard.read().await;
            let mut tenant_has_data = false;
            for type_data in guard.values().filter(|data| !data.is_empty()) {
                tenant_has_data = true;
                stats.resource_type_count += 1;
                stats.total_resources += type_data.len();
            }
            if tenant_has_data {
                stats.tenant_count += 1;
            }
        }

        stats
    }

    async fn shard(&self, tenant_id: &str) -> Option<Arc<RwLock<TenantShard>>> {
        self.shards.read().await.get(tenant_id).cloned()
    }

    async fn shard_or_create(&self, tenant_id: &str) -> Arc<RwLock<TenantShard>> {
        if let Some(shard) = self.shard(tenant_id).await {
            return shard;
        }

        let mut shards = self.shards.write().await;
        shards
            .entry(tenant_id.to_string())
            .or_insert_with(|| Arc::new(RwLock::new(HashMap::new())))
            .clone()
    }

    fn check_precondition(
        tenant_id: &str,
        shard: &TenantShard,
        precondition: &Precondition,
    ) -> Result<(), StorageError> {
        match precondition {
            Precondition::Exists { resource_type, id } => {
                let exists = shard
                    .get(resource_type)
                    .is_some_and(|type_data| type_data.contains_key(id));
                if !exists {
                    return Err(StorageError::resource_not_found(
                        tenant_id,
                        resource_type,
                        id,
                    ));
                }
            }
            Precondition::Version {
                resource_type,
                id,
                expected,
            } => {
                let actual = shard
                    .get(resource_type)
                    .and_then(|type_data| type_data.get(id))
                    .map(ContentVersion::from_value);
                if actual != *expected {
                    return Err(StorageError::version_mismatch(
                        tenant_id,
                        resource_type,
                        id,
                        expected.as_ref().map(|v| v.to_string()),
                        actual.map(|v| v.to_string()),
                    ));
                }
            }
            Precondition::Unique {
                resource_type,
                attribute,
                value,
                exclude_id,
            } => {
                let Some(type_data) = shard.get(resource_type) else {
                    return Ok(());
                };
                let taken = type_data.iter().any(|(id, data)| {
                    Some(id) != exclude_id.as_ref()
                        && extract_attribute_value(data, attribute).as_deref() == Some(value.as_str())
                });
                if taken {
                    return Err(StorageError::duplicate_attribute(
                        tenant_id,
                        resource_type,
                        attribute,
                        value,
                    ));
                }
            }
        }
        Ok(())
    }

    fn apply_operation(shard: &mut TenantShard, operation: &WriteOperation) {
        match operation {
            WriteOperation::Put {
                resource_type,
                id,
                data,
            } => {
                shard
                    .entry(resource_type.clone())
                    .or_default()
                    .insert(id.clone(), data.clone());
            }
            WriteOperation::Delete { resource_type, id } => {
                if let Some(type_data) = shard.get_mut(resource_type) {
                    type_data.remove(id);
                }
            }
            WriteOperation::DeleteMatching {
                resource_type,
                attribute,
                value,
            } => {
                if let Some(type_data) = shard.get_mut(resource_type) {
                    type_data.retain(|_, data| {
                        extract_attribute_value(data, attribute).as_deref() != Some(value.as_str())
                    });
                }
            }
        }
    }
}

impl Default for InMemoryStorage {
    fn default() -> Self {
        Self::new()
    }
}

impl StorageProvider for InMemoryStorage {
    type Error = StorageError;

    async fn put(&self, key: StorageKey, data: Value) -> Result<Value, Self::Error> {
        let shard = self.shard_or_create(key.tenant_id()).await;
        let mut guard = shard.write().await;

        guard
            .entry(key.resource_type().to_string())
            .or_default()
            .insert(key.resource_id().to_string(), data.clone());

        Ok(data)
    }

    async fn get(&self, key: StorageKey) -> Result<Option<Value>, Self::Error> {
        let Some(shard) = self.shard(key.tenant_id()).await else {
            return Ok(None);
        };
        let guard = shard.read().await;

        Ok(guard
            .get(key.resource_type())
            .and_then(|type_data| type_data.get(key.resource_id()))
            .cloned())
    }

    async fn delete(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let Some(shard) = self.shard(key.tenant_id()).await else {
            return Ok(false);
        };
        let mut guard = shard.write().await;

        Ok(guard
            .get_mut(key.resource_type())
            .is_some_and(|type_data| type_data.remove(key.resource_id()).is_some()))
    }

    async fn list(
        &self,
        prefix: StoragePrefix,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let Some(shard) = self.shard(prefix.tenant_id()).await else {
            return Ok(Vec::new());
        };
        let guard = shard.read().await;

        let Some(type_data) = guard.get(prefix.resource_type()) else {
            return Ok(Vec::new());
        };

        Ok(type_data
            .iter()
            .skip(offset)
            .take(limit)
            .map(|(resource_id, data)| {
                (
                    StorageKey::new(prefix.tenant_id(), prefix.resource_type(), resource_id),
                    data.clone(),
                )
            })
            .collect())
    }

    async fn find_by_attribute(
        &self,
        prefix: StoragePrefix,
        attribute: &str,
        value: &str,
    ) -> Result<Vec<(StorageKey, Value)>, Self::Error> {
        let Some(shard) = self.shard(prefix.tenant_id()).await else {
            return Ok(Vec::new());
        };
        let guard = shard.read().await;

        let Some(type_data) = guard.get(prefix.resource_type()) else {
            return Ok(Vec::new());
        };

        Ok(type_data
            .iter()
            .filter(|(_, data)| extract_attribute_value(data, attribute).as_deref() == Some(value))
            .map(|(resource_id, data)| {
                (
                    StorageKey::new(prefix.tenant_id(), prefix.resource_type(), resource_id),
                    data.clone(),
                )
            })
            .collect())
    }

    async fn exists(&self, key: StorageKey) -> Result<bool, Self::Error> {
        let Some(shard) = self.shard(key.tenant_id()).await else {
            return Ok(false);
        };
        let guard = shard.read().await;

        Ok(guard
            .get(key.resource_type())
            .is_some_and(|type_data| type_data.contains_key(key.resource_id())))
    }

    async fn count(&self, prefix: StoragePrefix) -> Result<usize, Self::Error> {
        let Some(shard) = self.shard(prefix.tenant_id()).await else {
            return Ok(0);
        };
        let guard = shard.read().await;

        Ok(guard
            .get(prefix.resource_type())
            .map(|type_data| type_data.len())
            .unwrap_or(0))
    }

    async fn list_tenants(&self) -> Result<Vec<String>, Self::Error> {
        let shards: Vec<_> = self
            .shards
            .read()
            .await
            .iter()
            .map(|(tenant_id, shard)| (tenant_id.clone(), shard.clone()))
            .collect();

        let mut tenants = Vec::new();
        for (tenant_id, shard) in shards {
            if shard.read().await.values().any(|data| !data.is_empty()) {
                tenants.push(tenant_id);
            }
        }
        tenants.sort();
        Ok(tenants)
    }

    async fn commit(&self, batch: WriteBatch) -> Result<(), Self::Error> {
        let shard = self.shard_or_create(batch.tenant_id()).await;
        let mut guard = shard.write().await;

        // No await below this point: the batch is applied entirely or not at all.
        for precondition in batch.preconditions() {
            Self::check_precondition(batch.tenant_id(), &guard, precondition)?;
        }
        for operation in batch.operations() {
            Self::apply_operation(&mut guard, operation);
        }

        trace!(
            "Committed batch for tenant '{}' ({} preconditions, {} writes)",
            batch.tenant_id(),
            batch.preconditions().len(),
            batch.operations().len()
        );
        Ok(())
    }

    async fn clear(&self) -> Result<(), Self::Error> {
        let shards: Vec<_> = self.shards.read().await.values().cloned().collect();
        for shard in shards {
            shard.write().await.clear();
        }
        Ok(())
    }
}

/// Statistics about the current state of in-memory storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryStorageStats {
    /// Number of tenants with data
    pub tenant_count: usize,
    /// Number of non-empty resource types across all tenants
    pub resource_type_count: usize,
    /// Total number of individual records
    pub total_resources: usize,
}
