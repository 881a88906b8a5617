//! The registry: runtimes, applications, labels and credential bindings.
//!
//! [`Registry`] holds the registry rules and delegates persistence to a
//! [`StorageProvider`]. Every mutation reads what it needs, builds one
//! [`WriteBatch`] with preconditions on everything it relied on, and commits
//! it atomically. Writers of the same runtime, application or credential
//! binding wait for each other. When a precondition on a record version still
//! fails, because a label definition the write relied on changed in between,
//! the whole operation is run again, up to
//! [`RegistryConfig::max_commit_attempts`] times.
//!
//! # Example
//!
//! ```rust
//! use runtime_registry::{Registry, RequestContext};
//! use runtime_registry::model::RuntimeInput;
//! use runtime_registry::storage::InMemoryStorage;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = Registry::new(InMemoryStorage::new());
//! let context = RequestContext::for_tenant("tenant-a");
//!
//! let runtime = registry
//!     .register_runtime(RuntimeInput::new("runtime-1").with_label("ggg", vec![json!("hhh")]), &context)
//!     .await?;
//! assert_eq!(runtime.labels.len(), 2); // ggg and the default scenarios label
//!
//! let err = registry
//!     .register_runtime(RuntimeInput::new("runtime-1"), &context)
//!     .await
//!     .unwrap_err();
//! assert!(err.to_string().contains("not unique"));
//! # Ok(())
//! # }
//! ```

mod applications;
mod auths;
pub mod builder;
mod entity;
mod label_definitions;
mod labels;
mod locks;
mod runtimes;

pub use builder::RegistryBuilder;

use crate::config::RegistryConfig;
use crate::error::{BuildResult, RegistryError, RegistryResult};
use crate::storage::{ContentVersion, StorageError, StorageKey, StorageProvider, WriteBatch};
use crate::tenant::RequestContext;
use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::OwnedMutexGuard;

use self::locks::EntityLocks;

/// Storage resource types used by the registry.
pub(crate) mod resource_types {
    pub const RUNTIME: &str = "Runtime";
    pub const APPLICATION: &str = "Application";
    /// Index of API definitions to their owning application.
    pub const API_DEFINITION: &str = "APIDefinition";
    pub const API_RUNTIME_AUTH: &str = "APIRuntimeAuth";
    pub const LABEL_DEFINITION: &str = "LabelDefinition";
}

/// Multi-tenant registry over a pluggable storage backend.
#[derive(Debug, Clone)]
pub struct Registry<S> {
    storage: S,
    config: RegistryConfig,
    locks: Arc<EntityLocks>,
}

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    /// Create a registry with the default configuration.
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            config: RegistryConfig::default(),
            locks: Arc::default(),
        }
    }

    /// Create a registry with a validated configuration.
    pub fn with_config(storage: S, config: RegistryConfig) -> BuildResult<Self> {
        config.validate()?;
        Ok(Self {
            storage,
            config,
            locks: Arc::default(),
        })
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    /// Direct access to the storage backend.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Resolve and validate the tenant of a request.
    fn tenant<'a>(&self, context: &'a RequestContext) -> RegistryResult<&'a str> {
        context.tenant.validate()?;
        Ok(context.tenant_id())
    }

    /// Serialize writers of one record; shared by every clone of the registry.
    async fn lock_entity(
        &self,
        tenant_id: &str,
        resource_type: &'static str,
        id: &str,
    ) -> OwnedMutexGuard<()> {
        self.locks.acquire(tenant_id, resource_type, id).await
    }

    /// Run `attempt` until it does not fail with a concurrent modification,
    /// at most `max_commit_attempts` times.
    async fn with_retries<T, F, Fut>(
        &self,
        operation: &str,
        context: &RequestContext,
        mut attempt: F,
    ) -> RegistryResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = RegistryResult<T>>,
    {
        let mut attempts = 0;
        loop {
            attempts += 1;
            match attempt().await {
                Err(RegistryError::ConcurrentModification { resource_type, id })
                    if attempts < self.config.max_commit_attempts =>
                {
                    debug!(
                        "{} conflicted on {} '{}' (attempt {}, request: '{}'), retrying",
                        operation, resource_type, id, attempts, context.request_id
                    );
                }
                Err(RegistryError::ConcurrentModification { resource_type, id }) => {
                    warn!(
                        "{} gave up after {} attempts on {} '{}' (request: '{}')",
                        operation, attempts, resource_type, id, context.request_id
                    );
                    return Err(RegistryError::ConcurrentModification { resource_type, id });
                }
                result => return result,
            }
        }
    }

    /// Load a record together with the version it was read at.
    async fn load<T: DeserializeOwned>(
        &self,
        tenant_id: &str,
        resource_type: &str,
        id: &str,
    ) -> RegistryResult<Option<(T, ContentVersion)>> {
        let key = StorageKey::new(tenant_id, resource_type, id);
        match self.storage.get(key).await? {
            Some(data) => {
                let version = ContentVersion::from_value(&data);
                Ok(Some((serde_json::from_value(data)?, version)))
            }
            None => Ok(None),
        }
    }

    /// Load a record or fail with not found.
    async fn load_existing<T: DeserializeOwned>(
        &self,
        tenant_id: &str,
        resource_type: &str,
        id: &str,
    ) -> RegistryResult<(T, ContentVersion)> {
        self.load(tenant_id, resource_type, id)
            .await?
            .ok_or_else(|| RegistryError::not_found(resource_type, id))
    }

    /// Load every record of a type, ordered by ID.
    async fn load_all<T: DeserializeOwned>(
        &self,
        tenant_id: &str,
        resource_type: &str,
    ) -> RegistryResult<Vec<(T, ContentVersion)>> {
        let prefix = StorageKey::prefix(tenant_id, resource_type);
        self.storage
            .list(prefix, 0, usize::MAX)
            .await?
            .into_iter()
            .map(|(_, data)| -> RegistryResult<(T, ContentVersion)> {
                let version = ContentVersion::from_value(&data);
                Ok((serde_json::from_value(data)?, version))
            })
            .collect()
    }

    async fn exists(&self, tenant_id: &str, resource_type: &str, id: &str) -> RegistryResult<bool> {
        Ok(self
            .storage
            .exists(StorageKey::new(tenant_id, resource_type, id))
            .await?)
    }

    async fn commit(&self, batch: WriteBatch) -> RegistryResult<()> {
        Ok(self.storage.commit(batch).await?)
    }
}

/// Serialize a record for storage.
fn to_document<T: serde::Serialize>(record: &T) -> RegistryResult<Value> {
    Ok(serde_json::to_value(record)?)
}
