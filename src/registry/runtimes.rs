//! Runtime operations.

use super::resource_types::{API_RUNTIME_AUTH, RUNTIME};
use super::{Registry, to_document};
use crate::error::RegistryResult;
use crate::labels::scenarios::{SCENARIOS_KEY, default_scenarios_value};
use crate::model::label::validate_labels;
use crate::model::{EntityName, Label, LabelFilter, Runtime, RuntimeInput, Status};
use crate::pagination::{Page, PageRequest};
use crate::storage::{StorageError, StorageProvider, WriteBatch};
use crate::tenant::RequestContext;
use log::{debug, info};
use serde_json::Value;
use uuid::Uuid;

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    /// Register a runtime under a fresh ID.
    pub async fn register_runtime(
        &self,
        input: RuntimeInput,
        context: &RequestContext,
    ) -> RegistryResult<Runtime> {
        let tenant_id = self.tenant(context)?;
        let name = EntityName::new(input.name.clone())?;
        validate_labels(&input.labels)?;

        info!(
            "Registering runtime '{}' for tenant '{}' (request: '{}')",
            name, tenant_id, context.request_id
        );

        let mut labels = input.labels;
        if self.config.assign_default_scenario && !labels.contains_key(SCENARIOS_KEY) {
            labels.insert(SCENARIOS_KEY.to_string(), default_scenarios_value());
        }

        let runtime = Runtime {
            id: Uuid::new_v4().to_string(),
            tenant: tenant_id.to_string(),
            name,
            description: input.description,
            labels,
            status: Status::new(input.status_condition.unwrap_or_default()),
        };

        self.with_retries("registerRuntime", context, || {
            self.try_register_runtime(tenant_id, &runtime)
        })
        .await?;

        debug!("Registered runtime '{}' with ID '{}'", runtime.name, runtime.id);
        Ok(runtime)
    }

    /// Update a runtime.
    ///
    /// The name is always replaced; description and status only when given.
    /// Submitted labels replace the labels with the same key, other labels are
    /// kept.
    pub async fn update_runtime(
        &self,
        id: &str,
        input: RuntimeInput,
        context: &RequestContext,
    ) -> RegistryResult<Runtime> {
        let tenant_id = self.tenant(context)?;
        let name = EntityName::new(input.name.clone())?;
        validate_labels(&input.labels)?;

        info!(
            "Updating runtime '{}' for tenant '{}' (request: '{}')",
            id, tenant_id, context.request_id
        );

        let _guard = self.lock_entity(tenant_id, RUNTIME, id).await;
        self.with_retries("updateRuntime", context, || {
            self.try_update_runtime(tenant_id, id, &name, &input)
        })
        .await
    }

    /// Remove a runtime together with its credential bindings.
    pub async fn unregister_runtime(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> RegistryResult<Runtime> {
        let tenant_id = self.tenant(context)?;

        info!(
            "Unregistering runtime '{}' for tenant '{}' (request: '{}')",
            id, tenant_id, context.request_id
        );

        let _guard = self.lock_entity(tenant_id, RUNTIME, id).await;
        self.with_retries("unregisterRuntime", context, || {
            self.try_unregister_runtime(tenant_id, id)
        })
        .await
    }

    /// Get a runtime of the caller's tenant.
    pub async fn runtime(&self, id: &str, context: &RequestContext) -> RegistryResult<Runtime> {
        let tenant_id = self.tenant(context)?;
        let (runtime, _) = self
            .load_existing::<Runtime>(tenant_id, RUNTIME, id)
            .await?;
        Ok(runtime)
    }

    /// List runtimes matching every label filter.
    pub async fn runtimes(
        &self,
        filters: &[LabelFilter],
        page: &PageRequest,
        context: &RequestContext,
    ) -> RegistryResult<Page<Runtime>> {
        self.list_entities::<Runtime>(filters, page, context).await
    }

    pub async fn set_runtime_label(
        &self,
        runtime_id: &str,
        key: &str,
        value: Vec<Value>,
        context: &RequestContext,
    ) -> RegistryResult<Label> {
        self.set_entity_label::<Runtime>(runtime_id, key, value, context)
            .await
    }

    pub async fn delete_runtime_label(
        &self,
        runtime_id: &str,
        key: &str,
        context: &RequestContext,
    ) -> RegistryResult<Label> {
        self.delete_entity_label::<Runtime>(runtime_id, key, context)
            .await
    }
}

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    async fn try_register_runtime(&self, tenant_id: &str, runtime: &Runtime) -> RegistryResult<()> {
        let batch = WriteBatch::new(tenant_id)
            .require_unique(RUNTIME, "name", runtime.name.as_str(), None)
            .require_version(RUNTIME, runtime.id.as_str(), None);
        let batch = self.guard_labels(tenant_id, &runtime.labels, batch).await?;
        self.commit(batch.put(RUNTIME, runtime.id.as_str(), to_document(runtime)?))
            .await
    }

    async fn try_update_runtime(
        &self,
        tenant_id: &str,
        id: &str,
        name: &EntityName,
        input: &RuntimeInput,
    ) -> RegistryResult<Runtime> {
        let (mut runtime, version) = self
            .load_existing::<Runtime>(tenant_id, RUNTIME, id)
            .await?;

        runtime.name = name.clone();
        if let Some(description) = &input.description {
            runtime.description = Some(description.clone());
        }
        if let Some(condition) = input.status_condition {
            runtime.status = Status::new(condition);
        }
        runtime
            .labels
            .extend(input.labels.iter().map(|(k, v)| (k.clone(), v.clone())));

        let batch = WriteBatch::new(tenant_id)
            .require_version(RUNTIME, id, Some(version))
            .require_unique(RUNTIME, "name", name.as_str(), Some(id));
        let batch = self.guard_labels(tenant_id, &input.labels, batch).await?;
        self.commit(batch.put(RUNTIME, id, to_document(&runtime)?))
            .await?;

        Ok(runtime)
    }

    async fn try_unregister_runtime(&self, tenant_id: &str, id: &str) -> RegistryResult<Runtime> {
        let (runtime, version) = self
            .load_existing::<Runtime>(tenant_id, RUNTIME, id)
            .await?;

        let batch = WriteBatch::new(tenant_id)
            .require_version(RUNTIME, id, Some(version))
            .delete(RUNTIME, id)
            .delete_matching(API_RUNTIME_AUTH, "runtimeId", id);
        self.commit(batch).await?;

        Ok(runtime)
    }
}
