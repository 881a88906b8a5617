//! Application and API definition operations.
//!
//! API definitions live inside their application document. A small index
//! record per API (`APIDefinition`, holding the owning application ID) is
//! written in the same batch so an API can be resolved by ID alone.

use super::resource_types::{API_DEFINITION, API_RUNTIME_AUTH, APPLICATION, RUNTIME};
use super::{Registry, to_document};
use crate::error::{RegistryError, RegistryResult, ValidationError};
use crate::labels::scenarios::{SCENARIOS_KEY, default_scenarios_value, share_scenario};
use crate::model::label::validate_labels;
use crate::model::{
    ApiDefinition, ApiDefinitionInput, Application, ApplicationRegisterInput,
    ApplicationUpdateInput, EntityName, Label, LabelFilter, Runtime, Status,
};
use crate::pagination::{Page, PageRequest, paginate};
use crate::storage::{StorageError, StorageProvider, WriteBatch};
use crate::tenant::RequestContext;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Index record resolving an API definition to its application.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct ApiDefinitionIndex {
    pub id: String,
    pub application_id: String,
}

impl ApiDefinitionIndex {
    fn of(api: &ApiDefinition) -> Self {
        Self {
            id: api.id.clone(),
            application_id: api.application_id.clone(),
        }
    }
}

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    /// Register an application with at least one API definition.
    pub async fn register_application(
        &self,
        input: ApplicationRegisterInput,
        context: &RequestContext,
    ) -> RegistryResult<Application> {
        let tenant_id = self.tenant(context)?;
        let name = EntityName::new(input.name.clone())?;
        validate_labels(&input.labels)?;
        if input.api_definitions.is_empty() {
            return Err(ValidationError::missing_required("apiDefinitions").into());
        }

        info!(
            "Registering application '{}' with {} APIs for tenant '{}' (request: '{}')",
            name,
            input.api_definitions.len(),
            tenant_id,
            context.request_id
        );

        let id = Uuid::new_v4().to_string();
        let api_definitions = input
            .api_definitions
            .into_iter()
            .map(|api| api.into_definition(Uuid::new_v4().to_string(), &id))
            .collect::<Result<Vec<_>, _>>()?;

        let mut labels = input.labels;
        if self.config.assign_default_scenario && !labels.contains_key(SCENARIOS_KEY) {
            labels.insert(SCENARIOS_KEY.to_string(), default_scenarios_value());
        }

        let application = Application {
            id,
            tenant: tenant_id.to_string(),
            name,
            description: input.description,
            labels,
            status: Status::default(),
            api_definitions,
        };

        self.with_retries("registerApplication", context, || {
            self.try_register_application(tenant_id, &application)
        })
        .await?;

        debug!(
            "Registered application '{}' with ID '{}'",
            application.name, application.id
        );
        Ok(application)
    }

    /// Update an application. API definitions are left untouched.
    pub async fn update_application(
        &self,
        id: &str,
        input: ApplicationUpdateInput,
        context: &RequestContext,
    ) -> RegistryResult<Application> {
        let tenant_id = self.tenant(context)?;
        let name = EntityName::new(input.name.clone())?;
        validate_labels(&input.labels)?;

        info!(
            "Updating application '{}' for tenant '{}' (request: '{}')",
            id, tenant_id, context.request_id
        );

        let _guard = self.lock_entity(tenant_id, APPLICATION, id).await;
        self.with_retries("updateApplication", context, || {
            self.try_update_application(tenant_id, id, &name, &input)
        })
        .await
    }

    /// Remove an application, its API definitions and their credential bindings.
    pub async fn unregister_application(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> RegistryResult<Application> {
        let tenant_id = self.tenant(context)?;

        info!(
            "Unregistering application '{}' for tenant '{}' (request: '{}')",
            id, tenant_id, context.request_id
        );

        let _guard = self.lock_entity(tenant_id, APPLICATION, id).await;
        self.with_retries("unregisterApplication", context, || {
            self.try_unregister_application(tenant_id, id)
        })
        .await
    }

    pub async fn application(
        &self,
        id: &str,
        context: &RequestContext,
    ) -> RegistryResult<Application> {
        let tenant_id = self.tenant(context)?;
        let (application, _) = self
            .load_existing::<Application>(tenant_id, APPLICATION, id)
            .await?;
        Ok(application)
    }

    /// List applications matching every label filter.
    pub async fn applications(
        &self,
        filters: &[LabelFilter],
        page: &PageRequest,
        context: &RequestContext,
    ) -> RegistryResult<Page<Application>> {
        self.list_entities::<Application>(filters, page, context)
            .await
    }

    pub async fn set_application_label(
        &self,
        application_id: &str,
        key: &str,
        value: Vec<Value>,
        context: &RequestContext,
    ) -> RegistryResult<Label> {
        self.set_entity_label::<Application>(application_id, key, value, context)
            .await
    }

    pub async fn delete_application_label(
        &self,
        application_id: &str,
        key: &str,
        context: &RequestContext,
    ) -> RegistryResult<Label> {
        self.delete_entity_label::<Application>(application_id, key, context)
            .await
    }

    /// Applications of the caller's tenant that share a scenario with the runtime.
    pub async fn applications_for_runtime(
        &self,
        runtime_id: &str,
        page: &PageRequest,
        context: &RequestContext,
    ) -> RegistryResult<Page<Application>> {
        let tenant_id = self.tenant(context)?;
        let (runtime, _) = self
            .load_existing::<Runtime>(tenant_id, RUNTIME, runtime_id)
            .await?;

        let applications: Vec<Application> = self
            .load_all::<Application>(tenant_id, APPLICATION)
            .await?
            .into_iter()
            .map(|(application, _)| application)
            .filter(|application| share_scenario(&runtime.labels, &application.labels))
            .collect();

        debug!(
            "Runtime '{}' shares scenarios with {} applications",
            runtime_id,
            applications.len()
        );

        Ok(paginate(
            applications,
            |application| application.id.as_str(),
            page,
            self.config.default_page_size,
            self.config.max_page_size,
        )?)
    }

    /// Add an API definition to an application.
    pub async fn add_api_definition(
        &self,
        application_id: &str,
        input: ApiDefinitionInput,
        context: &RequestContext,
    ) -> RegistryResult<ApiDefinition> {
        let tenant_id = self.tenant(context)?;
        let api = input.into_definition(Uuid::new_v4().to_string(), application_id)?;

        info!(
            "Adding API '{}' to application '{}' for tenant '{}' (request: '{}')",
            api.name, application_id, tenant_id, context.request_id
        );

        let _guard = self
            .lock_entity(tenant_id, APPLICATION, application_id)
            .await;
        self.with_retries("addAPIDefinition", context, || {
            self.try_add_api_definition(tenant_id, &api)
        })
        .await?;

        Ok(api)
    }

    /// Remove an API definition and its credential bindings.
    pub async fn delete_api_definition(
        &self,
        api_id: &str,
        context: &RequestContext,
    ) -> RegistryResult<ApiDefinition> {
        let tenant_id = self.tenant(context)?;

        info!(
            "Deleting API '{}' for tenant '{}' (request: '{}')",
            api_id, tenant_id, context.request_id
        );

        let index = self.api_definition_index(tenant_id, api_id).await?;
        let _guard = self
            .lock_entity(tenant_id, APPLICATION, &index.application_id)
            .await;
        self.with_retries("deleteAPIDefinition", context, || {
            self.try_delete_api_definition(tenant_id, api_id)
        })
        .await
    }

    /// Resolve an API definition of the caller's tenant.
    pub(super) async fn api_definition_index(
        &self,
        tenant_id: &str,
        api_id: &str,
    ) -> RegistryResult<ApiDefinitionIndex> {
        let (index, _) = self
            .load_existing::<ApiDefinitionIndex>(tenant_id, API_DEFINITION, api_id)
            .await?;
        Ok(index)
    }
}

impl<S: StorageProvider<Error = StorageError>> Registry<S> {
    async fn try_register_application(
        &self,
        tenant_id: &str,
        application: &Application,
    ) -> RegistryResult<()> {
        let mut batch = WriteBatch::new(tenant_id)
            .require_unique(APPLICATION, "name", application.name.as_str(), None)
            .require_version(APPLICATION, application.id.as_str(), None);
        batch = self
            .guard_labels(tenant_id, &application.labels, batch)
            .await?;

        batch = batch.put(
            APPLICATION,
            application.id.as_str(),
            to_document(application)?,
        );
        for api in &application.api_definitions {
            batch = batch.put(
                API_DEFINITION,
                api.id.as_str(),
                to_document(&ApiDefinitionIndex::of(api))?,
            );
        }

        self.commit(batch).await
    }

    async fn try_update_application(
        &self,
        tenant_id: &str,
        id: &str,
        name: &EntityName,
        input: &ApplicationUpdateInput,
    ) -> RegistryResult<Application> {
        let (mut application, version) = self
            .load_existing::<Application>(tenant_id, APPLICATION, id)
            .await?;

        application.name = name.clone();
        if let Some(description) = &input.description {
            application.description = Some(description.clone());
        }
        if let Some(condition) = input.status_condition {
            application.status = Status::new(condition);
        }
        application
            .labels
            .extend(input.labels.iter().map(|(k, v)| (k.clone(), v.clone())));

        let batch = WriteBatch::new(tenant_id)
            .require_version(APPLICATION, id, Some(version))
            .require_unique(APPLICATION, "name", name.as_str(), Some(id));
        let batch = self.guard_labels(tenant_id, &input.labels, batch).await?;
        self.commit(batch.put(APPLICATION, id, to_document(&application)?))
            .await?;

        Ok(application)
    }

    async fn try_unregister_application(
        &self,
        tenant_id: &str,
        id: &str,
    ) -> RegistryResult<Application> {
        let (application, version) = self
            .load_existing::<Application>(tenant_id, APPLICATION, id)
            .await?;

        let batch = WriteBatch::new(tenant_id)
            .require_version(APPLICATION, id, Some(version))
            .delete(APPLICATION, id)
            .delete_matching(API_DEFINITION, "applicationId", id)
            .delete_matching(API_RUNTIME_AUTH, "applicationId", id);
        self.commit(batch).await?;

        Ok(application)
    }

    async fn try_add_api_definition(&self, tenant_id: &str, api: &ApiDefinition) -> RegistryResult<()> {
        let (mut application, version) = self
            .load_existing::<Application>(tenant_id, APPLICATION, &api.application_id)
            .await?;
        application.api_definitions.push(api.clone());

        let batch = WriteBatch::new(tenant_id)
            .require_version(APPLICATION, api.application_id.as_str(), Some(version))
            .require_version(API_DEFINITION, api.id.as_str(), None)
            .put(
                APPLICATION,
                api.application_id.as_str(),
                to_document(&application)?,
            )
            .put(
                API_DEFINITION,
                api.id.as_str(),
                to_document(&ApiDefinitionIndex::of(api))?,
            );
        self.commit(batch).await
    }

    async fn try_delete_api_definition(
        &self,
        tenant_id: &str,
        api_id: &str,
    ) -> RegistryResult<ApiDefinition> {
        let (index, index_version) = self
            .load_existing::<ApiDefinitionIndex>(tenant_id, API_DEFINITION, api_id)
            .await?;
        let (mut application, version) = self
            .load_existing::<Application>(tenant_id, APPLICATION, &index.application_id)
            .await?;

        let position = application
            .api_definitions
            .iter()
            .position(|api| api.id == api_id)
            .ok_or_else(|| RegistryError::not_found(API_DEFINITION, api_id))?;
        let api = application.api_definitions.remove(position);

        let batch = WriteBatch::new(tenant_id)
            .require_version(API_DEFINITION, api_id, Some(index_version))
            .require_version(APPLICATION, index.application_id.as_str(), Some(version))
            .put(
                APPLICATION,
                index.application_id.as_str(),
                to_document(&application)?,
            )
            .delete(API_DEFINITION, api_id)
            .delete_matching(API_RUNTIME_AUTH, "apiId", api_id);
        self.commit(batch).await?;

        Ok(api)
    }
}
