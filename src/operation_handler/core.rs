//! Core operation handler infrastructure
//!
//! This module contains the request/response types and the dispatcher that
//! maps each [`Operation`] onto the registry.

use crate::error::RegistryResult;
use crate::labels::LabelDefinitionInput;
use crate::model::{
    ApiDefinitionInput, ApplicationRegisterInput, ApplicationUpdateInput, AuthInput, LabelFilter,
    RuntimeInput,
};
use crate::pagination::{Page, PageRequest};
use crate::registry::Registry;
use crate::storage::{StorageError, StorageProvider};
use crate::tenant::{RequestContext, TenantContext};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

use super::handlers::{application, auth, label, runtime};

/// Framework-agnostic operation handler for registry operations
///
/// This handler provides a structured interface for performing registry
/// operations without being tied to any specific transport layer.
pub struct RegistryOperationHandler<S> {
    pub(super) registry: Registry<S>,
}

/// Structured request for a registry operation
///
/// The operation is flattened into the request, so a request reads as
/// `{"operation": "registerRuntime", "input": {...}, "tenant": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationRequest {
    #[serde(flatten)]
    pub operation: Operation,
    /// Tenant the operation acts on
    pub tenant: TenantContext,
    /// Request ID for tracing and correlation, generated when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Operations supported by the handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(
    tag = "operation",
    rename_all = "camelCase",
    rename_all_fields = "camelCase"
)]
pub enum Operation {
    RegisterRuntime {
        input: RuntimeInput,
    },
    UpdateRuntime {
        id: String,
        input: RuntimeInput,
    },
    UnregisterRuntime {
        id: String,
    },
    Runtime {
        id: String,
    },
    Runtimes {
        #[serde(default)]
        filter: Vec<LabelFilter>,
        #[serde(default)]
        first: Option<usize>,
        #[serde(default)]
        after: Option<String>,
    },
    SetRuntimeLabel {
        runtime_id: String,
        key: String,
        value: Vec<Value>,
    },
    DeleteRuntimeLabel {
        runtime_id: String,
        key: String,
    },
    RegisterApplication {
        input: ApplicationRegisterInput,
    },
    UpdateApplication {
        id: String,
        input: ApplicationUpdateInput,
    },
    UnregisterApplication {
        id: String,
    },
    Application {
        id: String,
    },
    Applications {
        #[serde(default)]
        filter: Vec<LabelFilter>,
        #[serde(default)]
        first: Option<usize>,
        #[serde(default)]
        after: Option<String>,
    },
    SetApplicationLabel {
        application_id: String,
        key: String,
        value: Vec<Value>,
    },
    DeleteApplicationLabel {
        application_id: String,
        key: String,
    },
    ApplicationsForRuntime {
        runtime_id: String,
        #[serde(default)]
        first: Option<usize>,
        #[serde(default)]
        after: Option<String>,
    },
    #[serde(rename = "addAPIDefinition")]
    AddApiDefinition {
        application_id: String,
        input: ApiDefinitionInput,
    },
    #[serde(rename = "deleteAPIDefinition")]
    DeleteApiDefinition {
        id: String,
    },
    #[serde(rename = "setAPIAuth")]
    SetApiAuth {
        api_id: String,
        runtime_id: String,
        input: AuthInput,
    },
    #[serde(rename = "deleteAPIAuth")]
    DeleteApiAuth {
        api_id: String,
        runtime_id: String,
    },
    ApiAuth {
        api_id: String,
        runtime_id: String,
    },
    ApiAuths {
        api_id: String,
    },
    CreateLabelDefinition {
        input: LabelDefinitionInput,
    },
    UpdateLabelDefinition {
        input: LabelDefinitionInput,
    },
    LabelDefinition {
        key: String,
    },
    LabelDefinitions,
    DeleteLabelDefinition {
        key: String,
        #[serde(default)]
        delete_related_labels: bool,
    },
}

impl Operation {
    /// Operation name as it appears on the wire.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::RegisterRuntime { .. } => "registerRuntime",
            Operation::UpdateRuntime { .. } => "updateRuntime",
            Operation::UnregisterRuntime { .. } => "unregisterRuntime",
            Operation::Runtime { .. } => "runtime",
            Operation::Runtimes { .. } => "runtimes",
            Operation::SetRuntimeLabel { .. } => "setRuntimeLabel",
            Operation::DeleteRuntimeLabel { .. } => "deleteRuntimeLabel",
            Operation::RegisterApplication { .. } => "registerApplication",
            Operation::UpdateApplication { .. } => "updateApplication",
            Operation::UnregisterApplication { .. } => "unregisterApplication",
            Operation::Application { .. } => "application",
            Operation::Applications { .. } => "applications",
            Operation::SetApplicationLabel { .. } => "setApplicationLabel",
            Operation::DeleteApplicationLabel { .. } => "deleteApplicationLabel",
            Operation::ApplicationsForRuntime { .. } => "applicationsForRuntime",
            Operation::AddApiDefinition { .. } => "addAPIDefinition",
            Operation::DeleteApiDefinition { .. } => "deleteAPIDefinition",
            Operation::SetApiAuth { .. } => "setAPIAuth",
            Operation::DeleteApiAuth { .. } => "deleteAPIAuth",
            Operation::ApiAuth { .. } => "apiAuth",
            Operation::ApiAuths { .. } => "apiAuths",
            Operation::CreateLabelDefinition { .. } => "createLabelDefinition",
            Operation::UpdateLabelDefinition { .. } => "updateLabelDefinition",
            Operation::LabelDefinition { .. } => "labelDefinition",
            Operation::LabelDefinitions => "labelDefinitions",
            Operation::DeleteLabelDefinition { .. } => "deleteLabelDefinition",
        }
    }
}

/// Structured response from registry operations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationResponse {
    /// Whether the operation succeeded
    pub success: bool,
    /// The primary data returned by the operation; `null` for lookups that
    /// found nothing
    pub data: Option<Value>,
    /// Error message if the operation failed
    pub error: Option<String>,
    /// Error code for programmatic handling
    pub error_code: Option<String>,
    pub metadata: OperationMetadata,
}

/// Metadata about an operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationMetadata {
    /// Name of the operation that produced the response
    pub operation: String,
    pub resource_type: Option<String>,
    pub resource_id: Option<String>,
    /// Number of items in `data`
    pub resource_count: Option<usize>,
    /// Total size of a paginated collection
    pub total_count: Option<usize>,
    pub request_id: String,
    pub tenant_id: Option<String>,
    #[serde(default)]
    pub additional: HashMap<String, Value>,
}

impl<S: StorageProvider<Error = StorageError>> RegistryOperationHandler<S> {
    /// Create a new operation handler over the given registry.
    pub fn new(registry: Registry<S>) -> Self {
        Self { registry }
    }

    /// Handle a structured operation request.
    ///
    /// This is the main entry point; failures are reported in the response
    /// rather than as an error.
    pub async fn handle_operation(&self, request: OperationRequest) -> OperationResponse {
        let request_id = request
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
        let name = request.operation.name();

        info!(
            "Operation handler processing {} for tenant '{}' (request: '{}')",
            name, request.tenant.tenant_id, request_id
        );

        let context = RequestContext::new(request_id.clone(), request.tenant);
        let result = self.dispatch(request.operation, &context).await;

        match &result {
            Ok(_) => {
                debug!(
                    "Operation handler completed {} successfully (request: '{}')",
                    name, request_id
                );
            }
            Err(e) => {
                warn!(
                    "Operation handler failed {}: {} (request: '{}')",
                    name, e, request_id
                );
            }
        }

        let mut response = result
            .unwrap_or_else(|e| super::errors::create_error_response(e, &context));
        response.metadata.operation = name.to_string();
        response
    }

    async fn dispatch(
        &self,
        operation: Operation,
        context: &RequestContext,
    ) -> RegistryResult<OperationResponse> {
        match operation {
            Operation::RegisterRuntime { input } => {
                runtime::handle_register(self, input, context).await
            }
            Operation::UpdateRuntime { id, input } => {
                runtime::handle_update(self, &id, input, context).await
            }
            Operation::UnregisterRuntime { id } => {
                runtime::handle_unregister(self, &id, context).await
            }
            Operation::Runtime { id } => runtime::handle_get(self, &id, context).await,
            Operation::Runtimes {
                filter,
                first,
                after,
            } => runtime::handle_list(self, &filter, &PageRequest { first, after }, context).await,
            Operation::SetRuntimeLabel {
                runtime_id,
                key,
                value,
            } => runtime::handle_set_label(self, &runtime_id, &key, value, context).await,
            Operation::DeleteRuntimeLabel { runtime_id, key } => {
                runtime::handle_delete_label(self, &runtime_id, &key, context).await
            }
            Operation::RegisterApplication { input } => {
                application::handle_register(self, input, context).await
            }
            Operation::UpdateApplication { id, input } => {
                application::handle_update(self, &id, input, context).await
            }
            Operation::UnregisterApplication { id } => {
                application::handle_unregister(self, &id, context).await
            }
            Operation::Application { id } => application::handle_get(self, &id, context).await,
            Operation::Applications {
                filter,
                first,
                after,
            } => {
                application::handle_list(self, &filter, &PageRequest { first, after }, context)
                    .await
            }
            Operation::SetApplicationLabel {
                application_id,
                key,
                value,
            } => {
                application::handle_set_label(self, &application_id, &key, value, context).await
            }
            Operation::DeleteApplicationLabel {
                application_id,
                key,
            } => application::handle_delete_label(self, &application_id, &key, context).await,
            Operation::ApplicationsForRuntime {
                runtime_id,
                first,
                after,
            } => {
                application::handle_for_runtime(
                    self,
                    &runtime_id,
                    &PageRequest { first, after },
                    context,
                )
                .await
            }
            Operation::AddApiDefinition {
                application_id,
                input,
            } => application::handle_add_api(self, &application_id, input, context).await,
            Operation::DeleteApiDefinition { id } => {
                application::handle_delete_api(self, &id, context).await
            }
            Operation::SetApiAuth {
                api_id,
                runtime_id,
                input,
            } => auth::handle_set(self, &api_id, &runtime_id, input, context).await,
            Operation::DeleteApiAuth { api_id, runtime_id } => {
                auth::handle_delete(self, &api_id, &runtime_id, context).await
            }
            Operation::ApiAuth { api_id, runtime_id } => {
                auth::handle_get(self, &api_id, &runtime_id, context).await
            }
            Operation::ApiAuths { api_id } => auth::handle_list(self, &api_id, context).await,
            Operation::CreateLabelDefinition { input } => {
                label::handle_create(self, input, context).await
            }
            Operation::UpdateLabelDefinition { input } => {
                label::handle_update(self, input, context).await
            }
            Operation::LabelDefinition { key } => label::handle_get(self, &key, context).await,
            Operation::LabelDefinitions => label::handle_list(self, context).await,
            Operation::DeleteLabelDefinition {
                key,
                delete_related_labels,
            } => label::handle_delete(self, &key, delete_related_labels, context).await,
        }
    }

    /// Get access to the underlying registry.
    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }
}

/// Successful response carrying one serialized item.
pub(super) fn item_response<T: Serialize>(
    context: &RequestContext,
    resource_type: &str,
    resource_id: Option<String>,
    item: &T,
) -> RegistryResult<OperationResponse> {
    Ok(OperationResponse {
        success: true,
        data: Some(serde_json::to_value(item)?),
        error: None,
        error_code: None,
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_id,
            resource_count: Some(1),
            ..metadata(context)
        },
    })
}

/// Successful lookup that found nothing.
pub(super) fn null_response(
    context: &RequestContext,
    resource_type: &str,
    resource_id: &str,
) -> OperationResponse {
    OperationResponse {
        success: true,
        data: Some(Value::Null),
        error: None,
        error_code: None,
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_id: Some(resource_id.to_string()),
            resource_count: Some(0),
            ..metadata(context)
        },
    }
}

/// Successful response carrying a page with its counts and cursors.
pub(super) fn page_response<T: Serialize>(
    context: &RequestContext,
    resource_type: &str,
    page: &Page<T>,
) -> RegistryResult<OperationResponse> {
    Ok(OperationResponse {
        success: true,
        data: Some(serde_json::to_value(page)?),
        error: None,
        error_code: None,
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_count: Some(page.data.len()),
            total_count: Some(page.total_count),
            ..metadata(context)
        },
    })
}

/// Successful response carrying an unpaginated list.
pub(super) fn list_response<T: Serialize>(
    context: &RequestContext,
    resource_type: &str,
    items: &[T],
) -> RegistryResult<OperationResponse> {
    Ok(OperationResponse {
        success: true,
        data: Some(serde_json::to_value(items)?),
        error: None,
        error_code: None,
        metadata: OperationMetadata {
            resource_type: Some(resource_type.to_string()),
            resource_count: Some(items.len()),
            total_count: Some(items.len()),
            ..metadata(context)
        },
    })
}

pub(super) fn metadata(context: &RequestContext) -> OperationMetadata {
    OperationMetadata {
        request_id: context.request_id.clone(),
        tenant_id: Some(context.tenant_id().to_string()),
        ..Default::default()
    }
}
