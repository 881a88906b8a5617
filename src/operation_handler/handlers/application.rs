//! Application and API definition operation handlers

use crate::error::{ErrorKind, RegistryResult};
use crate::model::{ApiDefinitionInput, ApplicationRegisterInput, ApplicationUpdateInput, LabelFilter};
use crate::operation_handler::core::{
    OperationResponse, RegistryOperationHandler, item_response, null_response, page_response,
};
use crate::pagination::PageRequest;
use crate::storage::{StorageError, StorageProvider};
use crate::tenant::RequestContext;
use serde_json::Value;

const APPLICATION: &str = "Application";
const API_DEFINITION: &str = "APIDefinition";
const LABEL: &str = "Label";

pub async fn handle_register<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    input: ApplicationRegisterInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let application = handler
        .registry()
        .register_application(input, context)
        .await?;
    item_response(context, APPLICATION, Some(application.id.clone()), &application)
}

pub async fn handle_update<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    id: &str,
    input: ApplicationUpdateInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let application = handler
        .registry()
        .update_application(id, input, context)
        .await?;
    item_response(context, APPLICATION, Some(application.id.clone()), &application)
}

pub async fn handle_unregister<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let application = handler
        .registry()
        .unregister_application(id, context)
        .await?;
    item_response(context, APPLICATION, Some(application.id.clone()), &application)
}

/// A missing application is a successful lookup with `null` data.
pub async fn handle_get<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    match handler.registry().application(id, context).await {
        Ok(application) => {
            item_response(context, APPLICATION, Some(application.id.clone()), &application)
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(null_response(context, APPLICATION, id)),
        Err(e) => Err(e),
    }
}

pub async fn handle_list<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    filter: &[LabelFilter],
    page: &PageRequest,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let page = handler
        .registry()
        .applications(filter, page, context)
        .await?;
    page_response(context, APPLICATION, &page)
}

pub async fn handle_for_runtime<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    runtime_id: &str,
    page: &PageRequest,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let page = handler
        .registry()
        .applications_for_runtime(runtime_id, page, context)
        .await?;
    page_response(context, APPLICATION, &page)
}

pub async fn handle_set_label<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    application_id: &str,
    key: &str,
    value: Vec<Value>,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let label = handler
        .registry()
        .set_application_label(application_id, key, value, context)
        .await?;
    item_response(context, LABEL, Some(application_id.to_string()), &label)
}

pub async fn handle_delete_label<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    application_id: &str,
    key: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let label = handler
        .registry()
        .delete_application_label(application_id, key, context)
        .await?;
    item_response(context, LABEL, Some(application_id.to_string()), &label)
}

pub async fn handle_add_api<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    application_id: &str,
    input: ApiDefinitionInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let api = handler
        .registry()
        .add_api_definition(application_id, input, context)
        .await?;
    item_response(context, API_DEFINITION, Some(api.id.clone()), &api)
}

pub async fn handle_delete_api<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let api = handler.registry().delete_api_definition(id, context).await?;
    item_response(context, API_DEFINITION, Some(api.id.clone()), &api)
}
