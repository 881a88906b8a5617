//! API credential binding operation handlers
//!
//! Responses carry the binding including its secrets; they are never logged.

use crate::error::RegistryResult;
use crate::model::AuthInput;
use crate::operation_handler::core::{
    OperationResponse, RegistryOperationHandler, item_response, list_response,
};
use crate::storage::{StorageError, StorageProvider};
use crate::tenant::RequestContext;

const API_RUNTIME_AUTH: &str = "APIRuntimeAuth";

pub async fn handle_set<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    api_id: &str,
    runtime_id: &str,
    input: AuthInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let binding = handler
        .registry()
        .set_api_auth(api_id, runtime_id, input, context)
        .await?;
    item_response(context, API_RUNTIME_AUTH, Some(api_id.to_string()), &binding)
}

pub async fn handle_delete<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    api_id: &str,
    runtime_id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let binding = handler
        .registry()
        .delete_api_auth(api_id, runtime_id, context)
        .await?;
    item_response(context, API_RUNTIME_AUTH, Some(api_id.to_string()), &binding)
}

pub async fn handle_get<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    api_id: &str,
    runtime_id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let binding = handler
        .registry()
        .api_auth(api_id, runtime_id, context)
        .await?;
    item_response(context, API_RUNTIME_AUTH, Some(api_id.to_string()), &binding)
}

pub async fn handle_list<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    api_id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let bindings = handler.registry().api_auths(api_id, context).await?;
    let mut response = list_response(context, API_RUNTIME_AUTH, &bindings)?;
    response.metadata.resource_id = Some(api_id.to_string());
    Ok(response)
}
