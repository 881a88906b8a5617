//! Runtime operation handlers

use crate::error::{ErrorKind, RegistryResult};
use crate::model::{LabelFilter, RuntimeInput};
use crate::operation_handler::core::{
    OperationResponse, RegistryOperationHandler, item_response, null_response, page_response,
};
use crate::pagination::PageRequest;
use crate::storage::{StorageError, StorageProvider};
use crate::tenant::RequestContext;
use serde_json::Value;

const RUNTIME: &str = "Runtime";
const LABEL: &str = "Label";

pub async fn handle_register<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    input: RuntimeInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let runtime = handler.registry().register_runtime(input, context).await?;
    item_response(context, RUNTIME, Some(runtime.id.clone()), &runtime)
}

pub async fn handle_update<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    id: &str,
    input: RuntimeInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let runtime = handler.registry().update_runtime(id, input, context).await?;
    item_response(context, RUNTIME, Some(runtime.id.clone()), &runtime)
}

pub async fn handle_unregister<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let runtime = handler.registry().unregister_runtime(id, context).await?;
    item_response(context, RUNTIME, Some(runtime.id.clone()), &runtime)
}

/// A missing runtime is a successful lookup with `null` data.
pub async fn handle_get<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    id: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    match handler.registry().runtime(id, context).await {
        Ok(runtime) => item_response(context, RUNTIME, Some(runtime.id.clone()), &runtime),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(null_response(context, RUNTIME, id)),
        Err(e) => Err(e),
    }
}

pub async fn handle_list<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    filter: &[LabelFilter],
    page: &PageRequest,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let page = handler.registry().runtimes(filter, page, context).await?;
    page_response(context, RUNTIME, &page)
}

pub async fn handle_set_label<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    runtime_id: &str,
    key: &str,
    value: Vec<Value>,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let label = handler
        .registry()
        .set_runtime_label(runtime_id, key, value, context)
        .await?;
    item_response(context, LABEL, Some(runtime_id.to_string()), &label)
}

pub async fn handle_delete_label<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    runtime_id: &str,
    key: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let label = handler
        .registry()
        .delete_runtime_label(runtime_id, key, context)
        .await?;
    item_response(context, LABEL, Some(runtime_id.to_string()), &label)
}
