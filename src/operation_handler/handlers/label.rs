//! Label definition operation handlers

use crate::error::RegistryResult;
use crate::labels::LabelDefinitionInput;
use crate::operation_handler::core::{
    OperationResponse, RegistryOperationHandler, item_response, list_response, null_response,
};
use crate::storage::{StorageError, StorageProvider};
use crate::tenant::RequestContext;

const LABEL_DEFINITION: &str = "LabelDefinition";

pub async fn handle_create<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    input: LabelDefinitionInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let definition = handler
        .registry()
        .create_label_definition(input, context)
        .await?;
    item_response(context, LABEL_DEFINITION, Some(definition.key.clone()), &definition)
}

pub async fn handle_update<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    input: LabelDefinitionInput,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let definition = handler
        .registry()
        .update_label_definition(input, context)
        .await?;
    item_response(context, LABEL_DEFINITION, Some(definition.key.clone()), &definition)
}

pub async fn handle_get<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    key: &str,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    match handler.registry().label_definition(key, context).await? {
        Some(definition) => item_response(context, LABEL_DEFINITION, Some(key.to_string()), &definition),
        None => Ok(null_response(context, LABEL_DEFINITION, key)),
    }
}

pub async fn handle_list<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let definitions = handler.registry().label_definitions(context).await?;
    list_response(context, LABEL_DEFINITION, &definitions)
}

pub async fn handle_delete<S: StorageProvider<Error = StorageError>>(
    handler: &RegistryOperationHandler<S>,
    key: &str,
    delete_related_labels: bool,
    context: &RequestContext,
) -> RegistryResult<OperationResponse> {
    let definition = handler
        .registry()
        .delete_label_definition(key, delete_related_labels, context)
        .await?;
    item_response(context, LABEL_DEFINITION, Some(definition.key.clone()), &definition)
}
