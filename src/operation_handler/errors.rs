//! Error handling utilities for operation handlers
//!
//! This module turns registry errors into failed operation responses.

use crate::error::{ErrorKind, RegistryError};
use crate::operation_handler::core::{OperationResponse, metadata};
use crate::tenant::RequestContext;
use serde_json::Value;

/// Create an error response from a RegistryError.
///
/// Internal failures are reported without their details.
pub fn create_error_response(error: RegistryError, context: &RequestContext) -> OperationResponse {
    let kind = error.kind();
    let message = match kind {
        ErrorKind::Internal => "Internal error while processing the operation".to_string(),
        _ => error.to_string(),
    };

    let mut metadata = metadata(context);
    if let RegistryError::NotFound { resource_type, id } = &error {
        metadata.resource_type = Some(resource_type.clone());
        metadata.resource_id = Some(id.clone());
    }
    if let RegistryError::Validation(validation) = &error {
        metadata
            .additional
            .insert("details".to_string(), Value::String(validation.to_string()));
    }

    OperationResponse {
        success: false,
        data: None,
        error: Some(message),
        error_code: Some(kind.code().to_string()),
        metadata,
    }
}
