//! Framework-agnostic registry operation handler.
//!
//! This module maps serialized operation requests onto the [`Registry`] and
//! reports every outcome as a structured response, so a transport layer only
//! has to move JSON.
//!
//! # Key Types
//!
//! - [`RegistryOperationHandler`] - Main handler for processing operations
//! - [`OperationRequest`] - Operation, tenant and optional request ID
//! - [`OperationResponse`] - Data or error code, with metadata
//!
//! # Examples
//!
//! ```rust
//! use runtime_registry::operation_handler::{OperationRequest, RegistryOperationHandler};
//! use runtime_registry::Registry;
//! use runtime_registry::storage::InMemoryStorage;
//! use serde_json::json;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let handler = RegistryOperationHandler::new(Registry::new(InMemoryStorage::new()));
//!
//! let request: OperationRequest = serde_json::from_value(json!({
//!     "operation": "registerRuntime",
//!     "input": {"name": "runtime-1"},
//!     "tenant": {"tenantId": "tenant-a"}
//! }))?;
//! let response = handler.handle_operation(request).await;
//! assert!(response.success);
//! # Ok(())
//! # }
//! ```
//!
//! [`Registry`]: crate::Registry

mod builders;
mod core;
mod errors;
mod handlers;

pub use self::core::{
    Operation, OperationMetadata, OperationRequest, OperationResponse, RegistryOperationHandler,
};

pub use errors::create_error_response;
