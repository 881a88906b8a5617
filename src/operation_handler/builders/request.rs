//! Request builder utilities for OperationRequest
//!
//! Convenience constructors for building requests in code rather than
//! deserializing them.

use crate::operation_handler::core::{Operation, OperationRequest};
use crate::pagination::PageRequest;
use crate::tenant::TenantContext;

impl OperationRequest {
    /// Create a request for an operation on behalf of a tenant.
    pub fn new(operation: Operation, tenant: TenantContext) -> Self {
        Self {
            operation,
            tenant,
            request_id: None,
        }
    }

    /// Create a request for a tenant identified only by its ID.
    pub fn for_tenant(operation: Operation, tenant_id: impl Into<String>) -> Self {
        Self::new(operation, TenantContext::new(tenant_id, ""))
    }

    /// Set the request ID used for logging and response metadata.
    pub fn with_request_id(mut self, request_id: impl Into<String>) -> Self {
        self.request_id = Some(request_id.into());
        self
    }
}

impl Operation {
    /// `runtimes` with every runtime matching and the given page.
    pub fn list_runtimes(page: PageRequest) -> Self {
        Operation::Runtimes {
            filter: Vec::new(),
            first: page.first,
            after: page.after,
        }
    }

    /// `applications` with every application matching and the given page.
    pub fn list_applications(page: PageRequest) -> Self {
        Operation::Applications {
            filter: Vec::new(),
            first: page.first,
            after: page.after,
        }
    }
}
