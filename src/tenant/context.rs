//! Request and tenant context types.

use crate::error::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Tenant context for multi-tenant operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TenantContext {
    pub tenant_id: String,
    #[serde(default)]
    pub client_id: String,
}

impl TenantContext {
    /// Create a new tenant context
    pub fn new(tenant_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            tenant_id: tenant_id.into(),
            client_id: client_id.into(),
        }
    }

    /// Check that the tenant ID can scope storage keys.
    pub fn validate(&self) -> ValidationResult<()> {
        if self.tenant_id.trim().is_empty() {
            return Err(ValidationError::missing_required("tenant"));
        }
        if self.tenant_id.contains('/') {
            return Err(ValidationError::invalid_field(
                "tenant",
                "must not contain '/'",
            ));
        }
        Ok(())
    }
}

/// Request context for registry operations.
///
/// Provides request tracking for logging and the tenant every operation is
/// scoped to. There is no tenant-less context: the registry rejects a context
/// whose tenant ID is empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Unique identifier for this request
    pub request_id: String,
    /// Tenant the request acts on
    pub tenant: TenantContext,
}

impl RequestContext {
    /// Create a new request context with a specific request ID.
    pub fn new(request_id: impl Into<String>, tenant: TenantContext) -> Self {
        Self {
            request_id: request_id.into(),
            tenant,
        }
    }

    /// Create a new request context with a generated request ID.
    pub fn with_generated_id(tenant: TenantContext) -> Self {
        Self::new(Uuid::new_v4().to_string(), tenant)
    }

    /// Shorthand for a context with a generated request ID and no client ID.
    pub fn for_tenant(tenant_id: impl Into<String>) -> Self {
        Self::with_generated_id(TenantContext::new(tenant_id, ""))
    }

    /// Get the tenant ID.
    pub fn tenant_id(&self) -> &str {
        &self.tenant.tenant_id
    }

    /// Get the client ID.
    pub fn client_id(&self) -> &str {
        &self.tenant.client_id
    }
}
