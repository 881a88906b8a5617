//! Integration tests for the registry.
//!
//! Each module drives the public API the way a caller would: through a
//! [`Registry`](runtime_registry::Registry) or the operation handler, with a
//! request context per tenant.

pub mod api_auth;
pub mod concurrency;
pub mod operation_handler;
pub mod pagination;
pub mod runtime_lifecycle;
pub mod tenant_isolation;
