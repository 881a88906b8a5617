//! Tenant isolation for registry operations.
//!
//! Every registry operation receives a [`RequestContext`] carrying the
//! caller's [`TenantContext`]. The tenant ID scopes every storage key, so
//! records with the same ID in different tenants never collide and lookups
//! never see data of another tenant.

pub mod context;

pub use context::{RequestContext, TenantContext};
