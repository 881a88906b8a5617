//! Multi-tenant registry of runtimes and applications.
//!
//! Tracks runtimes, applications with their API definitions, labels on both
//! kinds of entity, tenant-defined label schemas and the credentials a
//! runtime uses to call an application's API. Every operation is scoped to
//! the tenant of its [`RequestContext`].
//!
//! # Core Components
//!
//! - [`Registry`] - Registry operations over a pluggable storage backend
//! - [`StorageProvider`](storage::StorageProvider) - Trait for implementing storage backends
//! - [`RegistryOperationHandler`] - Transport-agnostic request/response dispatcher
//!
//! # Quick Start
//!
//! ```rust
//! use runtime_registry::{RegistryBuilder, RequestContext};
//! use runtime_registry::model::{ApiDefinitionInput, ApplicationRegisterInput, RuntimeInput};
//! use runtime_registry::pagination::PageRequest;
//! use runtime_registry::storage::InMemoryStorage;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let registry = RegistryBuilder::new(InMemoryStorage::new()).build()?;
//! let context = RequestContext::for_tenant("tenant-a");
//!
//! let runtime = registry.register_runtime(RuntimeInput::new("runtime-1"), &context).await?;
//! registry
//!     .register_application(
//!         ApplicationRegisterInput::new("shop")
//!             .with_api_definition(ApiDefinitionInput::new("orders", "https://orders.example.com")),
//!         &context,
//!     )
//!     .await?;
//!
//! // Both carry the DEFAULT scenario, so the runtime sees the application
//! let page = registry
//!     .applications_for_runtime(&runtime.id, &PageRequest::default(), &context)
//!     .await?;
//! assert_eq!(page.total_count, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod labels;
pub mod model;
pub mod operation_handler;
pub mod pagination;
pub mod registry;
pub mod storage;
pub mod tenant;

// Re-export commonly used types for convenience
pub use config::RegistryConfig;
pub use error::{
    BuildError, BuildResult, ErrorKind, RegistryError, RegistryResult, ValidationError,
    ValidationResult,
};
pub use registry::{Registry, RegistryBuilder};
pub use tenant::{RequestContext, TenantContext};

pub use operation_handler::{
    Operation, OperationMetadata, OperationRequest, OperationResponse, RegistryOperationHandler,
};
