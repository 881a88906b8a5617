//! Common test utilities for registry testing.

use runtime_registry::storage::InMemoryStorage;
use runtime_registry::{Registry, RegistryBuilder, RequestContext, TenantContext};
use std::sync::Once;


static INIT_LOGGING: Once = Once::new();

/// Route `log` output through the test harness. Set `RUST_LOG` to see it.
pub fn init_logging() {
    INIT_LOGGING.call_once(|| {
        let _ = env_logger::builder().is_test(true).try_init();
    });
}

/// Registry over fresh in-memory storage with the default configuration.
pub fn create_registry() -> Registry<InMemoryStorage> {
    init_logging();
    Registry::new(InMemoryStorage::new())
}

/// Registry that does not assign the default scenario.
pub fn create_registry_without_scenarios() -> Registry<InMemoryStorage> {
    init_logging();
    RegistryBuilder::new(InMemoryStorage::new())
        .assign_default_scenario(false)
        .build()
        .expect("valid test configuration")
}

/// Request context for a tenant with a fresh request ID.
pub fn create_context(tenant_id: &str) -> RequestContext {
    RequestContext::with_generated_id(TenantContext::new(tenant_id, "test-client"))
}

/// Assert that a registry result failed with the given error kind.
#[macro_export]
macro_rules! assert_error_kind {
    ($result:expr, $kind:expr) => {
        match $result {
            Ok(value) => panic!("Expected {:?} error, got Ok({:?})", $kind, value),
            Err(error) => assert_eq!(
                error.kind(),
                $kind,
                "Expected {:?} error, got: {}",
                $kind,
                error
            ),
        }
    };
}
