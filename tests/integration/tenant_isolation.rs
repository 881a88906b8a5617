//! Cross-tenant visibility.

use crate::assert_error_kind;
use crate::common::fixtures::{application_input, basic_auth, runtime_input, strings};
use crate::common::{create_context, create_registry};
use runtime_registry::labels::LabelDefinitionInput;
use runtime_registry::pagination::PageRequest;
use runtime_registry::storage::StorageProvider;
use runtime_registry::{ErrorKind, RequestContext, TenantContext};

#[tokio::test]
async fn test_applications_for_runtime_stays_in_tenant() {
    let registry = create_registry();
    let tenant_a = create_context("tenant-a");
    let tenant_b = create_context("tenant-b");

    let runtime = registry
        .register_runtime(runtime_input("rt"), &tenant_a)
        .await
        .unwrap();
    let own = registry
        .register_application(application_input("own"), &tenant_a)
        .await
        .unwrap();
    // Same scenario, other tenant
    registry
        .register_application(application_input("foreign"), &tenant_b)
        .await
        .unwrap();

    let page = registry
        .applications_for_runtime(&runtime.id, &PageRequest::default(), &tenant_a)
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.data[0].id, own.id);

    // The runtime is invisible to tenant B
    assert_error_kind!(
        registry
            .applications_for_runtime(&runtime.id, &PageRequest::default(), &tenant_b)
            .await,
        ErrorKind::NotFound
    );
}

#[tokio::test]
async fn test_entities_invisible_across_tenants() {
    let registry = create_registry();
    let tenant_a = create_context("tenant-a");
    let tenant_b = create_context("tenant-b");

    let runtime = registry
        .register_runtime(runtime_input("shared-name"), &tenant_a)
        .await
        .unwrap();
    let application = registry
        .register_application(application_input("shop"), &tenant_a)
        .await
        .unwrap();
    let api_id = application.api_definitions[0].id.clone();

    // Names only need to be unique within a tenant
    registry
        .register_runtime(runtime_input("shared-name"), &tenant_b)
        .await
        .unwrap();

    assert_error_kind!(registry.runtime(&runtime.id, &tenant_b).await, ErrorKind::NotFound);
    assert_error_kind!(
        registry.application(&application.id, &tenant_b).await,
        ErrorKind::NotFound
    );
    assert_error_kind!(
        registry
            .set_runtime_label(&runtime.id, "k", strings(&["v"]), &tenant_b)
            .await,
        ErrorKind::NotFound
    );
    assert_error_kind!(
        registry
            .unregister_application(&application.id, &tenant_b)
            .await,
        ErrorKind::NotFound
    );
    assert_error_kind!(
        registry
            .set_api_auth(&api_id, &runtime.id, basic_auth(), &tenant_b)
            .await,
        ErrorKind::NotFound
    );

    let err = registry.runtime(&runtime.id, &tenant_b).await.unwrap_err();
    assert!(!err.to_string().contains("tenant-a"));

    let page = registry
        .runtimes(&[], &PageRequest::default(), &tenant_b)
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
    assert_ne!(page.data[0].id, runtime.id);
}

#[tokio::test]
async fn test_label_definitions_are_per_tenant() {
    let registry = create_registry();
    let tenant_a = create_context("tenant-a");
    let tenant_b = create_context("tenant-b");

    registry
        .create_label_definition(
            LabelDefinitionInput::new("tier").with_schema(serde_json::json!({
                "type": "string", "enum": ["gold"]
            })),
            &tenant_a,
        )
        .await
        .unwrap();

    assert_error_kind!(
        registry
            .register_runtime(runtime_input("rt").with_label("tier", strings(&["bronze"])), &tenant_a)
            .await,
        ErrorKind::Validation
    );
    registry
        .register_runtime(runtime_input("rt").with_label("tier", strings(&["bronze"])), &tenant_b)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_empty_tenant_rejected() {
    let registry = create_registry();
    let context = RequestContext::new("req-1", TenantContext::new("", "client"));

    assert_error_kind!(
        registry.register_runtime(runtime_input("rt"), &context).await,
        ErrorKind::Validation
    );
    assert_error_kind!(
        registry.label_definitions(&context).await,
        ErrorKind::Validation
    );
    assert!(registry.storage().list_tenants().await.unwrap().is_empty());
}
