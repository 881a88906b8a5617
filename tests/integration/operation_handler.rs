//! JSON requests through the operation handler.

use crate::common::create_registry;
use runtime_registry::storage::InMemoryStorage;
use runtime_registry::pagination::PageRequest;
use runtime_registry::{Operation, OperationRequest, OperationResponse, RegistryOperationHandler};
use serde_json::{Value, json};

fn handler() -> RegistryOperationHandler<InMemoryStorage> {
    RegistryOperationHandler::new(create_registry())
}

async fn send(handler: &RegistryOperationHandler<InMemoryStorage>, request: Value) -> OperationResponse {
    let request: OperationRequest =
        serde_json::from_value(request).expect("request should deserialize");
    handler.handle_operation(request).await
}

fn id_of(response: &OperationResponse) -> String {
    response.data.as_ref().expect("response data")["id"]
        .as_str()
        .expect("id")
        .to_string()
}

#[tokio::test]
async fn test_runtime_and_application_flow() {
    let handler = handler();
    let tenant = json!({"tenantId": "tenant-a", "clientId": "console"});

    let runtime = send(
        &handler,
        json!({
            "operation": "registerRuntime",
            "input": {"name": "runtime-1", "labels": {"ggg": ["hhh"]}},
            "tenant": tenant
        }),
    )
    .await;
    assert!(runtime.success, "{:?}", runtime.error);
    let runtime_id = id_of(&runtime);

    let label = send(
        &handler,
        json!({
            "operation": "setRuntimeLabel",
            "runtimeId": runtime_id,
            "key": "new_label",
            "value": ["bbb"],
            "tenant": tenant
        }),
    )
    .await;
    assert_eq!(label.data.unwrap(), json!({"key": "new_label", "value": ["bbb"]}));

    let fetched = send(
        &handler,
        json!({"operation": "runtime", "id": runtime_id, "tenant": tenant}),
    )
    .await;
    let labels = fetched.data.unwrap()["labels"].clone();
    assert_eq!(labels.as_object().unwrap().len(), 3);

    let application = send(
        &handler,
        json!({
            "operation": "registerApplication",
            "input": {
                "name": "shop",
                "apiDefinitions": [{"name": "orders", "targetURL": "https://orders.example.com"}]
            },
            "tenant": tenant
        }),
    )
    .await;
    let application_id = id_of(&application);

    let api = send(
        &handler,
        json!({
            "operation": "addAPIDefinition",
            "applicationId": application_id,
            "input": {"name": "billing", "targetURL": "https://billing.example.com"},
            "tenant": tenant
        }),
    )
    .await;
    assert_eq!(api.metadata.resource_type.as_deref(), Some("APIDefinition"));
    let api_id = id_of(&api);

    let auth = send(
        &handler,
        json!({
            "operation": "setAPIAuth",
            "apiId": api_id,
            "runtimeId": runtime_id,
            "input": {
                "credential": {"basic": {"username": "admin", "password": "pwd"}},
                "additionalHeaders": {"X-Env": ["prod"]}
            },
            "tenant": tenant
        }),
    )
    .await;
    assert!(auth.success);

    let unregistered = send(
        &handler,
        json!({"operation": "unregisterRuntime", "id": runtime_id, "tenant": tenant}),
    )
    .await;
    assert!(unregistered.success);

    let response = send(
        &handler,
        json!({
            "operation": "deleteAPIAuth",
            "apiId": api_id,
            "runtimeId": runtime_id,
            "tenant": tenant
        }),
    )
    .await;
    assert!(!response.success);
    assert_eq!(response.error_code.as_deref(), Some("NOT_FOUND"));

    let response = send(
        &handler,
        json!({"operation": "deleteAPIDefinition", "id": api_id, "tenant": tenant}),
    )
    .await;
    assert!(response.success);

    let response = send(
        &handler,
        json!({"operation": "unregisterApplication", "id": application_id, "tenant": tenant}),
    )
    .await;
    assert!(response.success);

    let response = send(
        &handler,
        json!({"operation": "application", "id": application_id, "tenant": tenant}),
    )
    .await;
    assert_eq!(response.data, Some(Value::Null));
}

#[tokio::test]
async fn test_paging_through_handler() {
    let handler = handler();
    let tenant = json!({"tenantId": "tenant-a"});
    for i in 0..10 {
        let response = send(
            &handler,
            json!({
                "operation": "registerRuntime",
                "input": {"name": format!("runtime-{}", i)},
                "tenant": tenant
            }),
        )
        .await;
        assert!(response.success);
    }

    let mut after = String::new();
    let mut sizes = Vec::new();
    loop {
        let response = send(
            &handler,
            json!({"operation": "runtimes", "first": 3, "after": after, "tenant": tenant}),
        )
        .await;
        let data = response.data.unwrap();
        assert_eq!(data["totalCount"], 10);
        assert_eq!(data["pageInfo"]["startCursor"], json!(after));
        sizes.push(data["data"].as_array().unwrap().len());

        if data["pageInfo"]["hasNextPage"] == json!(false) {
            assert_eq!(data["pageInfo"]["endCursor"], "");
            break;
        }
        after = data["pageInfo"]["endCursor"].as_str().unwrap().to_string();
    }
    assert_eq!(sizes, vec![3, 3, 3, 1]);
}

#[tokio::test]
async fn test_label_definition_operations() {
    let handler = handler();
    let tenant = json!({"tenantId": "tenant-a"});

    let created = send(
        &handler,
        json!({
            "operation": "createLabelDefinition",
            "input": {"key": "tier", "schema": {"type": "string", "enum": ["gold", "silver"]}},
            "tenant": tenant
        }),
    )
    .await;
    assert!(created.success);
    assert_eq!(created.metadata.resource_id.as_deref(), Some("tier"));

    let updated = send(
        &handler,
        json!({
            "operation": "updateLabelDefinition",
            "input": {"key": "missing"},
            "tenant": tenant
        }),
    )
    .await;
    assert_eq!(updated.error_code.as_deref(), Some("NOT_FOUND"));

    let listed = send(
        &handler,
        json!({"operation": "labelDefinitions", "tenant": tenant}),
    )
    .await;
    assert_eq!(listed.metadata.resource_count, Some(1));

    let deleted = send(
        &handler,
        json!({"operation": "deleteLabelDefinition", "key": "tier", "tenant": tenant}),
    )
    .await;
    assert!(deleted.success);
    assert_eq!(deleted.metadata.operation, "deleteLabelDefinition");
}

#[tokio::test]
async fn test_malformed_requests_do_not_deserialize() {
    for request in [
        json!({"operation": "registerRuntime", "tenant": {"tenantId": "t"}}),
        json!({"operation": "runtime", "id": "1"}),
        json!({"id": "1", "tenant": {"tenantId": "t"}}),
    ] {
        assert!(serde_json::from_value::<OperationRequest>(request).is_err());
    }
}

#[tokio::test]
async fn test_built_request_echoes_request_id() {
    let handler = handler();
    let request = OperationRequest::for_tenant(
        Operation::list_applications(PageRequest::first(5)),
        "tenant-a",
    )
    .with_request_id("trace-42");

    let response = handler.handle_operation(request).await;
    assert!(response.success);
    assert_eq!(response.metadata.request_id, "trace-42");
    assert_eq!(response.metadata.tenant_id.as_deref(), Some("tenant-a"));
    assert_eq!(response.metadata.total_count, Some(0));
    assert_eq!(response.data.unwrap()["pageInfo"]["hasNextPage"], false);
}
