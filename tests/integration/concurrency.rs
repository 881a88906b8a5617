//! Concurrent writers within one tenant.

use crate::common::fixtures::{application_input, basic_auth, runtime_input, strings};
use crate::common::{create_context, create_registry};
use futures::future::join_all;
use runtime_registry::model::ApiDefinitionInput;
use runtime_registry::pagination::PageRequest;
use runtime_registry::storage::{InMemoryStorage, StorageKey, StorageProvider};
use runtime_registry::{ErrorKind, Registry, RequestContext};
use serde_json::Value;
use std::collections::{HashMap, HashSet};

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_registration_with_same_name() {
    let registry = create_registry();

    let handles: Vec<_> = (0..16)
        .map(|i| {
            let registry = registry.clone();
            tokio::spawn(async move {
                let context = create_context("tenant-a");
                registry
                    .register_runtime(runtime_input("contended"), &context)
                    .await
                    .map(|_| i)
            })
        })
        .collect();

    let results: Vec<_> = join_all(handles)
        .await
        .into_iter()
        .map(|joined| joined.expect("task panicked"))
        .collect();

    let successes = results.iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1);
    for err in results.into_iter().filter_map(Result::err) {
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(err.to_string().contains("not unique"));
    }

    let page = registry
        .runtimes(&[], &PageRequest::default(), &create_context("tenant-a"))
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
}

#[tokio::test]
async fn test_concurrent_label_writes_all_land() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let runtime = registry
        .register_runtime(runtime_input("rt"), &context)
        .await
        .unwrap();

    let keys: Vec<String> = (0..4).map(|i| format!("key-{}", i)).collect();
    let writes = keys.iter().map(|key| {
        registry.set_runtime_label(&runtime.id, key, strings(&["v"]), &context)
    });
    for result in join_all(writes).await {
        result.unwrap();
    }

    let stored = registry.runtime(&runtime.id, &context).await.unwrap();
    for key in &keys {
        assert!(stored.labels.contains_key(key), "label {} was lost", key);
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_auth_racing_runtime_removal_leaves_no_orphans() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let application = registry
        .register_application(application_input("shop"), &context)
        .await
        .unwrap();
    let api_id = application.api_definitions[0].id.clone();

    for round in 0..8 {
        let runtime = registry
            .register_runtime(runtime_input(&format!("rt-{}", round)), &context)
            .await
            .unwrap();

        let set = {
            let registry = registry.clone();
            let context = context.clone();
            let api_id = api_id.clone();
            let runtime_id = runtime.id.clone();
            tokio::spawn(async move {
                registry
                    .set_api_auth(&api_id, &runtime_id, basic_auth(), &context)
                    .await
            })
        };
        let remove = {
            let registry = registry.clone();
            let context = context.clone();
            let runtime_id = runtime.id.clone();
            tokio::spawn(async move { registry.unregister_runtime(&runtime_id, &context).await })
        };

        let _ = set.await.expect("task panicked");
        remove.await.expect("task panicked").unwrap();
    }

    // Whatever the interleaving, no binding outlives its runtime
    assert!(registry.api_auths(&api_id, &context).await.unwrap().is_empty());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_many_writers_on_one_runtime_all_succeed() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let runtime = registry
        .register_runtime(runtime_input("busy"), &context)
        .await
        .unwrap();

    for round in 0..5 {
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let registry = registry.clone();
                let context = context.clone();
                let runtime_id = runtime.id.clone();
                tokio::spawn(async move {
                    registry
                        .set_runtime_label(
                            &runtime_id,
                            &format!("key-{}-{}", round, i),
                            strings(&["v"]),
                            &context,
                        )
                        .await
                })
            })
            .collect();

        for joined in join_all(handles).await {
            joined.expect("task panicked").unwrap();
        }
    }

    let stored = registry.runtime(&runtime.id, &context).await.unwrap();
    // 320 written labels plus the default scenarios label
    assert_eq!(stored.labels.len(), 321);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_binding_writers_never_see_version_conflicts() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let application = registry
        .register_application(application_input("shop"), &context)
        .await
        .unwrap();
    let api_id = application.api_definitions[0].id.clone();
    let runtime = registry
        .register_runtime(runtime_input("rt"), &context)
        .await
        .unwrap();

    let handles: Vec<_> = (0..48)
        .map(|i| {
            let registry = registry.clone();
            let context = context.clone();
            let api_id = api_id.clone();
            let runtime_id = runtime.id.clone();
            tokio::spawn(async move {
                if i % 2 == 0 {
                    registry
                        .set_api_auth(&api_id, &runtime_id, basic_auth(), &context)
                        .await
                } else {
                    registry.delete_api_auth(&api_id, &runtime_id, &context).await
                }
            })
        })
        .collect();

    for joined in join_all(handles).await {
        if let Err(err) = joined.expect("task panicked") {
            // A delete may find nothing to remove
            assert_eq!(err.kind(), ErrorKind::NotFound);
        }
    }
}

async fn stored_records(
    registry: &Registry<InMemoryStorage>,
    tenant_id: &str,
    resource_type: &str,
) -> Vec<Value> {
    registry
        .storage()
        .list(StorageKey::prefix(tenant_id, resource_type), 0, usize::MAX)
        .await
        .unwrap()
        .into_iter()
        .map(|(_, data)| data)
        .collect()
}

/// Every API index belongs to a stored application and every binding to a
/// stored runtime and API.
async fn assert_consistent(registry: &Registry<InMemoryStorage>, context: &RequestContext) {
    let tenant_id = context.tenant_id();

    let mut expected_indexes = HashMap::new();
    for application in stored_records(registry, tenant_id, "Application").await {
        for api in application["apiDefinitions"].as_array().unwrap() {
            expected_indexes.insert(
                api["id"].as_str().unwrap().to_string(),
                application["id"].as_str().unwrap().to_string(),
            );
        }
    }
    let indexes: HashMap<String, String> = stored_records(registry, tenant_id, "APIDefinition")
        .await
        .into_iter()
        .map(|index| {
            (
                index["id"].as_str().unwrap().to_string(),
                index["applicationId"].as_str().unwrap().to_string(),
            )
        })
        .collect();
    assert_eq!(indexes, expected_indexes);

    let runtimes: HashSet<String> = stored_records(registry, tenant_id, "Runtime")
        .await
        .into_iter()
        .map(|runtime| runtime["id"].as_str().unwrap().to_string())
        .collect();
    for binding in stored_records(registry, tenant_id, "APIRuntimeAuth").await {
        assert!(runtimes.contains(binding["runtimeId"].as_str().unwrap()));
        assert!(indexes.contains_key(binding["apiId"].as_str().unwrap()));
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_aborted_writes_leave_no_partial_state() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let shop = registry
        .register_application(application_input("shop"), &context)
        .await
        .unwrap();
    let api_id = shop.api_definitions[0].id.clone();

    for round in 0..24 {
        let register = {
            let registry = registry.clone();
            let context = context.clone();
            tokio::spawn(async move {
                let input = application_input(&format!("app-{}", round))
                    .with_api_definition(ApiDefinitionInput::new(
                        "second",
                        "https://second.example.com",
                    ));
                registry.register_application(input, &context).await
            })
        };

        let runtime = registry
            .register_runtime(runtime_input(&format!("rt-{}", round)), &context)
            .await
            .unwrap();
        registry
            .set_api_auth(&api_id, &runtime.id, basic_auth(), &context)
            .await
            .unwrap();
        let unregister = {
            let registry = registry.clone();
            let context = context.clone();
            let runtime_id = runtime.id.clone();
            tokio::spawn(async move { registry.unregister_runtime(&runtime_id, &context).await })
        };

        for _ in 0..(round % 4) {
            tokio::task::yield_now().await;
        }
        register.abort();
        unregister.abort();
        // Either cancelled or finished; a finished write must have succeeded
        if let Ok(result) = register.await {
            result.unwrap();
        }
        if let Ok(result) = unregister.await {
            result.unwrap();
        }

        assert_consistent(&registry, &context).await;
    }

    // Cancelled writes release their locks
    let runtime = registry
        .register_runtime(runtime_input("after"), &context)
        .await
        .unwrap();
    registry
        .set_runtime_label(&runtime.id, "k", strings(&["v"]), &context)
        .await
        .unwrap();
    registry.unregister_runtime(&runtime.id, &context).await.unwrap();
    assert_consistent(&registry, &context).await;
}
