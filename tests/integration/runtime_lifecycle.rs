//! Runtime registration, update, labelling and removal.

use crate::assert_error_kind;
use crate::common::fixtures::{runtime_input, strings};
use crate::common::{create_context, create_registry};
use runtime_registry::ErrorKind;
use runtime_registry::model::{Label, LabelFilter, RuntimeInput, StatusCondition};
use runtime_registry::pagination::PageRequest;
use serde_json::json;

#[tokio::test]
async fn test_runtime_with_label_then_new_label_has_three_labels() {
    let registry = create_registry();
    let context = create_context("tenant-a");

    let runtime = registry
        .register_runtime(
            RuntimeInput::new("runtime-1").with_label("ggg", strings(&["hhh"])),
            &context,
        )
        .await
        .unwrap();

    let label = registry
        .set_runtime_label(&runtime.id, "new_label", strings(&["bbb", "ccc"]), &context)
        .await
        .unwrap();
    assert_eq!(label, Label::new("new_label", strings(&["bbb", "ccc"])));

    let stored = registry.runtime(&runtime.id, &context).await.unwrap();
    let keys: Vec<&str> = stored.labels.keys().map(String::as_str).collect();
    assert_eq!(keys, vec!["ggg", "new_label", "scenarios"]);
    assert_eq!(stored.labels["ggg"], strings(&["hhh"]));
}

#[tokio::test]
async fn test_duplicate_runtime_name_is_not_unique() {
    let registry = create_registry();
    let context = create_context("tenant-a");

    registry
        .register_runtime(runtime_input("r1"), &context)
        .await
        .unwrap();
    let err = registry
        .register_runtime(runtime_input("r1"), &context)
        .await
        .unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Conflict);
    assert!(err.to_string().contains("not unique"));

    let page = registry
        .runtimes(&[], &PageRequest::default(), &context)
        .await
        .unwrap();
    assert_eq!(page.total_count, 1);
}

#[tokio::test]
async fn test_full_lifecycle() {
    let registry = create_registry();
    let context = create_context("tenant-a");

    let runtime = registry
        .register_runtime(runtime_input("r1"), &context)
        .await
        .unwrap();
    assert_eq!(runtime.status.condition, StatusCondition::Initial);

    let updated = registry
        .update_runtime(
            &runtime.id,
            RuntimeInput::new("r1")
                .with_status_condition(StatusCondition::Ready)
                .with_label("region", strings(&["eu"])),
            &context,
        )
        .await
        .unwrap();
    assert_eq!(updated.status.condition, StatusCondition::Ready);
    assert_eq!(updated.description, runtime.description);
    assert!(updated.status.timestamp >= runtime.status.timestamp);

    registry
        .delete_runtime_label(&runtime.id, "region", &context)
        .await
        .unwrap();
    assert_error_kind!(
        registry
            .delete_runtime_label(&runtime.id, "region", &context)
            .await,
        ErrorKind::NotFound
    );

    let removed = registry
        .unregister_runtime(&runtime.id, &context)
        .await
        .unwrap();
    assert_eq!(removed.id, runtime.id);
    assert_error_kind!(
        registry.runtime(&runtime.id, &context).await,
        ErrorKind::NotFound
    );

    // The name is free again
    registry
        .register_runtime(runtime_input("r1"), &context)
        .await
        .unwrap();
}

#[tokio::test]
async fn test_label_filters() {
    let registry = create_registry();
    let context = create_context("tenant-a");

    registry
        .register_runtime(
            RuntimeInput::new("eu-1").with_label("region", strings(&["eu", "global"])),
            &context,
        )
        .await
        .unwrap();
    registry
        .register_runtime(
            RuntimeInput::new("us-1").with_label("region", strings(&["us"])),
            &context,
        )
        .await
        .unwrap();
    registry
        .register_runtime(RuntimeInput::new("plain"), &context)
        .await
        .unwrap();

    let count = |filters: Vec<LabelFilter>| {
        let registry = &registry;
        let context = &context;
        async move {
            registry
                .runtimes(&filters, &PageRequest::default(), context)
                .await
                .unwrap()
                .total_count
        }
    };

    assert_eq!(count(vec![]).await, 3);
    assert_eq!(count(vec![LabelFilter::has_key("region")]).await, 2);
    assert_eq!(
        count(vec![LabelFilter::any_of("region", strings(&["global", "us"]))]).await,
        2
    );
    assert_eq!(
        count(vec![
            LabelFilter::has_key("region"),
            LabelFilter::any_of("region", vec![json!("eu")]),
        ])
        .await,
        1
    );
    assert_eq!(count(vec![LabelFilter::has_key("missing")]).await, 0);
}

#[tokio::test]
async fn test_label_values_must_be_scalars() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let runtime = registry
        .register_runtime(runtime_input("r1"), &context)
        .await
        .unwrap();

    assert_error_kind!(
        registry
            .set_runtime_label(&runtime.id, "nested", vec![json!({"a": 1})], &context)
            .await,
        ErrorKind::Validation
    );
    assert_error_kind!(
        registry
            .set_runtime_label(&runtime.id, "", strings(&["x"]), &context)
            .await,
        ErrorKind::Validation
    );
}
