//! Cursor paging over registered entities.

use crate::assert_error_kind;
use crate::common::fixtures::runtime_input;
use crate::common::{create_context, create_registry};
use proptest::prelude::*;
use runtime_registry::pagination::PageRequest;
use runtime_registry::storage::InMemoryStorage;
use runtime_registry::{ErrorKind, Registry, RequestContext};
use std::collections::HashSet;

async fn register_runtimes(
    registry: &Registry<InMemoryStorage>,
    context: &RequestContext,
    count: usize,
) -> Vec<String> {
    let mut ids = Vec::with_capacity(count);
    for i in 0..count {
        let runtime = registry
            .register_runtime(runtime_input(&format!("runtime-{}", i)), context)
            .await
            .unwrap();
        ids.push(runtime.id);
    }
    ids.sort();
    ids
}

/// Walk every page and return the page sizes and the IDs in order.
async fn walk_pages(
    registry: &Registry<InMemoryStorage>,
    context: &RequestContext,
    size: usize,
) -> (Vec<usize>, Vec<String>) {
    let mut request = PageRequest::first(size);
    let mut sizes = Vec::new();
    let mut ids = Vec::new();

    loop {
        let page = registry.runtimes(&[], &request, context).await.unwrap();
        assert_eq!(
            page.page_info.start_cursor,
            request.after.clone().unwrap_or_default()
        );
        sizes.push(page.data.len());
        ids.extend(page.data.into_iter().map(|runtime| runtime.id));

        if !page.page_info.has_next_page {
            assert_eq!(page.page_info.end_cursor, "");
            break;
        }
        assert!(!page.page_info.end_cursor.is_empty());
        request = PageRequest::first(size).after(page.page_info.end_cursor);
    }

    (sizes, ids)
}

#[tokio::test]
async fn test_ten_runtimes_in_pages_of_three() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let expected = register_runtimes(&registry, &context, 10).await;

    let first = registry
        .runtimes(&[], &PageRequest::first(3), &context)
        .await
        .unwrap();
    assert_eq!(first.total_count, 10);
    assert_eq!(first.page_info.start_cursor, "");
    assert!(first.page_info.has_next_page);

    let (sizes, ids) = walk_pages(&registry, &context, 3).await;
    assert_eq!(sizes, vec![3, 3, 3, 1]);
    assert_eq!(ids, expected);
}

#[tokio::test]
async fn test_page_arguments_are_validated() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    register_runtimes(&registry, &context, 2).await;

    assert_error_kind!(
        registry
            .runtimes(&[], &PageRequest::first(0), &context)
            .await,
        ErrorKind::Validation
    );
    assert_error_kind!(
        registry
            .runtimes(&[], &PageRequest::first(501), &context)
            .await,
        ErrorKind::Validation
    );
    assert_error_kind!(
        registry
            .runtimes(&[], &PageRequest::first(2).after("garbage!"), &context)
            .await,
        ErrorKind::Validation
    );

    // An empty cursor means the first page
    let page = registry
        .runtimes(&[], &PageRequest::first(2).after(""), &context)
        .await
        .unwrap();
    assert_eq!(page.data.len(), 2);
}

#[tokio::test]
async fn test_cursor_stays_valid_after_deletion() {
    let registry = create_registry();
    let context = create_context("tenant-a");
    let ids = register_runtimes(&registry, &context, 6).await;

    let first = registry
        .runtimes(&[], &PageRequest::first(2), &context)
        .await
        .unwrap();
    registry.unregister_runtime(&ids[1], &context).await.unwrap();

    let second = registry
        .runtimes(
            &[],
            &PageRequest::first(2).after(first.page_info.end_cursor),
            &context,
        )
        .await
        .unwrap();
    let second_ids: Vec<&str> = second.data.iter().map(|runtime| runtime.id.as_str()).collect();
    assert_eq!(second_ids, vec![ids[2].as_str(), ids[3].as_str()]);
    assert_eq!(second.total_count, 5);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn prop_pages_cover_every_runtime_once(count in 0usize..25, size in 1usize..8) {
        let (sizes, ids, expected) = tokio_test::block_on(async {
            let registry = create_registry();
            let context = create_context("tenant-prop");
            let expected = register_runtimes(&registry, &context, count).await;
            let (sizes, ids) = walk_pages(&registry, &context, size).await;
            (sizes, ids, expected)
        });

        let expected_pages = count.div_ceil(size).max(1);
        prop_assert_eq!(sizes.len(), expected_pages);
        prop_assert!(sizes.iter().all(|s| *s <= size));
        let unique: HashSet<&String> = ids.iter().collect();
        prop_assert_eq!(unique.len(), ids.len());
        prop_assert_eq!(ids, expected);
    }
}
