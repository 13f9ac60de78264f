use timekeeper_engine::PageCollector;
use timekeeper_notify::MemoryNotifier;

use crate::helpers::{child, Call, FakeStore};

#[tokio::test]
async fn collects_union_of_full_and_short_pages() {
    let store = FakeStore::new().with_children("t-1", 450).with_children("t-2", 5);

    let children = PageCollector::new(&store).collect("t-1").await.unwrap();

    assert_eq!(children.len(), 450);
    assert!(children.iter().all(|c| c.parent_id == "t-1"));
    assert_eq!(children[0].id, "t-1-c0");
    assert_eq!(children[449].id, "t-1-c449");
    assert_eq!(
        store.calls(),
        vec![
            Call::ListInstances { page: 0, size: 200, parent: Some("t-1".into()) },
            Call::ListInstances { page: 1, size: 200, parent: Some("t-1".into()) },
            Call::ListInstances { page: 2, size: 200, parent: Some("t-1".into()) },
        ]
    );
}

#[tokio::test]
async fn exact_multiple_costs_one_extra_request() {
    let store = FakeStore::new().with_children("t-1", 400);

    let children = PageCollector::new(&store).collect("t-1").await.unwrap();

    assert_eq!(children.len(), 400);
    assert_eq!(store.instance_listings(), 3);
}

#[tokio::test]
async fn no_children_means_one_request() {
    let store = FakeStore::new();

    let children = PageCollector::new(&store).collect("t-empty").await.unwrap();

    assert!(children.is_empty());
    assert_eq!(store.instance_listings(), 1);
}

#[tokio::test]
async fn duplicates_across_pages_are_dropped() {
    let store = FakeStore::new().scripted_pages(vec![
        vec![child("a", "t"), child("b", "t")],
        vec![child("b", "t"), child("c", "t")],
        vec![child("d", "t")],
    ]);

    let children = PageCollector::new(&store)
        .page_size(2)
        .collect("t")
        .await
        .unwrap();

    let ids: Vec<&str> = children.iter().map(|c| c.id.as_str()).collect();
    assert_eq!(ids, ["a", "b", "c", "d"]);
    assert_eq!(store.instance_listings(), 3);
}

#[tokio::test]
async fn stops_when_backend_repeats_the_same_page() {
    let page = vec![child("a", "t"), child("b", "t")];
    let store = FakeStore::new().scripted_pages(vec![page.clone(), page.clone(), page]);

    let children = PageCollector::new(&store)
        .page_size(2)
        .collect("t")
        .await
        .unwrap();

    assert_eq!(children.len(), 2);
    assert_eq!(store.instance_listings(), 2);
}

#[tokio::test]
async fn fails_fast_on_first_error() {
    let store = FakeStore::new().with_children("t-1", 450).failing_page(1);

    let err = PageCollector::new(&store).collect("t-1").await.unwrap_err();

    assert_eq!(err.status(), Some(500));
    assert_eq!(store.instance_listings(), 2);
}

#[tokio::test]
async fn reports_progress_for_large_parents() {
    let store = FakeStore::new().with_children("t-1", 450);
    let notices = MemoryNotifier::new();

    PageCollector::new(&store)
        .with_progress(&notices)
        .collect("t-1")
        .await
        .unwrap();

    assert_eq!(
        notices.messages(),
        vec!["Fetching instances... (400 so far)", "Found 450 total instances"]
    );
}

#[tokio::test]
async fn small_parents_report_nothing() {
    let store = FakeStore::new().with_children("t-1", 120);
    let notices = MemoryNotifier::new();

    PageCollector::new(&store)
        .with_progress(&notices)
        .collect("t-1")
        .await
        .unwrap();

    assert!(notices.messages().is_empty());
}
