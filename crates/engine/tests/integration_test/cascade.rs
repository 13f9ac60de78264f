use timekeeper_core::{InstanceStatus, ParentKind};
use timekeeper_engine::{Cascade, CascadeAction, Classification, ErrorKind, ParentView, Removal};
use timekeeper_notify::{MemoryNotifier, Severity};
use timekeeper_store::BulkAction;

use crate::helpers::{parent, Call, FakeStore};

async fn loaded_view(store: &FakeStore, kind: ParentKind, select: &[&str]) -> ParentView {
    let mut view = ParentView::new(kind);
    view.refresh(store).await.unwrap();
    view.select(select);
    view
}

#[tokio::test]
async fn suspend_with_120_children_uses_one_bulk_call() {
    let store = FakeStore::new()
        .with_parent(parent("p", "Nightly settlement"))
        .with_children("p", 120);
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &["p"]).await;

    let report = Cascade::new(&store, &notices, ParentKind::Template)
        .suspend(&mut view)
        .await
        .unwrap();

    assert_eq!(report.summary.classification, Classification::AllSucceeded);
    assert_eq!(report.summary.children_affected, 120);
    assert_eq!(
        store.count_calls(|c| matches!(c, Call::UpdateParent { suspended: true, .. })),
        1
    );
    assert_eq!(store.instance_listings(), 1);
    let bulk: Vec<Call> = store
        .calls()
        .into_iter()
        .filter(|c| matches!(c, Call::Bulk { .. }))
        .collect();
    assert_eq!(bulk.len(), 1);
    match &bulk[0] {
        Call::Bulk { action, ids } => {
            assert_eq!(*action, BulkAction::Suspend);
            assert_eq!(ids.len(), 120);
        }
        other => panic!("unexpected call {other:?}"),
    }

    assert!(store.parent("p").unwrap().suspended);
    assert_eq!(store.child_status("p-c119"), Some(InstanceStatus::Suspended));
    assert!(view.find("p").unwrap().suspended);
    assert!(view.selected_ids().is_empty());
    assert_eq!(
        notices.messages(),
        vec!["1 template(s) and 120 instance(s) suspended successfully"]
    );
}

#[tokio::test]
async fn failing_parent_is_isolated_and_stays_selected() {
    let store = FakeStore::new()
        .with_parent(parent("a", "Alpha"))
        .with_parent(parent("b", "Beta"))
        .with_children("b", 3)
        .failing_parent("a");
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &["a", "b"]).await;

    let report = Cascade::new(&store, &notices, ParentKind::Template)
        .suspend(&mut view)
        .await
        .unwrap();

    let a = &report.outcomes[0];
    let b = &report.outcomes[1];
    assert_eq!(a.parent_id, "a");
    assert!(!a.parent_succeeded);
    assert!(b.parent_succeeded);
    assert_eq!(b.child_ids_affected.len(), 3);
    assert_eq!(report.summary.classification, Classification::Partial);

    assert_eq!(view.selected_ids(), ["a"]);
    assert!(!view.find("a").unwrap().suspended);
    assert!(view.find("b").unwrap().suspended);

    let last = notices.last().unwrap();
    assert_eq!(last.severity, Severity::Error);
    assert_eq!(
        last.message,
        "Suspended 1 of 2 template(s) and 3 instance(s); 1 failed: HTTP 500: Internal Server Error"
    );
}

#[tokio::test]
async fn all_parents_failing_reports_failure() {
    let store = FakeStore::new()
        .with_parent(parent("a", "Alpha"))
        .failing_parent("a");
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &["a"]).await;

    let report = Cascade::new(&store, &notices, ParentKind::Template)
        .resume(&mut view)
        .await
        .unwrap();

    assert_eq!(report.summary.classification, Classification::AllFailed);
    assert_eq!(view.selected_ids(), ["a"]);
    assert_eq!(store.instance_listings(), 0);
    assert_eq!(
        notices.messages(),
        vec!["Failed to resume templates: HTTP 500: Internal Server Error"]
    );
}

#[tokio::test]
async fn child_bulk_failure_is_partial() {
    let store = FakeStore::new()
        .with_parent(parent("p", "Payroll"))
        .with_children("p", 4)
        .failing_bulk();
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &["p"]).await;

    let report = Cascade::new(&store, &notices, ParentKind::Template)
        .suspend(&mut view)
        .await
        .unwrap();

    let outcome = &report.outcomes[0];
    assert!(outcome.parent_succeeded);
    assert!(!outcome.child_operation_succeeded);
    assert!(outcome.child_ids_affected.is_empty());
    assert_eq!(report.summary.classification, Classification::Partial);
    assert!(view.find("p").unwrap().suspended);
    assert!(view.selected_ids().is_empty());
}

#[tokio::test]
async fn update_passes_unknown_fields_through() {
    let mut record = parent("p", "Quarterly close");
    record.cron_expression = Some("0 0 1 */3 *".into());
    record
        .extra
        .insert("owner".into(), serde_json::json!("finance-ops"));
    let store = FakeStore::new().with_parent(record);
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &["p"]).await;

    Cascade::new(&store, &notices, ParentKind::Template)
        .suspend(&mut view)
        .await
        .unwrap();

    let stored = store.parent("p").unwrap();
    assert!(stored.suspended);
    assert_eq!(stored.cron_expression.as_deref(), Some("0 0 1 */3 *"));
    assert_eq!(stored.extra["owner"], "finance-ops");
    assert_eq!(
        notices.messages(),
        vec!["1 template(s) and 0 instance(s) suspended successfully"]
    );
}

#[tokio::test]
async fn timers_do_not_cascade_to_instances() {
    let store = FakeStore::new()
        .with_parent(parent("t", "Morning batch"))
        .with_children("t", 10);
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Timer, &["t"]).await;

    let report = Cascade::new(&store, &notices, ParentKind::Timer)
        .suspend(&mut view)
        .await
        .unwrap();

    assert_eq!(report.summary.classification, Classification::AllSucceeded);
    assert_eq!(store.instance_listings(), 0);
    assert_eq!(notices.messages(), vec!["1 timer(s) suspended successfully"]);
}

#[tokio::test]
async fn empty_selection_is_a_no_op() {
    let store = FakeStore::new().with_parent(parent("p", "Unused"));
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &[]).await;
    let calls_before = store.calls().len();

    let report = Cascade::new(&store, &notices, ParentKind::Template)
        .run(&mut view, CascadeAction::Delete)
        .await;

    assert!(report.is_none());
    assert_eq!(store.calls().len(), calls_before);
    assert!(notices.messages().is_empty());
}

#[tokio::test]
async fn delete_falls_back_to_local_removal() {
    let store = FakeStore::new()
        .with_parent(parent("x", "Legacy export"))
        .with_parent(parent("y", "Daily report"))
        .with_parent(parent("z", "Kept"))
        .failing_delete("x", 404);
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &["x", "y"]).await;

    let report = Cascade::new(&store, &notices, ParentKind::Template)
        .delete(&mut view)
        .await
        .unwrap();

    assert_eq!(report.summary.classification, Classification::Mixed);
    assert_eq!(report.outcomes[0].removal, Some(Removal::LocalFallback));
    assert_eq!(
        report.outcomes[0].error,
        Some(ErrorKind::Unsupported { status: 404 })
    );
    assert_eq!(report.outcomes[1].removal, Some(Removal::Backend));

    let remaining: Vec<&str> = view.rows().iter().map(|r| r.id.as_str()).collect();
    assert_eq!(remaining, ["z"]);
    assert!(view.selected_ids().is_empty());
    assert_eq!(
        notices.messages(),
        vec![
            "Deleting 2 template(s): Legacy export, Daily report",
            "Partially successful: 1 deleted via backend, 1 removed locally",
        ]
    );
}

#[tokio::test]
async fn delete_server_error_is_network_kind() {
    let store = FakeStore::new()
        .with_parent(parent("x", "Legacy export"))
        .failing_delete("x", 500);
    let notices = MemoryNotifier::new();
    let mut view = loaded_view(&store, ParentKind::Template, &["x"]).await;

    let report = Cascade::new(&store, &notices, ParentKind::Template)
        .delete(&mut view)
        .await
        .unwrap();

    assert_eq!(report.summary.classification, Classification::AllLocalFallback);
    assert!(matches!(
        report.outcomes[0].error,
        Some(ErrorKind::Network { status: Some(500), .. })
    ));
    assert!(view.rows().is_empty());
    assert_eq!(
        notices.last().unwrap().message,
        "Backend delete not available, removed 1 template(s) locally only"
    );
}

#[tokio::test]
async fn trigger_single_uses_per_id_endpoint() {
    let store = FakeStore::new()
        .with_parent(parent("t1", "Morning batch"))
        .with_parent(parent("t2", "Evening batch"));
    let notices = MemoryNotifier::new();
    let view = loaded_view(&store, ParentKind::Timer, &["t1"]).await;

    let triggered = Cascade::new(&store, &notices, ParentKind::Timer)
        .trigger(&view)
        .await
        .unwrap()
        .unwrap();

    assert_eq!(triggered, 1);
    assert_eq!(store.count_calls(|c| *c == Call::TriggerParent("t1".into())), 1);
    assert_eq!(view.selected_ids(), ["t1"]);
    assert_eq!(
        notices.messages(),
        vec!["Triggering 1 timer(s)...", "Triggered 1 timer(s)"]
    );
}

#[tokio::test]
async fn trigger_many_uses_bulk_endpoint() {
    let store = FakeStore::new()
        .with_parent(parent("t1", "Morning batch"))
        .with_parent(parent("t2", "Evening batch"))
        .failing_trigger();
    let notices = MemoryNotifier::new();
    let view = loaded_view(&store, ParentKind::Timer, &["t1", "t2"]).await;

    let result = Cascade::new(&store, &notices, ParentKind::Timer)
        .trigger(&view)
        .await
        .unwrap();

    assert!(result.is_err());
    assert_eq!(
        store.count_calls(|c| *c == Call::TriggerParents(vec!["t1".into(), "t2".into()])),
        1
    );
    assert_eq!(
        notices.last().unwrap().message,
        "Failed to trigger: Internal Server Error"
    );
}
