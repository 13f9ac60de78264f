//! Cascading suspend / resume / delete over selected parents.
//!
//! Each selected parent gets its own pipeline; all pipelines are polled
//! together and the run completes only once every one has finished. A
//! failure is recorded in that parent's [`Outcome`] and never cancels a
//! sibling.

use futures::future::join_all;
use tracing::{debug, info, info_span, warn, Instrument};
use uuid::Uuid;

use timekeeper_core::config::DEFAULT_COLLECT_PAGE_SIZE;
use timekeeper_core::{ParentKind, StoreError};
use timekeeper_notify::{Notifier, Severity};
use timekeeper_store::{BulkAction, RecordStore};

use crate::aggregate::{aggregate, Report};
use crate::collector::PageCollector;
use crate::outcome::{CascadeAction, ErrorKind, Outcome, Removal};
use crate::view::ParentView;

/// Runs cascades for one parent kind.
pub struct Cascade<'a> {
    store: &'a dyn RecordStore,
    notifier: &'a dyn Notifier,
    kind: ParentKind,
    collect_page_size: u32,
}

impl<'a> Cascade<'a> {
    pub fn new(store: &'a dyn RecordStore, notifier: &'a dyn Notifier, kind: ParentKind) -> Self {
        Self {
            store,
            notifier,
            kind,
            collect_page_size: DEFAULT_COLLECT_PAGE_SIZE,
        }
    }

    /// Page size used when collecting children.
    pub fn collect_page_size(mut self, size: u32) -> Self {
        self.collect_page_size = size.max(1);
        self
    }

    pub async fn suspend(&self, view: &mut ParentView) -> Option<Report> {
        self.run(view, CascadeAction::Suspend).await
    }

    pub async fn resume(&self, view: &mut ParentView) -> Option<Report> {
        self.run(view, CascadeAction::Resume).await
    }

    pub async fn delete(&self, view: &mut ParentView) -> Option<Report> {
        self.run(view, CascadeAction::Delete).await
    }

    /// Apply `action` to the view's selection.
    ///
    /// Returns `None` without touching the store when nothing is selected.
    /// Otherwise the view is updated from the aggregated plan and exactly
    /// one summary notice is sent.
    pub async fn run(&self, view: &mut ParentView, action: CascadeAction) -> Option<Report> {
        let ids = view.selected_ids().to_vec();
        if ids.is_empty() {
            debug!(kind = %self.kind, %action, "empty selection, nothing to do");
            return None;
        }

        let run_id = Uuid::new_v4();
        let span = info_span!("cascade", %run_id, kind = %self.kind, %action, parents = ids.len());

        async {
            if action == CascadeAction::Delete {
                let names: Vec<&str> = view.selected_rows().iter().map(|r| r.name.as_str()).collect();
                self.notifier
                    .notify(
                        &format!(
                            "Deleting {} {}(s): {}",
                            ids.len(),
                            self.kind.label(),
                            names.join(", ")
                        ),
                        Severity::Info,
                    )
                    .await;
            }

            let outcomes = self.execute(action, &ids).await;
            let report = aggregate(self.kind, action, outcomes);
            view.apply(&report.plan);

            info!(
                classification = %report.summary.classification,
                affected = report.summary.parents_affected,
                children = report.summary.children_affected,
                "cascade finished"
            );
            self.notifier
                .notify(&report.summary.message(), report.summary.severity())
                .await;
            Some(report)
        }
        .instrument(span)
        .await
    }

    /// Run one pipeline per id concurrently; outcomes keep the input order.
    pub async fn execute(&self, action: CascadeAction, ids: &[String]) -> Vec<Outcome> {
        join_all(ids.iter().map(|id| self.pipeline(action, id))).await
    }

    async fn pipeline(&self, action: CascadeAction, id: &str) -> Outcome {
        match action.target_suspended() {
            Some(flag) => self.set_suspended(id, flag).await,
            None => self.remove(id).await,
        }
    }

    async fn set_suspended(&self, id: &str, suspended: bool) -> Outcome {
        let current = match self.store.get_parent(self.kind, id).await {
            Ok(record) => record,
            Err(e) => {
                warn!(parent_id = id, error = %e, "failed to fetch parent");
                return Outcome::parent_failed(id, &e);
            }
        };

        let updated = current.with_suspended(suspended);
        if let Err(e) = self.store.update_parent(self.kind, id, &updated).await {
            warn!(parent_id = id, error = %e, "failed to update parent");
            return Outcome::parent_failed(id, &e);
        }

        if !self.kind.owns_instances() {
            return Outcome::completed(id, Vec::new());
        }

        match self.cascade_children(id, suspended).await {
            Ok(child_ids) => Outcome::completed(id, child_ids),
            Err(e) => {
                warn!(parent_id = id, error = %e, "parent updated but children were not");
                Outcome::children_failed(id, &e)
            }
        }
    }

    async fn cascade_children(&self, id: &str, suspended: bool) -> Result<Vec<String>, StoreError> {
        let children = PageCollector::new(self.store)
            .page_size(self.collect_page_size)
            .with_progress(self.notifier)
            .collect(id)
            .await?;
        if children.is_empty() {
            debug!(parent_id = id, "no children to update");
            return Ok(Vec::new());
        }

        let child_ids: Vec<String> = children.into_iter().map(|c| c.id).collect();
        let action = if suspended {
            BulkAction::Suspend
        } else {
            BulkAction::Resume
        };
        self.store.bulk_instances(action, &child_ids).await?;
        debug!(parent_id = id, count = child_ids.len(), %action, "children updated");
        Ok(child_ids)
    }

    async fn remove(&self, id: &str) -> Outcome {
        match self.store.delete_parent(self.kind, id).await {
            Ok(()) => Outcome::removed(id, Removal::Backend, None),
            Err(e) => {
                let kind = ErrorKind::from(&e);
                warn!(parent_id = id, error = %e, "backend delete failed, removing locally");
                Outcome::removed(id, Removal::LocalFallback, Some(kind))
            }
        }
    }

    /// Fire the selected parents now. The selection is left as is.
    ///
    /// A single id goes to the per-id endpoint, several to the bulk one.
    pub async fn trigger(&self, view: &ParentView) -> Option<Result<usize, StoreError>> {
        let ids = view.selected_ids();
        if ids.is_empty() {
            return None;
        }

        let label = self.kind.label();
        self.notifier
            .notify(&format!("Triggering {} {label}(s)...", ids.len()), Severity::Info)
            .await;

        let result = match ids {
            [id] => self.store.trigger_parent(self.kind, id).await,
            _ => self.store.trigger_parents(self.kind, ids).await,
        };

        match result {
            Ok(()) => {
                info!(kind = %self.kind, count = ids.len(), "triggered");
                self.notifier
                    .notify(&format!("Triggered {} {label}(s)", ids.len()), Severity::Success)
                    .await;
                Some(Ok(ids.len()))
            }
            Err(e) => {
                warn!(kind = %self.kind, error = %e, "trigger failed");
                self.notifier
                    .notify(&format!("Failed to trigger: {}", e.message()), Severity::Error)
                    .await;
                Some(Err(e))
            }
        }
    }
}
