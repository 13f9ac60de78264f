//! Exhaustive child listing for one parent.
//!
//! The backend only signals exhaustion implicitly: a page shorter than the
//! requested size is the last one. A final page of exactly `size` items
//! therefore costs one extra (empty) request.

use std::collections::HashSet;

use tracing::{debug, warn};

use timekeeper_core::config::DEFAULT_COLLECT_PAGE_SIZE;
use timekeeper_core::{ChildRecord, ListQuery, StoreError};
use timekeeper_notify::{Notifier, Severity};
use timekeeper_store::RecordStore;

/// Fetches every child of a parent, page by page.
pub struct PageCollector<'a> {
    store: &'a dyn RecordStore,
    page_size: u32,
    progress: Option<&'a dyn Notifier>,
}

impl<'a> PageCollector<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            page_size: DEFAULT_COLLECT_PAGE_SIZE,
            progress: None,
        }
    }

    /// Override the page size (minimum 1).
    pub fn page_size(mut self, size: u32) -> Self {
        self.page_size = size.max(1);
        self
    }

    /// Report progress for parents with more than one page of children.
    pub fn with_progress(mut self, notifier: &'a dyn Notifier) -> Self {
        self.progress = Some(notifier);
        self
    }

    /// Collect all children of `parent_id` in listing order.
    ///
    /// Fails with the first store error; partial results are discarded.
    pub async fn collect(&self, parent_id: &str) -> Result<Vec<ChildRecord>, StoreError> {
        let size = self.page_size as usize;
        let mut seen = HashSet::new();
        let mut children = Vec::new();
        let mut page = 0u32;

        loop {
            let query = ListQuery::page(page, self.page_size).with_parent(parent_id);
            let batch = self.store.list_instances(&query).await?.into_items();
            let batch_len = batch.len();
            let before = children.len();

            for child in batch {
                if seen.insert(child.id.clone()) {
                    children.push(child);
                } else {
                    debug!(parent_id, child_id = %child.id, page, "dropping duplicate child");
                }
            }

            if batch_len != size {
                break;
            }
            // A full page with nothing new means the backend ignores `page`.
            if children.len() == before {
                warn!(parent_id, page, "full page contained only known children, stopping");
                break;
            }

            page += 1;
            if children.len() > size {
                self.report(
                    &format!("Fetching instances... ({} so far)", children.len()),
                )
                .await;
            }
        }

        debug!(parent_id, pages = page + 1, total = children.len(), "children collected");
        if children.len() > size {
            self.report(&format!("Found {} total instances", children.len()))
                .await;
        }
        Ok(children)
    }

    async fn report(&self, message: &str) {
        if let Some(notifier) = self.progress {
            notifier.notify(message, Severity::Info).await;
        }
    }
}
