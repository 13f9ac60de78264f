//! In-memory list of parents with the user's current selection.

use std::collections::HashSet;

use tracing::debug;

use timekeeper_core::{ParentKind, ParentRecord, StoreError};
use timekeeper_store::RecordStore;

use crate::aggregate::{LocalMutation, LocalPlan};

/// Cached parents of one kind and the ids selected for the next action.
///
/// Selection order is preserved and only ever contains ids of loaded rows.
#[derive(Debug, Clone)]
pub struct ParentView {
    kind: ParentKind,
    rows: Vec<ParentRecord>,
    selected: Vec<String>,
}

impl ParentView {
    pub fn new(kind: ParentKind) -> Self {
        Self {
            kind,
            rows: Vec::new(),
            selected: Vec::new(),
        }
    }

    pub fn kind(&self) -> ParentKind {
        self.kind
    }

    /// Replace the rows, dropping selections that no longer exist.
    pub fn load(&mut self, rows: Vec<ParentRecord>) {
        self.rows = rows;
        let present: HashSet<&str> = self.rows.iter().map(|r| r.id.as_str()).collect();
        self.selected.retain(|id| present.contains(id.as_str()));
    }

    /// Reload the rows from the store.
    pub async fn refresh(&mut self, store: &dyn RecordStore) -> Result<usize, StoreError> {
        let rows = store.list_parents(self.kind).await?.into_items();
        debug!(kind = %self.kind, count = rows.len(), "parents loaded");
        self.load(rows);
        Ok(self.rows.len())
    }

    /// Add ids to the selection; unknown and duplicate ids are ignored.
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            let id = id.as_ref();
            if self.find(id).is_some() && !self.is_selected(id) {
                self.selected.push(id.to_string());
            }
        }
    }

    pub fn select_all(&mut self) {
        self.selected = self.rows.iter().map(|r| r.id.clone()).collect();
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selected.iter().any(|s| s == id)
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn selected_rows(&self) -> Vec<&ParentRecord> {
        self.selected.iter().filter_map(|id| self.find(id)).collect()
    }

    pub fn rows(&self) -> &[ParentRecord] {
        &self.rows
    }

    pub fn find(&self, id: &str) -> Option<&ParentRecord> {
        self.rows.iter().find(|r| r.id == id)
    }

    /// Reflect a finished cascade locally and deselect what it applied to.
    pub fn apply(&mut self, plan: &LocalPlan) {
        let applied: HashSet<&str> = plan.apply_to.iter().map(String::as_str).collect();
        match plan.mutation {
            LocalMutation::SetSuspended(flag) => {
                for row in self.rows.iter_mut().filter(|r| applied.contains(r.id.as_str())) {
                    row.suspended = flag;
                }
            }
            LocalMutation::Remove => self.rows.retain(|r| !applied.contains(r.id.as_str())),
        }
        self.selected.retain(|id| !applied.contains(id.as_str()));
    }
}
