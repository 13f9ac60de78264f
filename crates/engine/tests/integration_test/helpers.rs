use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use timekeeper_core::{
    ChildRecord, Country, ExecutionRecord, InstanceStatus, ListQuery, Listing, PageEnvelope,
    ParentKind, ParentRecord, Region, StoreError,
};
use timekeeper_store::{BulkAction, RecordStore};

/// One recorded store call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    GetParent(String),
    UpdateParent { id: String, suspended: bool },
    DeleteParent(String),
    TriggerParent(String),
    TriggerParents(Vec<String>),
    ListParents,
    ListInstances { page: u32, size: u32, parent: Option<String> },
    Bulk { action: BulkAction, ids: Vec<String> },
    ListExecutions,
}

/// In-memory backend that records every call.
#[derive(Default)]
pub struct FakeStore {
    parents: Mutex<Vec<ParentRecord>>,
    children: Mutex<Vec<ChildRecord>>,
    calls: Mutex<Vec<Call>>,
    /// Parent ids whose get/update answer with HTTP 500.
    failing_parents: HashSet<String>,
    /// Parent id -> status returned by delete.
    delete_failures: HashMap<String, u16>,
    /// Instance listing pages (by page number) that fail.
    failing_pages: HashSet<u32>,
    /// Replaces the instance listing: page n returns `scripted[n]`.
    scripted_pages: Option<Vec<Vec<ChildRecord>>>,
    fail_bulk: bool,
    /// Once a bulk call succeeds, every instance listing fails.
    listing_breaks_after_bulk: bool,
    listing_down: Mutex<bool>,
    fail_trigger: bool,
    enveloped: bool,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_parent(self, parent: ParentRecord) -> Self {
        self.parents.lock().unwrap().push(parent);
        self
    }

    pub fn with_children(self, parent_id: &str, count: usize) -> Self {
        {
            let mut children = self.children.lock().unwrap();
            for i in 0..count {
                children.push(ChildRecord::new(
                    format!("{parent_id}-c{i}"),
                    parent_id,
                    InstanceStatus::Active,
                ));
            }
        }
        self
    }

    pub fn failing_parent(mut self, id: &str) -> Self {
        self.failing_parents.insert(id.to_string());
        self
    }

    pub fn failing_delete(mut self, id: &str, status: u16) -> Self {
        self.delete_failures.insert(id.to_string(), status);
        self
    }

    pub fn failing_page(mut self, page: u32) -> Self {
        self.failing_pages.insert(page);
        self
    }

    pub fn scripted_pages(mut self, pages: Vec<Vec<ChildRecord>>) -> Self {
        self.scripted_pages = Some(pages);
        self
    }

    pub fn failing_bulk(mut self) -> Self {
        self.fail_bulk = true;
        self
    }

    pub fn listing_breaks_after_bulk(mut self) -> Self {
        self.listing_breaks_after_bulk = true;
        self
    }

    pub fn failing_trigger(mut self) -> Self {
        self.fail_trigger = true;
        self
    }

    pub fn enveloped(mut self) -> Self {
        self.enveloped = true;
        self
    }

    /// Keep only the first `n` children, as if the rest were removed.
    pub fn truncate_children(&self, n: usize) {
        self.children.lock().unwrap().truncate(n);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count_calls(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| pred(c)).count()
    }

    pub fn instance_listings(&self) -> usize {
        self.count_calls(|c| matches!(c, Call::ListInstances { .. }))
    }

    pub fn parent(&self, id: &str) -> Option<ParentRecord> {
        self.parents
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn child_status(&self, id: &str) -> Option<InstanceStatus> {
        self.children
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.id == id)
            .map(|c| c.status)
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_parent(&self, id: &str) -> Result<(), StoreError> {
        if self.failing_parents.contains(id) {
            return Err(server_error());
        }
        Ok(())
    }
}

pub fn server_error() -> StoreError {
    StoreError::Http {
        status: 500,
        message: "Internal Server Error".into(),
    }
}

pub fn parent(id: &str, name: &str) -> ParentRecord {
    let mut record = ParentRecord::new(name);
    record.id = id.to_string();
    record
}

pub fn child(id: &str, parent_id: &str) -> ChildRecord {
    ChildRecord::new(id, parent_id, InstanceStatus::Active)
}

#[async_trait]
impl RecordStore for FakeStore {
    async fn list_parents(&self, _kind: ParentKind) -> Result<Listing<ParentRecord>, StoreError> {
        self.record(Call::ListParents);
        Ok(Listing::Bare(self.parents.lock().unwrap().clone()))
    }

    async fn get_parent(&self, _kind: ParentKind, id: &str) -> Result<ParentRecord, StoreError> {
        self.record(Call::GetParent(id.to_string()));
        self.check_parent(id)?;
        self.parent(id).ok_or_else(|| StoreError::Http {
            status: 404,
            message: "Not Found".into(),
        })
    }

    async fn create_parent(
        &self,
        _kind: ParentKind,
        body: &ParentRecord,
    ) -> Result<ParentRecord, StoreError> {
        self.parents.lock().unwrap().push(body.clone());
        Ok(body.clone())
    }

    async fn update_parent(
        &self,
        _kind: ParentKind,
        id: &str,
        body: &ParentRecord,
    ) -> Result<ParentRecord, StoreError> {
        self.record(Call::UpdateParent {
            id: id.to_string(),
            suspended: body.suspended,
        });
        self.check_parent(id)?;
        let mut parents = self.parents.lock().unwrap();
        if let Some(existing) = parents.iter_mut().find(|p| p.id == id) {
            *existing = body.clone();
        }
        Ok(body.clone())
    }

    async fn delete_parent(&self, _kind: ParentKind, id: &str) -> Result<(), StoreError> {
        self.record(Call::DeleteParent(id.to_string()));
        if let Some(&status) = self.delete_failures.get(id) {
            return Err(StoreError::Http {
                status,
                message: "delete refused".into(),
            });
        }
        self.parents.lock().unwrap().retain(|p| p.id != id);
        Ok(())
    }

    async fn trigger_parent(&self, _kind: ParentKind, id: &str) -> Result<(), StoreError> {
        self.record(Call::TriggerParent(id.to_string()));
        if self.fail_trigger {
            return Err(server_error());
        }
        Ok(())
    }

    async fn trigger_parents(&self, _kind: ParentKind, ids: &[String]) -> Result<(), StoreError> {
        self.record(Call::TriggerParents(ids.to_vec()));
        if self.fail_trigger {
            return Err(server_error());
        }
        Ok(())
    }

    async fn list_instances(&self, query: &ListQuery) -> Result<Listing<ChildRecord>, StoreError> {
        self.record(Call::ListInstances {
            page: query.page,
            size: query.size,
            parent: query.parent_id.clone(),
        });
        if self.failing_pages.contains(&query.page) || *self.listing_down.lock().unwrap() {
            return Err(server_error());
        }

        if let Some(pages) = &self.scripted_pages {
            let page = pages.get(query.page as usize).cloned().unwrap_or_default();
            return Ok(Listing::Bare(page));
        }

        let children = self.children.lock().unwrap();
        let matching: Vec<ChildRecord> = children
            .iter()
            .filter(|c| query.parent_id.as_ref().map_or(true, |p| &c.parent_id == p))
            .cloned()
            .collect();
        let size = query.size as usize;
        let content: Vec<ChildRecord> = matching
            .iter()
            .skip(query.page as usize * size)
            .take(size)
            .cloned()
            .collect();

        if self.enveloped {
            let total = matching.len() as u64;
            return Ok(Listing::Paged(PageEnvelope {
                content,
                total_elements: total,
                total_pages: total.div_ceil(query.size as u64),
            }));
        }
        Ok(Listing::Bare(content))
    }

    async fn bulk_instances(
        &self,
        action: BulkAction,
        ids: &[String],
    ) -> Result<Vec<ChildRecord>, StoreError> {
        self.record(Call::Bulk {
            action,
            ids: ids.to_vec(),
        });
        if self.fail_bulk {
            return Err(server_error());
        }
        let wanted: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut children = self.children.lock().unwrap();
        let mut affected = Vec::new();
        for c in children.iter_mut().filter(|c| wanted.contains(c.id.as_str())) {
            match action {
                BulkAction::Suspend => c.status = InstanceStatus::Suspended,
                BulkAction::Resume => c.status = InstanceStatus::Active,
                BulkAction::Trigger | BulkAction::Reset => {}
            }
            affected.push(c.clone());
        }
        if self.listing_breaks_after_bulk {
            *self.listing_down.lock().unwrap() = true;
        }
        Ok(affected)
    }

    async fn list_executions(
        &self,
        _query: &ListQuery,
    ) -> Result<Listing<ExecutionRecord>, StoreError> {
        self.record(Call::ListExecutions);
        Ok(Listing::Bare(Vec::new()))
    }

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError> {
        Ok(Vec::new())
    }

    async fn list_countries(&self, _region: Option<&str>) -> Result<Vec<Country>, StoreError> {
        Ok(Vec::new())
    }
}
