//! The `RecordStore` seam between the engine and the backend.

use async_trait::async_trait;

use timekeeper_core::{
    ChildRecord, Country, ExecutionRecord, ListQuery, Listing, ParentKind, ParentRecord, Region,
    StoreError,
};

/// Bulk endpoints that act on a set of instance ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BulkAction {
    Suspend,
    Resume,
    Trigger,
    Reset,
}

impl BulkAction {
    /// Path segment, e.g. `_suspend`.
    pub fn endpoint(&self) -> &'static str {
        match self {
            BulkAction::Suspend => "_suspend",
            BulkAction::Resume => "_resume",
            BulkAction::Trigger => "_trigger",
            BulkAction::Reset => "_reset",
        }
    }

    /// Past-tense verb for messages ("suspended").
    pub fn past_tense(&self) -> &'static str {
        match self {
            BulkAction::Suspend => "suspended",
            BulkAction::Resume => "resumed",
            BulkAction::Trigger => "triggered",
            BulkAction::Reset => "reset",
        }
    }
}

impl std::fmt::Display for BulkAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint().trim_start_matches('_'))
    }
}

/// Typed access to the backend's CRUD and bulk-action endpoints.
///
/// Implementations decode at the boundary so callers only ever see typed
/// records or a [`StoreError`].
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ── Templates / timers ──

    /// Parent collections are small and served unpaged.
    async fn list_parents(&self, kind: ParentKind) -> Result<Listing<ParentRecord>, StoreError>;

    async fn get_parent(&self, kind: ParentKind, id: &str) -> Result<ParentRecord, StoreError>;

    async fn create_parent(
        &self,
        kind: ParentKind,
        body: &ParentRecord,
    ) -> Result<ParentRecord, StoreError>;

    /// Full-body replace; partial updates are not supported by the backend.
    async fn update_parent(
        &self,
        kind: ParentKind,
        id: &str,
        body: &ParentRecord,
    ) -> Result<ParentRecord, StoreError>;

    async fn delete_parent(&self, kind: ParentKind, id: &str) -> Result<(), StoreError>;

    /// Manually fire one parent. Fire-and-forget from the caller's view.
    async fn trigger_parent(&self, kind: ParentKind, id: &str) -> Result<(), StoreError>;

    /// Manually fire several parents in one request.
    async fn trigger_parents(&self, kind: ParentKind, ids: &[String]) -> Result<(), StoreError>;

    // ── Instances ──

    async fn list_instances(&self, query: &ListQuery) -> Result<Listing<ChildRecord>, StoreError>;

    /// Apply `action` to every id; returns the affected records.
    async fn bulk_instances(
        &self,
        action: BulkAction,
        ids: &[String],
    ) -> Result<Vec<ChildRecord>, StoreError>;

    async fn suspend_instances(&self, ids: &[String]) -> Result<Vec<ChildRecord>, StoreError> {
        self.bulk_instances(BulkAction::Suspend, ids).await
    }

    async fn resume_instances(&self, ids: &[String]) -> Result<Vec<ChildRecord>, StoreError> {
        self.bulk_instances(BulkAction::Resume, ids).await
    }

    async fn trigger_instances(&self, ids: &[String]) -> Result<Vec<ChildRecord>, StoreError> {
        self.bulk_instances(BulkAction::Trigger, ids).await
    }

    async fn reset_instances(&self, ids: &[String]) -> Result<Vec<ChildRecord>, StoreError> {
        self.bulk_instances(BulkAction::Reset, ids).await
    }

    // ── Executions ──

    async fn list_executions(
        &self,
        query: &ListQuery,
    ) -> Result<Listing<ExecutionRecord>, StoreError>;

    // ── Geo catalogs ──

    async fn list_regions(&self) -> Result<Vec<Region>, StoreError>;

    async fn list_countries(&self, region: Option<&str>) -> Result<Vec<Country>, StoreError>;
}
