//! Execution history: loading, filtering and per-outcome counts.

use std::collections::{BTreeMap, BTreeSet};
use std::str::FromStr;

use tracing::debug;

use timekeeper_core::{ExecutionOutcome, ExecutionRecord, ListQuery, StoreError, TriggerType};
use timekeeper_store::RecordStore;

/// Executions fetched per history load.
pub const HISTORY_PAGE_SIZE: u32 = 100;

/// Outcome filter; `InProgress` matches executions without an outcome yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeFilter {
    Is(ExecutionOutcome),
    InProgress,
}

impl FromStr for OutcomeFilter {
    type Err = String;

    /// Accepts an outcome name or `NONE`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("NONE") {
            return Ok(OutcomeFilter::InProgress);
        }
        s.parse().map(OutcomeFilter::Is)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionFilter {
    pub instance_id: Option<String>,
    pub outcome: Option<OutcomeFilter>,
    pub trigger_type: Option<TriggerType>,
}

impl ExecutionFilter {
    pub fn matches(&self, record: &ExecutionRecord) -> bool {
        if let Some(id) = &self.instance_id {
            if &record.parent_id != id {
                return false;
            }
        }
        match self.outcome {
            Some(OutcomeFilter::Is(outcome)) if record.outcome != Some(outcome) => return false,
            Some(OutcomeFilter::InProgress) if record.outcome.is_some() => return false,
            _ => {}
        }
        match self.trigger_type {
            Some(trigger) => record.trigger_type == trigger,
            None => true,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.instance_id.is_none() && self.outcome.is_none() && self.trigger_type.is_none()
    }
}

/// Counts over a set of executions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionStats {
    pub total: usize,
    pub by_outcome: BTreeMap<ExecutionOutcome, usize>,
    /// Executions without an outcome (still running or never started).
    pub in_progress: usize,
}

impl ExecutionStats {
    /// Distinct outcomes present, in a stable order.
    pub fn outcomes(&self) -> Vec<ExecutionOutcome> {
        self.by_outcome.keys().copied().collect()
    }

    pub fn count(&self, outcome: ExecutionOutcome) -> usize {
        self.by_outcome.get(&outcome).copied().unwrap_or(0)
    }
}

/// One loaded page of execution history.
#[derive(Debug, Clone, Default)]
pub struct ExecutionHistory {
    records: Vec<ExecutionRecord>,
}

impl ExecutionHistory {
    pub fn new(records: Vec<ExecutionRecord>) -> Self {
        Self { records }
    }

    /// Load the most recent page. An instance id is passed to the backend
    /// as a hint; filtering still happens locally.
    pub async fn load(
        store: &dyn RecordStore,
        instance_id: Option<&str>,
    ) -> Result<Self, StoreError> {
        let mut query = ListQuery::page(0, HISTORY_PAGE_SIZE);
        if let Some(id) = instance_id {
            query = query.with_parent(id);
        }
        let records = store.list_executions(&query).await?.into_items();
        debug!(count = records.len(), "executions loaded");
        Ok(Self::new(records))
    }

    pub fn records(&self) -> &[ExecutionRecord] {
        &self.records
    }

    pub fn filter(&self, filter: &ExecutionFilter) -> Vec<&ExecutionRecord> {
        self.records.iter().filter(|r| filter.matches(r)).collect()
    }

    /// Distinct instance ids, sorted.
    pub fn instance_ids(&self) -> Vec<&str> {
        let ids: BTreeSet<&str> = self.records.iter().map(|r| r.parent_id.as_str()).collect();
        ids.into_iter().collect()
    }

    pub fn stats(&self) -> ExecutionStats {
        stats_for(self.records.iter())
    }
}

pub fn stats_for<'r>(records: impl IntoIterator<Item = &'r ExecutionRecord>) -> ExecutionStats {
    let mut stats = ExecutionStats::default();
    for record in records {
        stats.total += 1;
        match record.outcome {
            Some(outcome) => *stats.by_outcome.entry(outcome).or_insert(0) += 1,
            None => stats.in_progress += 1,
        }
    }
    stats
}
