//! Classification of a cascade's outcomes into one summary and one plan
//! for the local view. Pure; never fails.

use std::fmt;

use timekeeper_core::ParentKind;
use timekeeper_notify::Severity;

use crate::outcome::{CascadeAction, ErrorKind, Outcome, Removal};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    AllSucceeded,
    Partial,
    AllFailed,
    AllViaBackend,
    AllLocalFallback,
    Mixed,
}

impl fmt::Display for Classification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Classification::AllSucceeded => "all_succeeded",
            Classification::Partial => "partial",
            Classification::AllFailed => "all_failed",
            Classification::AllViaBackend => "all_via_backend",
            Classification::AllLocalFallback => "all_local_fallback",
            Classification::Mixed => "mixed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalMutation {
    SetSuspended(bool),
    Remove,
}

/// What the local parent view should do once the cascade has joined.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalPlan {
    pub mutation: LocalMutation,
    /// Parents whose pipeline got past the parent step.
    pub apply_to: Vec<String>,
    /// Hard failures: left untouched and kept selected for a retry.
    pub keep_selected: Vec<String>,
}

/// Counts and class of one cascade run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub kind: ParentKind,
    pub action: CascadeAction,
    pub classification: Classification,
    pub parents_total: usize,
    pub parents_affected: usize,
    pub parents_fully_succeeded: usize,
    pub children_affected: usize,
    pub via_backend: usize,
    pub local_fallback: usize,
    pub first_error: Option<ErrorKind>,
}

/// Everything a cascade run produced.
#[derive(Debug, Clone)]
pub struct Report {
    pub summary: Summary,
    pub plan: LocalPlan,
    pub outcomes: Vec<Outcome>,
}

pub fn aggregate(kind: ParentKind, action: CascadeAction, outcomes: Vec<Outcome>) -> Report {
    let parents_total = outcomes.len();
    let parents_affected = outcomes.iter().filter(|o| o.parent_succeeded).count();
    let parents_fully_succeeded = outcomes.iter().filter(|o| o.fully_succeeded()).count();
    let children_affected = outcomes.iter().map(|o| o.child_ids_affected.len()).sum();
    let via_backend = count_removal(&outcomes, Removal::Backend);
    let local_fallback = count_removal(&outcomes, Removal::LocalFallback);

    let classification = match action.target_suspended() {
        Some(_) if parents_fully_succeeded == parents_total => Classification::AllSucceeded,
        Some(_) if parents_affected == 0 => Classification::AllFailed,
        Some(_) => Classification::Partial,
        None if local_fallback == 0 => Classification::AllViaBackend,
        None if via_backend == 0 => Classification::AllLocalFallback,
        None => Classification::Mixed,
    };

    let (apply_to, keep_selected): (Vec<&Outcome>, Vec<&Outcome>) =
        outcomes.iter().partition(|o| o.parent_succeeded);
    let plan = LocalPlan {
        mutation: match action.target_suspended() {
            Some(flag) => LocalMutation::SetSuspended(flag),
            None => LocalMutation::Remove,
        },
        apply_to: apply_to.iter().map(|o| o.parent_id.clone()).collect(),
        keep_selected: keep_selected.iter().map(|o| o.parent_id.clone()).collect(),
    };

    let first_error = outcomes.iter().find_map(|o| o.error.clone());

    Report {
        summary: Summary {
            kind,
            action,
            classification,
            parents_total,
            parents_affected,
            parents_fully_succeeded,
            children_affected,
            via_backend,
            local_fallback,
            first_error,
        },
        plan,
        outcomes,
    }
}

fn count_removal(outcomes: &[Outcome], removal: Removal) -> usize {
    outcomes
        .iter()
        .filter(|o| o.removal == Some(removal))
        .count()
}

impl Summary {
    pub fn severity(&self) -> Severity {
        match self.classification {
            Classification::AllSucceeded | Classification::AllViaBackend => Severity::Success,
            Classification::Partial | Classification::AllFailed => Severity::Error,
            Classification::AllLocalFallback | Classification::Mixed => Severity::Info,
        }
    }

    /// The one user-facing message for this run.
    pub fn message(&self) -> String {
        let label = self.kind.label();
        let error = self
            .first_error
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "unknown error".to_string());
        let instances = |n: usize| {
            if self.kind.owns_instances() {
                format!(" and {n} instance(s)")
            } else {
                String::new()
            }
        };

        match self.classification {
            Classification::AllSucceeded => format!(
                "{} {label}(s){} {} successfully",
                self.parents_total,
                instances(self.children_affected),
                self.action.past_tense()
            ),
            Classification::Partial => format!(
                "{} {} of {} {label}(s){}; {} failed: {error}",
                capitalize(self.action.past_tense()),
                self.parents_fully_succeeded,
                self.parents_total,
                instances(self.children_affected),
                self.parents_total - self.parents_fully_succeeded
            ),
            Classification::AllFailed => {
                format!("Failed to {} {label}s: {error}", self.action.verb())
            }
            Classification::AllViaBackend => format!(
                "Successfully deleted {} {label}(s) via backend",
                self.via_backend
            ),
            Classification::AllLocalFallback => format!(
                "Backend delete not available, removed {} {label}(s) locally only",
                self.local_fallback
            ),
            Classification::Mixed => format!(
                "Partially successful: {} deleted via backend, {} removed locally",
                self.via_backend, self.local_fallback
            ),
        }
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
