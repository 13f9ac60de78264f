//! Per-parent results of one cascade run.

use std::fmt;

use timekeeper_core::StoreError;

/// Action applied to every selected parent by a cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CascadeAction {
    Suspend,
    Resume,
    Delete,
}

impl CascadeAction {
    /// Value the parent's `suspended` flag ends up with, `None` for delete.
    pub fn target_suspended(&self) -> Option<bool> {
        match self {
            CascadeAction::Suspend => Some(true),
            CascadeAction::Resume => Some(false),
            CascadeAction::Delete => None,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            CascadeAction::Suspend => "suspend",
            CascadeAction::Resume => "resume",
            CascadeAction::Delete => "delete",
        }
    }

    pub fn past_tense(&self) -> &'static str {
        match self {
            CascadeAction::Suspend => "suspended",
            CascadeAction::Resume => "resumed",
            CascadeAction::Delete => "deleted",
        }
    }
}

impl fmt::Display for CascadeAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.verb())
    }
}

/// Why a pipeline step failed, as recorded on its [`Outcome`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The request failed in transport or came back with an error status.
    Network { status: Option<u16>, message: String },
    /// The backend does not offer the endpoint (404, 405 or 501).
    Unsupported { status: u16 },
}

impl From<&StoreError> for ErrorKind {
    fn from(err: &StoreError) -> Self {
        match err.status() {
            Some(status) if err.is_unsupported() => ErrorKind::Unsupported { status },
            status => ErrorKind::Network {
                status,
                message: err.message(),
            },
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Network {
                status: Some(status),
                message,
            } => write!(f, "HTTP {status}: {message}"),
            ErrorKind::Network {
                status: None,
                message,
            } => f.write_str(message),
            ErrorKind::Unsupported { status } => write!(f, "endpoint not available (HTTP {status})"),
        }
    }
}

/// How a deleted parent left the local view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Backend,
    LocalFallback,
}

/// Result of one parent's pipeline.
///
/// `parent_succeeded` is false only when the parent itself could not be
/// fetched or updated. A delete that fell back to local removal still counts
/// as a parent success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub parent_id: String,
    pub parent_succeeded: bool,
    /// Children the bulk call was acknowledged for; empty when it failed.
    pub child_ids_affected: Vec<String>,
    pub child_operation_succeeded: bool,
    pub removal: Option<Removal>,
    pub error: Option<ErrorKind>,
}

impl Outcome {
    pub fn parent_failed(parent_id: impl Into<String>, err: &StoreError) -> Self {
        Self {
            parent_id: parent_id.into(),
            parent_succeeded: false,
            child_ids_affected: Vec::new(),
            child_operation_succeeded: false,
            removal: None,
            error: Some(ErrorKind::from(err)),
        }
    }

    pub fn completed(parent_id: impl Into<String>, child_ids: Vec<String>) -> Self {
        Self {
            parent_id: parent_id.into(),
            parent_succeeded: true,
            child_ids_affected: child_ids,
            child_operation_succeeded: true,
            removal: None,
            error: None,
        }
    }

    /// Parent updated but collecting or updating its children failed.
    pub fn children_failed(parent_id: impl Into<String>, err: &StoreError) -> Self {
        Self {
            parent_id: parent_id.into(),
            parent_succeeded: true,
            child_ids_affected: Vec::new(),
            child_operation_succeeded: false,
            removal: None,
            error: Some(ErrorKind::from(err)),
        }
    }

    pub fn removed(parent_id: impl Into<String>, removal: Removal, error: Option<ErrorKind>) -> Self {
        Self {
            parent_id: parent_id.into(),
            parent_succeeded: true,
            child_ids_affected: Vec::new(),
            child_operation_succeeded: true,
            removal: Some(removal),
            error,
        }
    }

    pub fn fully_succeeded(&self) -> bool {
        self.parent_succeeded && self.child_operation_succeeded
    }
}
