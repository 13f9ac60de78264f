use serde::{Deserialize, Serialize};

/// Paging filter for list endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    /// Owning record id (template for instances, instance for executions).
    pub parent_id: Option<String>,
}

impl ListQuery {
    pub fn page(page: u32, size: u32) -> Self {
        Self {
            page,
            size,
            parent_id: None,
        }
    }

    pub fn with_parent(mut self, parent_id: impl Into<String>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }
}

/// Count-bearing listing envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageEnvelope<T> {
    #[serde(default = "Vec::new")]
    pub content: Vec<T>,
    #[serde(default)]
    pub total_elements: u64,
    #[serde(default)]
    pub total_pages: u64,
}

/// A list response: the backend answers with either a bare array or an
/// envelope, depending on the endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Listing<T> {
    Bare(Vec<T>),
    Paged(PageEnvelope<T>),
}

impl<T> Listing<T> {
    pub fn items(&self) -> &[T] {
        match self {
            Listing::Bare(items) => items,
            Listing::Paged(envelope) => &envelope.content,
        }
    }

    pub fn into_items(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Paged(envelope) => envelope.content,
        }
    }

    pub fn len(&self) -> usize {
        self.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// `(totalElements, totalPages)` when the server reported them.
    pub fn totals(&self) -> Option<(u64, u64)> {
        match self {
            Listing::Bare(_) => None,
            Listing::Paged(envelope) => Some((envelope.total_elements, envelope.total_pages)),
        }
    }
}
