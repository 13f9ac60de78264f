//! Paging over the instance listing with best-effort totals.
//!
//! Some backends answer with a bare array and no count. Totals are then
//! estimated from batch lengths: a short page pins the count exactly, a full
//! first page triggers one probe of page 1, and later full pages raise the
//! estimate as navigation goes past it.

use tracing::{debug, warn};

use timekeeper_core::config::DEFAULT_INSTANCE_PAGE_SIZE;
use timekeeper_core::{ChildRecord, ListQuery, StoreError};
use timekeeper_store::RecordStore;

/// Page sizes a user may switch to.
pub const PAGE_SIZES: [u32; 4] = [25, 50, 100, 200];

#[derive(Debug, thiserror::Error)]
pub enum PagerError {
    #[error("Invalid page: {0}")]
    InvalidPage(i64),

    #[error("Invalid page size: {0} (allowed: 25, 50, 100, 200)")]
    InvalidPageSize(u32),

    #[error(transparent)]
    Store(#[from] StoreError),

    /// The action went through but the page could not be reloaded.
    #[error("{applied} instance(s) updated, but refreshing the page failed: {source}")]
    Refresh {
        applied: usize,
        #[source]
        source: StoreError,
    },
}

/// How much is known about the listing's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountState {
    Unknown,
    /// A full first page was seen and page 1 is being probed.
    Probed,
    /// `exact` is false while the totals are a lower-bound estimate.
    Known { exact: bool },
}

/// The primary instance view: one page of rows plus selection.
pub struct InstancePager<'a> {
    store: &'a dyn RecordStore,
    page_size: u32,
    current_page: u32,
    total_items: u64,
    total_pages: u64,
    state: CountState,
    rows: Vec<ChildRecord>,
    selected: Vec<String>,
}

impl<'a> InstancePager<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            page_size: DEFAULT_INSTANCE_PAGE_SIZE,
            current_page: 0,
            total_items: 0,
            total_pages: 0,
            state: CountState::Unknown,
            rows: Vec::new(),
            selected: Vec::new(),
        }
    }

    /// Start with a configured page size. Zero is rejected.
    pub fn with_page_size(store: &'a dyn RecordStore, page_size: u32) -> Result<Self, PagerError> {
        if page_size == 0 {
            return Err(PagerError::InvalidPageSize(page_size));
        }
        Ok(Self {
            page_size,
            ..Self::new(store)
        })
    }

    pub fn store(&self) -> &'a dyn RecordStore {
        self.store
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_items(&self) -> u64 {
        self.total_items
    }

    pub fn total_pages(&self) -> u64 {
        self.total_pages
    }

    pub fn state(&self) -> CountState {
        self.state
    }

    pub fn rows(&self) -> &[ChildRecord] {
        &self.rows
    }

    // ── Selection ──

    /// Select ids from the current page; others are ignored.
    pub fn select<I, S>(&mut self, ids: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for id in ids {
            let id = id.as_ref();
            let on_page = self.rows.iter().any(|r| r.id == id);
            if on_page && !self.selected.iter().any(|s| s == id) {
                self.selected.push(id.to_string());
            }
        }
    }

    pub fn selected_ids(&self) -> &[String] {
        &self.selected
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    // ── Navigation ──

    /// Load `page`, clamped to the known range.
    ///
    /// Negative pages are rejected before any request. While no total is
    /// known every non-negative page is allowed.
    pub async fn go_to_page(&mut self, page: i64) -> Result<(), PagerError> {
        if page < 0 {
            return Err(PagerError::InvalidPage(page));
        }
        let mut target = page as u64;
        if self.total_pages > 0 && target >= self.total_pages {
            target = self.total_pages - 1;
        }
        let target = u32::try_from(target).map_err(|_| PagerError::InvalidPage(page))?;
        self.load_page(target).await
    }

    /// Returns whether the current page changed.
    pub async fn next_page(&mut self) -> Result<bool, PagerError> {
        let before = self.current_page;
        let next = u64::from(before) + 1;
        if self.total_pages > 0 && next >= self.total_pages {
            return Ok(false);
        }
        self.go_to_page(next as i64).await?;
        Ok(self.current_page != before)
    }

    pub async fn previous_page(&mut self) -> Result<bool, PagerError> {
        let before = self.current_page;
        if before == 0 {
            return Ok(false);
        }
        self.load_page(before - 1).await?;
        Ok(self.current_page != before)
    }

    pub async fn first_page(&mut self) -> Result<(), PagerError> {
        self.load_page(0).await
    }

    /// Jump to the last known page; false while nothing is known.
    pub async fn last_page(&mut self) -> Result<bool, PagerError> {
        if self.total_pages == 0 {
            return Ok(false);
        }
        self.go_to_page(self.total_pages as i64 - 1).await?;
        Ok(true)
    }

    pub async fn reload(&mut self) -> Result<(), PagerError> {
        self.load_page(self.current_page).await
    }

    /// Switch page size and start over from page 0 with no known totals.
    pub async fn change_page_size(&mut self, size: u32) -> Result<(), PagerError> {
        if !PAGE_SIZES.contains(&size) {
            return Err(PagerError::InvalidPageSize(size));
        }
        self.page_size = size;
        self.current_page = 0;
        self.total_items = 0;
        self.total_pages = 0;
        self.state = CountState::Unknown;
        self.selected.clear();
        self.load_page(0).await
    }

    /// After a bulk action emptied the current page, step back one page
    /// (or reload page 0).
    pub async fn settle_after_operation(&mut self) -> Result<(), PagerError> {
        if !self.rows.is_empty() || self.total_pages == 0 {
            return Ok(());
        }
        let target = self.current_page.saturating_sub(1);
        debug!(from = self.current_page, to = target, "current page emptied, stepping back");
        self.load_page(target).await
    }

    async fn load_page(&mut self, page: u32) -> Result<(), PagerError> {
        let previous = self.current_page;
        let query = ListQuery::page(page, self.page_size);
        let listing = self.store.list_instances(&query).await?;

        if let Some((total_items, total_pages)) = listing.totals() {
            let rows = listing.into_items();
            if rows.is_empty() && page > 0 && page != previous {
                debug!(page, previous, "empty page, keeping previous rows");
                return Ok(());
            }
            self.current_page = page;
            self.rows = rows;
            self.total_items = total_items;
            self.total_pages = total_pages;
            self.state = CountState::Known { exact: true };
            return Ok(());
        }

        let rows = listing.into_items();
        let len = rows.len() as u64;
        let size = u64::from(self.page_size);

        if len == 0 && page > 0 && page != previous {
            debug!(page, previous, "empty page, keeping previous rows");
            return Ok(());
        }
        self.current_page = page;
        self.rows = rows;

        if len < size {
            self.total_items = u64::from(page) * size + len;
            self.total_pages = u64::from(page) + 1;
            self.state = CountState::Known { exact: true };
        } else if self.state == CountState::Unknown {
            self.state = CountState::Probed;
            self.probe().await;
        } else {
            let floor = (u64::from(page) + 1) * size;
            if self.total_items <= floor {
                self.total_items = floor + 1;
                self.total_pages = self.total_items.div_ceil(size);
                self.state = CountState::Known { exact: false };
            }
        }
        debug!(
            page,
            rows = self.rows.len(),
            total_items = self.total_items,
            total_pages = self.total_pages,
            state = ?self.state,
            "instance page loaded"
        );
        Ok(())
    }

    /// Look one page ahead to find out whether more than one page exists.
    async fn probe(&mut self) {
        let size = u64::from(self.page_size);
        let query = ListQuery::page(1, self.page_size);
        let probe_len = match self.store.list_instances(&query).await {
            Ok(listing) => listing.len() as u64,
            Err(e) => {
                warn!(error = %e, "page count probe failed, assuming a single page");
                0
            }
        };

        if probe_len > 0 {
            let floor = (u64::from(self.current_page) + 1) * size;
            self.total_items = (size + probe_len).max(floor);
            self.total_pages = self.total_items.div_ceil(size);
            self.state = CountState::Known { exact: false };
        } else {
            self.total_items = self.rows.len() as u64;
            self.total_pages = 1;
            self.state = CountState::Known { exact: true };
        }
    }
}
