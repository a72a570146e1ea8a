//! Pagination types shared by list operations

use serde::{Deserialize, Serialize};

/// Smallest accepted page size
pub const MIN_PAGE_SIZE: u32 = 1;
/// Largest accepted page size
pub const MAX_PAGE_SIZE: u32 = 100;
/// Page size used when the caller does not specify one
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// A 1-based page request with a clamped page size
///
/// Out-of-range inputs are clamped rather than rejected: page below 1
/// becomes 1, page size outside [1, 100] is pulled to the nearest bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    /// Create a page request, clamping out-of-range values
    #[must_use]
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.clamp(MIN_PAGE_SIZE, MAX_PAGE_SIZE),
        }
    }

    /// The 1-based page number
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// The clamped page size
    #[must_use]
    pub const fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip
    #[must_use]
    pub const fn offset(&self) -> u64 {
        (self.page as u64 - 1) * self.page_size as u64
    }

    /// Number of rows to fetch
    #[must_use]
    pub const fn limit(&self) -> u64 {
        self.page_size as u64
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// One page of results together with the unpaged total
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Items on this page
    pub items: Vec<T>,
    /// The 1-based page number that was fetched
    pub page: u32,
    /// The clamped page size that was applied
    pub page_size: u32,
    /// Total matching items across all pages
    pub total_items: u64,
}

impl<T> Page<T> {
    /// Create a page from items and the total count
    #[must_use]
    pub fn new(items: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            items,
            page: request.page(),
            page_size: request.page_size(),
            total_items,
        }
    }

    /// Total number of pages: ceil(total_items / page_size)
    #[must_use]
    pub const fn total_pages(&self) -> u64 {
        self.total_items.div_ceil(self.page_size as u64)
    }

    /// Map the items, keeping the paging envelope
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            page: self.page,
            page_size: self.page_size,
            total_items: self.total_items,
        }
    }
}
