//! Offset/limit pagination with 1-based page numbers.

use serde::{Deserialize, Serialize};

/// A requested page window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub size: u32,
}

impl PageRequest {
    pub fn new(page: u32, size: u32) -> Self {
        Self { page, size }
    }

    /// Rows to skip before the first row of this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.page.saturating_sub(1)) * u64::from(self.size)
    }

    /// Maximum rows on this page.
    pub fn limit(&self) -> u64 {
        u64::from(self.size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, size: 10 }
    }
}

/// Paging block returned alongside a page of results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub page: u32,
    pub size: u32,
    pub total_item: i64,
    pub total_page: i64,
}

impl PageMetadata {
    /// Builds the paging block; `total_page` is the ceiling of items / size.
    pub fn new(request: PageRequest, total_item: i64) -> Self {
        let size = i64::from(request.size);
        let total_page = if size == 0 || total_item <= 0 {
            0
        } else {
            (total_item + size - 1) / size
        };
        Self {
            page: request.page,
            size: request.size,
            total_item,
            total_page,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_page_starts_at_zero() {
        assert_eq!(PageRequest::new(1, 10).offset(), 0);
        assert_eq!(PageRequest::new(3, 10).offset(), 20);
    }

    #[test]
    fn total_pages_round_up() {
        assert_eq!(PageMetadata::new(PageRequest::new(1, 10), 21).total_page, 3);
        assert_eq!(PageMetadata::new(PageRequest::new(1, 10), 20).total_page, 2);
        assert_eq!(PageMetadata::new(PageRequest::new(1, 10), 1).total_page, 1);
    }

    #[test]
    fn empty_result_has_no_pages() {
        let meta = PageMetadata::new(PageRequest::new(1, 10), 0);
        assert_eq!(meta.total_page, 0);
        assert_eq!(meta.total_item, 0);
    }
}
