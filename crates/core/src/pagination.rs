//! Page-number pagination for listings.
//!
//! Pages are 1-based. Invalid page numbers or sizes are rejected rather than
//! clamped, so a size of zero can never be mistaken for "all rows".

use serde::Serialize;

use crate::error::CoreError;

/// Default number of rows per page.
pub const DEFAULT_PAGE_SIZE: i64 = 20;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: i64 = 500;

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: i64,
    page_size: i64,
}

impl PageRequest {
    /// Validate `page >= 1` and `1 <= page_size <= MAX_PAGE_SIZE`.
    pub fn new(page: i64, page_size: i64) -> Result<Self, CoreError> {
        if page < 1 {
            return Err(CoreError::InvalidArgument(format!(
                "page must be >= 1, got {page}"
            )));
        }
        if page_size < 1 {
            return Err(CoreError::InvalidArgument(format!(
                "page_size must be >= 1, got {page_size}"
            )));
        }
        if page_size > MAX_PAGE_SIZE {
            return Err(CoreError::InvalidArgument(format!(
                "page_size must be <= {MAX_PAGE_SIZE}, got {page_size}"
            )));
        }
        // Reject pages whose offset would not fit in a BIGINT.
        (page - 1).checked_mul(page_size).ok_or_else(|| {
            CoreError::InvalidArgument(format!("page {page} is out of range"))
        })?;
        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn page_size(&self) -> i64 {
        self.page_size
    }

    /// Number of rows to skip: `(page - 1) * page_size`.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.page_size
    }

    /// Row limit for this page.
    pub fn limit(&self) -> i64 {
        self.page_size
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

/// One page of results plus the total number of matching rows.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Matching rows before pagination was applied.
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64, request: PageRequest) -> Self {
        Self {
            items,
            total,
            page: request.page(),
            page_size: request.page_size(),
        }
    }

    /// Number of pages needed to cover `total` rows.
    pub fn total_pages(&self) -> i64 {
        if self.total == 0 {
            0
        } else {
            (self.total + self.page_size - 1) / self.page_size
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
