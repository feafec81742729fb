use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Paging parameters as received from clients.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl PageQuery {
    /// ## Summary
    /// Resolves the requested page to a 1-based page number and a bounded page size.
    #[must_use]
    pub fn normalized(self) -> (i64, i64) {
        let page = self.page.filter(|p| *p > 0).unwrap_or(1);
        let page_size = self
            .page_size
            .filter(|s| *s > 0)
            .map_or(DEFAULT_PAGE_SIZE, |s| s.min(MAX_PAGE_SIZE));
        (page, page_size)
    }

    /// Rows to skip. Saturates instead of overflowing on huge page numbers.
    #[must_use]
    pub fn offset(self) -> i64 {
        let (page, page_size) = self.normalized();
        page.saturating_sub(1).saturating_mul(page_size)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageResult<T> {
    pub list: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub page_size: i64,
}

impl<T> PageResult<T> {
    #[must_use]
    pub fn new(list: Vec<T>, total: i64, query: PageQuery) -> Self {
        let (page, page_size) = query.normalized();
        Self {
            list,
            total,
            page,
            page_size,
        }
    }
}
