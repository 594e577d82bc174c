//! Pagination envelope.

use serde::Serialize;

/// One page of results plus descriptive counts.
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub data: Vec<T>,

    /// 1-based page number that was requested.
    pub page: usize,

    pub limit: usize,

    /// Count of all items matching the filter, ignoring pagination.
    pub total: usize,

    pub total_pages: usize,

    pub has_next: bool,

    pub has_previous: bool,
}

impl<T> Page<T> {
    /// Wraps a slice of results with its pagination metadata.
    pub fn new(data: Vec<T>, page: usize, limit: usize, total: usize) -> Self {
        let total_pages = if limit == 0 { 0 } else { total.div_ceil(limit) };
        Self {
            data,
            page,
            limit,
            total,
            total_pages,
            has_next: page < total_pages,
            has_previous: page > 1,
        }
    }

    /// Maps the page's data, keeping the metadata.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            data: self.data.into_iter().map(f).collect(),
            page: self.page,
            limit: self.limit,
            total: self.total,
            total_pages: self.total_pages,
            has_next: self.has_next,
            has_previous: self.has_previous,
        }
    }
}
