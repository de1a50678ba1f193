//! Pagination utilities for the service layer.
//!
//! Provides a simple `Pagination` struct, input normalization, and the
//! `PageMeta` block returned alongside every paginated listing.

use serde::Serialize;

/// Pagination parameters
#[derive(Clone, Copy, Debug)]
pub struct Pagination {
    /// 1-based page index
    pub page: u64,
    /// items per page
    pub limit: u64,
}

impl Pagination {
    /// Clamp to sane values and compute the row offset.
    /// Returns `(page, limit, offset)` with `offset = (page - 1) * limit`.
    pub fn normalize(self) -> (u64, u64, u64) {
        let page = if self.page == 0 { 1 } else { self.page };
        let limit = self.limit.clamp(1, 100);
        (page, limit, (page - 1) * limit)
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self { page: 1, limit: 10 }
    }
}

/// Pagination block attached to list responses.
#[derive(Clone, Copy, Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub total_pages: u64,
}

impl PageMeta {
    pub fn new(total: u64, page: u64, limit: u64) -> Self {
        Self { total, page, limit, total_pages: total.div_ceil(limit.max(1)) }
    }
}

#[cfg(test)]
mod tests {
    use super::{PageMeta, Pagination};

    #[test]
    fn normalize_clamps_zero_to_defaults() {
        let (page, limit, offset) = Pagination { page: 0, limit: 0 }.normalize();
        assert_eq!(page, 1);
        assert_eq!(limit, 1);
        assert_eq!(offset, 0);
    }

    #[test]
    fn normalize_clamps_upper_bound() {
        let (page, limit, offset) = Pagination { page: 5, limit: 1000 }.normalize();
        assert_eq!(page, 5);
        assert_eq!(limit, 100);
        assert_eq!(offset, 400);
    }

    #[test]
    fn default_values_are_sane() {
        let d = Pagination::default();
        assert_eq!(d.page, 1);
        assert_eq!(d.limit, 10);
    }

    #[test]
    fn total_pages_is_ceiling_division() {
        assert_eq!(PageMeta::new(0, 1, 10).total_pages, 0);
        assert_eq!(PageMeta::new(10, 1, 10).total_pages, 1);
        assert_eq!(PageMeta::new(11, 1, 10).total_pages, 2);
        assert_eq!(PageMeta::new(21, 3, 10).total_pages, 3);
    }
}
