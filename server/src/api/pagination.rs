//! Page-number pagination shared by list endpoints.
//!
//! Responses carry `{results, pagination: {next, prev}, total}` where
//! `next`/`prev` are present only when such a page exists.

use serde::{Deserialize, Serialize};

/// Default page size when the client sends none.
pub const DEFAULT_LIMIT: i64 = 10;

/// Upper bound on page size.
pub const MAX_LIMIT: i64 = 100;

/// Highest page number whose offset still fits in an `i64`.
pub const MAX_PAGE: i64 = i64::MAX / MAX_LIMIT;

/// Pagination query parameters (`?limit=&page=`).
#[derive(Debug, Default, Clone, Copy, Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct PageQuery {
    /// Items per page (default 10, max 100).
    pub limit: Option<i64>,
    /// 1-based page number (default 1).
    pub page: Option<i64>,
}

/// A resolved, clamped page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub page: i64,
}

impl PageQuery {
    /// Clamp the raw query into a usable page.
    #[must_use]
    pub fn resolve(self) -> Page {
        Page {
            limit: self.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
            page: self.page.unwrap_or(1).clamp(1, MAX_PAGE),
        }
    }
}

impl Page {
    /// Rows to skip for this page.
    #[must_use]
    pub const fn offset(self) -> i64 {
        self.page.saturating_sub(1).saturating_mul(self.limit)
    }
}

/// Reference to an adjacent page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct PageRef {
    pub page: i64,
    pub limit: i64,
}

/// Links to the neighbouring pages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, utoipa::ToSchema)]
pub struct Pagination {
    pub next: Option<PageRef>,
    pub prev: Option<PageRef>,
}

impl Pagination {
    /// Compute neighbours for `page` given the total row count.
    #[must_use]
    pub const fn new(page: Page, total: i64) -> Self {
        let end = page.page.saturating_mul(page.limit);

        let next = if end < total {
            Some(PageRef {
                page: page.page + 1,
                limit: page.limit,
            })
        } else {
            None
        };

        let prev = if page.page > 1 {
            Some(PageRef {
                page: page.page - 1,
                limit: page.limit,
            })
        } else {
            None
        };

        Self { next, prev }
    }
}

/// A page of results.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct Paginated<T> {
    pub results: Vec<T>,
    pub pagination: Pagination,
    /// Total rows across all pages.
    pub total: i64,
}

impl<T> Paginated<T> {
    #[must_use]
    pub fn new(results: Vec<T>, page: Page, total: i64) -> Self {
        Self {
            results,
            pagination: Pagination::new(page, total),
            total,
        }
    }
}
