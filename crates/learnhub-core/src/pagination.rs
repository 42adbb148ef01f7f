//! Page-based pagination for listing endpoints.
//!
//! All review listings share the same convention:
//!
//! - `page` and `limit` default to 1 and 10 when absent or non-numeric
//! - `total_pages = ceil(total_reviews / limit)`
//! - `has_next_page = page < total_pages`
//! - `has_prev_page = page > 1`
//!
//! [`PageMeta::new`] is the single place these formulas live so every
//! listing produces identical pagination metadata.

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::serde::deserialize_lenient_i64;

/// Query parameters for page-based pagination.
///
/// Values that are missing, empty, or fail to parse fall back to the
/// defaults instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, IntoParams)]
pub struct PageParams {
    /// Page number (1-indexed, default: 1)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub page: Option<i64>,
    /// Items per page (default: 10)
    #[serde(default, deserialize_with = "deserialize_lenient_i64")]
    pub limit: Option<i64>,
}

impl PageParams {
    /// Effective page number, at least 1.
    #[must_use]
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(1).max(1)
    }

    /// Effective page size, at least 1.
    #[must_use]
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(10).max(1)
    }

    /// Number of rows to skip for the effective page.
    #[must_use]
    pub fn offset(&self) -> i64 {
        (self.page() - 1) * self.limit()
    }
}

/// Pagination metadata attached to every review listing response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct PageMeta {
    pub current_page: i64,
    pub total_pages: i64,
    pub total_reviews: i64,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl PageMeta {
    #[must_use]
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            current_page: page,
            total_pages,
            total_reviews: total,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }
}
