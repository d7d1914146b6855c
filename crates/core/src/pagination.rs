//! Page/limit parsing and page metadata.
//!
//! Query strings carry `page` and `limit` as text. They go through one
//! explicit rule: a positive integer is used as-is, anything else (missing,
//! non-numeric, zero, negative) becomes the default.

use serde::{Deserialize, Serialize};

/// Page used when the client sends none or an invalid one.
pub const DEFAULT_PAGE: u64 = 1;

/// Page size used when the client sends none or an invalid one.
pub const DEFAULT_LIMIT: u64 = 10;

/// Parse a raw query value into a positive integer, falling back to `default`.
pub fn parse_positive(raw: Option<&str>, default: u64) -> u64 {
    raw.map(str::trim)
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|n| u64::try_from(n).ok())
        .filter(|n| *n > 0)
        .unwrap_or(default)
}

/// A validated page request (`page >= 1`, `limit >= 1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u64,
    limit: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    /// Build from raw query-string values.
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        Self {
            page: parse_positive(page, DEFAULT_PAGE),
            limit: parse_positive(limit, DEFAULT_LIMIT),
        }
    }

    /// Build from already-numeric values; non-positive values become defaults.
    pub fn new(page: i64, limit: i64) -> Self {
        let positive = |n: i64, default: u64| u64::try_from(n).ok().filter(|n| *n > 0).unwrap_or(default);
        Self {
            page: positive(page, DEFAULT_PAGE),
            limit: positive(limit, DEFAULT_LIMIT),
        }
    }

    pub fn page(&self) -> u64 {
        self.page
    }

    pub fn limit(&self) -> u64 {
        self.limit
    }
}

/// Rows to skip and take for one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: u64,
    pub take: u64,
}

/// Page metadata returned alongside list data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMeta {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
}

/// Window plus metadata for a counted result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub window: PageWindow,
    pub meta: PageMeta,
}

/// Apply `request` to a result set of `total` rows.
pub fn paginate(request: PageRequest, total: u64) -> Page {
    let PageRequest { page, limit } = request;
    Page {
        window: PageWindow {
            skip: (page - 1).saturating_mul(limit),
            take: limit,
        },
        meta: PageMeta {
            page,
            limit,
            total,
            total_pages: total.div_ceil(limit),
        },
    }
}

/// Paginated list envelope: `{ data, pagination }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageResult<T> {
    pub data: Vec<T>,
    pub pagination: PageMeta,
}
