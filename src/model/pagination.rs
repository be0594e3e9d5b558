//! Pagination descriptor and display math.
//!
//! Server-provided numbers are untrusted: NaN, negative or missing values are
//! coerced to safe minimums (`page >= 1`, `page_size >= 1`, `total >= 0`)
//! instead of leaking into the displayed range.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Requested page of a table. Both fields are always >= 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PageRequest {
    page: usize,
    page_size: usize,
}

impl PageRequest {
    /// Build a request, coercing zeros to 1.
    pub fn new(page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }

    /// First page with the given size.
    pub fn first(page_size: usize) -> Self {
        Self::new(1, page_size)
    }

    /// 1-based page number.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Same size, different page.
    pub fn with_page(self, page: usize) -> Self {
        Self::new(page, self.page_size)
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::first(25)
    }
}

/// Page, page size and total record count.
///
/// # Invariants
/// - `page >= 1`, `page_size >= 1`
/// - `page <= total_pages()`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawPagination")]
pub struct Pagination {
    page: usize,
    page_size: usize,
    total: usize,
}

impl Pagination {
    /// Build a descriptor. The page is clamped into `[1, total_pages]`.
    pub fn new(page: usize, page_size: usize, total: usize) -> Self {
        let page_size = page_size.max(1);
        let mut pagination = Self {
            page: 1,
            page_size,
            total,
        };
        pagination.page = pagination.clamp_page(page);
        pagination
    }

    /// Build from a request and a total.
    pub fn for_request(request: PageRequest, total: usize) -> Self {
        Self::new(request.page(), request.page_size(), total)
    }

    /// Build from numbers of unknown quality.
    ///
    /// Non-finite or too-small inputs fall back to the minimum for that field;
    /// fractional values are floored.
    pub fn from_untrusted(page: f64, page_size: f64, total: f64) -> Self {
        Self::new(coerce(page, 1), coerce(page_size, 1), coerce(total, 0))
    }

    /// 1-based current page.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Rows per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Total records across all pages.
    pub fn total(&self) -> usize {
        self.total
    }

    /// `ceil(total / page_size)`, never less than 1.
    pub fn total_pages(&self) -> usize {
        self.total.div_ceil(self.page_size).max(1)
    }

    /// Clamp a requested page into `[1, total_pages]`.
    pub fn clamp_page(&self, page: usize) -> usize {
        page.clamp(1, self.total_pages())
    }

    /// Index of the first record on the current page (0-based).
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Request for the current page.
    pub fn request(&self) -> PageRequest {
        PageRequest::new(self.page, self.page_size)
    }

    /// Whether a previous page exists.
    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    /// Whether a next page exists.
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// 1-based inclusive range of records on the current page.
    ///
    /// `None` when there are no records. The last page reports the true
    /// remainder, not a rounded page-size multiple.
    pub fn display_range(&self) -> Option<(usize, usize)> {
        if self.total == 0 {
            return None;
        }
        let offset = self.offset();
        let end = offset.saturating_add(self.page_size).min(self.total);
        Some((offset + 1, end))
    }

    /// Footer text, e.g. `Showing 41 to 47 of 47 results`.
    pub fn summary(&self) -> String {
        match self.display_range() {
            None => "No records found".to_string(),
            Some((start, end)) => format!("Showing {start} to {end} of {} results", self.total),
        }
    }
}

impl Default for Pagination {
    fn default() -> Self {
        Self::new(1, PageRequest::default().page_size(), 0)
    }
}

fn coerce(value: f64, min: usize) -> usize {
    if !value.is_finite() || value < min as f64 {
        min
    } else {
        // Float-to-int `as` saturates, so huge values cannot wrap.
        value.floor() as usize
    }
}

/// Wire shape accepted from collaborators: any JSON value per field.
#[derive(Debug, Deserialize)]
struct RawPagination {
    #[serde(default)]
    page: Value,
    #[serde(default, alias = "pageSize")]
    page_size: Value,
    #[serde(default)]
    total: Value,
}

impl From<RawPagination> for Pagination {
    fn from(raw: RawPagination) -> Self {
        Self::from_untrusted(
            lenient_number(&raw.page),
            lenient_number(&raw.page_size),
            lenient_number(&raw.total),
        )
    }
}

fn lenient_number(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().unwrap_or(f64::NAN),
        Value::String(s) => s.trim().parse().unwrap_or(f64::NAN),
        _ => f64::NAN,
    }
}
