use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::errors::ConfigurationError;
use crate::query::SearchQuery;

/// Page size used when the request does not ask for one.
pub const DEFAULT_PAGE_SIZE: u64 = 10;
/// Largest page size a request may ask for.
pub const MAX_PAGE_SIZE: u64 = 100;

/// Read a page number or size. Integral floats and numeric strings count; anything else
/// (including negatives) does not.
fn parse_count(value: Option<&Value>) -> Option<i64> {
    match value? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

/// A float with no fractional part, within the range floats represent exactly.
fn integral(f: f64) -> Option<i64> {
    (f.fract() == 0.0 && f.abs() < 9.0e15).then(|| f as i64)
}

/// Page size defaults and limits.
///
/// Deserializable so applications can keep it in their own configuration:
///
/// ```rust,ignore
/// let policy: PaginationPolicy = serde_json::from_str(r#"{"max_page_size": 50}"#)?;
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PaginationPolicy {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

impl Default for PaginationPolicy {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            max_page_size: MAX_PAGE_SIZE,
        }
    }
}

impl PaginationPolicy {
    #[must_use]
    pub const fn new(default_page_size: u64, max_page_size: u64) -> Self {
        Self {
            default_page_size,
            max_page_size,
        }
    }

    /// Normalize the raw `page` and `page_size` values into a window.
    ///
    /// - `page` is 1 when absent, non-numeric or below 1
    /// - `page_size` is the default when absent, non-numeric or below 1, and is clamped to
    ///   the maximum
    #[must_use]
    pub fn resolve(&self, page: Option<&Value>, page_size: Option<&Value>) -> PageWindow {
        let page = parse_count(page)
            .filter(|&p| p >= 1)
            .map_or(1, i64::unsigned_abs);

        let page_size = parse_count(page_size)
            .filter(|&s| s >= 1)
            .map_or(self.default_page_size, i64::unsigned_abs)
            .min(self.max_page_size);

        PageWindow::new(page, page_size)
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        if self.default_page_size == 0 || self.default_page_size > self.max_page_size {
            return Err(ConfigurationError::InvalidPagination {
                default_page_size: self.default_page_size,
                max_page_size: self.max_page_size,
            });
        }
        Ok(())
    }
}

/// The half-open result range `[start, end)` of one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageWindow {
    pub page: u64,
    pub page_size: u64,
    pub start: u64,
    pub end: u64,
}

impl PageWindow {
    #[must_use]
    pub const fn new(page: u64, page_size: u64) -> Self {
        let start = page.saturating_sub(1).saturating_mul(page_size);
        Self {
            page,
            page_size,
            start,
            end: start.saturating_add(page_size),
        }
    }

    /// Restrict `query` to this window.
    pub fn apply<Q: SearchQuery>(&self, query: Q) -> Q {
        query.slice(self.start, self.end)
    }
}
