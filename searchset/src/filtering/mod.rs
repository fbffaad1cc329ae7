//! # Filtering, Sorting & Pagination
//!
//! Building blocks that turn a flat mapping of criteria into query clauses. They never
//! touch a search engine: everything here folds steps into a [`SearchQuery`] accumulator.
//!
//! ## Main Components
//!
//! - **Primitives** ([`CharFilter`], [`NumericFilter`], [`DateFilter`], [`BooleanFilter`],
//!   [`RangeFilter`]): one field, one clause
//! - **[`FilterRegistry`]**: named filters in declaration order
//! - **[`Precedence`]**: exact filters that switch off related range filters
//! - **[`SortOptions`]**: the accepted `sort` keys and their index fields
//! - **[`PaginationPolicy`]**: `page`/`page_size` normalization into a [`PageWindow`]
//!
//! ## Criteria Examples
//!
//! ```rust,ignore
//! // Full-text match on the title
//! {"title": "Python"}
//!
//! // Exact price; price_min_value/price_max_value are ignored when this is present
//! {"price_exact": 29.99}
//!
//! // Price range through two comparison filters
//! {"price_min_value": 35.0, "price_max_value": 45.0}
//!
//! // Range filter, object or flat form
//! {"price_range": {"min": 35, "max": 45}}
//! {"price_range_min": 35, "price_range_max": 45}
//!
//! // Sorting: key ascending, -key descending, several keys comma-separated
//! {"sort": "-price,title_keyword"}
//!
//! // Pagination (1-based pages, page_size clamped to the maximum)
//! {"page": 2, "page_size": 20}
//! ```
//!
//! Malformed values never fail a request: unknown keys are ignored, unreadable values skip
//! their filter, and out-of-range pagination falls back to defaults.
//!
//! [`SearchQuery`]: crate::query::SearchQuery

pub mod criteria;
pub mod pagination;
pub mod precedence;
pub mod primitives;
pub mod registry;
pub mod sort;

// Re-export commonly used items
pub use criteria::{Criteria, PAGE_KEY, PAGE_SIZE_KEY, RESERVED_KEYS, SORT_KEY, is_empty_value};
pub use pagination::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE, PageWindow, PaginationPolicy};
pub use precedence::Precedence;
pub use primitives::{
    BooleanFilter, CharFilter, DateFilter, Filter, FilterKind, Lookup, NumericFilter, RangeFilter,
};
pub use registry::{FilterRegistry, FilterRegistryBuilder};
pub use sort::{SortOption, SortOptions};
