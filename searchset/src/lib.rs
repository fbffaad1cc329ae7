//! # searchset
//!
//! Declarative filter-sets that turn flat request criteria into search queries.
//!
//! A filter-set type declares named filters once. Each request binds a [`Criteria`]
//! mapping to that declaration and a [`Document`] (the index being searched), and
//! [`DocumentFilterSet::build_query`] folds filters, sorting and pagination into the
//! document's query accumulator:
//!
//! ```rust,ignore
//! use searchset::{
//!     CharFilter, Criteria, DocumentFilterSet, FilterRegistryBuilder, FilterSetDefinition,
//!     SearchIndex, SortOptions,
//! };
//!
//! struct BookFilters;
//!
//! impl FilterSetDefinition for BookFilters {
//!     fn declare_filters(filters: FilterRegistryBuilder) -> FilterRegistryBuilder {
//!         filters
//!             .filter("title", CharFilter::new("title"))
//!             .filter("author", CharFilter::new("author"))
//!     }
//!
//!     fn sort_options() -> SortOptions {
//!         SortOptions::new().field("title_keyword", "title.keyword")
//!     }
//! }
//!
//! let criteria = Criteria::new().with("title", "Python").with("sort", "-title_keyword");
//! let filter_set = DocumentFilterSet::<BookFilters, _>::new(SearchIndex::new("books"), criteria)?;
//! println!("{}", filter_set.build_query().to_body());
//! ```
//!
//! ## Modules
//!
//! - [`filtering`]: filter primitives, the registry, precedence, sorting and pagination
//! - [`core`]: filter-set definitions and the document-bound pipeline
//! - [`query`]: query accumulators and executors (JSON body, in-memory, Sea-ORM)
//! - [`errors`]: configuration errors

pub mod core;
pub mod errors;
pub mod filtering;
pub mod query;

pub use core::{
    ActiveFilter, Document, DocumentFilterSet, DocumentFilterSetBuilder, FilterSet,
    FilterSetDefinition, FilterSetSchema, declared_filters,
};
pub use errors::ConfigurationError;
pub use filtering::{
    BooleanFilter, CharFilter, Criteria, DEFAULT_PAGE_SIZE, DateFilter, Filter, FilterKind,
    FilterRegistry, FilterRegistryBuilder, Lookup, MAX_PAGE_SIZE, NumericFilter, PageWindow,
    PaginationPolicy, Precedence, RangeFilter, SortOptions,
};
pub use query::{
    ClauseKind, MemoryIndex, MemoryIndexError, SearchExecutor, SearchIndex, SearchQuery,
    SearchRequest, SortDirection, SqlTable,
};
