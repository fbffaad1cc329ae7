//! # Configuration errors
//!
//! Filter-sets are permissive about *request* data: unknown filter names, unknown sort keys
//! and malformed values are ignored or normalized, never reported. Mistakes in the
//! *declaration* of a filter-set are different. They are programming errors, and they are
//! raised as a [`ConfigurationError`] the moment a filter-set is constructed, never deferred
//! to query execution.
//!
//! ```rust,ignore
//! let filter_set = DocumentFilterSet::<BookFilters, MemoryIndex>::builder()
//!     .criteria(criteria)
//!     .build();
//!
//! assert!(matches!(filter_set, Err(ConfigurationError::MissingDocument { .. })));
//! ```

use std::fmt;

/// A filter-set declaration that cannot produce queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// A document filter-set was built without binding a document/index
    MissingDocument {
        /// Type name of the filter-set definition
        filter_set: &'static str,
    },

    /// A filter was registered under an empty name
    EmptyFilterName,

    /// A filter targets an empty field name
    EmptyFieldName {
        /// Name the filter was registered under
        filter: String,
    },

    /// Two filters share a name
    DuplicateFilter {
        /// The repeated name
        name: String,
    },

    /// A precedence rule names a filter that was never declared
    UnknownPrecedenceFilter {
        /// The undeclared name
        name: String,
    },

    /// Two sort options share a key
    DuplicateSortKey {
        /// The repeated key
        key: String,
    },

    /// A sort option maps to an empty index field, or has an empty key
    EmptySortField {
        /// The sort key
        key: String,
    },

    /// Page sizes that cannot produce a window
    InvalidPagination {
        default_page_size: u64,
        max_page_size: u64,
    },
}

impl fmt::Display for ConfigurationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingDocument { filter_set } => {
                write!(f, "{filter_set} requires a document to search")
            }
            Self::EmptyFilterName => write!(f, "filter names must not be empty"),
            Self::EmptyFieldName { filter } => {
                write!(f, "filter '{filter}' must target a non-empty field")
            }
            Self::DuplicateFilter { name } => write!(f, "filter '{name}' is declared twice"),
            Self::UnknownPrecedenceFilter { name } => {
                write!(f, "precedence rule references undeclared filter '{name}'")
            }
            Self::DuplicateSortKey { key } => write!(f, "sort key '{key}' is declared twice"),
            Self::EmptySortField { key } => {
                write!(f, "sort key '{key}' must map to a non-empty field")
            }
            Self::InvalidPagination {
                default_page_size,
                max_page_size,
            } => write!(
                f,
                "invalid pagination: default page size {default_page_size} must be between 1 and the maximum {max_page_size}"
            ),
        }
    }
}

impl std::error::Error for ConfigurationError {}
