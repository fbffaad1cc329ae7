//! # Query accumulator contracts
//!
//! Filter-sets never talk to a search engine directly. They fold clauses into a query
//! accumulator implementing [`SearchQuery`], and hand the finished query to a
//! [`SearchExecutor`]. Each step consumes the accumulator and returns a new one, so a query
//! is built by functional composition:
//!
//! ```rust,ignore
//! let query = index
//!     .search()
//!     .add_clause(ClauseKind::Match, "title", json!("Python"))
//!     .sort("title.keyword", SortDirection::Asc)
//!     .slice(0, 10);
//! ```
//!
//! Three adapters ship with the crate:
//! - [`SearchRequest`] renders an OpenSearch-style JSON body
//! - [`MemoryIndex`] evaluates a [`SearchRequest`] over in-process JSON documents
//! - [`SqlTable`] maps clauses onto a Sea-ORM `Select`

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::fmt;

pub mod memory;
pub mod request;
pub mod sql;

pub use memory::{MemoryIndex, MemoryIndexError};
pub use request::{Clause, SearchIndex, SearchRequest, SortClause};
pub use sql::SqlTable;

/// The predicate type of a single clause.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ClauseKind {
    /// Full-text match on an analysed field
    Match,
    /// Exact term equality
    Term,
    /// Glob pattern (`*` and `?`)
    Wildcard,
    /// Bounded comparison; params are an object of `gt`/`gte`/`lt`/`lte` bounds
    Range,
    /// Any other query type, passed through verbatim
    Other(String),
}

impl ClauseKind {
    /// Name of the query type as the search engine spells it.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Match => "match",
            Self::Term => "term",
            Self::Wildcard => "wildcard",
            Self::Range => "range",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for ClauseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ClauseKind {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// Sort direction of a sort clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }
}

impl From<SortDirection> for sea_orm::Order {
    fn from(direction: SortDirection) -> Self {
        match direction {
            SortDirection::Asc => Self::Asc,
            SortDirection::Desc => Self::Desc,
        }
    }
}

/// A query under construction.
///
/// Implementations must treat every method as a pure transformation: the returned value
/// represents "the search so far" plus the new step. Clauses are combined with logical AND.
pub trait SearchQuery: Sized {
    /// Add a predicate on `field`. `params` is the clause body: a scalar for
    /// `match`/`term`/`wildcard`, an object of bounds for `range`.
    #[must_use]
    fn add_clause(self, kind: ClauseKind, field: &str, params: Value) -> Self;

    /// Append a sort key. Earlier keys take priority over later ones.
    #[must_use]
    fn sort(self, field: &str, direction: SortDirection) -> Self;

    /// Restrict results to the half-open window `[start, end)`.
    #[must_use]
    fn slice(self, start: u64, end: u64) -> Self;
}

/// Runs a finished query against a search backend.
///
/// Errors are the backend's own and are never wrapped by filter-sets.
#[async_trait]
pub trait SearchExecutor<Q: Send>: Send + Sync {
    /// One result document.
    type Hit: Send;
    /// Backend failure (connectivity, unsupported clause, ...).
    type Error: Send;

    /// Execute `query`, returning hits in result order.
    ///
    /// # Errors
    ///
    /// Returns the backend's error unmodified when the query cannot be executed.
    async fn execute(&self, query: Q) -> Result<Vec<Self::Hit>, Self::Error>;
}
