//! Structured search request with an OpenSearch-style JSON rendering.

use serde::Serialize;
use serde_json::{Map, Value, json};

use super::{ClauseKind, SearchQuery, SortDirection};
use crate::core::Document;

/// One predicate of a [`SearchRequest`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Clause {
    pub kind: ClauseKind,
    pub field: String,
    pub params: Value,
}

impl Clause {
    /// `{"<kind>": {"<field>": <params>}}`
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut body = Map::new();
        body.insert(self.field.clone(), self.params.clone());
        let mut clause = Map::new();
        clause.insert(self.kind.as_str().to_string(), Value::Object(body));
        Value::Object(clause)
    }
}

/// One sort key of a [`SearchRequest`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SortClause {
    pub field: String,
    pub direction: SortDirection,
}

/// A search against one named index.
///
/// The request is plain data: building it never touches the network, two requests built
/// from the same steps compare equal, and [`SearchRequest::to_body`] renders the body a
/// search client would send.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    index: String,
    clauses: Vec<Clause>,
    sort: Vec<SortClause>,
    window: Option<(u64, u64)>,
}

impl SearchRequest {
    #[must_use]
    pub fn new(index: impl Into<String>) -> Self {
        Self {
            index: index.into(),
            clauses: Vec::new(),
            sort: Vec::new(),
            window: None,
        }
    }

    #[must_use]
    pub fn index(&self) -> &str {
        &self.index
    }

    #[must_use]
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    #[must_use]
    pub fn sort_clauses(&self) -> &[SortClause] {
        &self.sort
    }

    /// The `[start, end)` window, if one was applied.
    #[must_use]
    pub const fn window(&self) -> Option<(u64, u64)> {
        self.window
    }

    /// Render the request body.
    ///
    /// Clauses are AND-ed under `bool.must`; an unfiltered request is `match_all`.
    #[must_use]
    pub fn to_body(&self) -> Value {
        let query = if self.clauses.is_empty() {
            json!({ "match_all": {} })
        } else {
            let must: Vec<Value> = self.clauses.iter().map(Clause::to_json).collect();
            json!({ "bool": { "must": must } })
        };

        let mut body = Map::new();
        body.insert("query".to_string(), query);

        if !self.sort.is_empty() {
            let sort: Vec<Value> = self
                .sort
                .iter()
                .map(|s| {
                    let mut key = Map::new();
                    key.insert(s.field.clone(), json!({ "order": s.direction.as_str() }));
                    Value::Object(key)
                })
                .collect();
            body.insert("sort".to_string(), Value::Array(sort));
        }

        if let Some((start, end)) = self.window {
            body.insert("from".to_string(), json!(start));
            body.insert("size".to_string(), json!(end.saturating_sub(start)));
        }

        Value::Object(body)
    }
}

impl SearchQuery for SearchRequest {
    fn add_clause(mut self, kind: ClauseKind, field: &str, params: Value) -> Self {
        self.clauses.push(Clause {
            kind,
            field: field.to_string(),
            params,
        });
        self
    }

    fn sort(mut self, field: &str, direction: SortDirection) -> Self {
        self.sort.push(SortClause {
            field: field.to_string(),
            direction,
        });
        self
    }

    fn slice(mut self, start: u64, end: u64) -> Self {
        // Slicing an already sliced request narrows within the previous window.
        self.window = Some(match self.window {
            Some((prev_start, prev_end)) => {
                let start = prev_start.saturating_add(start).min(prev_end);
                let end = prev_start.saturating_add(end).min(prev_end);
                (start, end.max(start))
            }
            None => (start, end.max(start)),
        });
        self
    }
}

/// A named index whose documents live in an external search engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchIndex {
    name: String,
}

impl SearchIndex {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Document for SearchIndex {
    type Query = SearchRequest;

    fn index_name(&self) -> &str {
        &self.name
    }

    fn search(&self) -> SearchRequest {
        SearchRequest::new(self.name.clone())
    }
}
