//! In-process index of JSON documents.
//!
//! `MemoryIndex` evaluates [`SearchRequest`]s without a search engine. It is meant for
//! tests, demos and small embedded data sets, and approximates the engine semantics:
//!
//! - `match`: case-insensitive, any query token found among the field's tokens
//! - `term`: exact equality (numbers compare numerically)
//! - `wildcard`: case-insensitive glob over the whole value (`*`, `?`)
//! - `range`: numeric comparison for numbers, lexical comparison for strings (ISO dates)
//! - a trailing `.keyword` segment addresses the raw value of a text field
//! - array values match when any element matches
//! - documents missing a sort field are ordered last

use async_trait::async_trait;
use serde_json::Value;
use std::cmp::Ordering;
use std::fmt;

use super::request::{Clause, SearchRequest, SortClause};
use super::{ClauseKind, SearchExecutor, SortDirection};
use crate::core::Document;

const RANGE_BOUNDS: [&str; 4] = ["gt", "gte", "lt", "lte"];

/// Errors raised while evaluating a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryIndexError {
    /// The request targets a different index
    IndexMismatch { expected: String, found: String },
    /// The clause kind has no in-memory evaluation
    UnsupportedClause { kind: String, field: String },
    /// The clause parameters do not fit the clause kind
    MalformedClause { kind: String, field: String },
}

impl fmt::Display for MemoryIndexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IndexMismatch { expected, found } => {
                write!(f, "request targets index '{found}', expected '{expected}'")
            }
            Self::UnsupportedClause { kind, field } => {
                write!(f, "unsupported '{kind}' clause on field '{field}'")
            }
            Self::MalformedClause { kind, field } => {
                write!(f, "malformed '{kind}' clause on field '{field}'")
            }
        }
    }
}

impl std::error::Error for MemoryIndexError {}

#[derive(Debug, Clone, Default)]
pub struct MemoryIndex {
    name: String,
    documents: Vec<Value>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>, documents: impl IntoIterator<Item = Value>) -> Self {
        Self {
            name: name.into(),
            documents: documents.into_iter().collect(),
        }
    }

    /// Add a document to the index.
    pub fn insert(&mut self, document: Value) {
        self.documents.push(document);
    }

    #[must_use]
    pub fn documents(&self) -> &[Value] {
        &self.documents
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Evaluate `request` synchronously.
    ///
    /// # Errors
    ///
    /// Fails when the request targets another index or contains a clause that cannot be
    /// evaluated in memory.
    pub fn run(&self, request: &SearchRequest) -> Result<Vec<Value>, MemoryIndexError> {
        if request.index() != self.name {
            return Err(MemoryIndexError::IndexMismatch {
                expected: self.name.clone(),
                found: request.index().to_string(),
            });
        }
        for clause in request.clauses() {
            check_clause(clause)?;
        }

        let mut hits: Vec<&Value> = self
            .documents
            .iter()
            .filter(|doc| request.clauses().iter().all(|clause| clause_matches(doc, clause)))
            .collect();

        if !request.sort_clauses().is_empty() {
            hits.sort_by(|a, b| compare_documents(a, b, request.sort_clauses()));
        }

        let (skip, take) = match request.window() {
            Some((start, end)) => (to_usize(start), to_usize(end.saturating_sub(start))),
            None => (0, usize::MAX),
        };

        Ok(hits.into_iter().skip(skip).take(take).cloned().collect())
    }
}

impl Document for MemoryIndex {
    type Query = SearchRequest;

    fn index_name(&self) -> &str {
        &self.name
    }

    fn search(&self) -> SearchRequest {
        SearchRequest::new(self.name.clone())
    }
}

#[async_trait]
impl SearchExecutor<SearchRequest> for MemoryIndex {
    type Hit = Value;
    type Error = MemoryIndexError;

    async fn execute(&self, query: SearchRequest) -> Result<Vec<Value>, MemoryIndexError> {
        self.run(&query)
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

fn check_clause(clause: &Clause) -> Result<(), MemoryIndexError> {
    match &clause.kind {
        ClauseKind::Other(kind) => Err(MemoryIndexError::UnsupportedClause {
            kind: kind.clone(),
            field: clause.field.clone(),
        }),
        ClauseKind::Range => {
            let well_formed = clause.params.as_object().is_some_and(|bounds| {
                !bounds.is_empty() && bounds.keys().all(|k| RANGE_BOUNDS.contains(&k.as_str()))
            });
            if well_formed {
                Ok(())
            } else {
                Err(MemoryIndexError::MalformedClause {
                    kind: clause.kind.to_string(),
                    field: clause.field.clone(),
                })
            }
        }
        ClauseKind::Match | ClauseKind::Term | ClauseKind::Wildcard => Ok(()),
    }
}

/// All values addressed by a dotted path, flattening arrays along the way.
fn field_values<'a>(doc: &'a Value, path: &str) -> Vec<&'a Value> {
    let segments: Vec<&str> = path.split('.').collect();
    let mut current = vec![doc];

    for (i, segment) in segments.iter().enumerate() {
        let is_last = i + 1 == segments.len();
        let mut next = Vec::new();
        for value in current {
            for item in flatten(value) {
                match item.get(segment) {
                    Some(found) => next.push(found),
                    None if is_last && *segment == "keyword" && !item.is_object() => next.push(item),
                    None => {}
                }
            }
        }
        current = next;
    }

    current.into_iter().flat_map(flatten).filter(|v| !v.is_null()).collect()
}

fn flatten(value: &Value) -> Vec<&Value> {
    match value {
        Value::Array(items) => items.iter().collect(),
        other => vec![other],
    }
}

fn clause_matches(doc: &Value, clause: &Clause) -> bool {
    let values = field_values(doc, &clause.field);
    match clause.kind {
        ClauseKind::Match => {
            let wanted = tokens(&clause.params);
            !wanted.is_empty()
                && values.iter().any(|v| {
                    let present = tokens(v);
                    wanted.iter().any(|token| present.contains(token))
                })
        }
        ClauseKind::Term => values.iter().any(|v| values_equal(v, &clause.params)),
        ClauseKind::Wildcard => {
            let pattern = text_of(&clause.params).to_lowercase();
            values.iter().any(|v| glob_matches(&pattern, &text_of(v).to_lowercase()))
        }
        ClauseKind::Range => {
            let Some(bounds) = clause.params.as_object() else {
                return false;
            };
            values.iter().any(|v| {
                bounds.iter().all(|(bound, limit)| {
                    compare_values(v, limit).is_some_and(|ord| match bound.as_str() {
                        "gt" => ord == Ordering::Greater,
                        "gte" => ord != Ordering::Less,
                        "lt" => ord == Ordering::Less,
                        "lte" => ord != Ordering::Greater,
                        _ => false,
                    })
                })
            })
        }
        ClauseKind::Other(_) => false,
    }
}

fn text_of(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn tokens(value: &Value) -> Vec<String> {
    text_of(value)
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn values_equal(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::String(a), Value::String(b)) => a == b,
        (Value::Bool(a), Value::Bool(b)) => a == b,
        (Value::Number(_), _) | (_, Value::Number(_)) => {
            matches!((as_number(left), as_number(right)), (Some(a), Some(b)) if a == b)
        }
        _ => false,
    }
}

fn compare_values(left: &Value, right: &Value) -> Option<Ordering> {
    match (left, right) {
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => as_number(left)?.partial_cmp(&as_number(right)?),
    }
}

fn compare_documents(a: &Value, b: &Value, sort: &[SortClause]) -> Ordering {
    for key in sort {
        let left = field_values(a, &key.field).into_iter().next();
        let right = field_values(b, &key.field).into_iter().next();
        let ordering = match (left, right) {
            (Some(l), Some(r)) => {
                let ord = compare_values(l, r).unwrap_or(Ordering::Equal);
                match key.direction {
                    SortDirection::Asc => ord,
                    SortDirection::Desc => ord.reverse(),
                }
            }
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

/// Glob match supporting `*` (any run) and `?` (any single character).
fn glob_matches(pattern: &str, text: &str) -> bool {
    let pattern: Vec<char> = pattern.chars().collect();
    let text: Vec<char> = text.chars().collect();
    let (mut p, mut t) = (0, 0);
    let mut backtrack: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            backtrack = Some((p, t));
            p += 1;
        } else if let Some((star, matched)) = backtrack {
            p = star + 1;
            t = matched + 1;
            backtrack = Some((star, matched + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|&c| c == '*')
}
