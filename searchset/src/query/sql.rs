//! Sea-ORM adapter: runs filter-sets against a relational table.
//!
//! `Select<E>` is the accumulator. Clauses become `WHERE` conditions, sort keys become
//! `ORDER BY` and the page window becomes `OFFSET`/`LIMIT`:
//!
//! | clause     | SQL                                                    |
//! |------------|--------------------------------------------------------|
//! | `match`    | `UPPER(col) LIKE UPPER('%token%')`, any token          |
//! | `term`     | `col = value`                                          |
//! | `wildcard` | `UPPER(col) LIKE UPPER(pattern)` with `*`/`?` mapped   |
//! | `range`    | `col >= a AND col <= b` (per bound)                    |
//!
//! Field paths are mapped to column names by dropping a trailing `.keyword` segment.
//! A clause that cannot be expressed in SQL matches no rows, and is logged with a warning.

use async_trait::async_trait;
use sea_orm::{
    Condition, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Select, Value as SqlValue,
    sea_query::{Alias, Expr, Func, LikeExpr, SimpleExpr},
};
use serde_json::Value;
use std::marker::PhantomData;

use super::{ClauseKind, SearchExecutor, SearchQuery, SortDirection};
use crate::core::Document;

/// Largest offset or limit the SQL drivers bind (they take signed 64-bit integers).
const MAX_BIND: u64 = i64::MAX.unsigned_abs();

/// Escape LIKE wildcards so user input only matches literally.
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

fn column_name(field: &str) -> &str {
    field.strip_suffix(".keyword").unwrap_or(field)
}

fn column(field: &str) -> Expr {
    Expr::col(Alias::new(column_name(field)))
}

/// Convert a JSON scalar into a bind value.
fn sql_value(value: &Value) -> Option<SqlValue> {
    match value {
        Value::String(s) => Some(SqlValue::from(s.clone())),
        Value::Bool(b) => Some(SqlValue::from(*b)),
        Value::Number(n) => n
            .as_i64()
            .map(SqlValue::from)
            .or_else(|| n.as_f64().map(SqlValue::from)),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

/// A condition no row satisfies.
fn match_nothing() -> Condition {
    Condition::all().add(Expr::cust("1 = 0"))
}

/// Case-insensitive LIKE against an already escaped pattern.
fn upper_like(field: &str, pattern: &str) -> SimpleExpr {
    Expr::expr(Func::upper(column(field)))
        .like(LikeExpr::new(pattern.to_uppercase()).escape('\\'))
}

fn match_condition(field: &str, params: &Value) -> Option<Condition> {
    let text = text_of(params)?;
    let tokens: Vec<&str> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    if tokens.is_empty() {
        return Some(match_nothing());
    }

    let mut any = Condition::any();
    for token in tokens {
        any = any.add(upper_like(field, &format!("%{}%", escape_like_wildcards(token))));
    }
    Some(any)
}

fn wildcard_condition(field: &str, params: &Value) -> Option<SimpleExpr> {
    let glob = text_of(params)?;
    let pattern: String = glob
        .chars()
        .map(|c| match c {
            '*' => "%".to_string(),
            '?' => "_".to_string(),
            other => escape_like_wildcards(&other.to_string()),
        })
        .collect();
    Some(upper_like(field, &pattern))
}

fn range_condition(field: &str, params: &Value) -> Option<Condition> {
    let bounds = params.as_object()?;
    let mut all = Condition::all();
    for (bound, limit) in bounds {
        let limit = sql_value(limit)?;
        let expr = match bound.as_str() {
            "gt" => column(field).gt(limit),
            "gte" => column(field).gte(limit),
            "lt" => column(field).lt(limit),
            "lte" => column(field).lte(limit),
            _ => return None,
        };
        all = all.add(expr);
    }
    Some(all)
}

impl<E: EntityTrait> SearchQuery for Select<E> {
    fn add_clause(self, kind: ClauseKind, field: &str, params: Value) -> Self {
        let condition = match &kind {
            ClauseKind::Match => match_condition(field, &params),
            ClauseKind::Term => {
                sql_value(&params).map(|v| Condition::all().add(column(field).eq(v)))
            }
            ClauseKind::Wildcard => {
                wildcard_condition(field, &params).map(|expr| Condition::all().add(expr))
            }
            ClauseKind::Range => range_condition(field, &params),
            ClauseKind::Other(_) => None,
        };

        if let Some(condition) = condition {
            tracing::trace!(kind = %kind, field, "adding SQL condition");
            self.filter(condition)
        } else {
            tracing::warn!(
                kind = %kind,
                field,
                params = %params,
                "clause has no SQL equivalent, matching nothing"
            );
            self.filter(match_nothing())
        }
    }

    fn sort(self, field: &str, direction: SortDirection) -> Self {
        let expr: SimpleExpr = column(field).into();
        self.order_by(expr, direction.into())
    }

    fn slice(self, start: u64, end: u64) -> Self {
        let offset = start.min(MAX_BIND);
        let limit = end.saturating_sub(start).min(MAX_BIND);
        self.offset(offset).limit(limit)
    }
}

/// A Sea-ORM entity bound as a searchable document.
pub struct SqlTable<E> {
    table: String,
    _entity: PhantomData<fn() -> E>,
}

impl<E: EntityTrait> SqlTable<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: E::default().table_name().to_string(),
            _entity: PhantomData,
        }
    }
}

impl<E: EntityTrait> Default for SqlTable<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Clone for SqlTable<E> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            _entity: PhantomData,
        }
    }
}

impl<E> std::fmt::Debug for SqlTable<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqlTable").field("table", &self.table).finish()
    }
}

impl<E: EntityTrait> Document for SqlTable<E> {
    type Query = Select<E>;

    fn index_name(&self) -> &str {
        &self.table
    }

    fn search(&self) -> Select<E> {
        E::find()
    }
}

#[async_trait]
impl<E> SearchExecutor<Select<E>> for DatabaseConnection
where
    E: EntityTrait,
    E::Model: Send + Sync,
{
    type Hit = E::Model;
    type Error = DbErr;

    async fn execute(&self, query: Select<E>) -> Result<Vec<E::Model>, DbErr> {
        query.all(self).await
    }
}
