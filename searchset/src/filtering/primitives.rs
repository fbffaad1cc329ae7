//! Filter primitives: single-field predicate builders.
//!
//! Each primitive turns one raw criteria value into at most one clause on the query
//! accumulator. An absent, null or empty value, or a value the primitive cannot read
//! (a non-numeric price, an unparseable date), leaves the accumulator unchanged.

use serde_json::{Map, Value};
use std::fmt;

use super::criteria::{
    bool_value, date_value, is_empty_value, number_value, range_operand, text_value,
};
use crate::query::{ClauseKind, SearchQuery};

/// How a primitive compares its value against the field.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Lookup {
    /// Full-text match
    Match,
    /// Exact term
    Term,
    /// Substring match (`*value*` for text)
    Wildcard,
    /// Greater than
    Gt,
    /// Greater than or equal
    Gte,
    /// Less than
    Lt,
    /// Less than or equal
    Lte,
    /// Any other query type, passed to the engine verbatim
    Other(String),
}

impl Lookup {
    /// Parse a lookup expression such as `"gte"` or `"match"`.
    #[must_use]
    pub fn parse(expr: &str) -> Self {
        match expr {
            "match" => Self::Match,
            "term" => Self::Term,
            "wildcard" => Self::Wildcard,
            "gt" => Self::Gt,
            "gte" => Self::Gte,
            "lt" => Self::Lt,
            "lte" => Self::Lte,
            other => Self::Other(other.to_string()),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Match => "match",
            Self::Term => "term",
            Self::Wildcard => "wildcard",
            Self::Gt => "gt",
            Self::Gte => "gte",
            Self::Lt => "lt",
            Self::Lte => "lte",
            Self::Other(name) => name,
        }
    }

    /// The range bound key for comparison lookups.
    #[must_use]
    pub const fn range_bound(&self) -> Option<&'static str> {
        match self {
            Self::Gt => Some("gt"),
            Self::Gte => Some("gte"),
            Self::Lt => Some("lt"),
            Self::Lte => Some("lte"),
            _ => None,
        }
    }

    /// The clause kind used when this lookup is forwarded as-is.
    fn verbatim_kind(&self) -> ClauseKind {
        match self {
            Self::Match => ClauseKind::Match,
            Self::Term => ClauseKind::Term,
            Self::Wildcard => ClauseKind::Wildcard,
            other => ClauseKind::Other(other.as_str().to_string()),
        }
    }
}

impl fmt::Display for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Lookup {
    fn from(expr: &str) -> Self {
        Self::parse(expr)
    }
}

/// The value type a primitive reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterKind {
    Text,
    Numeric,
    Date,
    Boolean,
    Range,
}

/// Comparison lookups become a range clause, everything else is forwarded as its own kind.
fn comparison<Q: SearchQuery>(query: Q, field: &str, lookup: &Lookup, value: Value) -> Q {
    match lookup.range_bound() {
        Some(bound) => {
            let mut bounds = Map::new();
            bounds.insert(bound.to_string(), value);
            query.add_clause(ClauseKind::Range, field, Value::Object(bounds))
        }
        None => query.add_clause(lookup.verbatim_kind(), field, value),
    }
}

/// Text filter. Default lookup: [`Lookup::Match`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharFilter {
    field_name: String,
    lookup: Lookup,
}

impl CharFilter {
    #[must_use]
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            lookup: Lookup::Match,
        }
    }

    #[must_use]
    pub fn lookup(mut self, lookup: impl Into<Lookup>) -> Self {
        self.lookup = lookup.into();
        self
    }

    pub fn apply<Q: SearchQuery>(&self, query: Q, value: &Value) -> Q {
        let Some(Value::String(text)) = text_value(value) else {
            return query;
        };
        let field = self.field_name.as_str();
        match &self.lookup {
            Lookup::Match => query.add_clause(ClauseKind::Match, field, Value::String(text)),
            Lookup::Term => query.add_clause(ClauseKind::Term, field, Value::String(text)),
            Lookup::Wildcard => {
                query.add_clause(ClauseKind::Wildcard, field, Value::String(format!("*{text}*")))
            }
            other => query.add_clause(
                ClauseKind::Other(other.as_str().to_string()),
                field,
                Value::String(text),
            ),
        }
    }
}

/// Numeric filter. Default lookup: [`Lookup::Term`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NumericFilter {
    field_name: String,
    lookup: Lookup,
}

impl NumericFilter {
    #[must_use]
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            lookup: Lookup::Term,
        }
    }

    #[must_use]
    pub fn lookup(mut self, lookup: impl Into<Lookup>) -> Self {
        self.lookup = lookup.into();
        self
    }

    pub fn apply<Q: SearchQuery>(&self, query: Q, value: &Value) -> Q {
        match number_value(value) {
            Some(number) => comparison(query, &self.field_name, &self.lookup, number),
            None => query,
        }
    }
}

/// Date filter. Default lookup: [`Lookup::Term`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateFilter {
    field_name: String,
    lookup: Lookup,
}

impl DateFilter {
    #[must_use]
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
            lookup: Lookup::Term,
        }
    }

    #[must_use]
    pub fn lookup(mut self, lookup: impl Into<Lookup>) -> Self {
        self.lookup = lookup.into();
        self
    }

    pub fn apply<Q: SearchQuery>(&self, query: Q, value: &Value) -> Q {
        match date_value(value) {
            Some(date) => comparison(query, &self.field_name, &self.lookup, date),
            None => query,
        }
    }
}

/// Boolean equality filter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BooleanFilter {
    field_name: String,
}

impl BooleanFilter {
    #[must_use]
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }

    pub fn apply<Q: SearchQuery>(&self, query: Q, value: &Value) -> Q {
        match bool_value(value) {
            Some(flag) => query.add_clause(ClauseKind::Term, &self.field_name, flag),
            None => query,
        }
    }
}

/// Two-sided range filter reading `{"min": .., "max": ..}` or `[min, max]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeFilter {
    field_name: String,
}

impl RangeFilter {
    #[must_use]
    pub fn new(field_name: impl Into<String>) -> Self {
        Self {
            field_name: field_name.into(),
        }
    }

    pub fn apply<Q: SearchQuery>(&self, query: Q, value: &Value) -> Q {
        let (min, max) = match value {
            Value::Object(map) => (map.get("min"), map.get("max")),
            Value::Array(items) if items.len() == 2 => (items.first(), items.get(1)),
            _ => return query,
        };

        let mut bounds = Map::new();
        if let Some(min) = min.and_then(range_operand) {
            bounds.insert("gte".to_string(), min);
        }
        if let Some(max) = max.and_then(range_operand) {
            bounds.insert("lte".to_string(), max);
        }

        if bounds.is_empty() {
            query
        } else {
            query.add_clause(ClauseKind::Range, &self.field_name, Value::Object(bounds))
        }
    }
}

/// Any filter primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    Char(CharFilter),
    Numeric(NumericFilter),
    Date(DateFilter),
    Boolean(BooleanFilter),
    Range(RangeFilter),
}

impl Filter {
    #[must_use]
    pub fn field_name(&self) -> &str {
        match self {
            Self::Char(f) => &f.field_name,
            Self::Numeric(f) => &f.field_name,
            Self::Date(f) => &f.field_name,
            Self::Boolean(f) => &f.field_name,
            Self::Range(f) => &f.field_name,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> FilterKind {
        match self {
            Self::Char(_) => FilterKind::Text,
            Self::Numeric(_) => FilterKind::Numeric,
            Self::Date(_) => FilterKind::Date,
            Self::Boolean(_) => FilterKind::Boolean,
            Self::Range(_) => FilterKind::Range,
        }
    }

    /// The lookup of single-valued primitives; boolean and range filters have fixed ones.
    #[must_use]
    pub const fn lookup(&self) -> Option<&Lookup> {
        match self {
            Self::Char(f) => Some(&f.lookup),
            Self::Numeric(f) => Some(&f.lookup),
            Self::Date(f) => Some(&f.lookup),
            Self::Boolean(_) | Self::Range(_) => None,
        }
    }

    /// Fold `value` into `query`. Empty values are a no-op for every kind.
    pub fn apply<Q: SearchQuery>(&self, query: Q, value: &Value) -> Q {
        if is_empty_value(value) {
            return query;
        }
        match self {
            Self::Char(f) => f.apply(query, value),
            Self::Numeric(f) => f.apply(query, value),
            Self::Date(f) => f.apply(query, value),
            Self::Boolean(f) => f.apply(query, value),
            Self::Range(f) => f.apply(query, value),
        }
    }
}

impl From<CharFilter> for Filter {
    fn from(filter: CharFilter) -> Self {
        Self::Char(filter)
    }
}

impl From<NumericFilter> for Filter {
    fn from(filter: NumericFilter) -> Self {
        Self::Numeric(filter)
    }
}

impl From<DateFilter> for Filter {
    fn from(filter: DateFilter) -> Self {
        Self::Date(filter)
    }
}

impl From<BooleanFilter> for Filter {
    fn from(filter: BooleanFilter) -> Self {
        Self::Boolean(filter)
    }
}

impl From<RangeFilter> for Filter {
    fn from(filter: RangeFilter) -> Self {
        Self::Range(filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{Clause, SearchRequest};
    use serde_json::json;

    fn clauses(filter: impl Into<Filter>, value: Value) -> Vec<Clause> {
        filter
            .into()
            .apply(SearchRequest::new("books"), &value)
            .clauses()
            .to_vec()
    }

    fn single(filter: impl Into<Filter>, value: Value) -> Value {
        let clauses = clauses(filter, value);
        assert_eq!(clauses.len(), 1, "{clauses:?}");
        clauses[0].to_json()
    }

    #[test]
    fn test_lookup_parse_round_trips_names() {
        for name in ["match", "term", "wildcard", "gt", "gte", "lt", "lte", "prefix"] {
            assert_eq!(Lookup::parse(name).as_str(), name);
        }
        assert_eq!(Lookup::parse("prefix"), Lookup::Other("prefix".to_string()));
    }

    #[test]
    fn test_char_filter_lookups() {
        assert_eq!(
            single(CharFilter::new("title"), json!("Python")),
            json!({ "match": { "title": "Python" } })
        );
        assert_eq!(
            single(CharFilter::new("title").lookup(Lookup::Term), json!("Python")),
            json!({ "term": { "title": "Python" } })
        );
        assert_eq!(
            single(CharFilter::new("title").lookup("wildcard"), json!("yth")),
            json!({ "wildcard": { "title": "*yth*" } })
        );
        assert_eq!(
            single(CharFilter::new("title").lookup("prefix"), json!("Py")),
            json!({ "prefix": { "title": "Py" } })
        );
    }

    #[test]
    fn test_char_filter_trims_and_stringifies() {
        assert_eq!(
            single(CharFilter::new("isbn"), json!(12345)),
            json!({ "match": { "isbn": "12345" } })
        );
        assert_eq!(
            single(CharFilter::new("title"), json!("  Python ")),
            json!({ "match": { "title": "Python" } })
        );
    }

    #[test]
    fn test_numeric_filter_lookups() {
        assert_eq!(
            single(NumericFilter::new("price"), json!(29.99)),
            json!({ "term": { "price": 29.99 } })
        );
        for (lookup, bound) in [(Lookup::Gt, "gt"), (Lookup::Gte, "gte"), (Lookup::Lt, "lt"), (Lookup::Lte, "lte")] {
            let clause = single(NumericFilter::new("price").lookup(lookup), json!("35"));
            assert_eq!(clause["range"]["price"][bound], json!(35));
            assert_eq!(clause["range"]["price"].as_object().map(Map::len), Some(1));
        }
    }

    #[test]
    fn test_numeric_filter_ignores_non_numbers() {
        assert!(clauses(NumericFilter::new("price"), json!("cheap")).is_empty());
        assert!(clauses(NumericFilter::new("price"), json!(true)).is_empty());
    }

    #[test]
    fn test_zero_is_a_value() {
        assert_eq!(
            single(NumericFilter::new("stock"), json!(0)),
            json!({ "term": { "stock": 0 } })
        );
    }

    #[test]
    fn test_date_filter_lookups() {
        assert_eq!(
            single(DateFilter::new("publication_date"), json!("2023-02-01")),
            json!({ "term": { "publication_date": "2023-02-01" } })
        );
        assert_eq!(
            single(DateFilter::new("publication_date").lookup(Lookup::Lt), json!("2023-02-01")),
            json!({ "range": { "publication_date": { "lt": "2023-02-01" } } })
        );
        assert!(clauses(DateFilter::new("publication_date"), json!("yesterday")).is_empty());
    }

    #[test]
    fn test_boolean_filter() {
        assert_eq!(
            single(BooleanFilter::new("in_stock"), json!(false)),
            json!({ "term": { "in_stock": false } })
        );
        assert_eq!(
            single(BooleanFilter::new("in_stock"), json!("true")),
            json!({ "term": { "in_stock": true } })
        );
        assert!(clauses(BooleanFilter::new("in_stock"), json!("perhaps")).is_empty());
    }

    #[test]
    fn test_range_filter_bounds() {
        assert_eq!(
            single(RangeFilter::new("price"), json!({ "min": 35, "max": "45" })),
            json!({ "range": { "price": { "gte": 35, "lte": 45 } } })
        );
        assert_eq!(
            single(RangeFilter::new("price"), json!([null, 45])),
            json!({ "range": { "price": { "lte": 45 } } })
        );
        assert_eq!(
            single(RangeFilter::new("published"), json!({ "min": "2023-01-01" })),
            json!({ "range": { "published": { "gte": "2023-01-01" } } })
        );
    }

    #[test]
    fn test_range_filter_without_bounds_is_noop() {
        assert!(clauses(RangeFilter::new("price"), json!({ "min": null, "max": "" })).is_empty());
        assert!(clauses(RangeFilter::new("price"), json!([1, 2, 3])).is_empty());
        assert!(clauses(RangeFilter::new("price"), json!(40)).is_empty());
    }

    #[test]
    fn test_empty_values_are_noop_for_every_kind() {
        let filters: Vec<Filter> = vec![
            CharFilter::new("title").into(),
            NumericFilter::new("price").into(),
            DateFilter::new("publication_date").into(),
            BooleanFilter::new("in_stock").into(),
            RangeFilter::new("price").into(),
        ];
        for filter in filters {
            for empty in [Value::Null, json!(""), json!("  "), json!([]), json!({})] {
                let query = filter.apply(SearchRequest::new("books"), &empty);
                assert_eq!(query, SearchRequest::new("books"), "{:?} with {empty}", filter.kind());
            }
        }
    }

    #[test]
    fn test_filter_metadata() {
        let filter = Filter::from(NumericFilter::new("price").lookup(Lookup::Gte));
        assert_eq!(filter.field_name(), "price");
        assert_eq!(filter.kind(), FilterKind::Numeric);
        assert_eq!(filter.lookup(), Some(&Lookup::Gte));
        assert_eq!(Filter::from(RangeFilter::new("price")).lookup(), None);
    }

    #[test]
    fn test_apply_chains_onto_existing_query() {
        let query = SearchRequest::new("books").add_clause(ClauseKind::Term, "id", json!(1));
        let query = Filter::from(CharFilter::new("title")).apply(query, &json!("Python"));
        assert_eq!(query.clauses().len(), 2);
    }
}
