use serde_json::{Value, json};
use std::any::TypeId;
use std::borrow::Cow;
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, LazyLock, Mutex, PoisonError};

use crate::errors::ConfigurationError;
use crate::filtering::{
    Criteria, DEFAULT_PAGE_SIZE, Filter, FilterRegistry, FilterRegistryBuilder, MAX_PAGE_SIZE,
    PaginationPolicy, Precedence, RESERVED_KEYS, SortOptions, precedence::is_suppressed,
};
use crate::query::SearchQuery;

const RANGE_MIN_SUFFIX: &str = "_min";
const RANGE_MAX_SUFFIX: &str = "_max";

/// Declaration of a concrete filter-set.
///
/// Filters are registered explicitly, in the order they should be applied:
///
/// ```rust,ignore
/// struct BookFilters;
///
/// impl FilterSetDefinition for BookFilters {
///     fn declare_filters(filters: FilterRegistryBuilder) -> FilterRegistryBuilder {
///         filters
///             .filter("title", CharFilter::new("title"))
///             .filter("price_exact", NumericFilter::new("price"))
///             .filter("price_min_value", NumericFilter::new("price").lookup(Lookup::Gte))
///             .filter("price_max_value", NumericFilter::new("price").lookup(Lookup::Lte))
///     }
///
///     fn precedence() -> Vec<Precedence> {
///         vec![Precedence::exact("price_exact").over(["price_min_value", "price_max_value"])]
///     }
///
///     fn sort_options() -> SortOptions {
///         SortOptions::new().field("title_keyword", "title.keyword")
///     }
/// }
/// ```
pub trait FilterSetDefinition: 'static {
    const DEFAULT_PAGE_SIZE: u64 = DEFAULT_PAGE_SIZE;
    const MAX_PAGE_SIZE: u64 = MAX_PAGE_SIZE;

    /// Register the named filters.
    fn declare_filters(filters: FilterRegistryBuilder) -> FilterRegistryBuilder;

    /// Exact-over-range precedence rules. Default: none.
    #[must_use]
    fn precedence() -> Vec<Precedence> {
        Vec::new()
    }

    /// Accepted `sort` keys. Default: none, every sort key is ignored.
    #[must_use]
    fn sort_options() -> SortOptions {
        SortOptions::new()
    }
}

/// The declared filters of `S`, recomputed from its declaration.
///
/// # Errors
///
/// Returns the registry validation error of an invalid declaration.
pub fn declared_filters<S: FilterSetDefinition>() -> Result<FilterRegistry, ConfigurationError> {
    S::declare_filters(FilterRegistry::builder()).build()
}

static SCHEMAS: LazyLock<Mutex<HashMap<TypeId, Arc<FilterSetSchema>>>> =
    LazyLock::new(|| Mutex::new(HashMap::new()));

/// A filter that takes part in a request, with the value it applies.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveFilter<'a> {
    pub name: &'a str,
    pub filter: &'a Filter,
    pub value: Cow<'a, Value>,
}

/// Everything a filter-set type declares, validated.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterSetSchema {
    registry: FilterRegistry,
    precedence: Vec<Precedence>,
    sort_options: SortOptions,
    pagination: PaginationPolicy,
}

impl FilterSetSchema {
    /// The schema of `S`, built and validated once per type.
    ///
    /// # Errors
    ///
    /// Returns the first problem found in the declaration. Invalid schemas are not cached.
    pub fn of<S: FilterSetDefinition>() -> Result<Arc<Self>, ConfigurationError> {
        let type_id = TypeId::of::<S>();
        if let Some(schema) = SCHEMAS
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&type_id)
        {
            return Ok(Arc::clone(schema));
        }

        let schema = Arc::new(Self::build::<S>()?);
        tracing::debug!(
            filter_set = std::any::type_name::<S>(),
            filters = schema.registry.len(),
            "registered filter-set schema"
        );

        let mut schemas = SCHEMAS.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(Arc::clone(schemas.entry(type_id).or_insert(schema)))
    }

    fn build<S: FilterSetDefinition>() -> Result<Self, ConfigurationError> {
        let registry = declared_filters::<S>()?;

        let precedence = S::precedence();
        for rule in &precedence {
            rule.validate(&registry)?;
        }

        let sort_options = S::sort_options();
        sort_options.validate()?;

        let pagination = PaginationPolicy::new(S::DEFAULT_PAGE_SIZE, S::MAX_PAGE_SIZE);
        pagination.validate()?;

        Ok(Self {
            registry,
            precedence,
            sort_options,
            pagination,
        })
    }

    #[must_use]
    pub fn registry(&self) -> &FilterRegistry {
        &self.registry
    }

    #[must_use]
    pub fn precedence(&self) -> &[Precedence] {
        &self.precedence
    }

    #[must_use]
    pub fn sort_options(&self) -> &SortOptions {
        &self.sort_options
    }

    #[must_use]
    pub const fn pagination(&self) -> PaginationPolicy {
        self.pagination
    }

    /// The value a filter reads from the criteria.
    ///
    /// Range filters fall back to the flat `<name>_min` / `<name>_max` keys when nothing is
    /// given under their own name.
    fn value_for<'a>(name: &str, filter: &Filter, criteria: &'a Criteria) -> Option<Cow<'a, Value>> {
        if let Some(value) = criteria.get_present(name) {
            return Some(Cow::Borrowed(value));
        }
        if !matches!(filter, Filter::Range(_)) {
            return None;
        }

        let min = criteria.get_present(&format!("{name}{RANGE_MIN_SUFFIX}"));
        let max = criteria.get_present(&format!("{name}{RANGE_MAX_SUFFIX}"));
        if min.is_none() && max.is_none() {
            return None;
        }
        Some(Cow::Owned(json!({
            "min": min.cloned().unwrap_or(Value::Null),
            "max": max.cloned().unwrap_or(Value::Null),
        })))
    }

    /// Resolve which filters apply to `criteria`, in declaration order.
    ///
    /// A filter is active when it has a present, non-empty value and no precedence rule
    /// suppresses it. `criteria` is only read.
    #[must_use]
    pub fn active_filters<'a>(&'a self, criteria: &'a Criteria) -> Vec<ActiveFilter<'a>> {
        self.registry
            .iter()
            .filter_map(|(name, filter)| {
                let value = Self::value_for(name, filter, criteria)?;
                if is_suppressed(&self.precedence, name, criteria) {
                    tracing::debug!(filter = name, "filter overridden by an exact filter");
                    return None;
                }
                Some(ActiveFilter {
                    name,
                    filter,
                    value,
                })
            })
            .collect()
    }

    /// Whether `key` means anything to this schema.
    #[must_use]
    pub fn is_known_key(&self, key: &str) -> bool {
        if RESERVED_KEYS.contains(&key) || self.registry.contains(key) {
            return true;
        }
        [RANGE_MIN_SUFFIX, RANGE_MAX_SUFFIX].iter().any(|suffix| {
            key.strip_suffix(suffix)
                .and_then(|base| self.registry.get(base))
                .is_some_and(|filter| matches!(filter, Filter::Range(_)))
        })
    }
}

/// Per-request criteria bound to a filter-set definition.
///
/// Criteria are never modified; [`FilterSet::apply`] can run any number of times, from any
/// number of threads.
pub struct FilterSet<S> {
    schema: Arc<FilterSetSchema>,
    criteria: Criteria,
    _definition: PhantomData<fn() -> S>,
}

impl<S: FilterSetDefinition> FilterSet<S> {
    /// # Errors
    ///
    /// Fails when the definition of `S` is invalid.
    pub fn new(criteria: Criteria) -> Result<Self, ConfigurationError> {
        Ok(Self {
            schema: FilterSetSchema::of::<S>()?,
            criteria,
            _definition: PhantomData,
        })
    }

    #[must_use]
    pub fn criteria(&self) -> &Criteria {
        &self.criteria
    }

    #[must_use]
    pub fn schema(&self) -> &FilterSetSchema {
        &self.schema
    }

    #[must_use]
    pub fn active_filters(&self) -> Vec<ActiveFilter<'_>> {
        self.schema.active_filters(&self.criteria)
    }

    /// Criteria keys that match no filter and no reserved key.
    pub fn ignored_keys(&self) -> impl Iterator<Item = &str> {
        self.criteria
            .keys()
            .filter(|key| !self.schema.is_known_key(key))
    }

    /// Fold every active filter into `query`.
    pub fn apply<Q: SearchQuery>(&self, query: Q) -> Q {
        for key in self.ignored_keys() {
            tracing::debug!(key, "ignoring criteria key without a filter");
        }

        self.active_filters().into_iter().fold(query, |query, active| {
            tracing::trace!(
                filter = active.name,
                field = active.filter.field_name(),
                "applying filter"
            );
            active.filter.apply(query, &active.value)
        })
    }
}

impl<S> Clone for FilterSet<S> {
    fn clone(&self) -> Self {
        Self {
            schema: Arc::clone(&self.schema),
            criteria: self.criteria.clone(),
            _definition: PhantomData,
        }
    }
}

impl<S> std::fmt::Debug for FilterSet<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterSet")
            .field("filter_set", &std::any::type_name::<S>())
            .field("criteria", &self.criteria)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::{BooleanFilter, CharFilter, Lookup, NumericFilter, RangeFilter};
    use crate::query::SearchRequest;

    struct Gadgets;

    impl FilterSetDefinition for Gadgets {
        fn declare_filters(filters: FilterRegistryBuilder) -> FilterRegistryBuilder {
            filters
                .filter("name", CharFilter::new("name"))
                .filter("in_stock", BooleanFilter::new("in_stock"))
                .filter("weight", NumericFilter::new("weight"))
                .filter("weight_above", NumericFilter::new("weight").lookup(Lookup::Gt))
                .filter("price", RangeFilter::new("price"))
        }

        fn precedence() -> Vec<Precedence> {
            vec![Precedence::exact("weight").over(["weight_above"])]
        }
    }

    struct Broken;

    impl FilterSetDefinition for Broken {
        fn declare_filters(filters: FilterRegistryBuilder) -> FilterRegistryBuilder {
            filters.filter("name", CharFilter::new("name"))
        }

        fn precedence() -> Vec<Precedence> {
            vec![Precedence::exact("name").over(["nickname"])]
        }
    }

    struct TinyPages;

    impl FilterSetDefinition for TinyPages {
        const DEFAULT_PAGE_SIZE: u64 = 200;

        fn declare_filters(filters: FilterRegistryBuilder) -> FilterRegistryBuilder {
            filters
        }
    }

    fn names(filter_set: &FilterSet<Gadgets>) -> Vec<&str> {
        filter_set.active_filters().iter().map(|a| a.name).collect()
    }

    #[test]
    fn test_declared_filters_is_idempotent() {
        let first = declared_filters::<Gadgets>().unwrap();
        let second = declared_filters::<Gadgets>().unwrap();
        assert_eq!(first, second);
        assert_eq!(&first, FilterSetSchema::of::<Gadgets>().unwrap().registry());
    }

    #[test]
    fn test_schema_is_cached_per_type() {
        let first = FilterSetSchema::of::<Gadgets>().unwrap();
        let second = FilterSetSchema::of::<Gadgets>().unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn test_invalid_schema_is_reported_every_time() {
        for _ in 0..2 {
            assert_eq!(
                FilterSet::<Broken>::new(Criteria::new()).unwrap_err(),
                ConfigurationError::UnknownPrecedenceFilter {
                    name: "nickname".to_string()
                }
            );
        }
    }

    #[test]
    fn test_invalid_pagination_consts() {
        assert!(matches!(
            FilterSetSchema::of::<TinyPages>(),
            Err(ConfigurationError::InvalidPagination { .. })
        ));
    }

    #[test]
    fn test_active_filters_follow_declaration_order() {
        let criteria = Criteria::new()
            .with("weight_above", 3)
            .with("name", "lamp")
            .with("in_stock", false);
        let filter_set = FilterSet::<Gadgets>::new(criteria).unwrap();
        assert_eq!(names(&filter_set), vec!["name", "in_stock", "weight_above"]);
    }

    #[test]
    fn test_empty_values_are_inactive() {
        let criteria = Criteria::new().with("name", "").with("weight", Value::Null);
        let filter_set = FilterSet::<Gadgets>::new(criteria).unwrap();
        assert!(filter_set.active_filters().is_empty());
        assert_eq!(filter_set.apply(SearchRequest::new("gadgets")), SearchRequest::new("gadgets"));
    }

    #[test]
    fn test_precedence_does_not_touch_criteria() {
        let criteria = Criteria::new().with("weight", 2).with("weight_above", 3);
        let filter_set = FilterSet::<Gadgets>::new(criteria.clone()).unwrap();

        assert_eq!(names(&filter_set), vec!["weight"]);
        assert_eq!(filter_set.criteria(), &criteria);
        assert_eq!(names(&filter_set), vec!["weight"]);
    }

    #[test]
    fn test_range_reads_flat_keys() {
        let criteria = Criteria::new().with("price_min", 10).with("price_max", "20");
        let filter_set = FilterSet::<Gadgets>::new(criteria).unwrap();
        let active = filter_set.active_filters();
        assert_eq!(active.len(), 1);
        assert_eq!(&*active[0].value, &json!({ "min": 10, "max": "20" }));

        let query = filter_set.apply(SearchRequest::new("gadgets"));
        assert_eq!(
            query.clauses()[0].to_json(),
            json!({ "range": { "price": { "gte": 10, "lte": 20 } } })
        );
    }

    #[test]
    fn test_ignored_keys() {
        let criteria = Criteria::new()
            .with("name", "lamp")
            .with("colour", "red")
            .with("price_min", 3)
            .with("page", 2);
        let filter_set = FilterSet::<Gadgets>::new(criteria).unwrap();
        assert_eq!(filter_set.ignored_keys().collect::<Vec<_>>(), vec!["colour"]);
    }
}
