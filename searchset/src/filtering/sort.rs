use serde_json::Value;

use crate::errors::ConfigurationError;
use crate::query::{SearchQuery, SortDirection};

/// Prefix turning a sort key into its descending variant.
const DESCENDING_PREFIX: char = '-';
/// Separator between several sort keys in one `sort` value.
const KEY_SEPARATOR: char = ',';

/// Split a requested key into its bare name and direction.
fn parse_direction(key: &str) -> (&str, SortDirection) {
    key.strip_prefix(DESCENDING_PREFIX)
        .map_or((key, SortDirection::Asc), |bare| (bare, SortDirection::Desc))
}

/// A public sort key and the index field it sorts on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOption {
    key: String,
    field: String,
}

impl SortOption {
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }
}

/// The fixed set of sort keys a filter-set accepts.
///
/// Registering `title_keyword → title.keyword` accepts both `title_keyword` (ascending) and
/// `-title_keyword` (descending).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortOptions {
    options: Vec<SortOption>,
}

impl SortOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Accept `key` / `-key`, sorting on the index field `field`.
    #[must_use]
    pub fn field(mut self, key: impl Into<String>, field: impl Into<String>) -> Self {
        self.options.push(SortOption {
            key: key.into(),
            field: field.into(),
        });
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &SortOption> {
        self.options.iter()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Look up a single requested key such as `"-price"`.
    #[must_use]
    pub fn resolve(&self, requested: &str) -> Option<(&str, SortDirection)> {
        let (bare, direction) = parse_direction(requested.trim());
        self.options
            .iter()
            .find(|option| option.key == bare)
            .map(|option| (option.field.as_str(), direction))
    }

    /// Resolve a `sort` criteria value into sort keys, in priority order.
    ///
    /// Several keys may be given comma-separated (`"-price,title_keyword"`) or as an array.
    /// Unknown keys are skipped.
    #[must_use]
    pub fn resolve_all(&self, sort: Option<&Value>) -> Vec<(&str, SortDirection)> {
        let requested: Vec<String> = match sort {
            Some(Value::String(s)) => s.split(KEY_SEPARATOR).map(str::to_string).collect(),
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        };

        requested
            .iter()
            .filter(|key| !key.trim().is_empty())
            .filter_map(|key| {
                let resolved = self.resolve(key);
                if resolved.is_none() {
                    tracing::debug!(sort_key = %key, "ignoring unknown sort key");
                }
                resolved
            })
            .collect()
    }

    /// Apply every resolved sort key to `query`.
    pub fn apply<Q: SearchQuery>(&self, query: Q, sort: Option<&Value>) -> Q {
        self.resolve_all(sort)
            .into_iter()
            .fold(query, |query, (field, direction)| query.sort(field, direction))
    }

    pub(crate) fn validate(&self) -> Result<(), ConfigurationError> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.options.len());
        for option in &self.options {
            let key = option.key.as_str();
            if key.trim().is_empty()
                || key.starts_with(DESCENDING_PREFIX)
                || key.contains(KEY_SEPARATOR)
                || option.field.trim().is_empty()
            {
                return Err(ConfigurationError::EmptySortField {
                    key: key.to_string(),
                });
            }
            if seen.contains(&key) {
                return Err(ConfigurationError::DuplicateSortKey {
                    key: key.to_string(),
                });
            }
            seen.push(key);
        }
        Ok(())
    }
}
