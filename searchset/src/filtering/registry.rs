//! Ordered, validated registration of named filters.

use super::primitives::Filter;
use crate::errors::ConfigurationError;

/// Named filters in declaration order.
///
/// Names are unique. Iteration order is the order the filters were declared in, which keeps
/// generated queries deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterRegistry {
    filters: Vec<(String, Filter)>,
}

impl FilterRegistry {
    #[must_use]
    pub fn builder() -> FilterRegistryBuilder {
        FilterRegistryBuilder::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Filter> {
        self.filters
            .iter()
            .find(|(filter_name, _)| filter_name == name)
            .map(|(_, filter)| filter)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Filter)> {
        self.filters.iter().map(|(name, filter)| (name.as_str(), filter))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.iter().map(|(name, _)| name.as_str())
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.filters.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

/// Collects filter declarations; validation happens in [`FilterRegistryBuilder::build`].
#[derive(Debug, Clone, Default)]
pub struct FilterRegistryBuilder {
    filters: Vec<(String, Filter)>,
}

impl FilterRegistryBuilder {
    /// Declare a filter under `name`.
    #[must_use]
    pub fn filter(mut self, name: impl Into<String>, filter: impl Into<Filter>) -> Self {
        self.filters.push((name.into(), filter.into()));
        self
    }

    /// Validate the declarations.
    ///
    /// # Errors
    ///
    /// Fails on an empty filter name, an empty field name or a repeated filter name.
    pub fn build(self) -> Result<FilterRegistry, ConfigurationError> {
        let mut seen: Vec<&str> = Vec::with_capacity(self.filters.len());
        for (name, filter) in &self.filters {
            if name.trim().is_empty() {
                return Err(ConfigurationError::EmptyFilterName);
            }
            if filter.field_name().trim().is_empty() {
                return Err(ConfigurationError::EmptyFieldName {
                    filter: name.clone(),
                });
            }
            if seen.contains(&name.as_str()) {
                return Err(ConfigurationError::DuplicateFilter { name: name.clone() });
            }
            seen.push(name.as_str());
        }

        Ok(FilterRegistry {
            filters: self.filters,
        })
    }
}
