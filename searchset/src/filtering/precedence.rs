//! Precedence between overlapping filters.
//!
//! A user who asks for an exact price is not also asking for a price range. A
//! [`Precedence`] rule names one exact filter and the filters it overrides; when the exact
//! filter carries a value, the overridden ones are not evaluated at all.
//!
//! ```rust,ignore
//! Precedence::exact("price_exact").over(["price_min_value", "price_max_value"])
//! ```

use super::criteria::Criteria;
use super::registry::FilterRegistry;
use crate::errors::ConfigurationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Precedence {
    exact: String,
    overridden: Vec<String>,
}

impl Precedence {
    /// Start a rule in which `exact` wins.
    #[must_use]
    pub fn exact(name: impl Into<String>) -> Self {
        Self {
            exact: name.into(),
            overridden: Vec::new(),
        }
    }

    /// Filters suppressed whenever the exact filter has a value.
    #[must_use]
    pub fn over<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.overridden.extend(names.into_iter().map(Into::into));
        self
    }

    #[must_use]
    pub fn exact_name(&self) -> &str {
        &self.exact
    }

    #[must_use]
    pub fn overridden(&self) -> &[String] {
        &self.overridden
    }

    /// Whether this rule suppresses `name` for the given criteria.
    #[must_use]
    pub fn suppresses(&self, name: &str, criteria: &Criteria) -> bool {
        self.overridden.iter().any(|o| o == name) && criteria.get_present(&self.exact).is_some()
    }

    /// Every name in the rule must be a declared filter.
    pub(crate) fn validate(&self, registry: &FilterRegistry) -> Result<(), ConfigurationError> {
        std::iter::once(&self.exact)
            .chain(&self.overridden)
            .find(|name| !registry.contains(name))
            .map_or(Ok(()), |name| {
                Err(ConfigurationError::UnknownPrecedenceFilter { name: name.clone() })
            })
    }
}

/// Whether any rule suppresses `name`.
#[must_use]
pub fn is_suppressed(rules: &[Precedence], name: &str, criteria: &Criteria) -> bool {
    rules.iter().any(|rule| rule.suppresses(name, criteria))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filtering::primitives::{Lookup, NumericFilter};
    use serde_json::json;

    fn price_rule() -> Precedence {
        Precedence::exact("price_exact").over(["price_min_value", "price_max_value"])
    }

    #[test]
    fn test_exact_value_suppresses_range() {
        let criteria = Criteria::new()
            .with("price_exact", 29.99)
            .with("price_min_value", 35);
        assert!(price_rule().suppresses("price_min_value", &criteria));
        assert!(price_rule().suppresses("price_max_value", &criteria));
        assert!(!price_rule().suppresses("price_exact", &criteria));
    }

    #[test]
    fn test_empty_exact_value_does_not_suppress() {
        let criteria = Criteria::new()
            .with("price_exact", json!(""))
            .with("price_min_value", 35);
        assert!(!price_rule().suppresses("price_min_value", &criteria));
        assert!(!is_suppressed(&[price_rule()], "price_min_value", &Criteria::new()));
    }

    #[test]
    fn test_validate_against_registry() {
        let registry = FilterRegistry::builder()
            .filter("price_exact", NumericFilter::new("price"))
            .filter("price_min_value", NumericFilter::new("price").lookup(Lookup::Gte))
            .build()
            .unwrap();

        assert_eq!(
            price_rule().validate(&registry),
            Err(ConfigurationError::UnknownPrecedenceFilter {
                name: "price_max_value".to_string()
            })
        );
        assert!(
            Precedence::exact("price_exact")
                .over(["price_min_value"])
                .validate(&registry)
                .is_ok()
        );
    }
}
