//! Per-request criteria data and value normalization.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use std::collections::BTreeMap;

/// Criteria key selecting the sort order.
pub const SORT_KEY: &str = "sort";
/// Criteria key selecting the 1-based page number.
pub const PAGE_KEY: &str = "page";
/// Criteria key selecting the page size.
pub const PAGE_SIZE_KEY: &str = "page_size";
/// Keys with a meaning of their own, never treated as filter names.
pub const RESERVED_KEYS: [&str; 3] = [SORT_KEY, PAGE_KEY, PAGE_SIZE_KEY];

/// Flat mapping of filter name (or reserved key) to a raw value.
///
/// Criteria are read-only once handed to a filter-set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Criteria(BTreeMap<String, Value>);

impl Criteria {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse criteria from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when `json` is not an object.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// The value under `key`, unless it is absent or empty.
    #[must_use]
    pub fn get_present(&self, key: &str) -> Option<&Value> {
        self.get(key).filter(|v| !is_empty_value(v))
    }

    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Criteria {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl From<serde_json::Map<String, Value>> for Criteria {
    fn from(map: serde_json::Map<String, Value>) -> Self {
        Self(map.into_iter().collect())
    }
}

/// Null, blank strings and empty containers carry no criterion.
#[must_use]
pub fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(s) => s.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

/// Text value: trimmed strings, stringified scalars.
pub(crate) fn text_value(value: &Value) -> Option<Value> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(Value::String(s.trim().to_string())),
        Value::Number(n) => Some(Value::String(n.to_string())),
        Value::Bool(b) => Some(Value::String(b.to_string())),
        _ => None,
    }
}

/// Numeric value: JSON numbers, or strings that parse as integers or floats.
pub(crate) fn number_value(value: &Value) -> Option<Value> {
    match value {
        Value::Number(n) => Some(Value::Number(n.clone())),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .map(Number::from)
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(Number::from_f64))
                .map(Value::Number)
        }
        _ => None,
    }
}

/// Date value normalized to ISO 8601.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 and `YYYY-MM-DDTHH:MM:SS`.
pub(crate) fn date_value(value: &Value) -> Option<Value> {
    let s = value.as_str()?.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Some(Value::String(date.format("%Y-%m-%d").to_string()));
    }
    if let Ok(datetime) = DateTime::parse_from_rfc3339(s) {
        return Some(Value::String(datetime.to_rfc3339()));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S")
        .ok()
        .map(|datetime| Value::String(datetime.format("%Y-%m-%dT%H:%M:%S").to_string()))
}

pub(crate) fn bool_value(value: &Value) -> Option<Value> {
    let parsed = match value {
        Value::Bool(b) => Some(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Some(false),
            Some(1) => Some(true),
            _ => None,
        },
        Value::String(s) => match s.trim().to_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    };
    parsed.map(Value::Bool)
}

/// Range operand: a number if it reads as one, else a date, else the trimmed string.
pub(crate) fn range_operand(value: &Value) -> Option<Value> {
    if is_empty_value(value) {
        return None;
    }
    number_value(value)
        .or_else(|| date_value(value))
        .or_else(|| text_value(value))
}
