//! Flat key-value records and explicit field access.
//!
//! A [`Record`] maps field names to [`FieldValue`]s. Filters never read a
//! value by implicit coercion: each leaf kind goes through one of the typed
//! accessors below, which report whether the field was absent, held a value
//! of another kind, or held a usable value.

use std::collections::HashMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::filter::FilterResult;

/// A single field value in a record.
///
/// Deserializes untagged from JSON scalars. JSON strings always become
/// [`FieldValue::Text`], including ones that look like dates; date leaves
/// coerce text on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    /// A boolean value.
    Bool(bool),
    /// A numeric value.
    Number(f64),
    /// A text value.
    Text(String),
    /// A native point in time.
    Date(DateTime<Utc>),
}

impl FieldValue {
    /// Returns the kind of this value.
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Bool(_) => FieldKind::Bool,
            FieldValue::Number(_) => FieldKind::Number,
            FieldValue::Text(_) => FieldKind::Text,
            FieldValue::Date(_) => FieldKind::Date,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        FieldValue::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        FieldValue::Text(value)
    }
}

impl From<bool> for FieldValue {
    fn from(value: bool) -> Self {
        FieldValue::Bool(value)
    }
}

impl From<f64> for FieldValue {
    fn from(value: f64) -> Self {
        FieldValue::Number(value)
    }
}

impl From<i64> for FieldValue {
    fn from(value: i64) -> Self {
        FieldValue::Number(value as f64)
    }
}

impl From<DateTime<Utc>> for FieldValue {
    fn from(value: DateTime<Utc>) -> Self {
        FieldValue::Date(value)
    }
}

/// The kind of a [`FieldValue`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Bool,
    Number,
    Text,
    Date,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FieldKind::Bool => "boolean",
            FieldKind::Number => "number",
            FieldKind::Text => "text",
            FieldKind::Date => "date",
        };
        f.write_str(name)
    }
}

/// Outcome of reading a field as a specific kind.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FieldAccess<T> {
    /// The record has no such field.
    Absent,
    /// The field holds a value of a different kind.
    Mismatch(FieldKind),
    /// The field holds a value of the requested kind.
    Present(T),
}

impl<T> FieldAccess<T> {
    /// Returns the value if present, discarding absence and mismatch.
    pub fn present(self) -> Option<T> {
        match self {
            FieldAccess::Present(value) => Some(value),
            FieldAccess::Absent | FieldAccess::Mismatch(_) => None,
        }
    }
}

/// A date-like field value, borrowed from a record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DateRef<'a> {
    /// A native point in time.
    Native(&'a DateTime<Utc>),
    /// Text that may parse into a point in time.
    Text(&'a str),
}

/// A flat mapping from field name to value.
///
/// Deserializes from a JSON object of scalars. `null` entries are dropped,
/// so they read as absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: HashMap<String, FieldValue>,
}

impl Record {
    /// Creates an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a record from a JSON object of scalar values.
    pub fn from_json(json: &str) -> FilterResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Adds a field, returning the record for chaining.
    pub fn with(mut self, field: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, returning the previous value if any.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<FieldValue>,
    ) -> Option<FieldValue> {
        self.fields.insert(field.into(), value.into())
    }

    /// Returns the raw value of a field.
    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.fields.get(field)
    }

    /// Returns the number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Reads a field as text.
    pub fn text_field(&self, field: &str) -> FieldAccess<&str> {
        match self.get(field) {
            None => FieldAccess::Absent,
            Some(FieldValue::Text(s)) => FieldAccess::Present(s.as_str()),
            Some(other) => FieldAccess::Mismatch(other.kind()),
        }
    }

    /// Reads a field as a number.
    pub fn number_field(&self, field: &str) -> FieldAccess<f64> {
        match self.get(field) {
            None => FieldAccess::Absent,
            Some(FieldValue::Number(n)) => FieldAccess::Present(*n),
            Some(other) => FieldAccess::Mismatch(other.kind()),
        }
    }

    /// Reads a field as a boolean.
    pub fn bool_field(&self, field: &str) -> FieldAccess<bool> {
        match self.get(field) {
            None => FieldAccess::Absent,
            Some(FieldValue::Bool(b)) => FieldAccess::Present(*b),
            Some(other) => FieldAccess::Mismatch(other.kind()),
        }
    }

    /// Reads a field as a date. Both native dates and text are accepted.
    pub fn date_field(&self, field: &str) -> FieldAccess<DateRef<'_>> {
        match self.get(field) {
            None => FieldAccess::Absent,
            Some(FieldValue::Date(dt)) => FieldAccess::Present(DateRef::Native(dt)),
            Some(FieldValue::Text(s)) => FieldAccess::Present(DateRef::Text(s.as_str())),
            Some(other) => FieldAccess::Mismatch(other.kind()),
        }
    }
}

impl<'de> Deserialize<'de> for Record {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let fields = HashMap::<String, Option<FieldValue>>::deserialize(deserializer)?;
        Ok(fields
            .into_iter()
            .filter_map(|(field, value)| value.map(|value| (field, value)))
            .collect())
    }
}

impl<K: Into<String>, V: Into<FieldValue>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            fields: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Empty text counts as no value for text and date leaves.
pub fn is_absent_or_empty(value: &str) -> bool {
    value.is_empty()
}

/// Zero and NaN count as no value for number leaves.
///
/// This excludes records whose field is exactly `0`, even for `eq 0`.
pub fn is_absent_or_zero(value: f64) -> bool {
    value == 0.0 || value.is_nan()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_json_scalars() {
        let record =
            Record::from_json(r#"{"name": "Anna", "age": 31, "active": false, "when": "2023-06-15"}"#)
                .unwrap();

        assert_eq!(record.len(), 4);
        assert_eq!(record.get("name"), Some(&FieldValue::Text("Anna".to_string())));
        assert_eq!(record.get("age"), Some(&FieldValue::Number(31.0)));
        assert_eq!(record.get("active"), Some(&FieldValue::Bool(false)));
        // Date-looking strings stay text
        assert_eq!(
            record.get("when"),
            Some(&FieldValue::Text("2023-06-15".to_string()))
        );
    }

    #[test]
    fn test_from_json_drops_null_fields() {
        let record = Record::from_json(r#"{"name": "Anna", "x": null}"#).unwrap();

        assert_eq!(record.len(), 1);
        assert_eq!(record.get("x"), None);
        assert_eq!(record.text_field("x"), FieldAccess::Absent);
        assert_eq!(record.number_field("x"), FieldAccess::Absent);
    }

    #[test]
    fn test_from_json_rejects_nested_values() {
        assert!(Record::from_json(r#"{"tags": ["a"]}"#).is_err());
        assert!(Record::from_json(r#"{"meta": {"a": 1}}"#).is_err());
    }

    #[test]
    fn test_from_json_rejects_non_object() {
        assert!(Record::from_json("[1, 2]").is_err());
    }

    #[test]
    fn test_text_field_access() {
        let record = Record::new().with("name", "Anna").with("age", 3i64);

        assert_eq!(record.text_field("name"), FieldAccess::Present("Anna"));
        assert_eq!(record.text_field("missing"), FieldAccess::Absent);
        assert_eq!(
            record.text_field("age"),
            FieldAccess::Mismatch(FieldKind::Number)
        );
    }

    #[test]
    fn test_number_and_bool_field_access() {
        let record = Record::new().with("n", 2.5).with("b", true);

        assert_eq!(record.number_field("n"), FieldAccess::Present(2.5));
        assert_eq!(record.bool_field("b"), FieldAccess::Present(true));
        assert_eq!(record.bool_field("n"), FieldAccess::Mismatch(FieldKind::Number));
        assert_eq!(record.number_field("b"), FieldAccess::Mismatch(FieldKind::Bool));
    }

    #[test]
    fn test_date_field_accepts_native_and_text() {
        let dt = Utc.with_ymd_and_hms(2023, 6, 15, 0, 0, 0).unwrap();
        let record = Record::new()
            .with("native", dt)
            .with("text", "2023-06-15")
            .with("flag", true);

        assert_eq!(
            record.date_field("native"),
            FieldAccess::Present(DateRef::Native(&dt))
        );
        assert_eq!(
            record.date_field("text"),
            FieldAccess::Present(DateRef::Text("2023-06-15"))
        );
        assert_eq!(
            record.date_field("flag"),
            FieldAccess::Mismatch(FieldKind::Bool)
        );
    }

    #[test]
    fn test_falsy_predicates() {
        assert!(is_absent_or_empty(""));
        assert!(!is_absent_or_empty(" "));
        assert!(is_absent_or_zero(0.0));
        assert!(is_absent_or_zero(-0.0));
        assert!(is_absent_or_zero(f64::NAN));
        assert!(!is_absent_or_zero(0.001));
        assert!(!is_absent_or_zero(-1.0));
    }

    #[test]
    fn test_from_iterator() {
        let record: Record = vec![("a", FieldValue::from(1i64)), ("b", FieldValue::from("x"))]
            .into_iter()
            .collect();
        assert_eq!(record.len(), 2);
        assert!(!record.is_empty());
    }
}
