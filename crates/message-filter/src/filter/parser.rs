//! JSON decoding and encoding of filter expressions.
//!
//! The wire form is a tagged union keyed by `type`:
//!
//! ```json
//! {"type": "and", "filters": [
//!     {"type": "string", "field": "name", "operation": "startsWith", "value": "An"},
//!     {"type": "number", "field": "age", "operation": "gte", "value": 18}
//! ]}
//! ```
//!
//! Decoding never loses a node: anything that cannot be decoded becomes a
//! [`Filter::Unsupported`] carrying the reason and the raw JSON. The strict
//! entry points then turn the first such node into an error, while the
//! lenient ones keep it so that it evaluates to `false`.

use serde::de::{Deserialize, Deserializer, Error as _};
use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use strsim::levenshtein;

use super::ast::{
    BooleanFilter, BooleanOperation, DateFilter, DateOperation, DateValue, Filter, NumberFilter,
    NumberOperation, StringFilter, StringOperation, UnsupportedFilter, WireOperation,
};
use super::error::FilterResult;

/// Every legal value of the `type` key.
const FILTER_TYPES: &[&str] = &["string", "number", "boolean", "date", "or", "and"];

/// Maximum Levenshtein distance to consider a name as a suggestion.
const MAX_SUGGESTION_DISTANCE: usize = 3;

/// Parser for the JSON form of filter expressions.
pub struct FilterParser;

impl FilterParser {
    /// Parses a filter, rejecting any malformed node.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidJson`](super::FilterError::InvalidJson) if the
    /// input is not JSON, or [`FilterError::UnsupportedNode`](super::FilterError::UnsupportedNode)
    /// naming the path of the first node that cannot be decoded.
    ///
    /// # Example
    ///
    /// ```
    /// use message_filter_rs::filter::{Filter, FilterParser};
    ///
    /// let filter = FilterParser::parse(
    ///     r#"{"type": "boolean", "field": "active", "operation": "eq", "value": false}"#,
    /// )
    /// .unwrap();
    /// assert_eq!(filter, Filter::boolean("active", false));
    ///
    /// let err = FilterParser::parse(r#"{"type": "or", "filters": [{"type": "regex"}]}"#);
    /// assert!(err.is_err());
    /// ```
    pub fn parse(input: &str) -> FilterResult<Filter> {
        let filter = Self::parse_lenient(input)?;
        filter.validate()?;
        Ok(filter)
    }

    /// Parses a filter, keeping malformed nodes as [`Filter::Unsupported`].
    ///
    /// # Errors
    ///
    /// Fails if the input is not valid JSON. JSON nesting is capped by
    /// `serde_json` at 128 levels, and every `and` / `or` level uses two of
    /// them (the object and its `filters` array), so text nested deeper than
    /// about 60 combinators is rejected as invalid JSON. Trees built in code
    /// have no such limit.
    pub fn parse_lenient(input: &str) -> FilterResult<Filter> {
        let value: Value = serde_json::from_str(input)?;
        Ok(Self::from_value(&value))
    }

    /// Decodes an already-parsed JSON value. Never fails.
    pub fn from_value(value: &Value) -> Filter {
        decode_node(value)
    }
}

fn decode_node(value: &Value) -> Filter {
    match try_decode_node(value) {
        Ok(filter) => filter,
        Err(reason) => {
            tracing::trace!(
                target: "message_filter",
                reason = %reason,
                "keeping unsupported filter node"
            );
            Filter::Unsupported(UnsupportedFilter {
                reason,
                raw: value.clone(),
            })
        }
    }
}

fn try_decode_node(value: &Value) -> Result<Filter, String> {
    let Some(node) = value.as_object() else {
        return Err(format!("expected an object, found {}", json_kind(value)));
    };

    let kind = match node.get("type") {
        Some(Value::String(kind)) => kind.as_str(),
        Some(other) => return Err(format!("\"type\" must be a string, found {}", json_kind(other))),
        None => return Err("missing \"type\"".to_string()),
    };

    match kind {
        "string" => Ok(Filter::String(StringFilter {
            field: field_of(node)?,
            operation: operation_of::<StringOperation>(node, kind)?,
            value: value_of(node, Value::as_str, "a string")?.to_string(),
        })),
        "number" => Ok(Filter::Number(NumberFilter {
            field: field_of(node)?,
            operation: operation_of::<NumberOperation>(node, kind)?,
            value: value_of(node, Value::as_f64, "a number")?,
        })),
        "boolean" => Ok(Filter::Boolean(BooleanFilter {
            field: field_of(node)?,
            operation: operation_of::<BooleanOperation>(node, kind)?,
            value: value_of(node, Value::as_bool, "a boolean")?,
        })),
        "date" => Ok(Filter::Date(DateFilter {
            field: field_of(node)?,
            operation: operation_of::<DateOperation>(node, kind)?,
            value: DateValue::Text(value_of(node, Value::as_str, "a date string")?.to_string()),
        })),
        "or" => Ok(Filter::Or(children_of(node)?)),
        "and" => Ok(Filter::And(children_of(node)?)),
        other => Err(with_suggestion(
            format!("unknown filter type \"{}\"", other),
            other,
            FILTER_TYPES.iter().copied(),
        )),
    }
}

fn field_of(node: &Map<String, Value>) -> Result<String, String> {
    match node.get("field") {
        Some(Value::String(field)) => Ok(field.clone()),
        Some(other) => Err(format!("\"field\" must be a string, found {}", json_kind(other))),
        None => Err("missing \"field\"".to_string()),
    }
}

fn operation_of<T: WireOperation>(node: &Map<String, Value>, kind: &str) -> Result<T, String> {
    let name = match node.get("operation") {
        Some(Value::String(name)) => name.as_str(),
        Some(other) => {
            return Err(format!(
                "\"operation\" must be a string, found {}",
                json_kind(other)
            ))
        }
        None => return Err("missing \"operation\"".to_string()),
    };

    T::from_wire(name).ok_or_else(|| {
        with_suggestion(
            format!("unknown operation \"{}\" for {} filter", name, kind),
            name,
            T::ALL.iter().map(|op| op.as_str()),
        )
    })
}

fn value_of<'a, T>(
    node: &'a Map<String, Value>,
    extract: impl Fn(&'a Value) -> Option<T>,
    expected: &str,
) -> Result<T, String> {
    let Some(value) = node.get("value") else {
        return Err("missing \"value\"".to_string());
    };
    extract(value)
        .ok_or_else(|| format!("\"value\" must be {}, found {}", expected, json_kind(value)))
}

fn children_of(node: &Map<String, Value>) -> Result<Vec<Filter>, String> {
    match node.get("filters") {
        Some(Value::Array(children)) => Ok(children.iter().map(decode_node).collect()),
        Some(other) => Err(format!(
            "\"filters\" must be an array, found {}",
            json_kind(other)
        )),
        None => Err("missing \"filters\"".to_string()),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

fn with_suggestion<'a>(
    message: String,
    query: &str,
    candidates: impl Iterator<Item = &'a str>,
) -> String {
    match find_similar_name(query, candidates) {
        Some(suggestion) => format!("{} (did you mean \"{}\"?)", message, suggestion),
        None => message,
    }
}

/// Finds the best matching name from a list of candidates using Levenshtein distance.
///
/// Returns the best match if its edit distance is within the threshold,
/// otherwise returns `None`.
fn find_similar_name<'a>(query: &str, candidates: impl Iterator<Item = &'a str>) -> Option<&'a str> {
    let query_lower = query.to_lowercase();

    let (best_match, best_distance) = candidates
        .map(|name| (name, levenshtein(&query_lower, &name.to_lowercase())))
        .min_by_key(|(_, d)| *d)?;

    // A case-only difference has distance 0 after lowering but is still wrong
    if best_match != query && best_distance <= MAX_SUGGESTION_DISTANCE {
        Some(best_match)
    } else {
        None
    }
}

/// Wire form of a leaf: the leaf's own fields plus its `type` tag.
#[derive(serde::Serialize)]
struct TaggedLeaf<'a, T> {
    #[serde(rename = "type")]
    kind: &'static str,
    #[serde(flatten)]
    leaf: &'a T,
}

/// Wire form of a combinator.
#[derive(serde::Serialize)]
struct TaggedCombinator<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    filters: &'a [Filter],
}

impl Serialize for Filter {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let kind = self.kind_name();
        match self {
            Filter::String(leaf) => TaggedLeaf { kind, leaf }.serialize(serializer),
            Filter::Number(leaf) => TaggedLeaf { kind, leaf }.serialize(serializer),
            Filter::Boolean(leaf) => TaggedLeaf { kind, leaf }.serialize(serializer),
            Filter::Date(leaf) => TaggedLeaf { kind, leaf }.serialize(serializer),
            Filter::Or(filters) | Filter::And(filters) => {
                TaggedCombinator { kind, filters }.serialize(serializer)
            }
            Filter::Unsupported(node) => node.raw.serialize(serializer),
        }
    }
}

impl<'de> Deserialize<'de> for Filter {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        let filter = FilterParser::from_value(&value);
        filter.validate().map_err(D::Error::custom)?;
        Ok(filter)
    }
}
