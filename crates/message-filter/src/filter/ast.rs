//! Abstract Syntax Tree (AST) for filter expressions.

use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::error::{FilterError, FilterResult};

/// Represents a filter expression.
///
/// Leaf variants compare one record field against a literal. `Or` and `And`
/// combine any number of child filters. `Unsupported` holds a node that could
/// not be decoded; it always evaluates to `false`.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    // ==================== Leaf Filters ====================
    /// Compares a text field.
    String(StringFilter),

    /// Compares a numeric field.
    Number(NumberFilter),

    /// Compares a boolean field.
    Boolean(BooleanFilter),

    /// Compares a date field.
    Date(DateFilter),

    // ==================== Combinators ====================
    /// Matches if at least one child matches. Empty matches nothing.
    Or(Vec<Filter>),

    /// Matches if every child matches. Empty matches everything.
    And(Vec<Filter>),

    // ==================== Malformed Input ====================
    /// A node that could not be decoded.
    Unsupported(UnsupportedFilter),
}

/// A comparison against a text field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StringFilter {
    pub field: String,
    pub operation: StringOperation,
    pub value: String,
}

/// A comparison against a numeric field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NumberFilter {
    pub field: String,
    pub operation: NumberOperation,
    pub value: f64,
}

/// A comparison against a boolean field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BooleanFilter {
    pub field: String,
    pub operation: BooleanOperation,
    pub value: bool,
}

/// A comparison against a date field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateFilter {
    pub field: String,
    pub operation: DateOperation,
    pub value: DateValue,
}

/// The literal of a date filter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum DateValue {
    /// A native point in time.
    Instant(DateTime<Utc>),
    /// Text coerced to a point in time at evaluation.
    Text(String),
}

impl From<DateTime<Utc>> for DateValue {
    fn from(value: DateTime<Utc>) -> Self {
        DateValue::Instant(value)
    }
}

impl From<&str> for DateValue {
    fn from(value: &str) -> Self {
        DateValue::Text(value.to_string())
    }
}

impl From<String> for DateValue {
    fn from(value: String) -> Self {
        DateValue::Text(value)
    }
}

/// A node rejected while decoding, kept so it can fail closed.
#[derive(Debug, Clone, PartialEq)]
pub struct UnsupportedFilter {
    /// Why the node was rejected.
    pub reason: String,
    /// The node as it was received.
    pub raw: serde_json::Value,
}

/// The closed set of operations legal for one leaf kind.
pub trait WireOperation: Copy + Sized + 'static {
    /// Every operation of this kind.
    const ALL: &'static [Self];

    /// The wire name of this operation.
    fn as_str(&self) -> &'static str;

    /// Looks up an operation by its exact wire name.
    fn from_wire(name: &str) -> Option<Self>;
}

macro_rules! operation_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $wire:tt),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
        pub enum $name {
            $(
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every operation of this kind.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The wire name of this operation.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire,)+
                }
            }

            /// Looks up an operation by its exact wire name.
            pub fn from_wire(name: &str) -> Option<Self> {
                match name {
                    $($wire => Some($name::$variant),)+
                    _ => None,
                }
            }
        }

        impl WireOperation for $name {
            const ALL: &'static [Self] = $name::ALL;

            fn as_str(&self) -> &'static str {
                $name::as_str(self)
            }

            fn from_wire(name: &str) -> Option<Self> {
                $name::from_wire(name)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

operation_enum! {
    /// Operations legal on a string filter.
    StringOperation {
        Eq => "eq",
        StartsWith => "startsWith",
        EndsWith => "endsWith",
        Contains => "contains",
    }
}

operation_enum! {
    /// Operations legal on a number filter.
    NumberOperation {
        Eq => "eq",
        Gt => "gt",
        Lt => "lt",
        Gte => "gte",
        Lte => "lte",
    }
}

operation_enum! {
    /// Operations legal on a boolean filter.
    BooleanOperation {
        Eq => "eq",
    }
}

operation_enum! {
    /// Operations legal on a date filter.
    DateOperation {
        Eq => "eq",
        After => "after",
        Before => "before",
    }
}

impl Filter {
    /// Creates a string filter.
    ///
    /// # Example
    ///
    /// ```
    /// use message_filter_rs::filter::{Filter, StringOperation};
    ///
    /// let filter = Filter::string("name", StringOperation::StartsWith, "An");
    /// assert!(matches!(filter, Filter::String(_)));
    /// ```
    pub fn string(
        field: impl Into<String>,
        operation: StringOperation,
        value: impl Into<String>,
    ) -> Self {
        Filter::String(StringFilter {
            field: field.into(),
            operation,
            value: value.into(),
        })
    }

    /// Creates a number filter.
    pub fn number(field: impl Into<String>, operation: NumberOperation, value: f64) -> Self {
        Filter::Number(NumberFilter {
            field: field.into(),
            operation,
            value,
        })
    }

    /// Creates a boolean equality filter.
    pub fn boolean(field: impl Into<String>, value: bool) -> Self {
        Filter::Boolean(BooleanFilter {
            field: field.into(),
            operation: BooleanOperation::Eq,
            value,
        })
    }

    /// Creates a date filter.
    pub fn date(
        field: impl Into<String>,
        operation: DateOperation,
        value: impl Into<DateValue>,
    ) -> Self {
        Filter::Date(DateFilter {
            field: field.into(),
            operation,
            value: value.into(),
        })
    }

    /// Creates an AND filter over the given children.
    ///
    /// # Example
    ///
    /// ```
    /// use message_filter_rs::filter::Filter;
    ///
    /// let filter = Filter::and([Filter::boolean("active", true), Filter::Or(Vec::new())]);
    /// assert!(matches!(filter, Filter::And(ref children) if children.len() == 2));
    /// ```
    pub fn and(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::And(filters.into_iter().collect())
    }

    /// Creates an OR filter over the given children.
    pub fn or(filters: impl IntoIterator<Item = Filter>) -> Self {
        Filter::Or(filters.into_iter().collect())
    }

    /// The wire `type` of this node, or `"unsupported"`.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Filter::String(_) => "string",
            Filter::Number(_) => "number",
            Filter::Boolean(_) => "boolean",
            Filter::Date(_) => "date",
            Filter::Or(_) => "or",
            Filter::And(_) => "and",
            Filter::Unsupported(_) => "unsupported",
        }
    }

    /// Returns the target field of a leaf filter.
    pub fn field(&self) -> Option<&str> {
        match self {
            Filter::String(f) => Some(&f.field),
            Filter::Number(f) => Some(&f.field),
            Filter::Boolean(f) => Some(&f.field),
            Filter::Date(f) => Some(&f.field),
            Filter::Or(_) | Filter::And(_) | Filter::Unsupported(_) => None,
        }
    }

    /// Number of nodes on the longest path from this node to a leaf.
    /// A leaf, or an empty combinator, has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Filter::Or(children) | Filter::And(children) => {
                1 + children.iter().map(Filter::depth).max().unwrap_or(0)
            }
            _ => 1,
        }
    }

    /// Collects the field names referenced by every leaf in the tree.
    pub fn referenced_fields(&self) -> BTreeSet<&str> {
        let mut fields = BTreeSet::new();
        self.collect_fields(&mut fields);
        fields
    }

    fn collect_fields<'a>(&'a self, fields: &mut BTreeSet<&'a str>) {
        match self {
            Filter::Or(children) | Filter::And(children) => {
                for child in children {
                    child.collect_fields(fields);
                }
            }
            _ => {
                if let Some(field) = self.field() {
                    fields.insert(field);
                }
            }
        }
    }

    /// Checks that the tree contains no unsupported nodes.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnsupportedNode`] for the first unsupported node,
    /// in depth-first order, with its JSON path.
    pub fn validate(&self) -> FilterResult<()> {
        self.validate_at("$")
    }

    fn validate_at(&self, path: &str) -> FilterResult<()> {
        match self {
            Filter::Unsupported(node) => Err(FilterError::unsupported_node(path, &node.reason)),
            Filter::Or(children) | Filter::And(children) => {
                for (i, child) in children.iter().enumerate() {
                    child.validate_at(&format!("{}.filters[{}]", path, i))?;
                }
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
