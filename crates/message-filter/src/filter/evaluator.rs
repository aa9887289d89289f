//! Filter evaluation against records.
//!
//! This module provides the [`FilterEvaluator`] for evaluating filter
//! expressions against [`Record`]s.
//!
//! Evaluation is total: every anomaly (a missing field, a field of the wrong
//! kind, unparseable date text, an unsupported node, a node below the depth
//! budget) makes the affected node evaluate to `false`, which excludes the
//! record rather than raising an error.
//!
//! # Example
//!
//! ```
//! use message_filter_rs::filter::{Filter, FilterEvaluator, NumberOperation, StringOperation};
//! use message_filter_rs::Record;
//!
//! let filter = Filter::and([
//!     Filter::string("name", StringOperation::StartsWith, "An"),
//!     Filter::number("age", NumberOperation::Gte, 18.0),
//! ]);
//!
//! let records = vec![
//!     Record::new().with("name", "Anna").with("age", 31i64),
//!     Record::new().with("name", "Andy").with("age", 12i64),
//!     Record::new().with("name", "Bob").with("age", 40i64),
//! ];
//!
//! let evaluator = FilterEvaluator::new(&filter);
//! let matched = evaluator.filter_records(&records);
//! assert_eq!(matched, vec![&records[0]]);
//! ```

use super::ast::{
    BooleanFilter, BooleanOperation, DateFilter, DateOperation, Filter, NumberFilter,
    NumberOperation, StringFilter, StringOperation,
};
use super::instant::Instant;
use super::options::EvaluatorOptions;
use crate::record::{is_absent_or_empty, is_absent_or_zero, DateRef, FieldAccess, Record};

/// Evaluates a filter against records.
///
/// The evaluator borrows the filter and never mutates it or the records it
/// is given, so one evaluator can be reused across any number of records.
#[derive(Debug, Clone)]
pub struct FilterEvaluator<'a> {
    filter: &'a Filter,
    options: EvaluatorOptions,
}

impl<'a> FilterEvaluator<'a> {
    /// Creates a new filter evaluator with default options.
    pub fn new(filter: &'a Filter) -> Self {
        Self::with_options(filter, EvaluatorOptions::default())
    }

    /// Creates a new filter evaluator with the given options.
    pub fn with_options(filter: &'a Filter, options: EvaluatorOptions) -> Self {
        Self { filter, options }
    }

    /// Returns the options this evaluator runs with.
    pub fn options(&self) -> &EvaluatorOptions {
        &self.options
    }

    /// Returns true if the record matches the filter.
    pub fn matches(&self, record: &Record) -> bool {
        self.evaluate_filter(self.filter, record, 1)
    }

    /// Filters a slice of records, returning only those that match, in order.
    pub fn filter_records<'b>(&self, records: &'b [Record]) -> Vec<&'b Record> {
        let matched: Vec<&Record> = records.iter().filter(|r| self.matches(r)).collect();
        tracing::debug!(
            target: "message_filter",
            total = records.len(),
            matched = matched.len(),
            "filtered records"
        );
        matched
    }

    /// Consumes the records, keeping only those that match, in order.
    pub fn filter_owned(&self, records: Vec<Record>) -> Vec<Record> {
        records.into_iter().filter(|r| self.matches(r)).collect()
    }

    /// Evaluates a filter node at the given depth (the root is depth 1).
    fn evaluate_filter(&self, filter: &Filter, record: &Record, depth: usize) -> bool {
        if let Some(max_depth) = self.options.max_depth {
            if depth > max_depth {
                tracing::trace!(
                    target: "message_filter",
                    depth,
                    max_depth,
                    "filter nesting exceeds depth budget"
                );
                return false;
            }
        }

        match filter {
            // Leaf filters
            Filter::String(leaf) => self.apply_string_filter(leaf, record),
            Filter::Number(leaf) => self.apply_number_filter(leaf, record),
            Filter::Boolean(leaf) => self.apply_boolean_filter(leaf, record),
            Filter::Date(leaf) => self.apply_date_filter(leaf, record),

            // Combinators
            Filter::Or(children) => children
                .iter()
                .any(|child| self.evaluate_filter(child, record, depth + 1)),
            Filter::And(children) => children
                .iter()
                .all(|child| self.evaluate_filter(child, record, depth + 1)),

            Filter::Unsupported(node) => {
                tracing::trace!(
                    target: "message_filter",
                    reason = %node.reason,
                    "unsupported filter evaluates to false"
                );
                false
            }
        }
    }

    /// Compares a text field. Absent or empty text never matches.
    fn apply_string_filter(&self, leaf: &StringFilter, record: &Record) -> bool {
        let Some(value) = present(record.text_field(&leaf.field), &leaf.field, "string") else {
            return false;
        };
        if is_absent_or_empty(value) {
            return false;
        }

        let literal = leaf.value.as_str();
        match leaf.operation {
            StringOperation::Eq => value == literal,
            StringOperation::StartsWith => value.starts_with(literal),
            StringOperation::EndsWith => value.ends_with(literal),
            StringOperation::Contains => value.contains(literal),
        }
    }

    /// Compares a numeric field. Absent, zero and NaN never match.
    fn apply_number_filter(&self, leaf: &NumberFilter, record: &Record) -> bool {
        let Some(value) = present(record.number_field(&leaf.field), &leaf.field, "number") else {
            return false;
        };
        if is_absent_or_zero(value) {
            return false;
        }

        let literal = leaf.value;
        match leaf.operation {
            NumberOperation::Eq => value == literal,
            NumberOperation::Gt => value > literal,
            NumberOperation::Lt => value < literal,
            NumberOperation::Gte => value >= literal,
            NumberOperation::Lte => value <= literal,
        }
    }

    /// Compares a boolean field. `false` is a value like any other.
    fn apply_boolean_filter(&self, leaf: &BooleanFilter, record: &Record) -> bool {
        let Some(value) = present(record.bool_field(&leaf.field), &leaf.field, "boolean") else {
            return false;
        };

        match leaf.operation {
            BooleanOperation::Eq => value == leaf.value,
        }
    }

    /// Compares a date field by instant. Absent or empty text never matches,
    /// and neither does anything that fails to coerce.
    fn apply_date_filter(&self, leaf: &DateFilter, record: &Record) -> bool {
        let Some(value) = present(record.date_field(&leaf.field), &leaf.field, "date") else {
            return false;
        };
        if let DateRef::Text(text) = value {
            if is_absent_or_empty(text) {
                return false;
            }
        }

        let offset = self.options.naive_offset();
        let instant = Instant::from_date_ref(value, offset);
        let literal = Instant::from_date_value(&leaf.value, offset);
        if !instant.is_valid() || !literal.is_valid() {
            tracing::trace!(
                target: "message_filter",
                field = %leaf.field,
                field_valid = instant.is_valid(),
                literal_valid = literal.is_valid(),
                "date comparison against invalid instant"
            );
        }

        match leaf.operation {
            DateOperation::Eq => instant.same_as(&literal),
            DateOperation::After => instant.is_after(&literal),
            DateOperation::Before => instant.is_before(&literal),
        }
    }
}

/// Unwraps a field access, treating absence and kind mismatch as no value.
fn present<T>(access: FieldAccess<T>, field: &str, leaf_kind: &'static str) -> Option<T> {
    if let FieldAccess::Mismatch(actual) = &access {
        tracing::trace!(
            target: "message_filter",
            field,
            expected = leaf_kind,
            actual = %actual,
            "field kind does not match filter kind"
        );
    }
    access.present()
}

/// Returns true if the record matches the filter, using default options.
pub fn evaluate(record: &Record, filter: &Filter) -> bool {
    FilterEvaluator::new(filter).matches(record)
}

/// Returns the records that match the filter, preserving their order.
///
/// # Example
///
/// ```
/// use message_filter_rs::filter::Filter;
/// use message_filter_rs::{filter_messages, Record};
///
/// let records = vec![
///     Record::new().with("active", false),
///     Record::new().with("active", true),
/// ];
/// let matched = filter_messages(&records, &Filter::boolean("active", false));
/// assert_eq!(matched, vec![&records[0]]);
/// ```
pub fn filter_messages<'a>(records: &'a [Record], filter: &Filter) -> Vec<&'a Record> {
    FilterEvaluator::new(filter).filter_records(records)
}

#[cfg(test)]
#[path = "evaluator_tests.rs"]
mod tests;
