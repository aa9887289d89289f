//! Filter expressions and their evaluation against records.
//!
//! A filter is a tree of typed predicate nodes. Leaves compare one record
//! field against a literal; `and`/`or` combinators aggregate their children.
//!
//! # Leaf Kinds
//!
//! | `type`    | operations                               | literal        |
//! |-----------|------------------------------------------|----------------|
//! | `string`  | `eq`, `startsWith`, `endsWith`, `contains` | text         |
//! | `number`  | `eq`, `gt`, `lt`, `gte`, `lte`           | number         |
//! | `boolean` | `eq`                                     | boolean        |
//! | `date`    | `eq`, `after`, `before`                  | date or text   |
//!
//! String comparisons are case-sensitive and ordinal. Empty text, a numeric
//! zero, and a missing field count as "no value" for string, number and date
//! leaves, which then never match. A boolean `false` is an ordinary value.
//!
//! # Combinators
//!
//! - `and` - every child matches (an empty `and` matches everything)
//! - `or` - at least one child matches (an empty `or` matches nothing)
//!
//! # Example
//!
//! ```
//! use message_filter_rs::filter::{FilterEvaluator, FilterParser};
//! use message_filter_rs::Record;
//!
//! // Parse a filter expression
//! let filter = FilterParser::parse(r#"{
//!     "type": "or",
//!     "filters": [
//!         {"type": "string", "field": "name", "operation": "contains", "value": "nn"},
//!         {"type": "date", "field": "createdAt", "operation": "after", "value": "2023-01-01"}
//!     ]
//! }"#).unwrap();
//!
//! // Create an evaluator
//! let evaluator = FilterEvaluator::new(&filter);
//!
//! let record = Record::from_json(r#"{"name": "Bob", "createdAt": "2023-06-15"}"#).unwrap();
//! assert!(evaluator.matches(&record));
//! ```

mod ast;
mod error;
mod evaluator;
mod instant;
mod options;
mod parser;

pub use ast::{
    BooleanFilter, BooleanOperation, DateFilter, DateOperation, DateValue, Filter, NumberFilter,
    NumberOperation, StringFilter, StringOperation, UnsupportedFilter, WireOperation,
};
pub use error::{FilterError, FilterResult};
pub use evaluator::{evaluate, filter_messages, FilterEvaluator};
pub use instant::Instant;
pub use options::EvaluatorOptions;
pub use parser::FilterParser;
