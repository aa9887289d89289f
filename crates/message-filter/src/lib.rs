//! Declarative filter expressions evaluated against flat key-value records.
//!
//! The crate exposes two operations:
//!
//! - [`evaluate`] decides whether one [`Record`] satisfies a [`Filter`].
//! - [`filter_messages`] keeps the records of a slice that satisfy a filter,
//!   in their original order.
//!
//! Evaluation never fails. Anything anomalous (a missing or mistyped field,
//! unparseable date text, a malformed filter node) excludes the record.
//!
//! ```
//! use message_filter_rs::filter::{Filter, NumberOperation};
//! use message_filter_rs::{evaluate, Record};
//!
//! let record = Record::new().with("x", 0i64);
//!
//! // Zero counts as "no value" for number filters
//! assert!(!evaluate(&record, &Filter::number("x", NumberOperation::Eq, 0.0)));
//! ```

pub mod filter;
pub mod record;

pub use filter::{evaluate, filter_messages, Filter, FilterError, FilterEvaluator, FilterResult};
pub use record::{FieldValue, Record};
