//! Error types for filter parsing and evaluator configuration.
//!
//! Evaluation never fails; these errors only surface while turning JSON into
//! a [`Filter`](super::Filter) or while validating [`EvaluatorOptions`](super::EvaluatorOptions).

use thiserror::Error;

/// A specialized Result type for filter parsing operations.
pub type FilterResult<T> = Result<T, FilterError>;

/// Errors that can occur while parsing filters or records.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    /// The input is not valid JSON, or does not have the expected JSON shape.
    #[error("invalid JSON: {message}")]
    InvalidJson {
        /// The underlying parser message.
        message: String,
    },

    /// A node in the expression tree could not be decoded.
    #[error("unsupported filter at {path}: {reason}")]
    UnsupportedNode {
        /// JSON path of the offending node, e.g. `$.filters[1]`.
        path: String,
        /// Why the node was rejected.
        reason: String,
    },

    /// The configured offset for offset-less date-times is out of range.
    #[error("invalid UTC offset: {minutes} minutes (expected -1439..=1439)")]
    InvalidOffset {
        /// The rejected offset in minutes.
        minutes: i32,
    },
}

impl FilterError {
    /// Creates an invalid JSON error.
    pub fn invalid_json(message: impl Into<String>) -> Self {
        FilterError::InvalidJson {
            message: message.into(),
        }
    }

    /// Creates an unsupported node error.
    pub fn unsupported_node(path: impl Into<String>, reason: impl Into<String>) -> Self {
        FilterError::UnsupportedNode {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for FilterError {
    fn from(err: serde_json::Error) -> Self {
        FilterError::invalid_json(err.to_string())
    }
}
