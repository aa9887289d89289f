//! Evaluator configuration.

use chrono::{FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use super::error::{FilterError, FilterResult};

/// Largest accepted offset magnitude, in minutes (just under 24 hours).
const MAX_OFFSET_MINUTES: u32 = 24 * 60 - 1;

/// Options controlling how a [`FilterEvaluator`](super::FilterEvaluator) runs.
///
/// Deserializable with defaults for every field, so it can be embedded in a
/// caller's own configuration file:
///
/// ```
/// use message_filter_rs::filter::EvaluatorOptions;
///
/// let options: EvaluatorOptions = serde_json::from_str(r#"{"max_depth": 8}"#).unwrap();
/// assert_eq!(options.max_depth, Some(8));
/// assert_eq!(options.naive_utc_offset_minutes, 0);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvaluatorOptions {
    /// Maximum nesting depth to evaluate. Nodes below this depth evaluate
    /// to `false`. `None` means unbounded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_depth: Option<usize>,

    /// Offset, in minutes east of UTC, applied to date-times written without
    /// an offset (e.g. `2023-06-15T10:00:00`).
    pub naive_utc_offset_minutes: i32,
}

impl EvaluatorOptions {
    /// Creates options with defaults: unbounded depth, UTC for naive date-times.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the maximum nesting depth.
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = Some(max_depth);
        self
    }

    /// Sets the offset applied to offset-less date-times.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidOffset`] if the magnitude is 24 hours or more.
    pub fn with_naive_utc_offset_minutes(mut self, minutes: i32) -> FilterResult<Self> {
        self.naive_utc_offset_minutes = minutes;
        self.validate()?;
        Ok(self)
    }

    /// Checks that the options are usable.
    pub fn validate(&self) -> FilterResult<()> {
        if self.naive_utc_offset_minutes.unsigned_abs() > MAX_OFFSET_MINUTES {
            return Err(FilterError::InvalidOffset {
                minutes: self.naive_utc_offset_minutes,
            });
        }
        Ok(())
    }

    /// Returns the offset used for offset-less date-times.
    ///
    /// Falls back to UTC if the configured value is out of range.
    pub fn naive_offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.naive_utc_offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix())
    }
}
