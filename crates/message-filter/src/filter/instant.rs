//! Coercion of date values into comparable instants.

use std::borrow::Cow;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

use super::ast::DateValue;
use crate::record::DateRef;

/// Offset-less date-time layouts, tried in order.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// Date-time layouts with a trailing offset that RFC 3339 parsing rejects,
/// such as minutes without seconds (`2023-06-15T10:00Z`).
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M%#z",
    "%Y-%m-%d %H:%M%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
];

/// An absolute point in time, at millisecond precision, or an invalid marker.
///
/// Every comparison involving an invalid instant is `false`, so `Instant`
/// deliberately does not implement `PartialEq`: two invalid instants are not
/// equal to each other.
#[derive(Debug, Clone, Copy)]
pub struct Instant {
    millis: Option<i64>,
}

impl Instant {
    /// The result of coercing text that does not describe a point in time.
    pub const INVALID: Instant = Instant { millis: None };

    /// Creates an instant from a native date-time.
    pub fn from_datetime<Tz: TimeZone>(dt: &DateTime<Tz>) -> Self {
        Self {
            millis: Some(dt.timestamp_millis()),
        }
    }

    /// Parses text into an instant.
    ///
    /// Accepts RFC 3339, RFC 2822, ISO date-times with an offset but no
    /// seconds, ISO date-times without an offset (interpreted at
    /// `naive_offset`), and the date-only forms
    /// `YYYY-MM-DD`, `YYYY-MM` and `YYYY` (UTC midnight).
    pub fn parse(text: &str, naive_offset: FixedOffset) -> Self {
        parse_datetime(text.trim(), naive_offset)
            .map(|dt| Self::from_datetime(&dt))
            .unwrap_or(Self::INVALID)
    }

    /// Coerces a filter literal.
    pub fn from_date_value(value: &DateValue, naive_offset: FixedOffset) -> Self {
        match value {
            DateValue::Instant(dt) => Self::from_datetime(dt),
            DateValue::Text(text) => Self::parse(text, naive_offset),
        }
    }

    /// Coerces a record field value.
    pub fn from_date_ref(value: DateRef<'_>, naive_offset: FixedOffset) -> Self {
        match value {
            DateRef::Native(dt) => Self::from_datetime(dt),
            DateRef::Text(text) => Self::parse(text, naive_offset),
        }
    }

    /// Returns true unless this is [`Instant::INVALID`].
    pub fn is_valid(&self) -> bool {
        self.millis.is_some()
    }

    /// Milliseconds since the Unix epoch, if valid.
    pub fn timestamp_millis(&self) -> Option<i64> {
        self.millis
    }

    /// Returns true if both instants are valid and equal.
    pub fn same_as(&self, other: &Instant) -> bool {
        self.compare_with(other, |a, b| a == b)
    }

    /// Returns true if both instants are valid and `self` is strictly later.
    pub fn is_after(&self, other: &Instant) -> bool {
        self.compare_with(other, |a, b| a > b)
    }

    /// Returns true if both instants are valid and `self` is strictly earlier.
    pub fn is_before(&self, other: &Instant) -> bool {
        self.compare_with(other, |a, b| a < b)
    }

    fn compare_with(&self, other: &Instant, cmp: impl Fn(i64, i64) -> bool) -> bool {
        match (self.millis, other.millis) {
            (Some(a), Some(b)) => cmp(a, b),
            _ => false,
        }
    }
}

fn parse_datetime(text: &str, naive_offset: FixedOffset) -> Option<DateTime<Utc>> {
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }

    let with_offset = normalize_utc_designator(text);
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(&with_offset, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return naive_offset
                .from_local_datetime(&naive)
                .single()
                .map(|dt| dt.with_timezone(&Utc));
        }
    }

    parse_date_only(text)?
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
}

/// Spells a trailing `Z` as `+00:00` so offset layouts can read it.
fn normalize_utc_designator(text: &str) -> Cow<'_, str> {
    match text.strip_suffix(&['Z', 'z'][..]) {
        Some(rest) => Cow::Owned(format!("{}+00:00", rest)),
        None => Cow::Borrowed(text),
    }
}

/// Parses `YYYY-MM-DD`, `YYYY-MM` or `YYYY`.
fn parse_date_only(text: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = text.split('-').collect();

    match parts.as_slice() {
        [year, month, day] if year.len() == 4 && month.len() == 2 && day.len() == 2 => {
            if !all_digits(year) || !all_digits(month) || !all_digits(day) {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
        }
        [year, month] if year.len() == 4 && month.len() == 2 => {
            if !all_digits(year) || !all_digits(month) {
                return None;
            }
            NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1)
        }
        [year] if year.len() == 4 && all_digits(year) => {
            NaiveDate::from_ymd_opt(year.parse().ok()?, 1, 1)
        }
        _ => None,
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
