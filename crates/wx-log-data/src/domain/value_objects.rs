//! # Value Objects
//!
//! Index types, typed index values, index ranges and curve cell values.
//!
//! Index values arrive from the store as loosely typed strings or numbers.
//! Everything that orders rows goes through [`IndexValue`], which picks a
//! strict comparator per [`IndexType`]: numeric for depth, chronological for
//! date-time. Lexical comparison of index strings is never used.

use chrono::{DateTime, NaiveDateTime, SecondsFormat, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use super::errors::LogDataError;

/// Kind of index curve a log is ordered by.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexType {
    /// Measured depth (raw units of the index curve).
    Depth,
    /// Date-time, ISO 8601.
    #[serde(alias = "date time", alias = "datetime")]
    DateTime,
}

/// Declared ordering of a log's rows.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Index grows with each row.
    #[default]
    Increasing,
    /// Index shrinks with each row.
    Decreasing,
}

impl Direction {
    /// Orientation factor: +1 for increasing logs, -1 for decreasing.
    pub fn sign(self) -> i64 {
        match self {
            Self::Increasing => 1,
            Self::Decreasing => -1,
        }
    }

    /// Orders `a` and `b` as they would appear in a log with this direction.
    pub fn order(self, a: &IndexValue, b: &IndexValue) -> Ordering {
        match self {
            Self::Increasing => a.cmp_index(b),
            Self::Decreasing => b.cmp_index(a),
        }
    }
}

/// A typed index value.
///
/// Serializes untagged: depth as a JSON number, date-time as an RFC 3339
/// string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IndexValue {
    /// Depth index.
    Depth(f64),
    /// Date-time index, normalized to UTC.
    DateTime(DateTime<Utc>),
}

impl IndexValue {
    /// Parse a stringified index value for the given index type.
    ///
    /// Depth values may carry unit text (`"1234.5 m"`); it is stripped.
    /// Date-time values without an offset are taken as UTC.
    pub fn parse(raw: &str, index_type: IndexType) -> Result<Self, LogDataError> {
        let trimmed = raw.trim();
        match index_type {
            IndexType::Depth => parse_depth(trimmed).map(Self::Depth),
            IndexType::DateTime => parse_date_time(trimmed).map(Self::DateTime),
        }
        .ok_or_else(|| LogDataError::InvalidIndex(format!("{raw:?} is not a {index_type:?} index")))
    }

    /// The index type this value belongs to.
    pub fn index_type(&self) -> IndexType {
        match self {
            Self::Depth(_) => IndexType::Depth,
            Self::DateTime(_) => IndexType::DateTime,
        }
    }

    /// Strict comparison: numeric for depth, chronological for date-time.
    ///
    /// Values of different index types never meet inside one log; if they
    /// do, depth sorts before date-time so the comparison stays total.
    pub fn cmp_index(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Depth(a), Self::Depth(b)) => a.total_cmp(b),
            (Self::DateTime(a), Self::DateTime(b)) => a.cmp(b),
            (Self::Depth(_), Self::DateTime(_)) => Ordering::Less,
            (Self::DateTime(_), Self::Depth(_)) => Ordering::Greater,
        }
    }

    /// Whether `self` lies strictly after `previous` in `direction`.
    pub fn follows(&self, previous: &Self, direction: Direction) -> bool {
        direction.order(previous, self) == Ordering::Less
    }

    /// Whether `self` has reached or passed `end` in `direction`.
    pub fn reaches(&self, end: &Self, direction: Direction) -> bool {
        direction.order(self, end) != Ordering::Less
    }

    /// Move the value forward in `direction` by an index-type specific
    /// offset. Negative offsets move backwards.
    ///
    /// Date-time values move by `time_secs` seconds using calendar
    /// arithmetic; depth values move by `depth` raw units. On a decreasing
    /// log "forward" means towards smaller values.
    pub fn advance(&self, time_secs: i64, depth: f64, direction: Direction) -> Self {
        match self {
            Self::Depth(value) => Self::Depth(value + depth * direction.sign() as f64),
            Self::DateTime(value) => {
                let delta = time_secs.saturating_mul(direction.sign());
                let shifted = TimeDelta::try_seconds(delta)
                    .and_then(|d| value.checked_add_signed(d))
                    .unwrap_or(if delta > 0 {
                        DateTime::<Utc>::MAX_UTC
                    } else {
                        DateTime::<Utc>::MIN_UTC
                    });
                Self::DateTime(shifted)
            }
        }
    }
}

impl fmt::Display for IndexValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Depth(value) => write!(f, "{value}"),
            Self::DateTime(value) => {
                write!(f, "{}", value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
            }
        }
    }
}

fn parse_depth(raw: &str) -> Option<f64> {
    if let Ok(value) = raw.parse::<f64>() {
        return value.is_finite().then_some(value);
    }
    // strip trailing unit text, e.g. "1234.5 m"
    let numeric: String = raw
        .chars()
        .take_while(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+'))
        .collect();
    numeric.parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_date_time(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(value) = DateTime::parse_from_rfc3339(raw) {
        return Some(value.with_timezone(&Utc));
    }
    raw.parse::<NaiveDateTime>().ok().map(|naive| naive.and_utc())
}

/// Inclusive index range used to scope delete and export requests.
///
/// Bounds are stringified index values in the log's direction order.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexRange {
    /// First index of the range (inclusive).
    pub start_index: String,
    /// Last index of the range (inclusive).
    pub end_index: String,
}

impl IndexRange {
    /// Create a range.
    pub fn new(start_index: impl Into<String>, end_index: impl Into<String>) -> Self {
        Self {
            start_index: start_index.into(),
            end_index: end_index.into(),
        }
    }

    /// Zero-width range covering a single index value.
    pub fn point(index: impl Into<String>) -> Self {
        let index = index.into();
        Self {
            start_index: index.clone(),
            end_index: index,
        }
    }

    /// Whether start and end are the same index.
    pub fn is_point(&self) -> bool {
        self.start_index == self.end_index
    }
}

/// Typed window of index values a read should cover.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IndexWindow {
    /// Lower bound in the log's direction.
    pub start: IndexValue,
    /// Upper bound in the log's direction (inclusive).
    pub end: IndexValue,
}

impl IndexWindow {
    /// Create a window.
    pub fn new(start: IndexValue, end: IndexValue) -> Self {
        Self { start, end }
    }

    /// Parse both bounds for the given index type.
    pub fn parse(start: &str, end: &str, index_type: IndexType) -> Result<Self, LogDataError> {
        Ok(Self {
            start: IndexValue::parse(start, index_type)?,
            end: IndexValue::parse(end, index_type)?,
        })
    }
}

impl fmt::Display for IndexWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start, self.end)
    }
}

/// A single cell of curve data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurveValue {
    /// Numeric value.
    Number(f64),
    /// Textual value (date-times, strings).
    Text(String),
    /// Missing value.
    Null,
}

impl CurveValue {
    /// Numeric view of the value, if it has one.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(text) => text.trim().parse().ok(),
            Self::Null => None,
        }
    }

    /// Interpret the value as an index of the given type.
    pub fn to_index(&self, index_type: IndexType) -> Result<IndexValue, LogDataError> {
        match (self, index_type) {
            (Self::Number(value), IndexType::Depth) => Ok(IndexValue::Depth(*value)),
            (Self::Text(text), _) => IndexValue::parse(text, index_type),
            _ => Err(LogDataError::InvalidIndex(format!(
                "{self:?} is not a {index_type:?} index"
            ))),
        }
    }

    /// Whether the cell is empty.
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl fmt::Display for CurveValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(value) => write!(f, "{value}"),
            Self::Text(text) => f.write_str(text),
            Self::Null => Ok(()),
        }
    }
}

impl From<f64> for CurveValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<&str> for CurveValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CurveValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
