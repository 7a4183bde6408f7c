//! # Domain Entities
//!
//! Log headers, curve metadata, rows, store batches and the accumulated
//! log data table.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use super::errors::LogDataError;
use super::value_objects::{CurveValue, Direction, IndexType, IndexValue};

/// Identity of a log object in the store.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogReference {
    /// Well uid.
    pub well_uid: String,
    /// Wellbore uid.
    pub wellbore_uid: String,
    /// Log uid.
    pub log_uid: String,
}

impl LogReference {
    /// Create a reference.
    pub fn new(
        well_uid: impl Into<String>,
        wellbore_uid: impl Into<String>,
        log_uid: impl Into<String>,
    ) -> Self {
        Self {
            well_uid: well_uid.into(),
            wellbore_uid: wellbore_uid.into(),
            log_uid: log_uid.into(),
        }
    }
}

impl fmt::Display for LogReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.well_uid, self.wellbore_uid, self.log_uid)
    }
}

/// Metadata of one curve in a log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurveInfo {
    /// Curve mnemonic, unique within a log.
    pub mnemonic: String,
    /// Unit of measure.
    pub unit: String,
    /// Smallest index with data for this curve.
    #[serde(default)]
    pub min_index: Option<IndexValue>,
    /// Largest index with data for this curve.
    #[serde(default)]
    pub max_index: Option<IndexValue>,
}

impl CurveInfo {
    /// Create curve info without index bounds.
    pub fn new(mnemonic: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            unit: unit.into(),
            min_index: None,
            max_index: None,
        }
    }
}

/// Column metadata of a log data table.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CurveSpecification {
    /// Curve mnemonic.
    pub mnemonic: String,
    /// Unit of measure.
    pub unit: String,
}

impl CurveSpecification {
    /// Create a curve specification.
    pub fn new(mnemonic: impl Into<String>, unit: impl Into<String>) -> Self {
        Self {
            mnemonic: mnemonic.into(),
            unit: unit.into(),
        }
    }
}

/// Log header as seen by the caller. Read-only to this crate.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogHeader {
    /// Store identity.
    pub reference: LogReference,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Index kind.
    pub index_type: IndexType,
    /// Row ordering.
    #[serde(default)]
    pub direction: Direction,
    /// Mnemonic of the index curve.
    pub index_curve: Option<String>,
    /// First index of the log.
    #[serde(default)]
    pub start_index: Option<IndexValue>,
    /// Last index of the log.
    #[serde(default)]
    pub end_index: Option<IndexValue>,
    /// Whether the log is still receiving data.
    #[serde(default)]
    pub object_growing: bool,
    /// Curve metadata, index curve first once normalized.
    #[serde(default)]
    pub curves: Vec<CurveInfo>,
}

impl LogHeader {
    /// Index curve mnemonic, or an error if the log declares none.
    pub fn require_index_curve(&self) -> Result<&str, LogDataError> {
        self.index_curve
            .as_deref()
            .ok_or_else(|| LogDataError::InvalidIndex(format!("log {} has no index curve", self.reference)))
    }

    /// End index, or an error if the log is empty.
    pub fn require_end_index(&self) -> Result<&IndexValue, LogDataError> {
        self.end_index
            .as_ref()
            .ok_or_else(|| LogDataError::InvalidIndex(format!("log {} has no end index", self.reference)))
    }

    /// Start index, or an error if the log is empty.
    pub fn require_start_index(&self) -> Result<&IndexValue, LogDataError> {
        self.start_index
            .as_ref()
            .ok_or_else(|| LogDataError::InvalidIndex(format!("log {} has no start index", self.reference)))
    }
}

/// One row of curve data.
///
/// `id` is the stringified index-curve value. Rows are identified by their
/// position in a table, not by `id`: duplicate index values are possible.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Row {
    id: String,
    values: BTreeMap<String, CurveValue>,
}

impl Row {
    /// Build a row from a positional record aligned with `mnemonics`.
    pub fn from_record(
        mnemonics: &[String],
        record: Vec<CurveValue>,
        index_curve: &str,
    ) -> Result<Self, LogDataError> {
        if record.len() > mnemonics.len() {
            return Err(LogDataError::MalformedResponse(format!(
                "row has {} values for {} mnemonics",
                record.len(),
                mnemonics.len()
            )));
        }
        let values: BTreeMap<String, CurveValue> =
            mnemonics.iter().cloned().zip(record).collect();
        let id = match values.get(index_curve) {
            Some(value) if !value.is_null() => value.to_string(),
            _ => {
                return Err(LogDataError::MalformedResponse(format!(
                    "row without value for index curve {index_curve}"
                )))
            }
        };
        Ok(Self { id, values })
    }

    /// Stringified index value.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cell for a mnemonic.
    pub fn get(&self, mnemonic: &str) -> Option<&CurveValue> {
        self.values.get(mnemonic)
    }

    /// All cells keyed by mnemonic.
    pub fn values(&self) -> &BTreeMap<String, CurveValue> {
        &self.values
    }

    /// Typed index value of this row.
    pub fn index_value(&self, index_type: IndexType) -> Result<IndexValue, LogDataError> {
        IndexValue::parse(&self.id, index_type)
    }
}

/// One bounded response from the store.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDataBatch {
    /// Mnemonics of the columns in `rows`.
    pub mnemonic_list: Vec<String>,
    /// Units aligned with `mnemonic_list`.
    pub unit_list: Vec<String>,
    /// Positional records.
    pub rows: Vec<Vec<CurveValue>>,
}

impl LogDataBatch {
    /// Whether the batch carries no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Curve specifications of the batch's columns.
    pub fn curve_specifications(&self) -> Vec<CurveSpecification> {
        self.mnemonic_list
            .iter()
            .enumerate()
            .map(|(i, mnemonic)| {
                CurveSpecification::new(mnemonic.clone(), self.unit_list.get(i).cloned().unwrap_or_default())
            })
            .collect()
    }
}

/// Ordered, append-only table of rows with its column metadata.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LogDataTable {
    curve_specifications: Vec<CurveSpecification>,
    rows: Vec<Row>,
}

impl LogDataTable {
    /// Create a table.
    pub fn new(curve_specifications: Vec<CurveSpecification>, rows: Vec<Row>) -> Self {
        Self {
            curve_specifications,
            rows,
        }
    }

    /// Column metadata.
    pub fn curve_specifications(&self) -> &[CurveSpecification] {
        &self.curve_specifications
    }

    /// Rows in table order.
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row at a table position.
    pub fn row(&self, position: usize) -> Option<&Row> {
        self.rows.get(position)
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Append another table's rows. Column metadata is adopted when this
    /// table has none yet.
    pub fn append(&mut self, other: LogDataTable) {
        if self.curve_specifications.is_empty() {
            self.curve_specifications = other.curve_specifications;
        }
        self.rows.extend(other.rows);
    }

    /// Index id of the first row.
    pub fn first_id(&self) -> Option<&str> {
        self.rows.first().map(Row::id)
    }

    /// Index id of the last row.
    pub fn last_id(&self) -> Option<&str> {
        self.rows.last().map(Row::id)
    }

    /// Consume the table.
    pub fn into_parts(self) -> (Vec<CurveSpecification>, Vec<Row>) {
        (self.curve_specifications, self.rows)
    }
}

/// Terminal result of a cancellable operation.
///
/// Cancellation is a normal outcome, not an error.
#[derive(Clone, Debug, PartialEq)]
pub enum Outcome<T> {
    /// The operation ran to completion.
    Completed(T),
    /// The caller cancelled the operation; nothing was produced.
    Cancelled,
}

impl<T> Outcome<T> {
    /// Whether the operation was cancelled.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// The completed value, if any.
    pub fn completed(self) -> Option<T> {
        match self {
            Self::Completed(value) => Some(value),
            Self::Cancelled => None,
        }
    }

    /// Transform the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Completed(value) => Outcome::Completed(f(value)),
            Self::Cancelled => Outcome::Cancelled,
        }
    }
}

/// Result of a batched read.
pub type ReadOutcome = Outcome<LogDataTable>;
