//! # Export Projection
//!
//! Serializes a chosen set of rows and columns as delimited text.
//!
//! Rows are always sorted ascending by the first column before they are
//! written: consumers, including the store's own bulk import, depend on
//! ascending order.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::domain::{CurveSpecification, CurveValue, IndexType, IndexValue, Row};

/// How a column's values compare and display.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContentType {
    /// Plain number.
    Number,
    /// Number with unit text attached, e.g. `"12.5 m"`.
    Measure,
    /// ISO 8601 date-time; lexical order is chronological.
    DateTime,
    /// Free text.
    String,
}

impl ContentType {
    /// Infer the content type of a curve from its mnemonic and unit.
    pub fn for_curve(spec: &CurveSpecification) -> Self {
        let mnemonic = spec.mnemonic.to_lowercase();
        if matches!(mnemonic.as_str(), "time" | "datetime" | "date time") {
            return Self::DateTime;
        }
        match spec.unit.to_lowercase().as_str() {
            "time" | "datetime" => Self::DateTime,
            "unitless" => Self::String,
            _ => Self::Number,
        }
    }

    fn compare(self, a: Option<&CurveValue>, b: Option<&CurveValue>) -> Ordering {
        match self {
            Self::Number => compare_numeric(a.and_then(CurveValue::as_f64), b.and_then(CurveValue::as_f64)),
            Self::Measure => compare_numeric(a.and_then(measure_value), b.and_then(measure_value)),
            Self::DateTime | Self::String => display(a).cmp(&display(b)),
        }
    }
}

fn measure_value(value: &CurveValue) -> Option<f64> {
    match value {
        CurveValue::Number(n) => Some(*n),
        CurveValue::Text(text) => match IndexValue::parse(text, IndexType::Depth) {
            Ok(IndexValue::Depth(n)) => Some(n),
            _ => None,
        },
        CurveValue::Null => None,
    }
}

// Missing values sort after present ones.
fn compare_numeric(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn display(value: Option<&CurveValue>) -> String {
    value.map(ToString::to_string).unwrap_or_default()
}

/// A column selected for export.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportColumn {
    /// Curve mnemonic.
    pub mnemonic: String,
    /// Unit of measure.
    pub unit: String,
    /// Comparator and display kind.
    pub content_type: ContentType,
}

impl ExportColumn {
    /// Column for a curve specification with an inferred content type.
    pub fn from_specification(spec: &CurveSpecification) -> Self {
        Self {
            mnemonic: spec.mnemonic.clone(),
            unit: spec.unit.clone(),
            content_type: ContentType::for_curve(spec),
        }
    }

    /// Header label, `mnemonic[unit]`.
    pub fn label(&self) -> String {
        format!("{}[{}]", self.mnemonic, self.unit)
    }
}

/// Separator and line terminator of exported text.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    /// Value separator.
    pub separator: String,
    /// Line terminator.
    pub new_line: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            new_line: "\n".to_string(),
        }
    }
}

/// Projected export: one header line and one line per row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportDocument {
    /// Column labels joined by the separator.
    pub header: String,
    /// Data lines, ascending by the first column.
    pub lines: Vec<String>,
    new_line: String,
}

impl ExportDocument {
    /// Header followed by all data lines, joined by the line terminator.
    pub fn render(&self) -> String {
        std::iter::once(self.header.as_str())
            .chain(self.lines.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(&self.new_line)
    }
}

/// Project rows onto `columns` and serialize them, sorted ascending by the
/// first column (stable for equal keys).
pub fn project<'a, I>(rows: I, columns: &[ExportColumn], options: &ExportOptions) -> ExportDocument
where
    I: IntoIterator<Item = &'a Row>,
{
    let header = columns
        .iter()
        .map(ExportColumn::label)
        .collect::<Vec<_>>()
        .join(&options.separator);

    let mut rows: Vec<&Row> = rows.into_iter().collect();
    if let Some(key) = columns.first() {
        rows.sort_by(|a, b| key.content_type.compare(a.get(&key.mnemonic), b.get(&key.mnemonic)));
    }

    let lines = rows
        .into_iter()
        .map(|row| {
            columns
                .iter()
                .map(|col| display(row.get(&col.mnemonic)))
                .collect::<Vec<_>>()
                .join(&options.separator)
        })
        .collect();

    ExportDocument {
        header,
        lines,
        new_line: options.new_line.clone(),
    }
}
