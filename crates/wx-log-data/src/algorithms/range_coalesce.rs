//! # Range Coalescing
//!
//! Turns a selection of table rows into the fewest contiguous index ranges
//! the store can act on (range-scoped delete and export).
//!
//! Two selected rows share a range only when their positions in the table
//! are adjacent. Index values are not compared for adjacency, so duplicate
//! index values and irregular sampling are handled correctly.

use std::collections::HashSet;

use crate::domain::{Direction, IndexRange, IndexType, IndexValue, LogDataError, LogDataTable};

/// Reject positions outside the table and repeated positions.
pub fn validate_selection(selected_positions: &[usize], table_len: usize) -> Result<(), LogDataError> {
    let mut seen = HashSet::with_capacity(selected_positions.len());
    for &position in selected_positions {
        if position >= table_len {
            return Err(LogDataError::InvalidSelection(format!(
                "row position {position} is outside a table of {table_len} rows"
            )));
        }
        if !seen.insert(position) {
            return Err(LogDataError::InvalidSelection(format!(
                "row position {position} selected more than once"
            )));
        }
    }
    Ok(())
}

/// Coalesce selected table positions into ordered, non-overlapping index
/// ranges.
///
/// The selection is sorted by index value in the log's direction (numeric
/// for depth, chronological for date-time); equal values are ordered by
/// table position. Each maximal run of position-adjacent rows becomes one range whose
/// bounds are the run's first and last index values.
///
/// # Errors
/// - `InvalidSelection` if a position is out of bounds or repeated
/// - `InvalidIndex` if a selected row's index cannot be parsed as `index_type`
pub fn coalesce_index_ranges(
    selected_positions: &[usize],
    table: &LogDataTable,
    index_type: IndexType,
    direction: Direction,
) -> Result<Vec<IndexRange>, LogDataError> {
    validate_selection(selected_positions, table.len())?;

    let rows = table.rows();
    let mut selected = selected_positions
        .iter()
        .map(|&position| Ok((position, rows[position].index_value(index_type)?)))
        .collect::<Result<Vec<(usize, IndexValue)>, LogDataError>>()?;
    selected.sort_by(|a, b| direction.order(&a.1, &b.1).then(a.0.cmp(&b.0)));

    let mut ranges: Vec<IndexRange> = Vec::new();
    let mut previous: Option<usize> = None;
    for (position, _) in selected {
        let id = rows[position].id();
        match (previous, ranges.last_mut()) {
            (Some(prev), Some(range)) if position == prev + 1 => {
                range.end_index = id.to_string();
            }
            _ => ranges.push(IndexRange::point(id)),
        }
        previous = Some(position);
    }
    Ok(ranges)
}
