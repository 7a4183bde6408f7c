//! # Domain Invariants
//!
//! Rules that must hold for curve metadata and store batches, plus the
//! default streaming constants.

use super::entities::CurveInfo;
use super::errors::LogDataError;
use super::value_objects::{Direction, IndexValue};

/// Offset before the log end index where streaming starts, date-time logs (seconds).
pub const TIME_INDEX_START_OFFSET_SECS: i64 = 20 * 60;

/// Offset before the log end index where streaming starts, depth logs (raw units).
pub const DEPTH_INDEX_START_OFFSET: f64 = 20.0;

/// Horizon past the current end index that captures any new data (seconds).
pub const TIME_INDEX_HORIZON_OFFSET_SECS: i64 = 30_536_000;

/// Horizon past the current end index that captures any new data (raw units).
pub const DEPTH_INDEX_HORIZON_OFFSET: f64 = 1_000_000.0;

/// Default delay between streaming polls.
pub const DEFAULT_REFRESH_DELAY_SECS: f64 = 5.0;

/// Streams are stopped after this long to bound load on the store.
pub const AUTO_REFRESH_TIMEOUT_SECS: u64 = 5 * 60;

/// Invariant: the index curve occupies position 0.
///
/// Holds trivially when the log declares no index curve or the curve
/// is absent from the list.
pub fn invariant_index_curve_first(curves: &[CurveInfo], index_curve: Option<&str>) -> bool {
    let Some(index_curve) = index_curve else {
        return true;
    };
    if !curves.iter().any(|c| c.mnemonic == index_curve) {
        return true;
    }
    curves.first().is_some_and(|c| c.mnemonic == index_curve)
}

/// Invariant: a batch is ordered in `direction` and starts strictly after
/// the last index of the previous batch.
///
/// Equal neighbouring values inside one batch are accepted since a log may
/// repeat an index value. `batch` is only used to label the error.
pub fn invariant_batch_ordered(
    batch: usize,
    previous: Option<&IndexValue>,
    values: &[IndexValue],
    direction: Direction,
) -> Result<(), LogDataError> {
    let violation = |prev: &IndexValue, current: &IndexValue| LogDataError::StoreContractViolation {
        batch,
        previous: prev.to_string(),
        current: current.to_string(),
    };

    if let (Some(prev), Some(first)) = (previous, values.first()) {
        if !first.follows(prev, direction) {
            return Err(violation(prev, first));
        }
    }
    for pair in values.windows(2) {
        if pair[0].follows(&pair[1], direction) {
            return Err(violation(&pair[0], &pair[1]));
        }
    }
    Ok(())
}
