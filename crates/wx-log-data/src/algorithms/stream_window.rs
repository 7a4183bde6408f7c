//! # Stream Windows
//!
//! Fetch windows for polling a growing log.
//!
//! The first window reaches a little behind the log's current end so the
//! stream opens with recent context; every later window starts at the last
//! index already seen. Each window extends far past its start so any data
//! appended since the previous poll is captured.

use crate::domain::{Direction, IndexValue, IndexWindow};

/// Index-type specific offsets for stream windows.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StreamOffsets {
    /// Look-back of the first window on date-time logs (seconds).
    pub time_start_secs: i64,
    /// Look-back of the first window on depth logs (raw units).
    pub depth_start: f64,
    /// Horizon of every window on date-time logs (seconds).
    pub time_horizon_secs: i64,
    /// Horizon of every window on depth logs (raw units).
    pub depth_horizon: f64,
}

/// First window of a stream: `[end - start offset, end + horizon]`,
/// both offsets negated on decreasing logs.
pub fn initial_stream_window(end_index: &IndexValue, direction: Direction, offsets: &StreamOffsets) -> IndexWindow {
    IndexWindow::new(
        end_index.advance(-offsets.time_start_secs, -offsets.depth_start, direction),
        end_index.advance(offsets.time_horizon_secs, offsets.depth_horizon, direction),
    )
}

/// Window following a poll: `[last observed, last observed + horizon]`.
///
/// Read with an exclusive start so the boundary row is not fetched twice.
pub fn next_stream_window(last_observed: &IndexValue, direction: Direction, offsets: &StreamOffsets) -> IndexWindow {
    IndexWindow::new(
        last_observed.clone(),
        last_observed.advance(offsets.time_horizon_secs, offsets.depth_horizon, direction),
    )
}
