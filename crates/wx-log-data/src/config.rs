//! # Log Data Configuration
//!
//! Tunables for batched reads and live streaming. Every value can be
//! overridden by the caller; [`LogDataConfig::validate`] rejects settings
//! that would overload the store.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::algorithms::StreamOffsets;
use crate::domain::{
    LogDataError, AUTO_REFRESH_TIMEOUT_SECS, DEFAULT_REFRESH_DELAY_SECS, DEPTH_INDEX_HORIZON_OFFSET,
    DEPTH_INDEX_START_OFFSET, TIME_INDEX_HORIZON_OFFSET_SECS, TIME_INDEX_START_OFFSET_SECS,
};

/// Default floor for the refresh delay.
const MIN_REFRESH_DELAY_SECS: f64 = 0.5;

/// Log data configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogDataConfig {
    /// Batched reader settings.
    pub reader: ReaderConfig,
    /// Streaming controller settings.
    pub streaming: StreamingConfig,
}

/// Batched reader configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReaderConfig {
    /// Row count hint passed with every store query. The store applies its
    /// own per-call cap regardless.
    pub max_count_hint: Option<usize>,
}

/// Streaming controller configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamingConfig {
    /// Look-back of the first window on date-time logs, in seconds.
    pub time_start_offset_secs: i64,
    /// Look-back of the first window on depth logs, in index units.
    pub depth_start_offset: f64,
    /// Window horizon on date-time logs, in seconds.
    pub time_horizon_offset_secs: i64,
    /// Window horizon on depth logs, in index units.
    pub depth_horizon_offset: f64,
    /// Delay between polls when the caller does not choose one.
    pub default_refresh_delay_secs: f64,
    /// Floor applied to any requested refresh delay.
    pub min_refresh_delay_secs: f64,
    /// Requested delays below this are accepted but logged as a warning.
    pub refresh_delay_warning_secs: f64,
    /// Ceiling on a stream's lifetime before it is stopped automatically.
    pub auto_stop_secs: u64,
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            time_start_offset_secs: TIME_INDEX_START_OFFSET_SECS,
            depth_start_offset: DEPTH_INDEX_START_OFFSET,
            time_horizon_offset_secs: TIME_INDEX_HORIZON_OFFSET_SECS,
            depth_horizon_offset: DEPTH_INDEX_HORIZON_OFFSET,
            default_refresh_delay_secs: DEFAULT_REFRESH_DELAY_SECS,
            min_refresh_delay_secs: MIN_REFRESH_DELAY_SECS,
            refresh_delay_warning_secs: 2.0,
            auto_stop_secs: AUTO_REFRESH_TIMEOUT_SECS,
        }
    }
}

impl StreamingConfig {
    /// Window offsets for the stream window algorithms.
    pub fn offsets(&self) -> StreamOffsets {
        StreamOffsets {
            time_start_secs: self.time_start_offset_secs,
            depth_start: self.depth_start_offset,
            time_horizon_secs: self.time_horizon_offset_secs,
            depth_horizon: self.depth_horizon_offset,
        }
    }

    /// Requested delay clamped to the configured floor.
    ///
    /// A floor that is not a valid duration falls back to the default floor.
    pub fn effective_refresh_delay(&self, requested: Duration) -> Duration {
        let floor = Duration::try_from_secs_f64(self.min_refresh_delay_secs)
            .ok()
            .filter(|floor| !floor.is_zero())
            .unwrap_or(Duration::from_secs_f64(MIN_REFRESH_DELAY_SECS));
        requested.max(floor)
    }

    /// Default refresh delay.
    pub fn default_refresh_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.default_refresh_delay_secs)
            .unwrap_or(Duration::from_secs_f64(DEFAULT_REFRESH_DELAY_SECS))
    }

    /// Auto-stop ceiling.
    pub fn auto_stop(&self) -> Duration {
        Duration::from_secs(self.auto_stop_secs)
    }

    /// Validate streaming settings.
    pub fn validate(&self) -> Result<(), LogDataError> {
        if !(self.min_refresh_delay_secs.is_finite() && self.min_refresh_delay_secs > 0.0) {
            return Err(LogDataError::InvalidConfig(
                "min_refresh_delay_secs must be positive".into(),
            ));
        }
        if !self.default_refresh_delay_secs.is_finite() || self.default_refresh_delay_secs < self.min_refresh_delay_secs {
            return Err(LogDataError::InvalidConfig(
                "default_refresh_delay_secs must not be below min_refresh_delay_secs".into(),
            ));
        }
        if !self.refresh_delay_warning_secs.is_finite() || self.refresh_delay_warning_secs < 0.0 {
            return Err(LogDataError::InvalidConfig(
                "refresh_delay_warning_secs must be finite and non-negative".into(),
            ));
        }
        if self.auto_stop_secs == 0 {
            return Err(LogDataError::InvalidConfig("auto_stop_secs cannot be 0".into()));
        }
        if self.time_start_offset_secs < 0 || self.time_horizon_offset_secs <= 0 {
            return Err(LogDataError::InvalidConfig(
                "time offsets must be non-negative with a positive horizon".into(),
            ));
        }
        if !(self.depth_start_offset >= 0.0 && self.depth_horizon_offset > 0.0 && self.depth_horizon_offset.is_finite()) {
            return Err(LogDataError::InvalidConfig(
                "depth offsets must be non-negative with a positive horizon".into(),
            ));
        }
        Ok(())
    }
}

impl LogDataConfig {
    /// Create a config for testing (short delays, same offsets).
    pub fn for_testing() -> Self {
        Self {
            reader: ReaderConfig::default(),
            streaming: StreamingConfig {
                default_refresh_delay_secs: 1.0,
                min_refresh_delay_secs: 0.1,
                auto_stop_secs: 60,
                ..StreamingConfig::default()
            },
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), LogDataError> {
        self.streaming.validate()?;
        if self.reader.max_count_hint == Some(0) {
            return Err(LogDataError::InvalidConfig("max_count_hint cannot be 0".into()));
        }
        Ok(())
    }
}
