//! # Outbound Ports
//!
//! The remote log store. It answers bounded range queries, has no cursors
//! and caps how many rows one call returns.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::domain::{IndexRange, IndexWindow, LogDataBatch, LogDataError, LogHeader, LogReference};

/// One bounded data query.
#[derive(Clone, Debug, PartialEq)]
pub struct LogDataQuery {
    /// Log to read from.
    pub reference: LogReference,
    /// Curves to return. The index curve is always included.
    pub mnemonics: Vec<String>,
    /// Index window to cover.
    pub window: IndexWindow,
    /// Whether `window.start` itself is part of the query.
    pub start_inclusive: bool,
    /// Row count hint. The store may return fewer rows.
    pub max_count: Option<usize>,
}

/// Log store - outbound port.
///
/// Implementations must tolerate concurrent independent calls.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Fetch a log header with its curve metadata.
    async fn get_log(&self, reference: &LogReference) -> Result<LogHeader, LogDataError>;

    /// Fetch at most one capped batch of rows inside `query.window`.
    ///
    /// Rows must come back ordered in the log's direction. Implementations
    /// should stop early and return `Ok` with whatever they have, or an
    /// empty batch, once `cancel` fires; the caller discards the result.
    async fn get_log_data(
        &self,
        query: &LogDataQuery,
        cancel: &CancellationToken,
    ) -> Result<LogDataBatch, LogDataError>;

    /// Delete the values of `mnemonics` inside every range.
    async fn delete_ranges(
        &self,
        reference: &LogReference,
        mnemonics: &[String],
        ranges: &[IndexRange],
    ) -> Result<(), LogDataError>;

    /// Store identifier (for logging).
    fn store_id(&self) -> &str;
}
