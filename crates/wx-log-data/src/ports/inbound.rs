//! # Inbound Ports
//!
//! API trait defining what callers can do with a log's curve data.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::algorithms::{ExportDocument, ExportOptions};
use crate::application::SessionHandle;
use crate::domain::{
    IndexRange, IndexWindow, LogDataError, LogDataTable, LogHeader, LogReference, Outcome,
    ReadOutcome,
};

/// Which rows an export covers.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportScope {
    /// Every row of the log, read fresh from the store over its full range.
    All,
    /// The rows of the table currently held by the caller.
    IntervalOfData,
    /// The rows at these table positions.
    SelectedIndexValues(Vec<usize>),
}

/// Log data API - inbound port.
#[async_trait]
pub trait LogDataApi: Send + Sync {
    /// Fetch a log header with the index curve first in its curve list.
    async fn get_log(&self, reference: &LogReference) -> Result<LogHeader, LogDataError>;

    /// Read curve data over an index window in as many store calls as needed.
    async fn read(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        window: &IndexWindow,
        inclusive_start: bool,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome, LogDataError>;

    /// Read one curve (and the index curve) over the log's full range.
    async fn read_curve(
        &self,
        log: &LogHeader,
        mnemonic: &str,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome, LogDataError>;

    /// Coalesce selected table positions into index ranges.
    fn coalesce(
        &self,
        log: &LogHeader,
        table: &LogDataTable,
        positions: &[usize],
    ) -> Result<Vec<IndexRange>, LogDataError>;

    /// Delete the values of `mnemonics` for the selected rows. Returns the
    /// ranges sent to the store; an empty selection sends nothing.
    async fn delete_selected(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        table: &LogDataTable,
        positions: &[usize],
    ) -> Result<Vec<IndexRange>, LogDataError>;

    /// Export the table's columns for the given scope as delimited text.
    async fn export(
        &self,
        log: &LogHeader,
        table: &LogDataTable,
        scope: &ExportScope,
        options: &ExportOptions,
        cancel: &CancellationToken,
    ) -> Result<Outcome<ExportDocument>, LogDataError>;

    /// Start polling a growing log. Starting the log already being streamed
    /// returns the running session.
    async fn start_streaming(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        refresh_delay: Option<Duration>,
    ) -> Result<SessionHandle, LogDataError>;

    /// Stop the active streaming session, if any.
    fn stop_streaming(&self);
}
