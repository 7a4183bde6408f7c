//! # Log Data Service
//!
//! Application service wiring the batched reader, range coalescing, export
//! and the streaming controller behind [`LogDataApi`].

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use super::reader::{full_window, BatchedLogDataReader};
use super::streaming::{SessionHandle, StreamingRefreshController};
use crate::algorithms::{
    coalesce_index_ranges, index_curve_first, project, validate_selection, ExportColumn,
    ExportDocument, ExportOptions,
};
use crate::config::LogDataConfig;
use crate::domain::{
    IndexRange, IndexWindow, LogDataError, LogDataTable, LogHeader, LogReference, Outcome,
    ReadOutcome, Row,
};
use crate::ports::{ExportScope, LogDataApi, LogStore};

/// Log Data Service - orchestrates reads, edits, exports and streaming.
pub struct LogDataService<S: LogStore + 'static> {
    /// Configuration.
    config: LogDataConfig,
    /// Shared store.
    store: Arc<S>,
    /// Batched reader over the store.
    reader: Arc<BatchedLogDataReader<S>>,
    /// Streaming controller.
    streaming: StreamingRefreshController<S>,
}

impl<S: LogStore + 'static> LogDataService<S> {
    /// Create a service after validating `config`.
    pub fn new(store: Arc<S>, config: LogDataConfig) -> Result<Self, LogDataError> {
        config.validate()?;
        info!("[wx-log-data] Initializing log data service on store {}", store.store_id());
        let reader = Arc::new(BatchedLogDataReader::new(store.clone(), config.reader.clone()));
        let streaming = StreamingRefreshController::new(reader.clone(), config.streaming.clone())?;
        Ok(Self {
            config,
            store,
            reader,
            streaming,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &LogDataConfig {
        &self.config
    }

    /// The batched reader.
    pub fn reader(&self) -> &BatchedLogDataReader<S> {
        &self.reader
    }

    /// The active or most recent streaming session.
    pub fn active_stream(&self) -> Option<SessionHandle> {
        self.streaming.active()
    }

    fn export_columns(table: &LogDataTable) -> Vec<ExportColumn> {
        table
            .curve_specifications()
            .iter()
            .map(ExportColumn::from_specification)
            .collect()
    }
}

#[async_trait]
impl<S: LogStore + 'static> LogDataApi for LogDataService<S> {
    async fn get_log(&self, reference: &LogReference) -> Result<LogHeader, LogDataError> {
        let mut header = self.store.get_log(reference).await?;
        let index_curve = header.index_curve.clone();
        header.curves = index_curve_first(std::mem::take(&mut header.curves), index_curve.as_deref());
        Ok(header)
    }

    async fn read(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        window: &IndexWindow,
        inclusive_start: bool,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome, LogDataError> {
        self.reader
            .read(log, mnemonics, window, inclusive_start, cancel)
            .await
    }

    async fn read_curve(
        &self,
        log: &LogHeader,
        mnemonic: &str,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome, LogDataError> {
        self.reader.read_curve(log, mnemonic, cancel).await
    }

    fn coalesce(
        &self,
        log: &LogHeader,
        table: &LogDataTable,
        positions: &[usize],
    ) -> Result<Vec<IndexRange>, LogDataError> {
        coalesce_index_ranges(positions, table, log.index_type, log.direction)
    }

    async fn delete_selected(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        table: &LogDataTable,
        positions: &[usize],
    ) -> Result<Vec<IndexRange>, LogDataError> {
        let ranges = self.coalesce(log, table, positions)?;
        if ranges.is_empty() {
            debug!("[wx-log-data] Empty selection on {}, nothing to delete", log.reference);
            return Ok(ranges);
        }
        self.store
            .delete_ranges(&log.reference, mnemonics, &ranges)
            .await?;
        info!(
            "[wx-log-data] Deleted {} curves over {} ranges from {}",
            mnemonics.len(),
            ranges.len(),
            log.reference
        );
        Ok(ranges)
    }

    async fn export(
        &self,
        log: &LogHeader,
        table: &LogDataTable,
        scope: &ExportScope,
        options: &ExportOptions,
        cancel: &CancellationToken,
    ) -> Result<Outcome<ExportDocument>, LogDataError> {
        let columns = Self::export_columns(table);
        match scope {
            ExportScope::All => {
                let mnemonics: Vec<String> = table
                    .curve_specifications()
                    .iter()
                    .map(|spec| spec.mnemonic.clone())
                    .collect();
                let window = full_window(log)?;
                let outcome = self.reader.read(log, &mnemonics, &window, true, cancel).await?;
                Ok(outcome.map(|fresh| {
                    let columns = if columns.is_empty() {
                        Self::export_columns(&fresh)
                    } else {
                        columns
                    };
                    project(fresh.rows(), &columns, options)
                }))
            }
            ExportScope::IntervalOfData => {
                Ok(Outcome::Completed(project(table.rows(), &columns, options)))
            }
            ExportScope::SelectedIndexValues(positions) => {
                validate_selection(positions, table.len())?;
                let rows: Vec<&Row> = positions.iter().filter_map(|&p| table.row(p)).collect();
                Ok(Outcome::Completed(project(rows, &columns, options)))
            }
        }
    }

    async fn start_streaming(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        refresh_delay: Option<Duration>,
    ) -> Result<SessionHandle, LogDataError> {
        self.streaming.start(log, mnemonics, refresh_delay)
    }

    fn stop_streaming(&self) {
        self.streaming.stop();
    }
}
