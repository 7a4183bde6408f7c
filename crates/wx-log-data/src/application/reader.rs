//! # Batched Log Data Reader
//!
//! Reads an arbitrarily long index window from a store that caps the rows
//! of each response. Each call resumes strictly after the last index
//! received, so no row is fetched twice.
//!
//! A log that repeats an index value across a batch boundary loses the
//! repeats the next call starts after. The reader cannot see those rows; it
//! warns when a batch ends on a repeated value, the one case it can observe.

use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use std::cmp::Ordering;
use tracing::{debug, warn};

use crate::algorithms::index_curve_first;
use crate::config::ReaderConfig;
use crate::domain::{
    invariant_batch_ordered, CurveSpecification, IndexValue, IndexWindow, LogDataError,
    LogDataTable, LogHeader, Outcome, ReadOutcome, Row,
};
use crate::ports::{LogDataQuery, LogStore};

/// Batched reader over a [`LogStore`].
pub struct BatchedLogDataReader<S: LogStore> {
    store: Arc<S>,
    config: ReaderConfig,
}

impl<S: LogStore> BatchedLogDataReader<S> {
    /// Create a reader.
    pub fn new(store: Arc<S>, config: ReaderConfig) -> Self {
        Self { store, config }
    }

    /// The underlying store.
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Read `mnemonics` over `window`.
    ///
    /// The index curve is always requested and always comes first in the
    /// result's curve specifications. Batches are validated against the
    /// log's direction; a store that goes backwards or repeats the previous
    /// batch's last index aborts the read.
    ///
    /// Cancellation is checked before each store call and raced against the
    /// call in flight. A cancelled read returns [`Outcome::Cancelled`] and
    /// any rows gathered so far are dropped, as they are on error.
    pub async fn read(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        window: &IndexWindow,
        inclusive_start: bool,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome, LogDataError> {
        let index_curve = log.require_index_curve()?;
        let mut query = LogDataQuery {
            reference: log.reference.clone(),
            mnemonics: with_index_curve(mnemonics, index_curve),
            window: window.clone(),
            start_inclusive: inclusive_start,
            max_count: self.config.max_count_hint,
        };

        let mut specifications: Vec<CurveSpecification> = Vec::new();
        let mut rows: Vec<Row> = Vec::new();
        let mut previous: Option<IndexValue> = None;
        let mut batch_number = 0usize;

        loop {
            if cancel.is_cancelled() {
                debug!("[wx-log-data] Read of {} cancelled before batch {}", log.reference, batch_number);
                return Ok(Outcome::Cancelled);
            }

            let batch = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Ok(Outcome::Cancelled),
                result = self.store.get_log_data(&query, cancel) => result?,
            };
            if cancel.is_cancelled() {
                return Ok(Outcome::Cancelled);
            }
            if batch.is_empty() {
                break;
            }

            let batch_specifications = batch.curve_specifications();
            let mut batch_rows = Vec::with_capacity(batch.rows.len());
            let mut index_values = Vec::with_capacity(batch.rows.len());
            for record in batch.rows {
                let row = Row::from_record(&batch.mnemonic_list, record, index_curve)?;
                index_values.push(row.index_value(log.index_type)?);
                batch_rows.push(row);
            }
            invariant_batch_ordered(batch_number, previous.as_ref(), &index_values, log.direction)?;

            if specifications.is_empty() {
                specifications = index_curve_first(batch_specifications, Some(index_curve));
            }

            if ends_on_repeated_index(&index_values) {
                warn!(
                    "[wx-log-data] {} batch {} ends on repeated index {}; rows sharing it beyond the batch are skipped",
                    log.reference,
                    batch_number,
                    index_values[index_values.len() - 1]
                );
            }
            let Some(last) = index_values.pop() else {
                break;
            };
            debug!(
                "[wx-log-data] {} batch {}: {} rows up to {} from {}",
                log.reference,
                batch_number,
                batch_rows.len(),
                last,
                self.store.store_id()
            );
            rows.extend(batch_rows);

            if last.reaches(&window.end, log.direction) {
                break;
            }
            query.window.start = last.clone();
            query.start_inclusive = false;
            previous = Some(last);
            batch_number += 1;
        }

        Ok(Outcome::Completed(LogDataTable::new(specifications, rows)))
    }

    /// Read one curve over the log's full `[start_index, end_index]`.
    pub async fn read_curve(
        &self,
        log: &LogHeader,
        mnemonic: &str,
        cancel: &CancellationToken,
    ) -> Result<ReadOutcome, LogDataError> {
        let window = full_window(log)?;
        self.read(log, &[mnemonic.to_string()], &window, true, cancel)
            .await
    }
}

/// The log's full index window.
pub fn full_window(log: &LogHeader) -> Result<IndexWindow, LogDataError> {
    Ok(IndexWindow::new(
        log.require_start_index()?.clone(),
        log.require_end_index()?.clone(),
    ))
}

fn ends_on_repeated_index(values: &[IndexValue]) -> bool {
    match values {
        [.., before, last] => before.cmp_index(last) == Ordering::Equal,
        _ => false,
    }
}

fn with_index_curve(mnemonics: &[String], index_curve: &str) -> Vec<String> {
    let mut requested = Vec::with_capacity(mnemonics.len() + 1);
    requested.push(index_curve.to_string());
    requested.extend(mnemonics.iter().filter(|m| *m != index_curve).cloned());
    requested
}
