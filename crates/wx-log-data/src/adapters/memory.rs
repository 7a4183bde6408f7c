//! # In-Memory Log Store
//!
//! [`LogStore`] backed by fixture data held in memory. Used by tests and the
//! CLI; behaves like the remote store as far as the reader can observe:
//! per-call row cap, window filtering in the log's direction and
//! range-scoped deletes.

use async_trait::async_trait;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::domain::{
    CurveValue, IndexRange, IndexValue, LogDataBatch, LogDataError, LogHeader, LogReference,
};
use crate::ports::{LogDataQuery, LogStore};

/// Rows returned per call unless configured otherwise.
pub const DEFAULT_MAX_ROWS_PER_CALL: usize = 10_000;

/// One log with its data, as stored.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogFixture {
    /// Log header. `curves` is returned as is, in store order.
    pub header: LogHeader,
    /// Column mnemonics of `rows`.
    pub mnemonics: Vec<String>,
    /// Units aligned with `mnemonics`.
    #[serde(default)]
    pub units: Vec<String>,
    /// Positional records ordered in the log's direction.
    #[serde(default)]
    pub rows: Vec<Vec<CurveValue>>,
}

impl LogFixture {
    fn index_column(&self) -> Result<usize, LogDataError> {
        let index_curve = self.header.require_index_curve()?;
        self.mnemonics
            .iter()
            .position(|m| m == index_curve)
            .ok_or_else(|| {
                LogDataError::MalformedResponse(format!(
                    "log {} has no column for index curve {index_curve}",
                    self.header.reference
                ))
            })
    }

    fn row_index(&self, column: usize, row: &[CurveValue]) -> Result<IndexValue, LogDataError> {
        row.get(column)
            .unwrap_or(&CurveValue::Null)
            .to_index(self.header.index_type)
    }
}

/// Serialized store contents.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoreFixture {
    /// Stored logs.
    pub logs: Vec<LogFixture>,
}

/// A recorded `delete_ranges` call.
#[derive(Clone, Debug, PartialEq)]
pub struct DeleteRequest {
    /// Target log.
    pub reference: LogReference,
    /// Curves whose values were deleted.
    pub mnemonics: Vec<String>,
    /// Ranges as received.
    pub ranges: Vec<IndexRange>,
}

/// In-memory log store.
pub struct InMemoryLogStore {
    id: String,
    logs: RwLock<HashMap<LogReference, LogFixture>>,
    max_rows_per_call: usize,
    call_delay: Option<Duration>,
    fail_from_call: Option<usize>,
    reverse_rows: bool,
    data_calls: AtomicUsize,
    deletes: Mutex<Vec<DeleteRequest>>,
}

impl Default for InMemoryLogStore {
    fn default() -> Self {
        Self {
            id: "memory-store".to_string(),
            logs: RwLock::new(HashMap::new()),
            max_rows_per_call: DEFAULT_MAX_ROWS_PER_CALL,
            call_delay: None,
            fail_from_call: None,
            reverse_rows: false,
            data_calls: AtomicUsize::new(0),
            deletes: Mutex::new(Vec::new()),
        }
    }
}

impl InMemoryLogStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store holding the fixture's logs.
    pub fn from_fixture(fixture: StoreFixture) -> Self {
        let store = Self::default();
        for log in fixture.logs {
            store.insert_log(log);
        }
        store
    }

    /// Parse a JSON fixture.
    pub fn from_json(json: &str) -> Result<Self, LogDataError> {
        let fixture: StoreFixture = serde_json::from_str(json)
            .map_err(|e| LogDataError::MalformedResponse(format!("invalid fixture: {e}")))?;
        Ok(Self::from_fixture(fixture))
    }

    /// Cap the rows returned by one data call.
    pub fn with_max_rows_per_call(mut self, cap: usize) -> Self {
        self.max_rows_per_call = cap.max(1);
        self
    }

    /// Delay every data call (cancellable).
    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    /// Fail every data call from the given zero-based call number on.
    pub fn with_failure_from_call(mut self, call: usize) -> Self {
        self.fail_from_call = Some(call);
        self
    }

    /// Return each batch in reverse order, breaking the ordering contract.
    pub fn with_reversed_rows(mut self) -> Self {
        self.reverse_rows = true;
        self
    }

    /// Override the store identifier.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = id.into();
        self
    }

    /// Add or replace a log.
    pub fn insert_log(&self, log: LogFixture) {
        self.logs.write().insert(log.header.reference.clone(), log);
    }

    /// Append rows to a log and move its end index, as a growing log would.
    pub fn push_rows(
        &self,
        reference: &LogReference,
        rows: Vec<Vec<CurveValue>>,
    ) -> Result<(), LogDataError> {
        let mut logs = self.logs.write();
        let log = logs
            .get_mut(reference)
            .ok_or_else(|| LogDataError::ObjectNotFound(reference.to_string()))?;
        let column = log.index_column()?;
        for row in rows {
            let index = log.row_index(column, &row)?;
            if log.header.start_index.is_none() {
                log.header.start_index = Some(index.clone());
            }
            log.header.end_index = Some(index);
            log.rows.push(row);
        }
        Ok(())
    }

    /// Number of `get_log_data` calls served so far.
    pub fn data_calls(&self) -> usize {
        self.data_calls.load(Ordering::SeqCst)
    }

    /// Recorded `delete_ranges` calls.
    pub fn deletes(&self) -> Vec<DeleteRequest> {
        self.deletes.lock().clone()
    }

    /// Snapshot of a stored log.
    pub fn log(&self, reference: &LogReference) -> Option<LogFixture> {
        self.logs.read().get(reference).cloned()
    }

    fn select_batch(&self, query: &LogDataQuery) -> Result<LogDataBatch, LogDataError> {
        let logs = self.logs.read();
        let log = logs
            .get(&query.reference)
            .ok_or_else(|| LogDataError::ObjectNotFound(query.reference.to_string()))?;
        let direction = log.header.direction;
        let column = log.index_column()?;

        let columns: Vec<usize> = log
            .mnemonics
            .iter()
            .enumerate()
            .filter(|(_, m)| query.mnemonics.contains(m))
            .map(|(i, _)| i)
            .collect();

        let cap = query
            .max_count
            .map_or(self.max_rows_per_call, |hint| hint.min(self.max_rows_per_call));

        let mut rows = Vec::new();
        for row in &log.rows {
            let index = log.row_index(column, row)?;
            let after_start = if query.start_inclusive {
                index.reaches(&query.window.start, direction)
            } else {
                index.follows(&query.window.start, direction)
            };
            if !after_start {
                continue;
            }
            if index.follows(&query.window.end, direction) || rows.len() == cap {
                break;
            }
            rows.push(
                columns
                    .iter()
                    .map(|&i| row.get(i).cloned().unwrap_or(CurveValue::Null))
                    .collect::<Vec<_>>(),
            );
        }
        if self.reverse_rows {
            rows.reverse();
        }

        Ok(LogDataBatch {
            mnemonic_list: columns.iter().map(|&i| log.mnemonics[i].clone()).collect(),
            unit_list: columns
                .iter()
                .map(|&i| log.units.get(i).cloned().unwrap_or_default())
                .collect(),
            rows,
        })
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn get_log(&self, reference: &LogReference) -> Result<LogHeader, LogDataError> {
        self.logs
            .read()
            .get(reference)
            .map(|log| log.header.clone())
            .ok_or_else(|| LogDataError::ObjectNotFound(reference.to_string()))
    }

    async fn get_log_data(
        &self,
        query: &LogDataQuery,
        cancel: &CancellationToken,
    ) -> Result<LogDataBatch, LogDataError> {
        let call = self.data_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.call_delay {
            tokio::select! {
                _ = cancel.cancelled() => return Ok(LogDataBatch::default()),
                _ = tokio::time::sleep(delay) => {}
            }
        }
        if self.fail_from_call.is_some_and(|from| call >= from) {
            return Err(LogDataError::StoreUnavailable(format!(
                "{}: simulated failure on call {call}",
                self.id
            )));
        }
        self.select_batch(query)
    }

    async fn delete_ranges(
        &self,
        reference: &LogReference,
        mnemonics: &[String],
        ranges: &[IndexRange],
    ) -> Result<(), LogDataError> {
        let mut logs = self.logs.write();
        let log = logs
            .get_mut(reference)
            .ok_or_else(|| LogDataError::ObjectNotFound(reference.to_string()))?;
        let index_type = log.header.index_type;
        let column = log.index_column()?;

        let bounds = ranges
            .iter()
            .map(|range| {
                let a = IndexValue::parse(&range.start_index, index_type)?;
                let b = IndexValue::parse(&range.end_index, index_type)?;
                Ok(if a.cmp_index(&b).is_le() { (a, b) } else { (b, a) })
            })
            .collect::<Result<Vec<_>, LogDataError>>()?;
        let targets: Vec<usize> = log
            .mnemonics
            .iter()
            .enumerate()
            .filter(|(i, m)| *i != column && mnemonics.contains(m))
            .map(|(i, _)| i)
            .collect();

        for row in log.rows.iter_mut() {
            let index = row
                .get(column)
                .unwrap_or(&CurveValue::Null)
                .to_index(index_type)?;
            let inside = bounds
                .iter()
                .any(|(lo, hi)| index.cmp_index(lo).is_ge() && index.cmp_index(hi).is_le());
            if inside {
                for &i in &targets {
                    if let Some(cell) = row.get_mut(i) {
                        *cell = CurveValue::Null;
                    }
                }
            }
        }

        self.deletes.lock().push(DeleteRequest {
            reference: reference.clone(),
            mnemonics: mnemonics.to_vec(),
            ranges: ranges.to_vec(),
        });
        Ok(())
    }

    fn store_id(&self) -> &str {
        &self.id
    }
}
