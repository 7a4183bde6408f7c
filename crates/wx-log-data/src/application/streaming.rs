//! # Streaming Refresh Controller
//!
//! Keeps a table in sync with a growing log by polling the store.
//!
//! ```text
//! Idle ──start──→ Polling ──stop / other log──→ Stopped
//!                    │ ──auto-stop deadline───→ AutoStopped
//!                    └──failed poll───────────→ Failed
//! ```
//!
//! A session polls, waits for the read to finish, then sleeps for the
//! refresh delay; reads never overlap. An independent deadline ends every
//! session after a fixed lifetime so an unattended stream cannot load the
//! store forever.

use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::reader::BatchedLogDataReader;
use crate::algorithms::{initial_stream_window, next_stream_window, StreamOffsets};
use crate::config::StreamingConfig;
use crate::domain::{
    IndexType, IndexValue, LogDataError, LogDataTable, LogHeader, LogReference, Outcome,
};
use crate::ports::LogStore;

/// Lifecycle state of a streaming session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StreamState {
    /// Created, first poll not started yet.
    Idle,
    /// Polling or waiting for the next poll.
    Polling,
    /// Stopped by the caller or replaced by a stream on another log.
    Stopped,
    /// Stopped by the lifetime deadline.
    AutoStopped,
    /// Stopped by a failed poll.
    Failed(String),
}

impl StreamState {
    /// Whether the session has ended.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Stopped | Self::AutoStopped | Self::Failed(_))
    }
}

/// Polling progress of a session.
#[derive(Clone, Debug, PartialEq)]
pub struct RefreshState {
    /// Last index appended to the table, or the log's end index before any
    /// row arrived.
    pub last_observed_index: IndexValue,
    /// Whether the session is still polling.
    pub auto_refresh_enabled: bool,
    /// Time since the first poll started; frozen once the session ends.
    pub elapsed_since_start: Duration,
    /// Completed polls.
    pub polls: usize,
}

struct Session {
    id: Uuid,
    reference: LogReference,
    index_type: IndexType,
    refresh_delay: Duration,
    cancel: CancellationToken,
    state: watch::Sender<StreamState>,
    table: RwLock<LogDataTable>,
    last_observed: Mutex<IndexValue>,
    started_at: Mutex<Option<Instant>>,
    ended_at: Mutex<Option<Instant>>,
    polls: AtomicUsize,
    notification: Mutex<Option<String>>,
    error: Mutex<Option<LogDataError>>,
}

impl Session {
    fn begin(&self) {
        *self.started_at.lock() = Some(Instant::now());
        self.state.send_if_modified(|current| {
            if *current == StreamState::Idle {
                *current = StreamState::Polling;
                true
            } else {
                false
            }
        });
    }

    /// Move to a terminal state unless one was reached already.
    fn finish(&self, state: StreamState) -> bool {
        let changed = self.state.send_if_modified(|current| {
            if current.is_terminal() {
                false
            } else {
                *current = state;
                true
            }
        });
        if changed {
            *self.ended_at.lock() = Some(Instant::now());
        }
        changed
    }

    /// Append a poll's rows and return the index the next window starts at.
    fn absorb(&self, table: LogDataTable) -> Result<IndexValue, LogDataError> {
        let last = table
            .last_id()
            .map(|id| IndexValue::parse(id, self.index_type))
            .transpose()?;
        self.table.write().append(table);
        self.polls.fetch_add(1, Ordering::SeqCst);

        let mut observed = self.last_observed.lock();
        if let Some(last) = last {
            *observed = last;
        }
        Ok(observed.clone())
    }
}

/// Handle to a streaming session. Cheap to clone.
#[derive(Clone)]
pub struct SessionHandle {
    inner: Arc<Session>,
}

impl SessionHandle {
    /// Session identifier.
    pub fn id(&self) -> Uuid {
        self.inner.id
    }

    /// Log being streamed.
    pub fn reference(&self) -> &LogReference {
        &self.inner.reference
    }

    /// Refresh delay in effect after clamping.
    pub fn refresh_delay(&self) -> Duration {
        self.inner.refresh_delay
    }

    /// Current state.
    pub fn state(&self) -> StreamState {
        self.inner.state.borrow().clone()
    }

    /// Whether the session is still running.
    pub fn is_active(&self) -> bool {
        !self.inner.state.borrow().is_terminal()
    }

    /// Snapshot of the polling progress.
    pub fn refresh_state(&self) -> RefreshState {
        let started = *self.inner.started_at.lock();
        let ended = *self.inner.ended_at.lock();
        let elapsed_since_start = match (started, ended) {
            (Some(start), Some(end)) => end.saturating_duration_since(start),
            (Some(start), None) => start.elapsed(),
            _ => Duration::ZERO,
        };
        RefreshState {
            last_observed_index: self.inner.last_observed.lock().clone(),
            auto_refresh_enabled: self.is_active(),
            elapsed_since_start,
            polls: self.inner.polls.load(Ordering::SeqCst),
        }
    }

    /// Snapshot of the streamed table.
    pub fn table(&self) -> LogDataTable {
        self.inner.table.read().clone()
    }

    /// Smallest index value in the streamed table.
    pub fn min_index(&self) -> Option<IndexValue> {
        self.index_values().min_by(IndexValue::cmp_index)
    }

    /// Largest index value in the streamed table.
    pub fn max_index(&self) -> Option<IndexValue> {
        self.index_values().max_by(IndexValue::cmp_index)
    }

    fn index_values(&self) -> impl Iterator<Item = IndexValue> {
        let index_type = self.inner.index_type;
        self.inner
            .table
            .read()
            .rows()
            .iter()
            .filter_map(|row| row.index_value(index_type).ok())
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Message for the caller when the session was stopped automatically.
    pub fn notification(&self) -> Option<String> {
        self.inner.notification.lock().clone()
    }

    /// Error of the failed poll. Returned once.
    pub fn take_error(&self) -> Option<LogDataError> {
        self.inner.error.lock().take()
    }

    /// Stop the session, cancelling any read in flight.
    pub fn stop(&self) {
        self.inner.cancel.cancel();
    }

    /// Wait until the session reaches a terminal state.
    pub async fn wait(&self) -> StreamState {
        let mut receiver = self.inner.state.subscribe();
        let state = match receiver.wait_for(StreamState::is_terminal).await {
            Ok(state) => state.clone(),
            Err(_) => self.state(),
        };
        state
    }
}

impl std::fmt::Debug for SessionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionHandle")
            .field("id", &self.inner.id)
            .field("reference", &self.inner.reference)
            .field("state", &self.state())
            .finish()
    }
}

/// Streaming controller. At most one session is active at a time.
pub struct StreamingRefreshController<S: LogStore + 'static> {
    reader: Arc<BatchedLogDataReader<S>>,
    config: StreamingConfig,
    active: Mutex<Option<SessionHandle>>,
}

impl<S: LogStore + 'static> StreamingRefreshController<S> {
    /// Create a controller after validating `config`.
    pub fn new(reader: Arc<BatchedLogDataReader<S>>, config: StreamingConfig) -> Result<Self, LogDataError> {
        config.validate()?;
        Ok(Self {
            reader,
            config,
            active: Mutex::new(None),
        })
    }

    /// Start streaming `mnemonics` of a growing log.
    ///
    /// Must be called within a Tokio runtime. Starting the log that is
    /// already streaming returns the running session; any other active
    /// session is stopped first.
    pub fn start(
        &self,
        log: &LogHeader,
        mnemonics: &[String],
        refresh_delay: Option<Duration>,
    ) -> Result<SessionHandle, LogDataError> {
        log.require_index_curve()?;
        let end_index = log.require_end_index()?.clone();

        let mut active = self.active.lock();
        if let Some(existing) = active.as_ref() {
            if existing.reference() == &log.reference && existing.is_active() {
                debug!("[wx-log-data] Stream for {} already running", log.reference);
                return Ok(existing.clone());
            }
            existing.stop();
        }

        let requested = refresh_delay.unwrap_or_else(|| self.config.default_refresh_delay());
        if requested.as_secs_f64() < self.config.refresh_delay_warning_secs {
            warn!(
                "[wx-log-data] Refresh delay of {:?} is below {}s and may overload the store",
                requested, self.config.refresh_delay_warning_secs
            );
        }
        let refresh_delay = self.config.effective_refresh_delay(requested);

        let (state, _) = watch::channel(StreamState::Idle);
        let session = Arc::new(Session {
            id: Uuid::new_v4(),
            reference: log.reference.clone(),
            index_type: log.index_type,
            refresh_delay,
            cancel: CancellationToken::new(),
            state,
            table: RwLock::new(LogDataTable::default()),
            last_observed: Mutex::new(end_index),
            started_at: Mutex::new(None),
            ended_at: Mutex::new(None),
            polls: AtomicUsize::new(0),
            notification: Mutex::new(None),
            error: Mutex::new(None),
        });
        let handle = SessionHandle {
            inner: session.clone(),
        };

        info!(
            "[wx-log-data] Streaming {} every {:?} (session {})",
            log.reference, refresh_delay, session.id
        );
        let task = StreamTask {
            reader: self.reader.clone(),
            log: log.clone(),
            mnemonics: mnemonics.to_vec(),
            offsets: self.config.offsets(),
            auto_stop: self.config.auto_stop(),
            session,
        };
        tokio::spawn(task.run());

        *active = Some(handle.clone());
        Ok(handle)
    }

    /// Stop the active session, if any.
    pub fn stop(&self) {
        if let Some(handle) = self.active.lock().take() {
            handle.stop();
        }
    }

    /// The most recently started session.
    pub fn active(&self) -> Option<SessionHandle> {
        self.active.lock().clone()
    }
}

impl<S: LogStore + 'static> Drop for StreamingRefreshController<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

struct StreamTask<S: LogStore + 'static> {
    reader: Arc<BatchedLogDataReader<S>>,
    log: LogHeader,
    mnemonics: Vec<String>,
    offsets: StreamOffsets,
    auto_stop: Duration,
    session: Arc<Session>,
}

impl<S: LogStore + 'static> StreamTask<S> {
    async fn run(self) {
        let session = &self.session;
        session.begin();

        let deadline = tokio::time::sleep(self.auto_stop);
        tokio::pin!(deadline);

        let direction = self.log.direction;
        let mut window = {
            let end = session.last_observed.lock().clone();
            initial_stream_window(&end, direction, &self.offsets)
        };

        loop {
            let result = {
                let read = self
                    .reader
                    .read(&self.log, &self.mnemonics, &window, false, &session.cancel);
                tokio::pin!(read);

                let finished = tokio::select! {
                    biased;
                    result = &mut read => Some(result),
                    _ = &mut deadline => None,
                };
                match finished {
                    Some(result) => result,
                    None => {
                        session.cancel.cancel();
                        let _ = read.await;
                        return self.auto_stopped();
                    }
                }
            };

            match result {
                Ok(Outcome::Completed(table)) => {
                    let rows = table.len();
                    match session.absorb(table) {
                        Ok(last) => {
                            debug!(
                                "[wx-log-data] Stream {} appended {} rows, last index {}",
                                session.id, rows, last
                            );
                            window = next_stream_window(&last, direction, &self.offsets);
                        }
                        Err(e) => return self.failed(e),
                    }
                }
                Ok(Outcome::Cancelled) => return self.stopped(),
                Err(e) => return self.failed(e),
            }

            tokio::select! {
                biased;
                _ = session.cancel.cancelled() => return self.stopped(),
                _ = &mut deadline => return self.auto_stopped(),
                _ = tokio::time::sleep(session.refresh_delay) => {}
            }
        }
    }

    fn stopped(&self) {
        if self.session.finish(StreamState::Stopped) {
            info!("[wx-log-data] Stream {} for {} stopped", self.session.id, self.log.reference);
        }
    }

    fn auto_stopped(&self) {
        let message = format!(
            "The log data stream was automatically stopped after {} to reduce the load on the server.",
            describe(self.auto_stop)
        );
        *self.session.notification.lock() = Some(message.clone());
        if self.session.finish(StreamState::AutoStopped) {
            info!("[wx-log-data] {} (session {})", message, self.session.id);
        }
    }

    fn failed(&self, error: LogDataError) {
        warn!(
            "[wx-log-data] Stream {} for {} failed: {}",
            self.session.id, self.log.reference, error
        );
        let state = StreamState::Failed(error.to_string());
        *self.session.error.lock() = Some(error);
        self.session.finish(state);
    }
}

fn describe(duration: Duration) -> String {
    let secs = duration.as_secs();
    match secs {
        1 => "1 second".to_string(),
        60 => "1 minute".to_string(),
        s if s > 0 && s % 60 == 0 => format!("{} minutes", s / 60),
        s => format!("{s} seconds"),
    }
}
