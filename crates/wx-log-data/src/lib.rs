//! # Wellx Log Data
//!
//! Browsing and editing of depth- and time-indexed well-log curve data held
//! in a remote query/response store.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! The store answers bounded range queries, caps every response and keeps no
//! cursors. This crate turns that into:
//! - Complete reads of arbitrary index windows, batch after batch
//! - Curve lists with the index curve always first
//! - Live tables that follow a growing log until stopped or timed out
//! - The fewest contiguous index ranges covering a row selection
//! - Delimited-text export, always sorted ascending
//!
//! ## Ordering Rules
//!
//! | Index type | Comparator | Offsets |
//! |------------|------------|---------|
//! | Depth | numeric | raw index units |
//! | Date-time | chronological | calendar seconds |
//!
//! Index strings are never compared lexically. Decreasing logs negate every
//! offset and reverse every ordering.
//!
//! ## Module Structure
//!
//! ```text
//! wx-log-data/
//! ├── domain/          # Index values, rows, tables, invariants, errors
//! ├── algorithms/      # Curve ordering, range coalescing, export, stream windows
//! ├── ports/           # API trait (inbound) + store trait (outbound)
//! ├── adapters/        # In-memory store
//! ├── application/     # Batched reader, streaming controller, LogDataService
//! └── config.rs        # LogDataConfig
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports
pub use adapters::{InMemoryLogStore, LogFixture, StoreFixture};
pub use algorithms::{
    coalesce_index_ranges, index_curve_first, initial_stream_window, next_stream_window, project,
    validate_selection, ContentType, ExportColumn, ExportDocument, ExportOptions, HasMnemonic,
    StreamOffsets,
};
pub use application::{
    full_window, BatchedLogDataReader, LogDataService, RefreshState, SessionHandle, StreamState,
    StreamingRefreshController,
};
pub use config::{LogDataConfig, ReaderConfig, StreamingConfig};
pub use domain::{
    invariant_batch_ordered, invariant_index_curve_first, CurveInfo, CurveSpecification,
    CurveValue, Direction, IndexRange, IndexType, IndexValue, IndexWindow, LogDataBatch,
    LogDataError, LogDataTable, LogHeader, LogReference, Outcome, ReadOutcome, Row,
    AUTO_REFRESH_TIMEOUT_SECS, DEFAULT_REFRESH_DELAY_SECS, DEPTH_INDEX_HORIZON_OFFSET,
    DEPTH_INDEX_START_OFFSET, TIME_INDEX_HORIZON_OFFSET_SECS, TIME_INDEX_START_OFFSET_SECS,
};
pub use ports::{ExportScope, LogDataApi, LogDataQuery, LogStore};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
