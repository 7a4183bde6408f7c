//! # Algorithms Module
//!
//! Synchronous, I/O-free algorithms: curve ordering, range coalescing,
//! export projection and stream window arithmetic.

pub mod curve_order;
pub mod export;
pub mod range_coalesce;
pub mod stream_window;

pub use curve_order::{index_curve_first, HasMnemonic};
pub use export::{project, ContentType, ExportColumn, ExportDocument, ExportOptions};
pub use range_coalesce::{coalesce_index_ranges, validate_selection};
pub use stream_window::{initial_stream_window, next_stream_window, StreamOffsets};
