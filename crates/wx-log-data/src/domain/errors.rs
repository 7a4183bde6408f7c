//! # Domain Errors
//!
//! Error types for log data retrieval, streaming and range editing.
//!
//! Cancellation and empty results are not errors: a cancelled read ends in
//! [`Outcome::Cancelled`](crate::domain::Outcome) and an empty
//! range yields an empty table.

use thiserror::Error;

/// Log data error types.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum LogDataError {
    /// Transport-level failure talking to the store. Not retried locally.
    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The requested object does not exist in the store.
    #[error("Object not found: {0}")]
    ObjectNotFound(String),

    /// The store answered with something that cannot be interpreted.
    #[error("Malformed store response: {0}")]
    MalformedResponse(String),

    /// A batch was not ordered in the log's declared direction, or did not
    /// advance past the previous batch.
    #[error("Store contract violation in batch {batch}: index {current} does not follow {previous}")]
    StoreContractViolation {
        /// Zero-based batch number within the read
        batch: usize,
        /// Last accepted index value
        previous: String,
        /// Offending index value
        current: String,
    },

    /// Row selection refers to rows that are not part of the table.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// An index value could not be parsed or is missing.
    #[error("Invalid index value: {0}")]
    InvalidIndex(String),

    /// Configuration rejected by validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl LogDataError {
    /// Whether this error originated in the store (as opposed to the caller).
    pub fn is_store_error(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable(_)
                | Self::ObjectNotFound(_)
                | Self::MalformedResponse(_)
                | Self::StoreContractViolation { .. }
        )
    }
}
