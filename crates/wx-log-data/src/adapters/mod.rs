//! # Adapters Module
//!
//! Implementations of the outbound ports.

pub mod memory;

pub use memory::{DeleteRequest, InMemoryLogStore, LogFixture, StoreFixture, DEFAULT_MAX_ROWS_PER_CALL};
