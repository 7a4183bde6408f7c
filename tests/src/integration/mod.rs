//! # Integration Tests
//!
//! Flows across the reader, coalescer, export projector and streaming
//! controller, driven through `LogDataService` over the in-memory store.

pub mod flows;
pub mod streaming;
