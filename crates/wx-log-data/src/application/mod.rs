//! # Application Module
//!
//! Application services orchestrating the domain and outbound ports.

pub mod reader;
pub mod service;
pub mod streaming;

pub use reader::{full_window, BatchedLogDataReader};
pub use service::LogDataService;
pub use streaming::{RefreshState, SessionHandle, StreamState, StreamingRefreshController};
