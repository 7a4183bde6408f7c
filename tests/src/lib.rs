//! # Wellx Log Data Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Log builders shared by flows and benchmarks
//! └── integration/      # Cross-module flows through LogDataService
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p wx-tests
//!
//! # By category
//! cargo test -p wx-tests integration::flows::
//! cargo test -p wx-tests integration::streaming::
//!
//! # Benchmarks
//! cargo bench -p wx-tests
//! ```

pub mod fixtures;
pub mod integration;
