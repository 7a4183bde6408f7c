//! # Wellx Telemetry
//!
//! Structured logging setup shared by Wellx binaries.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use wx_telemetry::{init_logging, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     init_logging(&config).expect("Failed to init logging");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `WX_LOG_LEVEL` or `RUST_LOG` | `info` | Log level filter |
//! | `WX_JSON_LOGS` | `false` (`true` in containers) | JSON formatted logs |
//! | `WX_CONSOLE_OUTPUT` | `true` | Write logs to stderr |
//! | `WX_SERVICE_NAME` | `wellx` | Service name attached to JSON logs |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::{init_logging, LoggingHandle};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter directive could not be parsed.
    #[error("Invalid log filter: {0}")]
    Filter(String),

    /// A global subscriber is already installed.
    #[error("Failed to install subscriber: {0}")]
    SubscriberInit(String),
}

/// Log an operation on a log object with standard fields.
///
/// ```rust,ignore
/// wx_telemetry::log_object_event!(info, "wx-curves", "read complete", reference, rows = 42);
/// ```
#[macro_export]
macro_rules! log_object_event {
    ($level:ident, $component:expr, $msg:expr, $reference:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            component = $component,
            log = %$reference,
            $($($field)*,)?
            $msg
        )
    };
}
