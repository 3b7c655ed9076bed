//! dirmirror Audit - the user-facing action log
//!
//! Provides:
//! - `LogDestination`: resolves the requested log path once at startup
//! - `ActionLog`: `IActionSink` that appends every applied action to the log
//!   file and echoes it to the console

pub mod destination;
pub mod logger;

pub use destination::{LogDestination, LogDestinationError, DEFAULT_LOG_FILE_NAME};
pub use logger::ActionLog;
