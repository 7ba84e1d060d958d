//! Console reporting
//!
//! Renders live runner progress as `tracing` events at a configurable
//! verbosity.

mod log_level;
mod tracing_reporter;

pub use log_level::{InvalidLogLevel, LogLevel};
pub use tracing_reporter::TracingReporter;
