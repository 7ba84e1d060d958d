//! Dratt Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the reqwest transport, the system
//! clock, the console reporter and suite file loading.

pub mod adapters;
pub mod reporting;
pub mod serialization;
pub mod suite_file;

pub use adapters::{HttpClientConfig, ReqwestHttpClient, SystemClock};
pub use reporting::{InvalidLogLevel, LogLevel, TracingReporter};
pub use serialization::{SerializationError, to_json_stable, write_json_stable};
pub use suite_file::{
    FileSuiteSource, SuiteFileError, SuiteFormat, load_suite_file, map_suite, parse_suite,
};
