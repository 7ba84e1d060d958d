//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod http_client;
mod reporter;
mod suite_source;

pub use clock::{Clock, FixedClock};
pub use http_client::{HttpClient, HttpClientError, HttpFuture};
pub use reporter::{NullReporter, Reporter};
pub use suite_source::{SuiteSource, SuiteSourceError};
