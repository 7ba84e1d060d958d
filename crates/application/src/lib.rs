//! Dratt Application - Test execution engine and ports
//!
//! This crate defines the application layer with:
//! - Variable substitution over URLs, request bodies and expectations
//! - The structural comparator and matcher evaluation
//! - The sequential test runner
//! - Port traits (interfaces for HTTP, reporting, suite loading and time)

pub mod comparator;
pub mod error;
pub mod execute_request;
pub mod executor;
pub mod expectations;
pub mod matchers;
pub mod ports;
pub mod variable_resolver;

pub use comparator::{evaluate_mismatch, filter_mismatches, matches};
pub use error::{OperationalError, OperationalResult};
pub use execute_request::{ExecuteRequest, ExecuteRequestError, ExecuteResult};
pub use executor::TestRunner;
pub use expectations::{all_met, check_expectation, check_expectations};
pub use matchers::EvaluateMatcher;
pub use ports::{
    Clock, FixedClock, HttpClient, HttpClientError, HttpFuture, NullReporter, Reporter,
    SuiteSource, SuiteSourceError,
};
pub use variable_resolver::{
    SubstitutionError, VariableError, substitute_variables_in_expectations,
    substitute_variables_in_request, substitute_variables_in_string,
    substitute_variables_on_template,
};
