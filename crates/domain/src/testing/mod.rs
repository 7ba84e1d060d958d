//! Test definitions, expectations and execution reports.
//!
//! Definitions ([`Suite`], [`Test`], [`DataSeeder`], [`Step`]) are read-only
//! templates built once and run any number of times. Reports are produced by
//! the runner and never mutated after construction.

mod definition;
mod expectation;
mod report;

pub use definition::{
    AfterStep, DataSeeder, PlannedStep, Progress, Step, StepPhase, Suite, Test,
};
pub use expectation::Expectation;
pub use report::{
    ExpectationContext, ExpectationReport, RunOutcome, RunReport, StepReport, SuiteReport,
    SuiteSummary, TestReport,
};
