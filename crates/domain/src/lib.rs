//! Dratt Domain - Core test-definition and report types
//!
//! This crate defines the domain model for the dratt HTTP integration-test
//! runner: templates with embedded matchers, mismatch trees, variables,
//! suite/test/step definitions and execution reports.
//! All types here are pure Rust with no I/O dependencies.

pub mod error;
pub mod matcher;
pub mod mismatch;
pub mod request;
pub mod response;
pub mod state;
pub mod template;
pub mod testing;
pub mod variables;

pub use error::{DomainError, DomainResult};
pub use matcher::{ArrayIncludesMatcher, JsonType, Matcher, TypeMatcher};
pub use mismatch::{Mismatch, MismatchKind, MismatchNode};
pub use request::{HttpMethod, RequestSpec};
pub use response::{ResponseSpec, StatusCode};
pub use state::{ErrorKind, Outcome, UnitState};
pub use template::{Template, VariablePlaceholder, VariableType};
pub use testing::{
    AfterStep, DataSeeder, Expectation, ExpectationContext, ExpectationReport, PlannedStep,
    Progress, RunOutcome, RunReport, Step, StepPhase, StepReport, Suite, SuiteReport,
    SuiteSummary, Test, TestReport,
};
pub use variables::{VariableSetError, VariableSetter, VariableStore, VariableValue, Variables};
