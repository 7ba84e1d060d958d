//! Reporter port
//!
//! The runner calls a reporter with structured events and reports as it
//! goes. Reporters decide all formatting; the runner decides none.

use dratt_domain::{
    Progress, RequestSpec, RunReport, Step, StepPhase, StepReport, Suite, SuiteReport, Test,
    TestReport, VariableValue,
};

/// Receives live progress from the runner.
///
/// Every hook has a no-op default, so implementations override only what
/// they render.
#[allow(unused_variables)]
pub trait Reporter {
    /// A suite is about to run.
    fn suite_started(&mut self, suite: &Suite) {}

    /// A test is about to run.
    fn test_started(&mut self, test: &Test, progress: Progress) {}

    /// A step is about to run.
    fn step_started(&mut self, step: &Step, phase: StepPhase, progress: Progress) {}

    /// A substituted request is about to be sent.
    fn request_sent(&mut self, request: &RequestSpec) {}

    /// An after-step hook set a test variable.
    fn variable_set(&mut self, name: &str, value: &VariableValue) {}

    /// A step finished; `will_continue` tells whether the test goes on.
    fn step_finished(&mut self, report: &StepReport, progress: Progress, will_continue: bool) {}

    /// A test finished; `will_continue` tells whether the suite goes on.
    fn test_finished(&mut self, report: &TestReport, progress: Progress, will_continue: bool) {}

    /// A suite finished.
    fn suite_finished(&mut self, report: &SuiteReport) {}

    /// The run finished.
    fn run_finished(&mut self, report: &RunReport) {}
}

/// Reporter that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {}
