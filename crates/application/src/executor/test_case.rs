//! Test execution: setup, main and teardown phases.

use dratt_domain::{Outcome, Progress, StepPhase, Test, TestReport, VariableStore, Variables};
use tracing::debug;

use super::TestRunner;
use crate::ports::{HttpClient, Reporter};

impl<C: HttpClient> TestRunner<C> {
    /// Runs one test with a fresh test scope over `suite_variables`.
    ///
    /// Without `continue_after_failed_steps`, the first failed step ends the
    /// test and later steps, teardown included, are skipped. With it, every
    /// step runs and the test fails if any step failed. An errored step
    /// always ends the test.
    pub async fn run_test<R: Reporter + ?Sized>(
        &self,
        test: &Test,
        suite_variables: &VariableStore,
        progress: Progress,
        reporter: &mut R,
    ) -> TestReport {
        reporter.test_started(test, progress);
        if test.continue_after_failed_steps {
            debug!(test = %test.name, "continuing after failed steps");
        }

        let mut variables = Variables::new(suite_variables);
        let mut report = TestReport {
            name: test.name.clone(),
            description: test.description.clone(),
            setup: Vec::new(),
            steps: Vec::new(),
            teardown: Vec::new(),
            outcome: Outcome::Succeeded,
        };
        let mut any_failed = false;

        for planned in test.execution_plan() {
            let step_report = self
                .run_step(
                    &planned,
                    &mut variables,
                    test.continue_after_failed_steps,
                    reporter,
                )
                .await;

            let step_outcome = step_report.outcome.clone();
            let will_continue = match &step_outcome {
                Outcome::Succeeded => true,
                Outcome::Failed => test.continue_after_failed_steps,
                Outcome::Errored { .. } => false,
            };
            reporter.step_finished(&step_report, planned.progress, will_continue);

            match planned.phase {
                StepPhase::Setup => report.setup.push(step_report),
                StepPhase::Main => report.steps.push(step_report),
                StepPhase::Teardown => report.teardown.push(step_report),
            }

            match step_outcome {
                Outcome::Errored { .. } => {
                    report.outcome = step_outcome;
                    return report;
                }
                Outcome::Failed => any_failed = true,
                Outcome::Succeeded => {}
            }
            if !will_continue {
                break;
            }
        }

        if any_failed {
            report.outcome = Outcome::Failed;
        }
        report
    }
}
