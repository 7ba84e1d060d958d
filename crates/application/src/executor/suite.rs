//! Suite execution.

use dratt_domain::{Outcome, Progress, Suite, SuiteReport};

use super::TestRunner;
use crate::ports::{HttpClient, Reporter};

impl<C: HttpClient> TestRunner<C> {
    /// Runs every test of a suite in order.
    ///
    /// Without `ignore_failed_tests`, the first failed test ends the suite.
    /// With it, every test runs and the suite fails if any test failed. An
    /// errored test always ends the suite.
    pub async fn run_test_suite<R: Reporter + ?Sized>(
        &self,
        suite: &Suite,
        reporter: &mut R,
    ) -> SuiteReport {
        reporter.suite_started(suite);

        let total = suite.tests.len();
        let mut test_reports = Vec::with_capacity(total);
        let mut outcome = Outcome::Succeeded;

        for (index, test) in suite.tests.iter().enumerate() {
            let progress = Progress::new(index + 1, total);
            let report = self
                .run_test(test, &suite.variables, progress, reporter)
                .await;

            let will_continue = match &report.outcome {
                Outcome::Succeeded => true,
                Outcome::Failed => suite.ignore_failed_tests,
                Outcome::Errored { .. } => false,
            };
            reporter.test_finished(&report, progress, will_continue);

            match &report.outcome {
                Outcome::Errored { .. } => outcome = report.outcome.clone(),
                Outcome::Failed => outcome = Outcome::Failed,
                Outcome::Succeeded => {}
            }
            test_reports.push(report);

            if !will_continue {
                break;
            }
        }

        let report = SuiteReport {
            name: suite.name.clone(),
            test_reports,
            outcome,
        };
        reporter.suite_finished(&report);
        report
    }
}
