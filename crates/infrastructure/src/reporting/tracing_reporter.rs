//! Console progress through `tracing`.

use dratt_application::comparator::filter_mismatches;
use dratt_application::ports::Reporter;
use dratt_domain::{
    Expectation, ExpectationContext, ExpectationReport, Mismatch, Outcome, Progress, RequestSpec,
    RunReport, Step, StepPhase, StepReport, Suite, SuiteReport, Test, TestReport, VariableValue,
};
use serde::Serialize;
use tracing::info;

use super::LogLevel;

const SEPARATOR: &str = "------------------------------------------------------";
const DATA_LINE_LIMIT: usize = 4;

/// Renders runner events as tab-separated progress lines.
///
/// Every line is emitted as an `info` event, so the subscriber installed by
/// the binary decides where it ends up.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter {
    level: LogLevel,
}

impl TracingReporter {
    /// Creates a reporter printing at `level`.
    #[must_use]
    pub const fn new(level: LogLevel) -> Self {
        Self { level }
    }

    /// Returns the configured level.
    #[must_use]
    pub const fn level(&self) -> LogLevel {
        self.level
    }

    fn emit(lines: Vec<String>) {
        for line in lines {
            info!(target: "dratt", "{line}");
        }
    }

    fn enabled(&self, min: LogLevel) -> bool {
        self.level >= min
    }

    fn render_suite_started(suite: &Suite) -> Vec<String> {
        vec![line("Test suite", [suite.name.as_str()])]
    }

    fn render_test_started(test: &Test, progress: Progress) -> Vec<String> {
        let mut lines = vec![
            SEPARATOR.to_string(),
            line(&format!("Test {progress}"), [test.name.as_str()]),
        ];
        if test.continue_after_failed_steps {
            lines.push(line(
                "Warning",
                ["Running test with continueAfterFailedSteps=true"],
            ));
        }
        lines
    }

    fn render_step_started(step: &Step, phase: StepPhase, progress: Progress) -> Vec<String> {
        vec![line(
            &format!("{} {progress}", phase.title()),
            [step.description.as_str()],
        )]
    }

    fn render_request(&self, request: &RequestSpec) -> Vec<String> {
        let mut lines = Vec::new();
        if self.enabled(LogLevel::Normal) {
            lines.push(line(request.method.as_str(), [request.url.as_str()]));
        }
        if self.enabled(LogLevel::Info)
            && let Some(body) = request.body.as_ref().filter(|_| request.sends_body())
        {
            lines.extend(data("Request body", &pretty(body), self.level.limits_data()));
        }
        lines
    }

    fn render_variable(&self, name: &str, value: &VariableValue) -> Vec<String> {
        if self.enabled(LogLevel::Info) {
            vec![line("Setting variable", [format!("{name}={value}").as_str()])]
        } else {
            Vec::new()
        }
    }

    fn render_step_finished(
        &self,
        report: &StepReport,
        progress: Progress,
        will_continue: bool,
    ) -> Vec<String> {
        let mut lines = Vec::new();
        let title = format!("^ {} {progress}", report.phase.title());

        if self.enabled(LogLevel::Max)
            && let Some(response) = &report.response
        {
            lines.extend(data("Response", &pretty(response), false));
        }

        for expectation in report.expectations.iter().filter(|e| !e.met) {
            lines.extend(self.render_failed_expectation(expectation));
        }

        match &report.outcome {
            Outcome::Succeeded => {}
            Outcome::Failed => lines.push(line(
                &title,
                [
                    report.description.as_str(),
                    report.outcome.label(),
                    continuation(will_continue),
                ],
            )),
            Outcome::Errored { kind, detail } => {
                lines.push(line("Error", [kind.title(), detail.as_str()]));
                lines.extend(kind.suggestions().iter().map(|hint| line("Hint", [*hint])));
                lines.push(line(&title, ["Exiting...", "Unexpected error encountered"]));
            }
        }
        lines
    }

    fn render_failed_expectation(&self, report: &ExpectationReport) -> Vec<String> {
        let description = report.expectation.description();
        let mut lines = vec![line("^ Expectation", [description.as_str(), "FAIL"])];

        match (&report.expectation, &report.context) {
            (_, ExpectationContext::Status { actual_status }) => {
                lines.push(line("Actual status", [actual_status.to_string().as_str()]));
            }
            (expectation, ExpectationContext::Body { body, mismatch }) => {
                let relevant = if matches!(expectation, Expectation::BodyIncludes { .. }) {
                    filter_mismatches(mismatch, &|m: &Mismatch| !m.is_extra())
                } else {
                    mismatch.clone()
                };
                let diff = relevant
                    .paths()
                    .into_iter()
                    .map(|(path, m)| {
                        let path = if path.is_empty() { "<root>".to_string() } else { path };
                        format!("{path}\t{m}")
                    })
                    .collect::<Vec<_>>()
                    .join("\n");
                lines.extend(data("Mismatch", &diff, self.level.limits_data()));
                if self.enabled(LogLevel::Normal) {
                    let body = body.as_ref().map(pretty).unwrap_or_default();
                    lines.extend(data("Response body", &body, self.level.limits_data()));
                }
            }
        }
        lines
    }

    fn render_test_finished(
        report: &TestReport,
        progress: Progress,
        will_continue: bool,
    ) -> Vec<String> {
        let title = format!("^ Test {progress}");
        let rendered = match report.outcome {
            Outcome::Failed => line(
                &title,
                [
                    report.name.as_str(),
                    report.outcome.label(),
                    continuation(will_continue),
                ],
            ),
            Outcome::Succeeded | Outcome::Errored { .. } => {
                line(&title, [report.name.as_str(), report.outcome.label()])
            }
        };
        vec![rendered]
    }

    fn render_suite_finished(report: &SuiteReport) -> Vec<String> {
        vec![line(
            "^ Test suite",
            [report.name.as_str(), report.outcome.label()],
        )]
    }

    fn render_run_finished(report: &RunReport) -> Vec<String> {
        let (passed, total) = report
            .suite_reports
            .iter()
            .map(SuiteReport::summary)
            .fold((0, 0), |(passed, total), summary| {
                (passed + summary.passed, total + summary.total)
            });
        vec![
            SEPARATOR.to_string(),
            line(
                "Run",
                [
                    report.outcome.as_str(),
                    format!("{passed}/{total} tests passed").as_str(),
                    format!("{} ms", report.duration_ms()).as_str(),
                ],
            ),
        ]
    }
}

impl Reporter for TracingReporter {
    fn suite_started(&mut self, suite: &Suite) {
        Self::emit(Self::render_suite_started(suite));
    }

    fn test_started(&mut self, test: &Test, progress: Progress) {
        Self::emit(Self::render_test_started(test, progress));
    }

    fn step_started(&mut self, step: &Step, phase: StepPhase, progress: Progress) {
        Self::emit(Self::render_step_started(step, phase, progress));
    }

    fn request_sent(&mut self, request: &RequestSpec) {
        Self::emit(self.render_request(request));
    }

    fn variable_set(&mut self, name: &str, value: &VariableValue) {
        Self::emit(self.render_variable(name, value));
    }

    fn step_finished(&mut self, report: &StepReport, progress: Progress, will_continue: bool) {
        Self::emit(self.render_step_finished(report, progress, will_continue));
    }

    fn test_finished(&mut self, report: &TestReport, progress: Progress, will_continue: bool) {
        Self::emit(Self::render_test_finished(report, progress, will_continue));
    }

    fn suite_finished(&mut self, report: &SuiteReport) {
        Self::emit(Self::render_suite_finished(report));
    }

    fn run_finished(&mut self, report: &RunReport) {
        Self::emit(Self::render_run_finished(report));
    }
}

fn line<'a>(title: &'a str, parts: impl IntoIterator<Item = &'a str>) -> String {
    std::iter::once(title)
        .chain(parts)
        .collect::<Vec<_>>()
        .join("\t")
}

const fn continuation(will_continue: bool) -> &'static str {
    if will_continue {
        "Continuing..."
    } else {
        "Aborting..."
    }
}

fn pretty<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|e| format!("<unprintable: {e}>"))
}

/// Formats a titled data block, keeping the first lines only when `limit`.
fn data(title: &str, text: &str, limit: bool) -> Vec<String> {
    let mut lines = vec![format!("[{title}]")];
    let total = text.lines().count();
    if limit && total > DATA_LINE_LIMIT {
        lines.push(
            text.lines()
                .take(DATA_LINE_LIMIT)
                .collect::<Vec<_>>()
                .join("\n"),
        );
        lines.push(line(
            &format!("^ {title}"),
            [
                "Output is limited to 4 lines",
                "Run tests with --log-level info to see it all",
            ],
        ));
    } else if text.is_empty() {
        lines.push("<empty>".to_string());
    } else {
        lines.push(text.to_string());
    }
    lines
}
