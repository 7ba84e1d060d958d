//! Test runner
//!
//! Executes suites sequentially: suites in order, tests in order, and for each
//! test its setup, main and teardown steps in order. Nothing runs in parallel.
//!
//! The runner produces a report tree and streams progress to a [`Reporter`];
//! it never prints anything itself.

mod step;
mod suite;
mod test_case;

use std::sync::Arc;

use dratt_domain::{RunReport, Suite};
use tracing::info;

use crate::execute_request::ExecuteRequest;
use crate::ports::{Clock, HttpClient, Reporter};

/// Runs suites against an HTTP client.
pub struct TestRunner<C: HttpClient> {
    requests: ExecuteRequest<C>,
    clock: Arc<dyn Clock>,
}

impl<C: HttpClient> TestRunner<C> {
    /// Creates a runner over the given client and clock.
    pub fn new(client: Arc<C>, clock: Arc<dyn Clock>) -> Self {
        Self {
            requests: ExecuteRequest::new(client),
            clock,
        }
    }

    /// Runs every suite in order and returns the run report.
    ///
    /// A failed suite does not stop the run; an errored suite does, and the
    /// remaining suites are not reported.
    pub async fn run_test_suites<R: Reporter + ?Sized>(
        &self,
        suites: &[Suite],
        reporter: &mut R,
    ) -> RunReport {
        let started_at = self.clock.now();
        let mut suite_reports = Vec::with_capacity(suites.len());

        for suite in suites {
            let report = self.run_test_suite(suite, reporter).await;
            let errored = report.outcome.is_errored();
            suite_reports.push(report);
            if errored {
                break;
            }
        }

        let report = RunReport::new(started_at, self.clock.now(), suite_reports);
        info!(
            run_id = %report.run_id,
            outcome = %report.outcome,
            suites = report.suite_reports.len(),
            "run finished"
        );
        reporter.run_finished(&report);
        report
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Mutex;

    use chrono::{TimeZone, Utc};
    use dratt_domain::{
        DataSeeder, ErrorKind, Expectation, JsonType, Matcher, Outcome, Progress, RequestSpec,
        ResponseSpec, RunOutcome, Step, StepReport, Template, Test, TestReport, VariableSetError,
        VariableType, VariableValue,
    };
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::ports::{FixedClock, HttpClientError, HttpFuture, NullReporter};

    /// Returns scripted responses in order and records every request.
    #[derive(Default)]
    struct ScriptedHttpClient {
        responses: Mutex<VecDeque<Result<ResponseSpec, HttpClientError>>>,
        calls: Mutex<Vec<RequestSpec>>,
    }

    impl ScriptedHttpClient {
        fn with_responses(
            responses: impl IntoIterator<Item = Result<ResponseSpec, HttpClientError>>,
        ) -> Arc<Self> {
            Arc::new(Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn urls(&self) -> Vec<String> {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .map(|request| request.url.clone())
                .collect()
        }
    }

    impl HttpClient for ScriptedHttpClient {
        fn execute<'a>(&'a self, request: &'a RequestSpec) -> HttpFuture<'a> {
            self.calls.lock().unwrap().push(request.clone());
            let response = self
                .responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(ResponseSpec::new(200, None)));
            Box::pin(async move { response })
        }
    }

    /// Records reporter events as strings.
    #[derive(Default)]
    struct RecordingReporter {
        events: Vec<String>,
    }

    impl Reporter for RecordingReporter {
        fn test_started(&mut self, test: &Test, progress: Progress) {
            self.events.push(format!("test {progress} {}", test.name));
        }

        fn variable_set(&mut self, name: &str, value: &VariableValue) {
            self.events.push(format!("set {name}={value}"));
        }

        fn step_finished(&mut self, report: &StepReport, progress: Progress, will_continue: bool) {
            self.events.push(format!(
                "{} {progress} {} {will_continue}",
                report.phase.title(),
                report.outcome.label()
            ));
        }

        fn test_finished(&mut self, report: &TestReport, _progress: Progress, will_continue: bool) {
            self.events
                .push(format!("done {} {will_continue}", report.outcome.label()));
        }

        fn run_finished(&mut self, report: &RunReport) {
            self.events.push(format!("run {}", report.outcome));
        }
    }

    fn runner(client: &Arc<ScriptedHttpClient>) -> TestRunner<ScriptedHttpClient> {
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        TestRunner::new(Arc::clone(client), Arc::new(clock))
    }

    fn ok() -> Result<ResponseSpec, HttpClientError> {
        Ok(ResponseSpec::new(200, None))
    }

    fn expect_ok(description: &str, url: &str) -> Step {
        Step::get(description, url).expect(Expectation::status(200))
    }

    fn failing_test(name: &str) -> Test {
        Test::new(name).with_step(Step::get("fails", "http://localhost/fail").expect(Expectation::status(201)))
    }

    #[tokio::test]
    async fn test_failed_step_stops_test() {
        let client = ScriptedHttpClient::with_responses([]);
        let test = Test::new("stops")
            .with_step(expect_ok("first", "http://localhost/1"))
            .with_step(Step::get("second", "http://localhost/2").expect(Expectation::status(201)))
            .with_step(expect_ok("third", "http://localhost/3"));
        let suite = Suite::new("suite").with_test(test);

        let report = runner(&client)
            .run_test_suites(&[suite], &mut NullReporter)
            .await;

        assert_eq!(client.urls(), vec!["http://localhost/1", "http://localhost/2"]);
        assert_eq!(report.outcome(), RunOutcome::Failed);
        let test_report = &report.suite_reports[0].test_reports[0];
        assert_eq!(test_report.outcome, Outcome::Failed);
        assert_eq!(test_report.steps.len(), 2);
    }

    #[tokio::test]
    async fn test_continue_after_failed_steps_runs_everything() {
        let client = ScriptedHttpClient::with_responses([]);
        let test = Test::new("continues")
            .with_step(expect_ok("first", "http://localhost/1"))
            .with_step(Step::get("second", "http://localhost/2").expect(Expectation::status(201)))
            .with_step(expect_ok("third", "http://localhost/3"))
            .continue_after_failed_steps(true);
        let suite = Suite::new("suite").with_test(test);
        let mut reporter = RecordingReporter::default();

        let report = runner(&client).run_test_suites(&[suite], &mut reporter).await;

        assert_eq!(client.urls().len(), 3);
        let outcomes: Vec<_> = report.suite_reports[0].test_reports[0]
            .steps
            .iter()
            .map(|step| step.outcome.clone())
            .collect();
        assert_eq!(
            outcomes,
            vec![Outcome::Succeeded, Outcome::Failed, Outcome::Succeeded]
        );
        assert_eq!(report.suite_reports[0].test_reports[0].outcome, Outcome::Failed);
        assert_eq!(
            reporter.events,
            vec![
                "test 1/1 continues",
                "Step 1/3 OK true",
                "Step 2/3 FAIL true",
                "Step 3/3 OK true",
                "done FAIL false",
                "run failed",
            ]
        );
    }

    #[tokio::test]
    async fn test_failed_test_stops_suite_unless_ignored() {
        let build = |ignore: bool| {
            Suite::new("suite")
                .with_test(Test::new("a").with_step(expect_ok("a", "http://localhost/a")))
                .with_test(failing_test("b"))
                .with_test(Test::new("c").with_step(expect_ok("c", "http://localhost/c")))
                .ignore_failed_tests(ignore)
        };

        let client = ScriptedHttpClient::with_responses([]);
        let report = runner(&client)
            .run_test_suite(&build(false), &mut NullReporter)
            .await;
        assert_eq!(report.test_reports.len(), 2);
        assert_eq!(report.outcome, Outcome::Failed);

        let client = ScriptedHttpClient::with_responses([]);
        let report = runner(&client)
            .run_test_suite(&build(true), &mut NullReporter)
            .await;
        assert_eq!(report.test_reports.len(), 3);
        assert_eq!(report.outcome, Outcome::Failed);
        assert_eq!(report.summary().passed, 2);
    }

    #[tokio::test]
    async fn test_failed_suite_does_not_stop_run() {
        let client = ScriptedHttpClient::with_responses([]);
        let first = Suite::new("first").with_test(failing_test("fails"));
        let second = Suite::new("second")
            .with_test(Test::new("passes").with_step(expect_ok("ok", "http://localhost/ok")));

        let report = runner(&client)
            .run_test_suites(&[first, second], &mut NullReporter)
            .await;

        assert_eq!(
            client.urls(),
            vec!["http://localhost/fail", "http://localhost/ok"]
        );
        let outcomes: Vec<_> = report
            .suite_reports
            .iter()
            .map(|suite| suite.outcome.clone())
            .collect();
        assert_eq!(outcomes, vec![Outcome::Failed, Outcome::Succeeded]);
        assert_eq!(report.outcome(), RunOutcome::Failed);
    }

    #[tokio::test]
    async fn test_errored_test_stops_suite_even_when_ignoring_failures() {
        let client = ScriptedHttpClient::with_responses([Err(HttpClientError::ConnectionRefused {
            host: "localhost".to_string(),
            port: 3000,
        })]);
        let suite = Suite::new("suite")
            .with_test(Test::new("errors").with_step(expect_ok("down", "http://localhost:3000/a")))
            .with_test(Test::new("skipped").with_step(expect_ok("never", "http://localhost:3000/b")))
            .ignore_failed_tests(true);

        let report = runner(&client).run_test_suite(&suite, &mut NullReporter).await;

        assert_eq!(client.urls(), vec!["http://localhost:3000/a"]);
        assert_eq!(report.test_reports.len(), 1);
        assert!(matches!(
            report.outcome,
            Outcome::Errored {
                kind: ErrorKind::ApiCall,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_failed_setup_skips_main_and_teardown() {
        let client = ScriptedHttpClient::with_responses([]);
        let test = Test::new("seeded")
            .with_seeder(
                DataSeeder::new("users")
                    .with_setup(
                        Step::get("create user", "http://localhost/setup")
                            .expect(Expectation::status(201)),
                    )
                    .with_teardown(expect_ok("delete user", "http://localhost/teardown")),
            )
            .with_step(expect_ok("main", "http://localhost/main"));
        let suite = Suite::new("suite").with_test(test);

        let report = runner(&client).run_test_suite(&suite, &mut NullReporter).await;

        assert_eq!(client.urls(), vec!["http://localhost/setup"]);
        let test_report = &report.test_reports[0];
        assert_eq!(test_report.setup.len(), 1);
        assert!(test_report.steps.is_empty());
        assert!(test_report.teardown.is_empty());
        assert_eq!(test_report.outcome, Outcome::Failed);
    }

    #[tokio::test]
    async fn test_seeders_wrap_main_steps_and_teardown_reverses() {
        let client = ScriptedHttpClient::with_responses([]);
        let test = Test::new("seeded")
            .with_seeder(
                DataSeeder::new("users")
                    .with_setup(expect_ok("create user", "http://localhost/setup/users"))
                    .with_teardown(expect_ok("delete user", "http://localhost/teardown/users")),
            )
            .with_seeder(
                DataSeeder::new("todos")
                    .with_setup(expect_ok("create todo", "http://localhost/setup/todos"))
                    .with_teardown(expect_ok("delete todo", "http://localhost/teardown/todos")),
            )
            .with_step(expect_ok("main", "http://localhost/main"));
        let suite = Suite::new("suite").with_test(test);

        let report = runner(&client)
            .run_test_suites(&[suite], &mut NullReporter)
            .await;

        assert_eq!(
            client.urls(),
            vec![
                "http://localhost/setup/users",
                "http://localhost/setup/todos",
                "http://localhost/main",
                "http://localhost/teardown/todos",
                "http://localhost/teardown/users",
            ]
        );
        let test_report = &report.suite_reports[0].test_reports[0];
        assert_eq!(test_report.setup.len(), 2);
        assert_eq!(test_report.steps.len(), 1);
        assert_eq!(test_report.teardown[0].seeder.as_deref(), Some("todos"));
        assert_eq!(report.outcome(), RunOutcome::Success);
    }

    #[tokio::test]
    async fn test_captured_variable_feeds_later_steps() {
        let client = ScriptedHttpClient::with_responses([
            Ok(ResponseSpec::json(201, json!({"id": 7, "title": "write docs"}))),
            Ok(ResponseSpec::json(200, json!({"id": 7, "title": "write docs"}))),
        ]);
        let create = Step::post(
            "create",
            "${baseUrl}/todos",
            Template::object().with_field("title", "write docs"),
        )
        .expect(Expectation::status(201))
        .after_step(|vars, response| vars.set_from_json("todoId", response.pointer("/id")));
        let fetch = Step::get("fetch", "${baseUrl}/todos/${todoId}")
            .expect(Expectation::status(200))
            .expect(Expectation::body_equals(
                Template::object()
                    .with_field("id", Template::variable("todoId", VariableType::Number))
                    .with_field("title", Matcher::of_type(JsonType::String)),
            ));
        let suite = Suite::new("todos")
            .with_variable("baseUrl", "http://localhost:3000")
            .with_test(Test::new("crud").with_step(create).with_step(fetch));
        let mut reporter = RecordingReporter::default();

        let report = runner(&client).run_test_suites(&[suite], &mut reporter).await;

        assert_eq!(report.outcome(), RunOutcome::Success);
        assert_eq!(
            client.urls(),
            vec!["http://localhost:3000/todos", "http://localhost:3000/todos/7"]
        );
        assert!(reporter.events.contains(&"set todoId=7".to_string()));
        let create_report = &report.suite_reports[0].test_reports[0].steps[0];
        assert_eq!(
            create_report.variables_set.get("todoId"),
            Some(&VariableValue::from(7))
        );
    }

    #[tokio::test]
    async fn test_test_scope_is_fresh_for_every_test() {
        let client = ScriptedHttpClient::with_responses([Ok(ResponseSpec::json(200, json!({"id": 1})))]);
        let first = Test::new("captures").with_step(
            expect_ok("capture", "http://localhost/a")
                .after_step(|vars, response| vars.set_from_json("id", response.pointer("/id"))),
        );
        let second = Test::new("reuses").with_step(expect_ok("reuse", "http://localhost/${id}"));
        let suite = Suite::new("suite").with_test(first).with_test(second);

        let report = runner(&client).run_test_suite(&suite, &mut NullReporter).await;

        assert_eq!(client.urls(), vec!["http://localhost/a"]);
        let errored = &report.test_reports[1].outcome;
        assert!(matches!(
            errored,
            Outcome::Errored {
                kind: ErrorKind::Substitution,
                ..
            }
        ));
        assert!(report.test_reports[1].steps[0].request.is_none());
    }

    #[tokio::test]
    async fn test_undefined_capture_errors_and_stops_run() {
        let client = ScriptedHttpClient::with_responses([Ok(ResponseSpec::json(200, json!({})))]);
        let capture = expect_ok("capture", "http://localhost/a")
            .after_step(|vars, response| vars.set_from_json("id", response.pointer("/id")));
        let first = Suite::new("first").with_test(
            Test::new("capture")
                .with_step(capture)
                .with_step(expect_ok("never", "http://localhost/b"))
                .continue_after_failed_steps(true),
        );
        let second = Suite::new("second").with_test(failing_test("unreached"));

        let report = runner(&client)
            .run_test_suites(&[first, second], &mut NullReporter)
            .await;

        assert_eq!(report.outcome(), RunOutcome::Error);
        assert_eq!(report.suite_reports.len(), 1);
        assert_eq!(client.urls(), vec!["http://localhost/a"]);
        assert_eq!(
            report.suite_reports[0].outcome,
            Outcome::errored(
                ErrorKind::AfterStep,
                "after step failed: cannot set variable 'id' to an undefined value"
            )
        );
        let step = &report.suite_reports[0].test_reports[0].steps[0];
        assert!(step.all_met());
        assert!(step.response.is_some());
    }

    #[tokio::test]
    async fn test_hook_error_is_reported() {
        let client = ScriptedHttpClient::with_responses([]);
        let step = expect_ok("hook", "http://localhost/a")
            .after_step(|_, _| Err(VariableSetError::Hook("token missing".to_string())));
        let suite = Suite::new("suite").with_test(Test::new("t").with_step(step));

        let report = runner(&client).run_test_suite(&suite, &mut NullReporter).await;

        assert_eq!(
            report.outcome,
            Outcome::errored(ErrorKind::AfterStep, "after step failed: token missing")
        );
    }

    #[tokio::test]
    async fn test_hook_skipped_when_expectations_fail() {
        let client = ScriptedHttpClient::with_responses([Ok(ResponseSpec::json(500, json!({"id": 1})))]);
        let step = expect_ok("capture", "http://localhost/a")
            .after_step(|vars, response| vars.set_from_json("id", response.pointer("/id")));
        let suite = Suite::new("suite").with_test(Test::new("t").with_step(step));

        let report = runner(&client).run_test_suite(&suite, &mut NullReporter).await;

        let step = &report.test_reports[0].steps[0];
        assert_eq!(step.outcome, Outcome::Failed);
        assert!(step.variables_set.is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_aborts_even_when_continuing() {
        let client = ScriptedHttpClient::with_responses([
            ok(),
            Err(HttpClientError::ConnectionRefused {
                host: "localhost".to_string(),
                port: 3000,
            }),
        ]);
        let test = Test::new("t")
            .with_step(expect_ok("first", "http://localhost:3000/1"))
            .with_step(expect_ok("second", "http://localhost:3000/2"))
            .with_step(expect_ok("third", "http://localhost:3000/3"))
            .continue_after_failed_steps(true);
        let suite = Suite::new("suite").with_test(test).ignore_failed_tests(true);
        let mut reporter = RecordingReporter::default();

        let report = runner(&client).run_test_suites(&[suite], &mut reporter).await;

        assert_eq!(client.urls().len(), 2);
        assert_eq!(report.outcome(), RunOutcome::Error);
        let step = &report.suite_reports[0].test_reports[0].steps[1];
        assert!(step.request.is_some());
        assert!(step.response.is_none());
        assert!(matches!(
            step.outcome,
            Outcome::Errored {
                kind: ErrorKind::ApiCall,
                ..
            }
        ));
        assert!(reporter.events.contains(&"Step 2/3 ERROR false".to_string()));
    }

    #[tokio::test]
    async fn test_invalid_url_is_an_error_not_a_failure() {
        let client = ScriptedHttpClient::with_responses([]);
        let suite = Suite::new("suite")
            .with_test(Test::new("t").with_step(expect_ok("relative", "localhost/todos")));

        let report = runner(&client).run_test_suite(&suite, &mut NullReporter).await;

        assert!(client.urls().is_empty());
        assert!(matches!(
            report.outcome,
            Outcome::Errored {
                kind: ErrorKind::InvalidUrl,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_run_report_uses_clock() {
        let client = ScriptedHttpClient::with_responses([]);
        let report = runner(&client).run_test_suites(&[], &mut NullReporter).await;

        assert_eq!(report.outcome(), RunOutcome::Success);
        assert_eq!(
            report.started_at,
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()
        );
        assert_eq!(report.duration_ms(), 0);
    }
}
