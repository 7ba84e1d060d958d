//! Suite, test, seeder and step definitions.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::request::RequestSpec;
use crate::response::ResponseSpec;
use crate::template::Template;
use crate::variables::{VariableSetError, VariableSetter, VariableStore, VariableValue};

use super::Expectation;

type AfterStepFn =
    dyn Fn(&mut VariableSetter<'_>, &ResponseSpec) -> Result<(), VariableSetError> + Send + Sync;

/// Hook run after a step's expectations are checked.
///
/// It receives a setter over the test scope and the response, and typically
/// captures values (ids, tokens) for later steps.
#[derive(Clone)]
pub struct AfterStep(Arc<AfterStepFn>);

impl AfterStep {
    /// Wraps a hook function.
    pub fn new<F>(hook: F) -> Self
    where
        F: Fn(&mut VariableSetter<'_>, &ResponseSpec) -> Result<(), VariableSetError>
            + Send
            + Sync
            + 'static,
    {
        Self(Arc::new(hook))
    }

    /// Runs the hook.
    ///
    /// # Errors
    ///
    /// Returns the hook's error, e.g. when it sets an undefined value.
    pub fn call(
        &self,
        setter: &mut VariableSetter<'_>,
        response: &ResponseSpec,
    ) -> Result<(), VariableSetError> {
        (self.0)(setter, response)
    }
}

impl fmt::Debug for AfterStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AfterStep(..)")
    }
}

/// One HTTP request with expectations on its response.
#[derive(Debug, Clone)]
pub struct Step {
    /// Human-readable description.
    pub description: String,
    /// Request template.
    pub request: RequestSpec,
    /// Expectations, checked in order.
    pub expectations: Vec<Expectation>,
    /// Optional hook run after the expectations.
    pub after_step: Option<AfterStep>,
}

impl Step {
    /// Creates a step from a request.
    #[must_use]
    pub fn new(description: impl Into<String>, request: RequestSpec) -> Self {
        Self {
            description: description.into(),
            request,
            expectations: Vec::new(),
            after_step: None,
        }
    }

    /// Creates a GET step.
    #[must_use]
    pub fn get(description: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(description, RequestSpec::get(url))
    }

    /// Creates a POST step.
    #[must_use]
    pub fn post(
        description: impl Into<String>,
        url: impl Into<String>,
        body: impl Into<Template>,
    ) -> Self {
        Self::new(description, RequestSpec::post(url, body))
    }

    /// Creates a PUT step.
    #[must_use]
    pub fn put(
        description: impl Into<String>,
        url: impl Into<String>,
        body: impl Into<Template>,
    ) -> Self {
        Self::new(description, RequestSpec::put(url, body))
    }

    /// Creates a DELETE step.
    #[must_use]
    pub fn delete(description: impl Into<String>, url: impl Into<String>) -> Self {
        Self::new(description, RequestSpec::delete(url))
    }

    /// Adds an expectation (builder pattern).
    #[must_use]
    pub fn expect(mut self, expectation: Expectation) -> Self {
        self.expectations.push(expectation);
        self
    }

    /// Sets the after-step hook (builder pattern).
    #[must_use]
    pub fn after_step<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut VariableSetter<'_>, &ResponseSpec) -> Result<(), VariableSetError>
            + Send
            + Sync
            + 'static,
    {
        self.after_step = Some(AfterStep::new(hook));
        self
    }
}

/// Named group of setup and teardown steps.
#[derive(Debug, Clone, Default)]
pub struct DataSeeder {
    /// Seeder name.
    pub name: String,
    /// Steps run before the test's main steps.
    pub setup: Vec<Step>,
    /// Steps run after the test's main steps.
    pub teardown: Vec<Step>,
}

impl DataSeeder {
    /// Creates an empty seeder.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Adds a setup step (builder pattern).
    #[must_use]
    pub fn with_setup(mut self, step: Step) -> Self {
        self.setup.push(step);
        self
    }

    /// Adds a teardown step (builder pattern).
    #[must_use]
    pub fn with_teardown(mut self, step: Step) -> Self {
        self.teardown.push(step);
        self
    }
}

/// Phase a step belongs to within a test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPhase {
    /// Seeder setup steps.
    Setup,
    /// The test's own steps.
    Main,
    /// Seeder teardown steps.
    Teardown,
}

impl StepPhase {
    /// Returns the title used in progress output.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Setup => "Setup step",
            Self::Main => "Step",
            Self::Teardown => "Teardown step",
        }
    }
}

/// Position of a unit among its siblings, 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Progress {
    /// 1-based index.
    pub index: usize,
    /// Number of siblings.
    pub total: usize,
}

impl Progress {
    /// Creates a progress marker.
    #[must_use]
    pub const fn new(index: usize, total: usize) -> Self {
        Self { index, total }
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.index, self.total)
    }
}

/// A step scheduled for execution, with its phase and position.
#[derive(Debug, Clone, Copy)]
pub struct PlannedStep<'a> {
    /// Phase the step runs in.
    pub phase: StepPhase,
    /// Owning seeder name for setup and teardown steps.
    pub seeder: Option<&'a str>,
    /// The step definition.
    pub step: &'a Step,
    /// Position within the phase.
    pub progress: Progress,
}

/// A sequence of steps exercising one behaviour.
#[derive(Debug, Clone, Default)]
pub struct Test {
    /// Test name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
    /// Seeders whose setup runs first and whose teardown runs last, reversed.
    pub data_seeders: Vec<DataSeeder>,
    /// Main steps.
    pub steps: Vec<Step>,
    /// Keep running steps after an assertion failure.
    pub continue_after_failed_steps: bool,
}

impl Test {
    /// Creates an empty test.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the description (builder pattern).
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Adds a seeder (builder pattern).
    #[must_use]
    pub fn with_seeder(mut self, seeder: DataSeeder) -> Self {
        self.data_seeders.push(seeder);
        self
    }

    /// Adds a main step (builder pattern).
    #[must_use]
    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }

    /// Sets the continuation policy (builder pattern).
    #[must_use]
    pub const fn continue_after_failed_steps(mut self, enabled: bool) -> Self {
        self.continue_after_failed_steps = enabled;
        self
    }

    /// Returns every step in execution order.
    ///
    /// Setup steps come first in seeder declaration order, then the main
    /// steps, then teardown steps with seeders in reverse declaration order.
    /// Each phase numbers its steps independently.
    #[must_use]
    pub fn execution_plan(&self) -> Vec<PlannedStep<'_>> {
        let setup: Vec<_> = self
            .data_seeders
            .iter()
            .flat_map(|seeder| seeder.setup.iter().map(move |step| (Some(seeder.name.as_str()), step)))
            .collect();
        let main: Vec<_> = self.steps.iter().map(|step| (None, step)).collect();
        let teardown: Vec<_> = self
            .data_seeders
            .iter()
            .rev()
            .flat_map(|seeder| {
                seeder
                    .teardown
                    .iter()
                    .map(move |step| (Some(seeder.name.as_str()), step))
            })
            .collect();

        [
            (StepPhase::Setup, setup),
            (StepPhase::Main, main),
            (StepPhase::Teardown, teardown),
        ]
        .into_iter()
        .flat_map(|(phase, steps)| {
            let total = steps.len();
            steps
                .into_iter()
                .enumerate()
                .map(move |(i, (seeder, step))| PlannedStep {
                    phase,
                    seeder,
                    step,
                    progress: Progress::new(i + 1, total),
                })
        })
        .collect()
    }
}

/// A named group of tests sharing suite-level variables.
#[derive(Debug, Clone, Default)]
pub struct Suite {
    /// Suite name.
    pub name: String,
    /// Tests, run in order.
    pub tests: Vec<Test>,
    /// Suite-scope variables, read-only during execution.
    pub variables: VariableStore,
    /// Keep running tests after a failed test.
    pub ignore_failed_tests: bool,
}

impl Suite {
    /// Creates an empty suite.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Declares a suite variable (builder pattern).
    #[must_use]
    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<VariableValue>) -> Self {
        self.variables.insert(name.into(), value.into());
        self
    }

    /// Replaces all suite variables (builder pattern).
    #[must_use]
    pub fn with_variables(mut self, variables: BTreeMap<String, VariableValue>) -> Self {
        self.variables = variables;
        self
    }

    /// Adds a test (builder pattern).
    #[must_use]
    pub fn with_test(mut self, test: Test) -> Self {
        self.tests.push(test);
        self
    }

    /// Sets the failed-test policy (builder pattern).
    #[must_use]
    pub const fn ignore_failed_tests(mut self, enabled: bool) -> Self {
        self.ignore_failed_tests = enabled;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn describe(plan: &[PlannedStep<'_>]) -> Vec<String> {
        plan.iter()
            .map(|planned| format!("{:?} {} {}", planned.phase, planned.progress, planned.step.description))
            .collect()
    }

    #[test]
    fn test_execution_plan_orders_phases_and_reverses_teardown() {
        let test = Test::new("crud")
            .with_seeder(
                DataSeeder::new("users")
                    .with_setup(Step::post("create user", "http://x/users", serde_json::json!({})))
                    .with_teardown(Step::delete("delete user", "http://x/users/1")),
            )
            .with_seeder(
                DataSeeder::new("todos")
                    .with_setup(Step::post("create todo", "http://x/todos", serde_json::json!({})))
                    .with_teardown(Step::delete("delete todo", "http://x/todos/1"))
                    .with_teardown(Step::get("verify todo gone", "http://x/todos/1")),
            )
            .with_step(Step::get("read todo", "http://x/todos/1"));

        let plan = test.execution_plan();
        assert_eq!(
            describe(&plan),
            vec![
                "Setup 1/2 create user",
                "Setup 2/2 create todo",
                "Main 1/1 read todo",
                "Teardown 1/3 delete todo",
                "Teardown 2/3 verify todo gone",
                "Teardown 3/3 delete user",
            ]
        );
        assert_eq!(plan[3].seeder, Some("todos"));
        assert_eq!(plan[2].seeder, None);
    }

    #[test]
    fn test_after_step_hook_sets_variables() {
        let step = Step::get("read", "http://x").after_step(|set, response| {
            set.set_from_json("id", response.pointer("/id"))
        });
        let response = ResponseSpec::json(200, serde_json::json!({"id": 9}));

        let suite = VariableStore::new();
        let mut variables = crate::variables::Variables::new(&suite);
        let mut setter = variables.setter();
        step.after_step.as_ref().unwrap().call(&mut setter, &response).unwrap();
        let assigned = setter.finish().unwrap();

        assert_eq!(assigned.get("id"), Some(&VariableValue::from(9)));
    }

    #[test]
    fn test_suite_builder() {
        let suite = Suite::new("api")
            .with_variable("baseUrl", "http://localhost")
            .with_test(Test::new("a"))
            .ignore_failed_tests(true);

        assert_eq!(suite.tests.len(), 1);
        assert!(suite.ignore_failed_tests);
        assert_eq!(
            suite.variables.get("baseUrl"),
            Some(&VariableValue::from("http://localhost"))
        );
    }
}
