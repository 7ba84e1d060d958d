//! Execution reports.
//!
//! Reports mirror the definition tree: a [`RunReport`] holds
//! [`SuiteReport`]s, which hold [`TestReport`]s, which hold [`StepReport`]s
//! grouped by phase, which hold [`ExpectationReport`]s.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::mismatch::MismatchNode;
use crate::request::RequestSpec;
use crate::response::ResponseSpec;
use crate::state::Outcome;
use crate::variables::VariableValue;

use super::{Expectation, StepPhase};

/// What an expectation was checked against.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ExpectationContext {
    /// Context of a status expectation.
    #[serde(rename_all = "camelCase")]
    Status {
        /// Status the server returned.
        actual_status: u16,
    },
    /// Context of a body expectation.
    Body {
        /// Body the server returned, `None` when empty.
        body: Option<Value>,
        /// Full mismatch tree, including `Extra` leaves for includes checks.
        mismatch: MismatchNode,
    },
}

/// Result of checking one expectation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpectationReport {
    /// The expectation after variable substitution.
    pub expectation: Expectation,
    /// Whether it was met.
    pub met: bool,
    /// What it was checked against.
    pub context: ExpectationContext,
}

impl ExpectationReport {
    /// Returns the mismatch tree for body expectations.
    #[must_use]
    pub const fn mismatch(&self) -> Option<&MismatchNode> {
        match &self.context {
            ExpectationContext::Body { mismatch, .. } => Some(mismatch),
            ExpectationContext::Status { .. } => None,
        }
    }
}

/// Result of running one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    /// Step description.
    pub description: String,
    /// Phase the step ran in.
    pub phase: StepPhase,
    /// Owning seeder for setup and teardown steps.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seeder: Option<String>,
    /// Request actually sent, absent if substitution failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request: Option<RequestSpec>,
    /// Response received, absent if the call failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response: Option<ResponseSpec>,
    /// Expectation results in declaration order.
    pub expectations: Vec<ExpectationReport>,
    /// Variables assigned by the after-step hook.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub variables_set: BTreeMap<String, VariableValue>,
    /// Terminal outcome.
    #[serde(flatten)]
    pub outcome: Outcome,
    /// Wall time of the step.
    pub duration_ms: u64,
}

impl StepReport {
    /// Returns true if every expectation was met.
    #[must_use]
    pub fn all_met(&self) -> bool {
        self.expectations.iter().all(|report| report.met)
    }
}

/// Result of running one test.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReport {
    /// Test name.
    pub name: String,
    /// Test description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Setup steps that ran.
    pub setup: Vec<StepReport>,
    /// Main steps that ran.
    pub steps: Vec<StepReport>,
    /// Teardown steps that ran.
    pub teardown: Vec<StepReport>,
    /// Terminal outcome.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl TestReport {
    /// Returns all step reports in execution order.
    pub fn step_reports(&self) -> impl Iterator<Item = &StepReport> {
        self.setup
            .iter()
            .chain(self.steps.iter())
            .chain(self.teardown.iter())
    }
}

/// Counts of test outcomes in a suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SuiteSummary {
    /// Tests that ran.
    pub total: usize,
    /// Tests that succeeded.
    pub passed: usize,
    /// Tests that failed.
    pub failed: usize,
    /// Tests that errored.
    pub errored: usize,
}

impl SuiteSummary {
    /// Get pass rate as percentage.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn pass_rate(&self) -> f64 {
        if self.total == 0 {
            100.0
        } else {
            (self.passed as f64 / self.total as f64) * 100.0
        }
    }
}

/// Result of running one suite.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuiteReport {
    /// Suite name.
    pub name: String,
    /// Reports of the tests that ran.
    pub test_reports: Vec<TestReport>,
    /// Terminal outcome.
    #[serde(flatten)]
    pub outcome: Outcome,
}

impl SuiteReport {
    /// Counts test outcomes.
    #[must_use]
    pub fn summary(&self) -> SuiteSummary {
        let total = self.test_reports.len();
        let passed = self
            .test_reports
            .iter()
            .filter(|report| report.outcome.is_succeeded())
            .count();
        let errored = self
            .test_reports
            .iter()
            .filter(|report| report.outcome.is_errored())
            .count();
        SuiteSummary {
            total,
            passed,
            failed: total - passed - errored,
            errored,
        }
    }
}

/// Final result of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every suite succeeded.
    Success,
    /// At least one suite failed and none errored.
    Failed,
    /// A suite was aborted by an operational error.
    Error,
}

impl RunOutcome {
    /// Combines suite outcomes; errors take precedence over failures.
    pub fn from_suites<'a>(outcomes: impl IntoIterator<Item = &'a Outcome>) -> Self {
        outcomes
            .into_iter()
            .fold(Self::Success, |acc, outcome| match (acc, outcome) {
                (Self::Error, _) | (_, Outcome::Errored { .. }) => Self::Error,
                (Self::Failed, _) | (_, Outcome::Failed) => Self::Failed,
                (Self::Success, Outcome::Succeeded) => Self::Success,
            })
    }

    /// Returns the outcome as a static string.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Failed => "failed",
            Self::Error => "error",
        }
    }

    /// Returns the process exit code for this outcome.
    #[must_use]
    pub const fn exit_code(self) -> u8 {
        match self {
            Self::Success => 0,
            Self::Failed => 1,
            Self::Error => 2,
        }
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a whole run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    /// Unique run identifier.
    pub run_id: Uuid,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
    /// Reports of the suites that ran.
    pub suite_reports: Vec<SuiteReport>,
    /// Final outcome.
    pub outcome: RunOutcome,
}

impl RunReport {
    /// Builds a run report, deriving the outcome from the suite reports.
    #[must_use]
    pub fn new(
        started_at: DateTime<Utc>,
        finished_at: DateTime<Utc>,
        suite_reports: Vec<SuiteReport>,
    ) -> Self {
        let outcome = RunOutcome::from_suites(suite_reports.iter().map(|report| &report.outcome));
        Self {
            run_id: Uuid::now_v7(),
            started_at,
            finished_at,
            suite_reports,
            outcome,
        }
    }

    /// Returns the final outcome.
    #[must_use]
    pub const fn outcome(&self) -> RunOutcome {
        self.outcome
    }

    /// Returns the run duration in milliseconds.
    #[must_use]
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}
