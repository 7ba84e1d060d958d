//! Execution state and outcome types.
//!
//! Every executable unit (step, test, suite) moves through
//! `Pending -> Running -> {Succeeded, Failed, Errored}`. Assertion failures
//! and operational errors are distinct terminal states and never conflated.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a step, test or suite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
    /// Not started yet.
    #[default]
    Pending,
    /// Currently executing.
    Running,
    /// Finished with every expectation met.
    Succeeded,
    /// Finished with at least one expectation unmet.
    Failed,
    /// Aborted by an operational error.
    Errored,
}

impl UnitState {
    /// Returns true for the three terminal states.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Failed | Self::Errored)
    }
}

/// Categories of operational errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A variable could not be substituted.
    Substitution,
    /// The request URL is malformed.
    InvalidUrl,
    /// The request body cannot be sent.
    InvalidBody,
    /// The HTTP call itself failed (DNS, connection, timeout).
    ApiCall,
    /// The response body could not be read.
    ResponseRead,
    /// The `after_step` hook failed to set a variable.
    AfterStep,
}

impl ErrorKind {
    /// Returns user-friendly suggestions for this error type.
    #[must_use]
    pub const fn suggestions(&self) -> &[&'static str] {
        match self {
            Self::Substitution => &[
                "Check that the variable is declared on the suite",
                "Check that an earlier step captures it",
            ],
            Self::InvalidUrl => &[
                "Check that the URL starts with http:// or https://",
                "Verify there are no typos in the URL",
            ],
            Self::InvalidBody => &[
                "Remove matchers from request bodies",
                "Verify all placeholders are substituted",
            ],
            Self::ApiCall => &[
                "Check if the server is running",
                "Verify the host and port are correct",
                "Try increasing the timeout value",
            ],
            Self::ResponseRead => &[
                "The server may have closed the connection early",
                "Check that JSON responses are well formed",
            ],
            Self::AfterStep => &[
                "Check that the captured field exists in the response",
                "Only strings and numbers can be stored in variables",
            ],
        }
    }

    /// Returns a human-readable title for this error type.
    #[must_use]
    pub const fn title(&self) -> &'static str {
        match self {
            Self::Substitution => "Variable Substitution Error",
            Self::InvalidUrl => "Invalid URL",
            Self::InvalidBody => "Invalid Request Body",
            Self::ApiCall => "API Call Error",
            Self::ResponseRead => "Response Read Error",
            Self::AfterStep => "After Step Error",
        }
    }
}

/// Terminal result of a step, test or suite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Outcome {
    /// All expectations met.
    Succeeded,
    /// At least one expectation unmet.
    Failed,
    /// An operational error aborted execution.
    Errored {
        /// Error category.
        kind: ErrorKind,
        /// Human-readable error message.
        detail: String,
    },
}

impl Outcome {
    /// Creates an Errored outcome.
    #[must_use]
    pub fn errored(kind: ErrorKind, detail: impl Into<String>) -> Self {
        Self::Errored {
            kind,
            detail: detail.into(),
        }
    }

    /// Returns true if the unit succeeded.
    #[must_use]
    pub const fn is_succeeded(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// Returns true if the unit failed an assertion.
    #[must_use]
    pub const fn is_failed(&self) -> bool {
        matches!(self, Self::Failed)
    }

    /// Returns true if the unit was aborted by an error.
    #[must_use]
    pub const fn is_errored(&self) -> bool {
        matches!(self, Self::Errored { .. })
    }

    /// Returns the corresponding terminal state.
    #[must_use]
    pub const fn state(&self) -> UnitState {
        match self {
            Self::Succeeded => UnitState::Succeeded,
            Self::Failed => UnitState::Failed,
            Self::Errored { .. } => UnitState::Errored,
        }
    }

    /// Returns the short label used in progress output.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Succeeded => "OK",
            Self::Failed => "FAIL",
            Self::Errored { .. } => "ERROR",
        }
    }
}
