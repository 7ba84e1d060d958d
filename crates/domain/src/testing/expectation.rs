//! Response expectations.

use serde::{Deserialize, Serialize};

use crate::template::Template;

/// A check applied to a step's response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Expectation {
    /// The response status must equal `expected_status`.
    #[serde(rename_all = "camelCase")]
    StatusEquals {
        /// Expected HTTP status code.
        expected_status: u16,
    },
    /// The response body must structurally equal `expected_body`.
    #[serde(rename_all = "camelCase")]
    BodyEquals {
        /// Expected body template.
        expected_body: Template,
    },
    /// The response body must contain everything in `expected_body`;
    /// surplus actual keys are allowed.
    #[serde(rename_all = "camelCase")]
    BodyIncludes {
        /// Expected body template.
        expected_body: Template,
    },
}

impl Expectation {
    /// Creates a status expectation.
    #[must_use]
    pub const fn status(expected_status: u16) -> Self {
        Self::StatusEquals { expected_status }
    }

    /// Creates a body-equals expectation.
    pub fn body_equals(expected_body: impl Into<Template>) -> Self {
        Self::BodyEquals {
            expected_body: expected_body.into(),
        }
    }

    /// Creates a body-includes expectation.
    pub fn body_includes(expected_body: impl Into<Template>) -> Self {
        Self::BodyIncludes {
            expected_body: expected_body.into(),
        }
    }

    /// Returns the expected body for body-bearing expectations.
    #[must_use]
    pub const fn expected_body(&self) -> Option<&Template> {
        match self {
            Self::StatusEquals { .. } => None,
            Self::BodyEquals { expected_body } | Self::BodyIncludes { expected_body } => {
                Some(expected_body)
            }
        }
    }

    /// Returns a new expectation with the body replaced.
    ///
    /// Status expectations are returned unchanged.
    #[must_use]
    pub fn with_expected_body(&self, body: Template) -> Self {
        match self {
            Self::StatusEquals { expected_status } => Self::status(*expected_status),
            Self::BodyEquals { .. } => Self::BodyEquals {
                expected_body: body,
            },
            Self::BodyIncludes { .. } => Self::BodyIncludes {
                expected_body: body,
            },
        }
    }

    /// Get a human-readable description of this expectation.
    #[must_use]
    pub fn description(&self) -> String {
        match self {
            Self::StatusEquals { expected_status } => format!("status equals {expected_status}"),
            Self::BodyEquals { .. } => "body equals".to_string(),
            Self::BodyIncludes { .. } => "body includes".to_string(),
        }
    }
}
