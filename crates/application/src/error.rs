//! Application error types

use dratt_domain::{ErrorKind, Outcome, VariableSetError};
use thiserror::Error;

use crate::execute_request::ExecuteRequestError;
use crate::variable_resolver::SubstitutionError;

/// An operational error that aborts a step.
///
/// These are never assertion failures: any of them turns the step, and
/// with it the enclosing test and suite, into an errored outcome.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum OperationalError {
    /// A placeholder in the request or an expectation could not be resolved.
    #[error(transparent)]
    Substitution(#[from] SubstitutionError),

    /// The request could not be created, sent or read.
    #[error(transparent)]
    Request(#[from] ExecuteRequestError),

    /// The after-step hook failed.
    #[error("after step failed: {0}")]
    AfterStep(#[from] VariableSetError),
}

impl OperationalError {
    /// Returns the error category.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Substitution(_) => ErrorKind::Substitution,
            Self::Request(e) => e.to_error_kind(),
            Self::AfterStep(_) => ErrorKind::AfterStep,
        }
    }

    /// Converts the error into an errored outcome.
    #[must_use]
    pub fn into_outcome(self) -> Outcome {
        Outcome::errored(self.kind(), self.to_string())
    }
}

/// Result type alias for step-level operations.
pub type OperationalResult<T> = Result<T, OperationalError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::HttpClientError;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_kind_mapping() {
        let error = OperationalError::from(ExecuteRequestError::HttpError(
            HttpClientError::ResponseRead("eof".to_string()),
        ));
        assert_eq!(error.kind(), ErrorKind::ResponseRead);

        let error = OperationalError::from(VariableSetError::Undefined {
            name: "id".to_string(),
        });
        assert_eq!(
            error.into_outcome(),
            Outcome::errored(
                ErrorKind::AfterStep,
                "after step failed: cannot set variable 'id' to an undefined value"
            )
        );
    }
}
