//! Suite source port
//!
//! Defines the interface for loading suite definitions from storage.

use async_trait::async_trait;
use std::path::Path;

use dratt_domain::Suite;

/// Errors that can occur while loading a suite.
#[derive(Debug, thiserror::Error)]
pub enum SuiteSourceError {
    /// Suite file not found.
    #[error("Suite file not found: {0}")]
    NotFound(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid YAML or JSON, or does not match the suite schema.
    #[error("Parse error in {path}: {message}")]
    Parse {
        /// File that failed to parse.
        path: String,
        /// Parser message.
        message: String,
    },

    /// The file parsed but describes an invalid suite.
    #[error("Invalid suite in {path}: {message}")]
    Invalid {
        /// File that failed validation.
        path: String,
        /// What is wrong.
        message: String,
    },
}

/// Source of suite definitions.
#[async_trait]
pub trait SuiteSource: Send + Sync {
    /// Loads one suite from `path`.
    ///
    /// # Errors
    /// Returns an error if the file is missing, unreadable or invalid.
    async fn load(&self, path: &Path) -> Result<Suite, SuiteSourceError>;

    /// Loads several suites, preserving order and stopping at the first failure.
    ///
    /// # Errors
    /// Returns the first load error.
    async fn load_all(&self, paths: &[&Path]) -> Result<Vec<Suite>, SuiteSourceError> {
        let mut suites = Vec::with_capacity(paths.len());
        for path in paths {
            suites.push(self.load(path).await?);
        }
        Ok(suites)
    }
}
