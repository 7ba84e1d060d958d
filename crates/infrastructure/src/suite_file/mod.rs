//! Declarative suite files
//!
//! Suites can be written as YAML (`.yaml`, `.yml`) or JSON (`.json`). Bodies
//! use the template notation: `{ $type: number }`, `{ $arrayIncludes: [..] }`
//! and `{ $var: name, $as: number }`. Values captured from responses are
//! declared as a map from variable name to JSON pointer.
//!
//! ```yaml
//! name: Todos
//! variables: { baseUrl: "http://localhost:3000" }
//! tests:
//!   - name: Create
//!     steps:
//!       - description: create todo
//!         request: { method: POST, url: "${baseUrl}/todos", body: { title: x } }
//!         expect:
//!           - status: 201
//!           - bodyIncludes: { id: { $type: number } }
//!         capture: { todoId: /id }
//! ```

mod mapper;
pub mod types;

use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dratt_application::ports::{SuiteSource, SuiteSourceError};
use dratt_domain::Suite;
use thiserror::Error;
use tokio::fs;
use tracing::debug;

pub use mapper::map_suite;
use types::SuiteFile;

/// Errors raised while loading a suite file.
#[derive(Debug, Error)]
pub enum SuiteFileError {
    /// The file does not exist.
    #[error("Suite file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// The file could not be read.
    #[error("I/O error reading {}: {source}", path.display())]
    Io {
        /// File being read.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The extension is not one of `.yaml`, `.yml` or `.json`.
    #[error("Unsupported suite file extension: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    /// The YAML is malformed or does not match the suite layout.
    #[error("Invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The JSON is malformed or does not match the suite layout.
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The file parsed but an entry is invalid.
    #[error("Invalid suite at {location}: {message}")]
    Invalid {
        /// Path of the offending entry, e.g. `tests[0].steps[1]`.
        location: String,
        /// What is wrong.
        message: String,
    },
}

impl SuiteFileError {
    pub(crate) fn invalid(location: impl Into<String>, message: impl ToString) -> Self {
        Self::Invalid {
            location: location.into(),
            message: message.to_string(),
        }
    }

    /// Converts the error into the application port error for `path`.
    #[must_use]
    pub fn into_source_error(self, path: &Path) -> SuiteSourceError {
        let display = path.display().to_string();
        match self {
            Self::NotFound(_) => SuiteSourceError::NotFound(display),
            Self::Io { source, .. } => SuiteSourceError::Io(source),
            Self::UnsupportedFormat(_) | Self::Yaml(_) | Self::Json(_) => {
                SuiteSourceError::Parse {
                    path: display,
                    message: self.to_string(),
                }
            }
            Self::Invalid { .. } => SuiteSourceError::Invalid {
                path: display,
                message: self.to_string(),
            },
        }
    }
}

/// Encoding of a suite file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SuiteFormat {
    /// YAML document.
    Yaml,
    /// JSON document.
    Json,
}

impl SuiteFormat {
    /// Detects the format from the file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let extension = path.extension()?.to_str()?.to_ascii_lowercase();
        match extension.as_str() {
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parses and validates suite file contents.
///
/// # Errors
///
/// Returns a parse error for malformed documents and
/// [`SuiteFileError::Invalid`] for invalid entries.
pub fn parse_suite(contents: &str, format: SuiteFormat) -> Result<Suite, SuiteFileError> {
    let file: SuiteFile = match format {
        SuiteFormat::Yaml => serde_yaml::from_str(contents)?,
        SuiteFormat::Json => serde_json::from_str(contents)?,
    };
    map_suite(file)
}

/// Reads and parses a suite file.
///
/// # Errors
///
/// Returns an error if the file is missing, unreadable, has an unknown
/// extension or does not describe a valid suite.
pub async fn load_suite_file(path: &Path) -> Result<Suite, SuiteFileError> {
    let format = SuiteFormat::from_path(path)
        .ok_or_else(|| SuiteFileError::UnsupportedFormat(path.to_path_buf()))?;

    let contents = fs::read_to_string(path).await.map_err(|e| {
        if e.kind() == io::ErrorKind::NotFound {
            SuiteFileError::NotFound(path.to_path_buf())
        } else {
            SuiteFileError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        }
    })?;

    let suite = parse_suite(&contents, format)?;
    debug!(
        path = %path.display(),
        suite = %suite.name,
        tests = suite.tests.len(),
        "loaded suite file"
    );
    Ok(suite)
}

/// [`SuiteSource`] backed by suite files on disk.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileSuiteSource;

impl FileSuiteSource {
    /// Creates a new file source.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

#[async_trait]
impl SuiteSource for FileSuiteSource {
    async fn load(&self, path: &Path) -> Result<Suite, SuiteSourceError> {
        load_suite_file(path)
            .await
            .map_err(|e| e.into_source_error(path))
    }
}
