//! Runner settings.

use std::path::PathBuf;

use dratt_infrastructure::{HttpClientConfig, LogLevel};

use crate::cli::Cli;

/// Resolved settings for one invocation.
///
/// Values come from CLI flags, then `DRATT_*` environment variables, then
/// defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerSettings {
    /// Console verbosity.
    pub log_level: LogLevel,
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Where to write the JSON run report, if anywhere.
    pub report_path: Option<PathBuf>,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Suite files in run order.
    pub suite_files: Vec<PathBuf>,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        let http = HttpClientConfig::default();
        Self {
            log_level: LogLevel::default(),
            timeout_ms: http.timeout_ms,
            report_path: None,
            user_agent: http.user_agent,
            suite_files: Vec::new(),
        }
    }
}

impl RunnerSettings {
    /// Creates default settings for the given suite files.
    #[must_use]
    pub fn for_files(suite_files: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            suite_files: suite_files.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Sets the report path (builder pattern).
    #[must_use]
    pub fn with_report_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.report_path = Some(path.into());
        self
    }

    /// Sets the timeout (builder pattern).
    #[must_use]
    pub const fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Returns the transport configuration.
    #[must_use]
    pub fn http_config(&self) -> HttpClientConfig {
        HttpClientConfig::default()
            .with_timeout_ms(self.timeout_ms)
            .with_user_agent(self.user_agent.clone())
    }
}

impl From<Cli> for RunnerSettings {
    fn from(cli: Cli) -> Self {
        Self {
            log_level: cli.log_level,
            timeout_ms: cli.timeout_ms,
            report_path: cli.report,
            suite_files: cli.suite_files,
            ..Self::default()
        }
    }
}
