//! Dratt - HTTP integration-test runner
//!
//! Wires the reqwest transport, the system clock, the console reporter and
//! suite file loading into the sequential test runner.

pub mod cli;
pub mod settings;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use dratt_application::TestRunner;
use dratt_application::ports::SuiteSource;
use dratt_domain::RunReport;
use dratt_infrastructure::{
    FileSuiteSource, ReqwestHttpClient, SystemClock, TracingReporter, write_json_stable,
};
use tracing::info;

pub use cli::Cli;
pub use settings::RunnerSettings;

/// Loads the configured suite files, runs them and writes the report.
///
/// Test failures and operational errors are reported through the returned
/// [`RunReport`]; only setup problems (unreadable suites, client creation,
/// report writing) are returned as errors.
///
/// # Errors
///
/// Returns an error if a suite file cannot be loaded, the HTTP client cannot
/// be created or the report cannot be written.
pub async fn run(settings: &RunnerSettings) -> anyhow::Result<RunReport> {
    let paths: Vec<&Path> = settings.suite_files.iter().map(AsRef::as_ref).collect();
    let suites = FileSuiteSource::new()
        .load_all(&paths)
        .await
        .context("failed to load suite files")?;

    let client = ReqwestHttpClient::new(settings.http_config())
        .context("failed to create HTTP client")?;
    let runner = TestRunner::new(Arc::new(client), Arc::new(SystemClock::new()));
    let mut reporter = TracingReporter::new(settings.log_level);

    let report = runner.run_test_suites(&suites, &mut reporter).await;

    if let Some(path) = &settings.report_path {
        write_json_stable(path, &report)
            .await
            .with_context(|| format!("failed to write report to {}", path.display()))?;
        info!(path = %path.display(), "run report written");
    }

    Ok(report)
}
