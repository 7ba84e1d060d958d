//! Dratt - Main Entry Point
//!
//! Parses arguments, initializes tracing and exits with the run outcome:
//! 0 on success, 1 when a test failed and 2 on errors.

use std::process::ExitCode;

use clap::Parser;
use dratt::{Cli, RunnerSettings};
use dratt_domain::RunOutcome;
use tracing::error;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    let settings = RunnerSettings::from(cli);
    match dratt::run(&settings).await {
        Ok(report) => ExitCode::from(report.outcome().exit_code()),
        Err(e) => {
            error!("{e:#}");
            ExitCode::from(RunOutcome::Error.exit_code())
        }
    }
}
