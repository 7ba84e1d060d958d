//! Command-line interface.

use std::path::PathBuf;

use clap::Parser;
use dratt_infrastructure::LogLevel;

/// Runs declarative HTTP integration-test suites.
#[derive(Debug, Clone, Parser)]
#[command(name = "dratt", version, about)]
pub struct Cli {
    /// Console verbosity: min, normal, info or max.
    #[arg(short = 'L', long, env = "DRATT_LOG_LEVEL", default_value_t = LogLevel::Normal)]
    pub log_level: LogLevel,

    /// Per-request timeout in milliseconds.
    #[arg(long, env = "DRATT_TIMEOUT_MS", default_value_t = 30_000)]
    pub timeout_ms: u64,

    /// Write the run report as JSON to this path.
    #[arg(long, env = "DRATT_REPORT")]
    pub report: Option<PathBuf>,

    /// Suite files (.yaml, .yml or .json), run in the given order.
    #[arg(required = true)]
    pub suite_files: Vec<PathBuf>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_flags() {
        let cli = Cli::try_parse_from([
            "dratt",
            "-L",
            "info",
            "--timeout-ms",
            "500",
            "--report",
            "out/run.json",
            "a.yaml",
            "b.json",
        ])
        .unwrap();

        assert_eq!(cli.log_level, LogLevel::Info);
        assert_eq!(cli.timeout_ms, 500);
        assert_eq!(cli.report, Some(PathBuf::from("out/run.json")));
        assert_eq!(
            cli.suite_files,
            vec![PathBuf::from("a.yaml"), PathBuf::from("b.json")]
        );
    }

    #[test]
    fn test_suite_files_are_required() {
        assert!(Cli::try_parse_from(["dratt"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_log_level() {
        assert!(Cli::try_parse_from(["dratt", "--log-level", "loud", "a.yaml"]).is_err());
    }

    #[test]
    fn test_command_is_well_formed() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
