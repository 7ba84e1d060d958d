//! Console verbosity.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How much the console reporter prints.
///
/// Levels are ordered: each one includes everything printed by the levels
/// below it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Titles and outcomes only; no request info on successful steps.
    Min,
    /// Adds request methods and URLs.
    #[default]
    Normal,
    /// Adds request bodies and variable assignments, without truncation.
    Info,
    /// Adds full responses.
    Max,
}

impl LogLevel {
    /// All levels in ascending order.
    pub const ALL: [Self; 4] = [Self::Min, Self::Normal, Self::Info, Self::Max];

    /// Returns the level name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Min => "min",
            Self::Normal => "normal",
            Self::Info => "info",
            Self::Max => "max",
        }
    }

    /// Returns true if data blocks are cut to a few lines at this level.
    #[must_use]
    pub fn limits_data(self) -> bool {
        self < Self::Info
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for unknown log level names.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown log level '{0}', expected one of: min, normal, info, max")]
pub struct InvalidLogLevel(pub String);

impl FromStr for LogLevel {
    type Err = InvalidLogLevel;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|level| level.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| InvalidLogLevel(s.to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_is_case_insensitive() {
        assert_eq!("MIN".parse::<LogLevel>().unwrap(), LogLevel::Min);
        assert_eq!(" Info ".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!(
            "loud".parse::<LogLevel>(),
            Err(InvalidLogLevel("loud".to_string()))
        );
    }

    #[test]
    fn test_ordering_and_limits() {
        assert!(LogLevel::Min < LogLevel::Normal);
        assert!(LogLevel::Info < LogLevel::Max);
        assert!(LogLevel::Normal.limits_data());
        assert!(!LogLevel::Info.limits_data());
        assert_eq!(LogLevel::default(), LogLevel::Normal);
    }
}
