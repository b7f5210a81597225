use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} is required and must be a positive number")]
    Missing { field: &'static str },

    #[error("{field} is required and must be a positive number, got {value}")]
    NonPositive { field: &'static str, value: i64 },

    #[error("failed to read throttle config {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(
        "unexpected top-level keys alongside [throttle]: {}",
        .keys.join(", ")
    )]
    KeysOutsideTable { keys: Vec<String> },

    #[error("failed to parse throttle config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Returned by the cancellable permit operations when the wait is aborted.
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum PermitError {
    #[error("permit wait was cancelled")]
    Cancelled,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DirectiveParseError {
    #[error(
        "unknown throttle directive `{0}`; expected backoff, speedup, reset or override=<millis>"
    )]
    Unknown(String),

    #[error("invalid override interval `{value}`: {source}")]
    InvalidOverride {
        value: String,
        #[source]
        source: ParseIntError,
    },
}
