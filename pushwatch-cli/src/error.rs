//! Error types for the pushwatch CLI.

use pushwatch_config::ConfigError;
use pushwatch_core::CheckError;
use std::fmt;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types.
#[derive(Debug)]
pub enum CliError {
    /// IO error (reading payloads, writing output)
    Io(std::io::Error),

    /// Settings or rule source error
    Config(String),

    /// The push check failed; the failure alert has already been emitted
    Check(CheckError),

    /// The rule config could not be loaded or parsed
    Rules(CheckError),

    /// Invalid argument
    InvalidArgument(String),

    /// Output serialization error
    Output(String),
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Io(e) => write!(f, "IO error: {}", e),
            CliError::Config(msg) => write!(f, "Configuration error: {}", msg),
            CliError::Check(e) => write!(f, "Check failed: {}", e),
            CliError::Rules(e) => write!(f, "Invalid rule config: {}", e),
            CliError::InvalidArgument(msg) => write!(f, "Invalid argument: {}", msg),
            CliError::Output(msg) => write!(f, "Output error: {}", msg),
        }
    }
}

impl std::error::Error for CliError {}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e.to_string())
    }
}

impl From<CheckError> for CliError {
    fn from(e: CheckError) -> Self {
        CliError::Check(e)
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Output(e.to_string())
    }
}
