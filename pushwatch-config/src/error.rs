// Error types for rule sources and settings

use pushwatch_core::CheckError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Config file not found: {0}")]
    NotFound(String),

    #[error("Unable to read config file: {0}")]
    Unreadable(String),

    #[error("Unable to read config from url: {0}")]
    FetchError(String),

    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("Invalid config location: {0}")]
    InvalidLocation(String),

    #[error("Failed to parse settings: {0}")]
    ParseError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Deserialization error: {0}")]
    DeserializationError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

impl From<ConfigError> for CheckError {
    fn from(err: ConfigError) -> Self {
        CheckError::ConfigUnreadable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_check_error() {
        let err: CheckError = ConfigError::NotFound("rules.txt".to_string()).into();
        assert_eq!(
            err,
            CheckError::ConfigUnreadable("Config file not found: rules.txt".to_string())
        );
    }
}
