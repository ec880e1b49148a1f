//! Error types for the push check pipeline

use thiserror::Error;

/// Errors that can occur while loading rules or checking a push
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CheckError {
    /// `check` was called before a rule set was loaded
    #[error("Configuration not loaded")]
    ConfigNotLoaded,

    /// Configuration content exceeds the allowed size
    #[error("Config file too big ({len} bytes), max allowed size is {max}")]
    ConfigTooLarge { len: usize, max: usize },

    /// Configuration source could not be read
    #[error("Unable to read config: {0}")]
    ConfigUnreadable(String),

    /// A configuration line could not be parsed
    #[error("Config line {line}: {kind}")]
    ConfigParse { line: usize, kind: ParseErrorKind },

    /// A secret is configured but the request carried no signature
    #[error("Signature is empty, remove the secret from the config to skip the check")]
    SignatureMissing,

    /// The signature names an algorithm we cannot compute
    #[error("The specified algorithm is not valid: {0}")]
    SignatureAlgorithmUnsupported(String),

    /// The signature does not match the payload
    #[error("Secret key check failed")]
    SignatureMismatch,

    /// The payload is not valid JSON or has the wrong shape
    #[error("Payload json decode error: {0}")]
    PayloadParse(String),

    /// The payload has no `repository.full_name`
    #[error("Unable to find repository full name in payload")]
    PayloadMissingRepository,

    /// An unexpected fault inside the pipeline
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Reasons a single configuration line is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// `@` line after the metadata section was closed
    #[error("metadata already parsed, too late")]
    DuplicateMetadata,

    /// `@` line without `=` or with an empty key
    #[error("metadata line malformed: {0}")]
    MalformedMetadata(String),

    /// Exception that does not extend the most recent rule
    #[error("exception `{exception}` does not belong to previous rule `{rule}`")]
    OrphanedException { exception: String, rule: String },

    /// Marker with nothing after it
    #[error("line is empty after the `{0}` marker")]
    EmptyDirective(char),

    /// Unknown line marker
    #[error("unable to parse line starting with `{0}`")]
    UnrecognizedLine(char),
}

impl From<serde_json::Error> for CheckError {
    fn from(err: serde_json::Error) -> Self {
        CheckError::PayloadParse(err.to_string())
    }
}

impl CheckError {
    /// Whether the error comes from loading the rule set rather than from a request
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            CheckError::ConfigNotLoaded
                | CheckError::ConfigTooLarge { .. }
                | CheckError::ConfigUnreadable(_)
                | CheckError::ConfigParse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_message_names_line() {
        let err = CheckError::ConfigParse {
            line: 4,
            kind: ParseErrorKind::DuplicateMetadata,
        };
        assert_eq!(err.to_string(), "Config line 4: metadata already parsed, too late");
    }

    #[test]
    fn test_config_error_classification() {
        assert!(CheckError::ConfigNotLoaded.is_config_error());
        assert!(CheckError::ConfigTooLarge { len: 2, max: 1 }.is_config_error());
        assert!(!CheckError::SignatureMismatch.is_config_error());
        assert!(!CheckError::PayloadMissingRepository.is_config_error());
    }

    #[test]
    fn test_json_error_conversion() {
        let err: CheckError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, CheckError::PayloadParse(_)));
    }
}
