//! Alert composition for downstream notification channels
//!
//! Delivery is left to an [`AlertSink`] implementation; this module only
//! decides what the alert says.

use crate::{CheckError, NotifySet};
use std::fmt;

/// Something a watcher should be told about
#[derive(Debug, Clone, PartialEq)]
pub enum Alert {
    /// Processing a push failed
    Failure {
        repository: Option<String>,
        error: CheckError,
        payload: String,
    },

    /// Watched files changed
    Changes {
        repository: String,
        files: NotifySet,
    },
}

impl Alert {
    /// Build a failure alert; `payload` is rendered lossily
    pub fn failure(repository: Option<&str>, error: CheckError, payload: &[u8]) -> Self {
        Alert::Failure {
            repository: repository.map(str::to_string),
            error,
            payload: String::from_utf8_lossy(payload).into_owned(),
        }
    }

    /// Build a change alert, or `None` when nothing matched
    pub fn changes(repository: &str, files: &NotifySet) -> Option<Self> {
        if files.is_empty() {
            return None;
        }
        Some(Alert::Changes {
            repository: repository.to_string(),
            files: files.clone(),
        })
    }

    pub fn subject(&self) -> String {
        match self {
            Alert::Failure {
                repository, error, ..
            } => format!(
                "Push watch error - {} - {}",
                repository.as_deref().unwrap_or("unknown repository"),
                error
            ),
            Alert::Changes { repository, .. } => format!("Push watch - {}", repository),
        }
    }

    pub fn body(&self) -> String {
        match self {
            Alert::Failure {
                repository,
                error,
                payload,
            } => format!(
                "Error while processing push for repo {}\n\nthis is the error: {}\n\npayload:\n{}\n",
                repository.as_deref().unwrap_or("unknown repository"),
                error,
                payload
            ),
            Alert::Changes { repository, files } => {
                let mut body = format!(
                    "These files in the {} repository have changed:\n\n",
                    repository
                );
                for file in files {
                    body.push_str(file.as_str());
                    body.push('\n');
                }
                body
            }
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Alert::Failure { .. })
    }
}

impl fmt::Display for Alert {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n\n{}", self.subject(), self.body())
    }
}

/// Delivers alerts to a recipient over some channel
pub trait AlertSink {
    type Error: std::error::Error;

    fn dispatch(&self, recipient: Option<&str>, alert: &Alert) -> Result<(), Self::Error>;
}
