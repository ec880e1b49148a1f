//! Trace events emitted while loading rules and checking pushes

use crate::{Algorithm, ChangedFile, CheckError, RuleSetStats, Verdict};
use pushwatch_log::{Field, Level};

/// A step in the load/check pipeline
#[derive(Debug, Clone, Copy)]
pub enum CheckEvent<'a> {
    ConfigLoaded { stats: RuleSetStats },
    ConfigRejected { error: &'a CheckError },
    /// No secret is configured, so signatures are not checked
    SignatureSkipped,
    SignatureVerified { algorithm: Algorithm },
    PayloadExtracted {
        repository: &'a str,
        commits: usize,
        files: usize,
    },
    FileEvaluated {
        file: &'a ChangedFile,
        verdict: &'a Verdict<'a>,
    },
    CheckFailed { error: &'a CheckError },
    CheckCompleted { repository: &'a str, notify: usize },
}

/// Receives [`CheckEvent`]s from a [`Checker`](crate::Checker)
pub trait CheckObserver: Send + Sync {
    fn on_event(&self, event: &CheckEvent<'_>);
}

/// Discards every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CheckObserver for NoopObserver {
    fn on_event(&self, _event: &CheckEvent<'_>) {}
}

/// Forwards events to `pushwatch-log` as structured records
#[derive(Debug, Clone, Copy, Default)]
pub struct LogObserver;

const TARGET: &str = "pushwatch::check";

impl CheckObserver for LogObserver {
    fn on_event(&self, event: &CheckEvent<'_>) {
        match event {
            CheckEvent::ConfigLoaded { stats } => pushwatch_log::event(
                Level::Info,
                TARGET,
                "configuration loaded",
                &[
                    Field::new("lines", stats.lines),
                    Field::new("rules", stats.rules),
                    Field::new("exceptions", stats.exceptions),
                    Field::new("metadata", stats.metadata),
                    Field::new("skipped", stats.skipped),
                ],
            ),
            CheckEvent::ConfigRejected { error } => pushwatch_log::event(
                Level::Error,
                TARGET,
                "configuration rejected",
                &[Field::new("error", error)],
            ),
            CheckEvent::SignatureSkipped => pushwatch_log::event(
                Level::Warn,
                TARGET,
                "secret key not found in config, signature check skipped",
                &[],
            ),
            CheckEvent::SignatureVerified { algorithm } => pushwatch_log::event(
                Level::Debug,
                TARGET,
                "signature verified",
                &[Field::new("algorithm", algorithm)],
            ),
            CheckEvent::PayloadExtracted {
                repository,
                commits,
                files,
            } => pushwatch_log::event(
                Level::Debug,
                TARGET,
                "payload loaded",
                &[
                    Field::new("repository", repository),
                    Field::new("commits", commits),
                    Field::new("files", files),
                ],
            ),
            CheckEvent::FileEvaluated { file, verdict } => {
                let (outcome, rule, exception) = match verdict {
                    Verdict::Notify { rule } => ("notify", rule.as_str(), ""),
                    Verdict::Suppressed { rule, exception } => {
                        ("suppressed", rule.as_str(), exception.as_str())
                    }
                    Verdict::Unmatched => ("unmatched", "", ""),
                };
                pushwatch_log::event(
                    Level::Trace,
                    TARGET,
                    "file evaluated",
                    &[
                        Field::new("file", file),
                        Field::new("outcome", outcome),
                        Field::new("rule", rule),
                        Field::new("exception", exception),
                    ],
                );
            }
            CheckEvent::CheckFailed { error } => pushwatch_log::event(
                Level::Warn,
                TARGET,
                "check failed",
                &[Field::new("error", error)],
            ),
            CheckEvent::CheckCompleted { repository, notify } => pushwatch_log::event(
                Level::Info,
                TARGET,
                "check completed",
                &[
                    Field::new("repository", repository),
                    Field::new("notify", notify),
                ],
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl CheckObserver for Recorder {
        fn on_event(&self, event: &CheckEvent<'_>) {
            self.0.lock().unwrap().push(format!("{:?}", event));
        }
    }

    #[test]
    fn test_observer_is_object_safe() {
        let recorder = Recorder::default();
        let observer: &dyn CheckObserver = &recorder;
        observer.on_event(&CheckEvent::SignatureSkipped);
        assert_eq!(recorder.0.lock().unwrap().as_slice(), ["SignatureSkipped"]);
    }

    #[test]
    fn test_log_observer_handles_all_events() {
        let error = CheckError::SignatureMismatch;
        let file = ChangedFile::rooted("src/a");
        let verdict = Verdict::Unmatched;

        let events = [
            CheckEvent::ConfigRejected { error: &error },
            CheckEvent::SignatureSkipped,
            CheckEvent::SignatureVerified {
                algorithm: Algorithm::Sha256,
            },
            CheckEvent::PayloadExtracted {
                repository: "acme/app",
                commits: 1,
                files: 1,
            },
            CheckEvent::FileEvaluated {
                file: &file,
                verdict: &verdict,
            },
            CheckEvent::CheckFailed { error: &error },
            CheckEvent::CheckCompleted {
                repository: "acme/app",
                notify: 0,
            },
        ];

        for event in &events {
            LogObserver.on_event(event);
        }
    }
}
