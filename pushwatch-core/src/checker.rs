//! Push check orchestration

use crate::{
    CheckError, CheckEvent, CheckObserver, NoopObserver, NotifySet, PushContext, Result,
    RuleMatcher, RuleSet, RuleSetParser, SignatureVerifier, Verification, unwrap_form_body,
};
use serde::Serialize;
use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

/// Successful check result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckReport {
    /// `repository.full_name` from the payload
    pub repository: String,
    /// Number of changed files in the push
    pub scanned: usize,
    /// Files that should trigger a notification, possibly none
    pub notify: NotifySet,
}

/// Loads a rule set once and checks incoming pushes against it
///
/// The loaded rule set is never mutated, so a `Checker` can be shared across
/// threads and `check` called concurrently.
#[derive(Clone)]
pub struct Checker {
    rules: Option<Arc<RuleSet>>,
    parser: RuleSetParser,
    observer: Arc<dyn CheckObserver>,
}

impl Default for Checker {
    fn default() -> Self {
        Self::new()
    }
}

impl Checker {
    /// Create an unloaded checker with the strict parser
    pub fn new() -> Self {
        Self {
            rules: None,
            parser: RuleSetParser::new(),
            observer: Arc::new(NoopObserver),
        }
    }

    /// Create a checker around an already parsed rule set
    pub fn from_rules(rules: RuleSet) -> Self {
        Self {
            rules: Some(Arc::new(rules)),
            ..Self::new()
        }
    }

    /// Use `parser` for subsequent [`load`](Self::load) calls
    pub fn with_parser(mut self, parser: RuleSetParser) -> Self {
        self.parser = parser;
        self
    }

    /// Report pipeline events to `observer`
    pub fn with_observer(mut self, observer: impl CheckObserver + 'static) -> Self {
        self.observer = Arc::new(observer);
        self
    }

    /// Parse and install config text
    ///
    /// A failed load leaves the checker unloaded, even if a rule set was
    /// loaded before.
    pub fn load(&mut self, text: &str) -> Result<&RuleSet> {
        self.rules = None;
        match self.parser.parse(text) {
            Ok(set) => {
                self.observer
                    .on_event(&CheckEvent::ConfigLoaded { stats: set.stats() });
                let set = self.rules.insert(Arc::new(set));
                Ok(&**set)
            }
            Err(error) => {
                self.observer
                    .on_event(&CheckEvent::ConfigRejected { error: &error });
                Err(error)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        self.rules.is_some()
    }

    pub fn rules(&self) -> Option<&RuleSet> {
        self.rules.as_deref()
    }

    /// Metadata lookup with a fallback, also used when nothing is loaded
    pub fn metadata_value<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        match self.rules() {
            Some(set) => set.metadata().get(key, default),
            None => default,
        }
    }

    /// Verify, extract and match a push body
    ///
    /// `body` must be the exact bytes received; `signature` is the
    /// `X-Hub-Signature` style header value, if any. Panics inside the
    /// pipeline are reported as [`CheckError::Internal`].
    pub fn check(&self, body: &[u8], signature: Option<&str>) -> Result<CheckReport> {
        let error = match guarded(|| self.run(body, signature)) {
            Ok(report) => return Ok(report),
            Err(error) => error,
        };

        // The failure report goes through the observer too, so it is guarded as well
        guarded(|| {
            self.observer
                .on_event(&CheckEvent::CheckFailed { error: &error });
            Ok(())
        })?;
        Err(error)
    }

    fn run(&self, body: &[u8], signature: Option<&str>) -> Result<CheckReport> {
        let rules = self.rules.as_deref().ok_or(CheckError::ConfigNotLoaded)?;

        let verifier = SignatureVerifier::new(rules.metadata().secret());
        match verifier.verify(body, signature)? {
            Verification::Skipped => self.observer.on_event(&CheckEvent::SignatureSkipped),
            Verification::Verified(algorithm) => self
                .observer
                .on_event(&CheckEvent::SignatureVerified { algorithm }),
        }

        let json = unwrap_form_body(body)?;
        let push = PushContext::extract(&json)?;
        self.observer.on_event(&CheckEvent::PayloadExtracted {
            repository: &push.repository,
            commits: push.commits,
            files: push.files.len(),
        });

        let notify = RuleMatcher::for_rules(rules).filter_with(&push.files, |file, verdict| {
            self.observer
                .on_event(&CheckEvent::FileEvaluated { file, verdict });
        });
        self.observer.on_event(&CheckEvent::CheckCompleted {
            repository: &push.repository,
            notify: notify.len(),
        });

        Ok(CheckReport {
            scanned: push.files.len(),
            repository: push.repository,
            notify,
        })
    }
}

/// Run `f`, turning a panic into [`CheckError::Internal`]
fn guarded<T>(f: impl FnOnce() -> Result<T>) -> Result<T> {
    catch_unwind(AssertUnwindSafe(f))
        .unwrap_or_else(|panic| Err(CheckError::Internal(panic_message(panic))))
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected panic during check".to_string()
    }
}
