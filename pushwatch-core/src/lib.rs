//! Push webhook rule engine
//!
//! This crate decides which files of a repository push are worth telling
//! someone about. It provides:
//!
//! - **Rule language**: a line-oriented config of metadata, rules and exceptions
//! - **Signature verification**: `X-Hub-Signature` style HMAC checks in constant time
//! - **Payload extraction**: changed paths from a push payload, JSON or form encoded
//! - **Matching**: first-match rules with exception suppression
//! - **Orchestration**: a shareable [`Checker`] with pluggable trace observers
//!
//! # Example
//!
//! ```rust
//! use pushwatch_core::{Algorithm, Checker, sign};
//!
//! let mut checker = Checker::new();
//! checker.load("@secret=s3cret\n-src/\n!src/generated/").unwrap();
//!
//! let body = br#"{
//!     "repository": {"full_name": "acme/app"},
//!     "commits": [{"added": ["src/a.go", "src/generated/b.go"], "modified": ["docs/c.md"]}]
//! }"#;
//! let signature = sign("s3cret", body, Algorithm::Sha1);
//!
//! let report = checker.check(body, Some(&signature)).unwrap();
//! assert_eq!(report.repository, "acme/app");
//! assert_eq!(report.notify.len(), 1);
//! ```

mod alert;
mod checker;
mod error;
mod matcher;
mod observer;
mod payload;
mod rules;
mod signature;

pub use alert::{Alert, AlertSink};
pub use checker::{CheckReport, Checker};
pub use error::{CheckError, ParseErrorKind};
pub use matcher::{NotifySet, RuleMatcher, Verdict};
pub use observer::{CheckEvent, CheckObserver, LogObserver, NoopObserver};
pub use payload::{ChangedFile, PushContext, unwrap_form_body};
pub use rules::{
    DEFAULT_MAX_CONFIG_LEN, Directive, Exception, Metadata, PROJECT_ROOT, ParseMode, Pattern,
    Rule, RuleSet, RuleSetParser, RuleSetStats, SkippedLine, classify,
};
pub use signature::{
    Algorithm, SignatureVerifier, Verification, headers, sign, signature_from_headers,
};

/// Result type for push checks
pub type Result<T> = std::result::Result<T, CheckError>;
