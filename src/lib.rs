// pushwatch - filter repository pushes through a rule config
//
// This library verifies signed push webhooks, extracts the changed paths and
// reports the ones matching watched rules.

// Re-export core functionality
pub use pushwatch_core::*;

// Re-export logging
pub use pushwatch_log as log;

// Re-export optional crates
#[cfg(feature = "config")]
pub use pushwatch_config;

// Prelude for common imports
pub mod prelude {
    pub use crate::{
        Alert, AlertSink, Algorithm, CheckError, CheckReport, Checker, LogObserver, NotifySet,
        ParseMode, PushContext, Result, RuleSet, RuleSetParser, SignatureVerifier, sign,
    };

    #[cfg(feature = "config")]
    pub use pushwatch_config::{ConfigSource, Settings, SourceLoader};
}
