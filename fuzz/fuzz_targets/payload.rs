//! Fuzz target for push payload extraction.
//!
//! Tests JSON and form-encoded bodies through the full check pipeline.

#![no_main]

use libfuzzer_sys::fuzz_target;
use pushwatch_core::{CheckError, Checker, PushContext, RuleSet, unwrap_form_body};

fuzz_target!(|data: &[u8]| {
    if let Ok(body) = unwrap_form_body(data) {
        if let Ok(ctx) = PushContext::extract(&body) {
            assert!(!ctx.repository.is_empty());
            for file in &ctx.files {
                assert!(file.as_str().starts_with("[PROOT]/"));
            }
        }
    }

    if let Ok(set) = RuleSet::parse("-src/\n!src/gen/\n-/README") {
        let checker = Checker::from_rules(set);
        if let Err(error) = checker.check(data, None) {
            assert!(!matches!(error, CheckError::Internal(_)));
        }
    }
});
