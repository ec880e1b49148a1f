//! Fuzz target for rule config parsing.
//!
//! Strict and lenient parses must never panic, and a lenient parse must
//! succeed whenever a strict one does.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use pushwatch_core::{ParseMode, RuleMatcher, RuleSet};

#[derive(Debug, Arbitrary)]
struct FuzzConfig {
    text: String,
    max_len: u16,
    paths: Vec<String>,
}

fuzz_target!(|data: FuzzConfig| {
    let max_len = data.max_len as usize;
    let strict = RuleSet::parser().max_len(max_len).parse(&data.text);
    let lenient = RuleSet::parser()
        .mode(ParseMode::Lenient)
        .max_len(max_len)
        .parse(&data.text);

    if data.text.len() > max_len {
        assert!(strict.is_err());
        assert!(lenient.is_err());
        return;
    }
    assert!(lenient.is_ok());

    if let Ok(set) = strict {
        let lenient = lenient.unwrap();
        assert_eq!(set.rules(), lenient.rules());
        assert!(lenient.skipped().is_empty());

        let files: Vec<_> = data
            .paths
            .iter()
            .map(|p| pushwatch_core::ChangedFile::rooted(p))
            .collect();
        let notify = RuleMatcher::for_rules(&set).filter(&files);
        assert!(notify.len() <= files.len());
    }
});
