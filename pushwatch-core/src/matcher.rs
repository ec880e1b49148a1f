//! Rule and exception matching
//!
//! Matching is plain substring search: a rule matches anywhere in the
//! re-rooted path. The first matching rule wins, and any matching exception
//! suppresses the file.

use crate::{ChangedFile, Exception, Rule, RuleSet};
use serde::Serialize;

/// What happened to a single changed file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict<'a> {
    /// Matched `rule` and no exception
    Notify { rule: &'a Rule },

    /// Matched `rule` but was suppressed by `exception`
    Suppressed {
        rule: &'a Rule,
        exception: &'a Exception,
    },

    /// No rule matched
    Unmatched,
}

impl Verdict<'_> {
    pub fn is_notify(&self) -> bool {
        matches!(self, Verdict::Notify { .. })
    }
}

/// Applies a rule set's rules and exceptions to changed paths
#[derive(Debug, Clone, Copy)]
pub struct RuleMatcher<'a> {
    rules: &'a [Rule],
    exceptions: &'a [Exception],
}

impl<'a> RuleMatcher<'a> {
    pub fn new(rules: &'a [Rule], exceptions: &'a [Exception]) -> Self {
        Self { rules, exceptions }
    }

    pub fn for_rules(set: &'a RuleSet) -> Self {
        Self::new(set.rules(), set.exceptions())
    }

    /// Evaluate one re-rooted path
    pub fn evaluate(&self, path: &str) -> Verdict<'a> {
        let Some(rule) = self.rules.iter().find(|rule| rule.matches(path)) else {
            return Verdict::Unmatched;
        };

        match self.exceptions.iter().find(|exception| exception.matches(path)) {
            Some(exception) => Verdict::Suppressed { rule, exception },
            None => Verdict::Notify { rule },
        }
    }

    /// Keep the files that should trigger a notification
    pub fn filter<'f, I>(&self, files: I) -> NotifySet
    where
        I: IntoIterator<Item = &'f ChangedFile>,
    {
        self.filter_with(files, |_, _| {})
    }

    /// Like [`filter`](Self::filter), reporting every verdict to `inspect`
    pub fn filter_with<'f, I, F>(&self, files: I, mut inspect: F) -> NotifySet
    where
        I: IntoIterator<Item = &'f ChangedFile>,
        F: FnMut(&ChangedFile, &Verdict<'a>),
    {
        let mut notify = NotifySet::default();
        for file in files {
            let verdict = self.evaluate(file.as_str());
            inspect(file, &verdict);
            if verdict.is_notify() {
                notify.files.push(file.clone());
            }
        }
        notify
    }
}

/// Ordered files that should trigger a notification
///
/// Input order and duplicates are preserved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct NotifySet {
    files: Vec<ChangedFile>,
}

impl NotifySet {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ChangedFile> {
        self.files.iter()
    }

    pub fn as_slice(&self) -> &[ChangedFile] {
        &self.files
    }

    pub fn into_vec(self) -> Vec<ChangedFile> {
        self.files
    }
}

impl<'a> IntoIterator for &'a NotifySet {
    type Item = &'a ChangedFile;
    type IntoIter = std::slice::Iter<'a, ChangedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn files(paths: &[&str]) -> Vec<ChangedFile> {
        paths.iter().map(|p| ChangedFile::rooted(p)).collect()
    }

    fn notified(set: &RuleSet, paths: &[&str]) -> Vec<String> {
        RuleMatcher::for_rules(set)
            .filter(&files(paths))
            .iter()
            .map(ToString::to_string)
            .collect()
    }

    #[test]
    fn test_rule_with_exception() {
        let set = RuleSet::parse("-src/\n!src/generated/").unwrap();
        assert_eq!(
            notified(&set, &["src/a.go", "src/generated/b.go", "docs/c.md"]),
            vec!["[PROOT]/src/a.go"]
        );
    }

    #[test]
    fn test_first_rule_wins() {
        let set = RuleSet::parse("-src/\n-.go").unwrap();
        let matcher = RuleMatcher::for_rules(&set);

        match matcher.evaluate("[PROOT]/src/a.go") {
            Verdict::Notify { rule } => assert_eq!(rule.as_str(), "src/"),
            other => panic!("unexpected verdict: {:?}", other),
        }
    }

    #[test]
    fn test_exceptions_apply_across_rules() {
        // An exception listed under one rule still suppresses files matched by another
        let set = RuleSet::parse("-docs/\n!docs/private\n-private").unwrap();
        assert!(notified(&set, &["docs/private/x.md"]).is_empty());
    }

    #[test]
    fn test_anchored_rule() {
        let set = RuleSet::parse("-/config/").unwrap();
        assert_eq!(
            notified(&set, &["config/app.toml", "vendor/config/x.toml"]),
            vec!["[PROOT]/config/app.toml"]
        );
    }

    #[test]
    fn test_duplicates_preserved() {
        let set = RuleSet::parse("-src").unwrap();
        assert_eq!(
            notified(&set, &["src/a", "lib/b", "src/a"]),
            vec!["[PROOT]/src/a", "[PROOT]/src/a"]
        );
    }

    #[test]
    fn test_no_rules_notifies_nothing() {
        let set = RuleSet::parse("!src/").unwrap();
        assert!(notified(&set, &["src/a"]).is_empty());
    }

    #[test]
    fn test_filter_with_reports_each_file() {
        let set = RuleSet::parse("-src/\n!src/gen/").unwrap();
        let input = files(&["src/a", "src/gen/b", "c"]);
        let mut seen = Vec::new();

        let notify = RuleMatcher::for_rules(&set).filter_with(&input, |file, verdict| {
            let tag = match verdict {
                Verdict::Notify { .. } => "notify",
                Verdict::Suppressed { .. } => "suppressed",
                Verdict::Unmatched => "unmatched",
            };
            seen.push((file.relative().to_string(), tag));
        });

        assert_eq!(notify.len(), 1);
        assert_eq!(
            seen,
            vec![
                ("src/a".to_string(), "notify"),
                ("src/gen/b".to_string(), "suppressed"),
                ("c".to_string(), "unmatched"),
            ]
        );
    }
}
