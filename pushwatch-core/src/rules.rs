//! Rule configuration language
//!
//! A config is a list of one-directive-per-line entries:
//!
//! ```text
//! ; metadata first
//! @secret = s3cret
//! @email = team@example.com
//! # then rules, each optionally refined by exceptions
//! -/src/
//! !/src/generated/
//! -README
//! ```
//!
//! Rules and exceptions starting with `/` are anchored to [`PROJECT_ROOT`].

use crate::{CheckError, ParseErrorKind, Result};
use std::collections::BTreeMap;
use std::fmt;

/// Sentinel standing in for the repository root in rules and changed paths
pub const PROJECT_ROOT: &str = "[PROOT]";

/// Default upper bound on config content, in bytes
pub const DEFAULT_MAX_CONFIG_LEN: usize = 10_000;

/// How malformed lines are handled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ParseMode {
    /// Abort on the first malformed line
    #[default]
    Strict,

    /// Skip malformed lines and record them in [`RuleSet::skipped`]
    Lenient,
}

/// A substring pattern from a `-` or `!` line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    text: String,
    line: usize,
}

/// A pattern that qualifies a path for notification
pub type Rule = Pattern;

/// A pattern that suppresses a path already matched by a rule
pub type Exception = Pattern;

impl Pattern {
    /// Build a pattern, anchoring it to [`PROJECT_ROOT`] when it starts with `/`
    pub fn new(text: &str, line: usize) -> Self {
        let text = if text.starts_with('/') {
            format!("{}{}", PROJECT_ROOT, text)
        } else {
            text.to_string()
        };
        Self { text, line }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// 1-based config line the pattern was read from
    pub fn line(&self) -> usize {
        self.line
    }

    /// Substring match against a re-rooted path
    pub fn matches(&self, path: &str) -> bool {
        path.contains(self.text.as_str())
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// Key/value data from the `@` section
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Metadata {
    entries: BTreeMap<String, String>,
}

impl Metadata {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a value, replacing any earlier value for the key
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Look up a key, falling back to `default`
    pub fn get<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.entries.get(key).map(String::as_str).unwrap_or(default)
    }

    pub fn get_opt(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Shared HMAC secret; an empty value counts as absent
    pub fn secret(&self) -> Option<&str> {
        self.get_opt("secret").filter(|s| !s.is_empty())
    }

    /// Alert destination; an empty value counts as absent
    pub fn email(&self) -> Option<&str> {
        self.get_opt("email").filter(|s| !s.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl fmt::Debug for Metadata {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for (key, value) in &self.entries {
            if key == "secret" {
                map.entry(key, &"<redacted>");
            } else {
                map.entry(key, value);
            }
        }
        map.finish()
    }
}

/// One classified config line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive<'a> {
    Blank,
    Comment,
    Metadata { key: &'a str, value: &'a str },
    Rule(&'a str),
    Exception(&'a str),
    Invalid(ParseErrorKind),
}

/// Classify a single raw line by its first non-whitespace character
pub fn classify(line: &str) -> Directive<'_> {
    let line = line.trim();
    let mut chars = line.chars();
    let Some(marker) = chars.next() else {
        return Directive::Blank;
    };
    let rest = chars.as_str().trim();

    match marker {
        ';' | '#' => Directive::Comment,
        _ if rest.is_empty() => Directive::Invalid(ParseErrorKind::EmptyDirective(marker)),
        '@' => match rest.split_once('=') {
            None => Directive::Invalid(ParseErrorKind::MalformedMetadata(
                "expected key=value".to_string(),
            )),
            Some((key, _)) if key.trim().is_empty() => {
                Directive::Invalid(ParseErrorKind::MalformedMetadata("missing key".to_string()))
            }
            Some((key, value)) => Directive::Metadata {
                key: key.trim(),
                value: value.trim(),
            },
        },
        '-' => Directive::Rule(rest),
        '!' => Directive::Exception(rest),
        other => Directive::Invalid(ParseErrorKind::UnrecognizedLine(other)),
    }
}

/// A line dropped by [`ParseMode::Lenient`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    pub line: usize,
    pub reason: ParseErrorKind,
}

/// Counters describing a loaded rule set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuleSetStats {
    pub lines: usize,
    pub rules: usize,
    pub exceptions: usize,
    pub metadata: usize,
    pub skipped: usize,
}

/// Parsed, immutable rules, exceptions and metadata
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RuleSet {
    rules: Vec<Rule>,
    exceptions: Vec<Exception>,
    metadata: Metadata,
    skipped: Vec<SkippedLine>,
    lines: usize,
}

impl RuleSet {
    /// Parse with the strict parser and the default size bound
    pub fn parse(text: &str) -> Result<Self> {
        RuleSetParser::new().parse(text)
    }

    pub fn parser() -> RuleSetParser {
        RuleSetParser::new()
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    pub fn exceptions(&self) -> &[Exception] {
        &self.exceptions
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn skipped(&self) -> &[SkippedLine] {
        &self.skipped
    }

    pub fn stats(&self) -> RuleSetStats {
        RuleSetStats {
            lines: self.lines,
            rules: self.rules.len(),
            exceptions: self.exceptions.len(),
            metadata: self.metadata.len(),
            skipped: self.skipped.len(),
        }
    }
}

/// Configurable config parser
#[derive(Debug, Clone, Copy)]
pub struct RuleSetParser {
    mode: ParseMode,
    max_len: usize,
}

impl Default for RuleSetParser {
    fn default() -> Self {
        Self {
            mode: ParseMode::Strict,
            max_len: DEFAULT_MAX_CONFIG_LEN,
        }
    }
}

impl RuleSetParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the malformed-line policy
    pub fn mode(mut self, mode: ParseMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the maximum accepted content length in bytes
    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = max_len;
        self
    }

    /// Parse config text into a [`RuleSet`]
    pub fn parse(&self, text: &str) -> Result<RuleSet> {
        if text.len() > self.max_len {
            return Err(CheckError::ConfigTooLarge {
                len: text.len(),
                max: self.max_len,
            });
        }

        let mut builder = RuleSetBuilder::default();
        for (index, raw) in text.split('\n').enumerate() {
            let line = index + 1;
            if let Err(kind) = builder.apply(line, classify(raw)) {
                match self.mode {
                    ParseMode::Strict => return Err(CheckError::ConfigParse { line, kind }),
                    ParseMode::Lenient => builder.skipped.push(SkippedLine { line, reason: kind }),
                }
            }
            builder.lines = line;
        }

        Ok(builder.finish())
    }
}

#[derive(Default)]
struct RuleSetBuilder {
    rules: Vec<Rule>,
    exceptions: Vec<Exception>,
    metadata: Metadata,
    skipped: Vec<SkippedLine>,
    metadata_closed: bool,
    lines: usize,
}

impl RuleSetBuilder {
    fn apply(
        &mut self,
        line: usize,
        directive: Directive<'_>,
    ) -> std::result::Result<(), ParseErrorKind> {
        match directive {
            Directive::Blank | Directive::Comment => Ok(()),
            Directive::Metadata { key, value } => {
                if self.metadata_closed {
                    return Err(ParseErrorKind::DuplicateMetadata);
                }
                self.metadata.insert(key, value);
                Ok(())
            }
            Directive::Rule(text) => {
                self.metadata_closed = true;
                self.rules.push(Pattern::new(text, line));
                Ok(())
            }
            Directive::Exception(text) => {
                self.metadata_closed = true;
                let exception = Pattern::new(text, line);
                if let Some(rule) = self.rules.last() {
                    if !exception.as_str().starts_with(rule.as_str()) {
                        return Err(ParseErrorKind::OrphanedException {
                            exception: exception.text,
                            rule: rule.text.clone(),
                        });
                    }
                }
                self.exceptions.push(exception);
                Ok(())
            }
            Directive::Invalid(kind) => {
                if matches!(kind, ParseErrorKind::UnrecognizedLine(_)) {
                    self.metadata_closed = true;
                }
                Err(kind)
            }
        }
    }

    fn finish(self) -> RuleSet {
        RuleSet {
            rules: self.rules,
            exceptions: self.exceptions,
            metadata: self.metadata,
            skipped: self.skipped,
            lines: self.lines,
        }
    }
}
