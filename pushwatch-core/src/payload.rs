//! Push payload extraction

use crate::{CheckError, PROJECT_ROOT, Result};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// A changed path, re-rooted under [`PROJECT_ROOT`]
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ChangedFile(String);

impl ChangedFile {
    /// Re-root a repository-relative path
    pub fn rooted(path: &str) -> Self {
        Self(format!("{}/{}", PROJECT_ROOT, path))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Path with the project-root sentinel removed
    pub fn relative(&self) -> &str {
        self.0
            .strip_prefix(PROJECT_ROOT)
            .and_then(|p| p.strip_prefix('/'))
            .unwrap_or(&self.0)
    }
}

impl fmt::Display for ChangedFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ChangedFile {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Deserialize)]
struct PushEvent {
    repository: Option<Repository>,
    commits: Option<Vec<Commit>>,
}

#[derive(Debug, Deserialize)]
struct Repository {
    full_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Commit {
    added: Option<Vec<String>>,
    modified: Option<Vec<String>>,
    removed: Option<Vec<String>>,
}

/// Per-request data extracted from a push payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushContext {
    /// `repository.full_name`
    pub repository: String,
    /// Number of commits in the push
    pub commits: usize,
    /// Changed paths in commit order, then added/modified/removed order
    pub files: Vec<ChangedFile>,
}

impl PushContext {
    /// Parse a JSON push payload
    pub fn extract(body: &[u8]) -> Result<Self> {
        let event: PushEvent = serde_json::from_slice(body)?;

        let repository = event
            .repository
            .and_then(|r| r.full_name)
            .filter(|name| !name.is_empty())
            .ok_or(CheckError::PayloadMissingRepository)?;

        let commits = event.commits.unwrap_or_default();
        let files = commits
            .iter()
            .flat_map(|commit| {
                [&commit.added, &commit.modified, &commit.removed]
                    .into_iter()
                    .flatten()
                    .flatten()
            })
            .map(|path| ChangedFile::rooted(path))
            .collect();

        Ok(Self {
            repository,
            commits: commits.len(),
            files,
        })
    }
}

/// Unwrap a form-encoded webhook body (`payload=<urlencoded json>`)
///
/// Bodies not starting with `payload=` are returned unchanged.
pub fn unwrap_form_body(body: &[u8]) -> Result<Cow<'_, [u8]>> {
    if !body.starts_with(b"payload=") {
        return Ok(Cow::Borrowed(body));
    }

    let fields: Vec<(String, String)> = serde_urlencoded::from_bytes(body)
        .map_err(|e| CheckError::PayloadParse(format!("form body: {}", e)))?;

    fields
        .into_iter()
        .find(|(key, _)| key == "payload")
        .map(|(_, value)| Cow::Owned(value.into_bytes()))
        .ok_or_else(|| CheckError::PayloadParse("form body has no payload field".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: serde_json::Value) -> Vec<u8> {
        serde_json::to_vec(&value).unwrap()
    }

    #[test]
    fn test_extract_order() {
        let payload = body(json!({
            "repository": {"full_name": "acme/app"},
            "commits": [
                {"id": "1", "added": ["a"], "modified": ["b", "c"], "removed": ["d"]},
                {"id": "2", "added": ["e"], "modified": [], "removed": ["a"]}
            ]
        }));

        let ctx = PushContext::extract(&payload).unwrap();
        assert_eq!(ctx.repository, "acme/app");
        assert_eq!(ctx.commits, 2);
        let files: Vec<&str> = ctx.files.iter().map(ChangedFile::as_str).collect();
        assert_eq!(
            files,
            vec![
                "[PROOT]/a",
                "[PROOT]/b",
                "[PROOT]/c",
                "[PROOT]/d",
                "[PROOT]/e",
                "[PROOT]/a"
            ]
        );
    }

    #[test]
    fn test_missing_lists_are_empty() {
        let payload = body(json!({
            "repository": {"full_name": "acme/app"},
            "commits": [{"id": "1", "modified": ["x"], "removed": null}]
        }));

        let ctx = PushContext::extract(&payload).unwrap();
        assert_eq!(ctx.files, vec![ChangedFile::rooted("x")]);
    }

    #[test]
    fn test_empty_and_absent_commits() {
        let empty = body(json!({"repository": {"full_name": "acme/app"}, "commits": []}));
        assert!(PushContext::extract(&empty).unwrap().files.is_empty());

        let absent = body(json!({"repository": {"full_name": "acme/app"}}));
        let ctx = PushContext::extract(&absent).unwrap();
        assert_eq!(ctx.commits, 0);
        assert!(ctx.files.is_empty());
    }

    #[test]
    fn test_malformed_json() {
        let err = PushContext::extract(b"{not json").unwrap_err();
        assert!(matches!(err, CheckError::PayloadParse(_)));

        let err = PushContext::extract(b"[1, 2]").unwrap_err();
        assert!(matches!(err, CheckError::PayloadParse(_)));
    }

    #[test]
    fn test_missing_repository() {
        for value in [
            json!({"commits": []}),
            json!({"repository": {}}),
            json!({"repository": {"full_name": ""}}),
            json!({"repository": null}),
        ] {
            assert_eq!(
                PushContext::extract(&body(value)).unwrap_err(),
                CheckError::PayloadMissingRepository
            );
        }
    }

    #[test]
    fn test_changed_file_relative() {
        let file = ChangedFile::rooted("src/lib.rs");
        assert_eq!(file.as_str(), "[PROOT]/src/lib.rs");
        assert_eq!(file.relative(), "src/lib.rs");
        assert_eq!(file.to_string(), "[PROOT]/src/lib.rs");
    }

    #[test]
    fn test_unwrap_form_body() {
        let raw = b"payload=%7B%22a%22%3A+1%7D";
        let unwrapped = unwrap_form_body(raw).unwrap();
        assert_eq!(&*unwrapped, br#"{"a": 1}"#);

        let json = br#"{"a": 1}"#;
        assert!(matches!(unwrap_form_body(json).unwrap(), Cow::Borrowed(_)));
    }
}
