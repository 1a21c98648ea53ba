//! Loosely-shaped commit records and their validation.
//!
//! Whatever a collaborator returns is deserialized into [`CommitRecord`]
//! first and only becomes a [`CommitMetadata`] after [`CommitRecord::validate`].

use crate::error::{PerfError, Result};
use crate::metadata::MetadataSource;
use crate::model::{CommitMetadata, commit_url};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Commit record as delivered by a metadata collaborator.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommitRecord {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, alias = "email")]
    pub author_email: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default, alias = "html_url")]
    pub url: Option<String>,
    #[serde(default, alias = "parent")]
    pub parent_sha: Option<String>,
}

impl CommitRecord {
    /// Check required fields and build the typed record.
    ///
    /// `date` must be RFC 3339; `url` defaults to one derived from `repo_url`.
    ///
    /// # Errors
    ///
    /// Returns `MetadataFetch` if message, author or date is missing, or the
    /// date does not parse.
    pub fn validate(self, sha: &str, repo_url: &str) -> Result<CommitMetadata> {
        let invalid = |reason: String| PerfError::MetadataFetch {
            sha: sha.to_string(),
            reason,
        };

        let message = self
            .message
            .ok_or_else(|| invalid("record has no message".to_string()))?;
        let author = non_empty(self.author)
            .ok_or_else(|| invalid("record has no author".to_string()))?;
        let date_text = self
            .date
            .ok_or_else(|| invalid("record has no date".to_string()))?;
        let date = DateTime::parse_from_rfc3339(date_text.trim())
            .map_err(|e| invalid(format!("invalid date '{date_text}': {e}")))?
            .with_timezone(&Utc);

        Ok(CommitMetadata {
            sha: sha.to_string(),
            message,
            author,
            author_email: self.author_email.unwrap_or_default(),
            date,
            url: non_empty(self.url).unwrap_or_else(|| commit_url(repo_url, sha)),
            parent_sha: non_empty(self.parent_sha),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Metadata collaborator backed by a JSON document: `{ "<sha>": { ... } }`.
///
/// Keys may be full shas or unique prefixes of them.
#[derive(Debug, Clone)]
pub struct FileMetadataSource {
    path: PathBuf,
    records: HashMap<String, CommitRecord>,
    repo_url: String,
}

impl FileMetadataSource {
    /// Load the document at `path`.
    ///
    /// # Errors
    ///
    /// Returns `MissingFile` if the document is absent, or a JSON error if it
    /// is not an object of records.
    pub fn load(path: &Path, repo_url: &str) -> Result<Self> {
        if !path.is_file() {
            return Err(PerfError::MissingFile {
                path: path.to_path_buf(),
            });
        }
        let contents = fs::read_to_string(path)?;
        let records: HashMap<String, CommitRecord> = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), records = records.len(), "Loaded metadata file");
        Ok(Self {
            path: path.to_path_buf(),
            records,
            repo_url: repo_url.to_string(),
        })
    }

    fn lookup(&self, sha: &str) -> Option<&CommitRecord> {
        if let Some(record) = self.records.get(sha) {
            return Some(record);
        }
        let mut matches = self
            .records
            .iter()
            .filter(|(key, _)| !key.is_empty() && (sha.starts_with(key.as_str()) || key.starts_with(sha)));
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(first.1)
    }
}

impl MetadataSource for FileMetadataSource {
    fn fetch(&self, sha: &str, _timeout: Duration) -> Result<CommitMetadata> {
        let record = self.lookup(sha).ok_or_else(|| PerfError::MetadataFetch {
            sha: sha.to_string(),
            reason: format!("no unique record in {}", self.path.display()),
        })?;
        record.clone().validate(sha, &self.repo_url)
    }

    fn name(&self) -> &'static str {
        "file"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const REPO: &str = "https://example.com/org/repo";

    #[test]
    fn validate_fills_url_and_parses_date() {
        let record = CommitRecord {
            message: Some("Speed up loop".to_string()),
            author: Some("dev".to_string()),
            author_email: Some("dev@example.com".to_string()),
            date: Some("2024-03-01T10:00:00+02:00".to_string()),
            url: None,
            parent_sha: Some(String::new()),
        };
        let meta = record.validate("abc123", REPO).expect("valid");
        assert_eq!(meta.url, "https://example.com/org/repo/commit/abc123");
        assert_eq!(meta.date.to_rfc3339(), "2024-03-01T08:00:00+00:00");
        assert_eq!(meta.parent_sha, None);
    }

    #[test]
    fn validate_rejects_bad_date() {
        let record = CommitRecord {
            message: Some("m".to_string()),
            author: Some("a".to_string()),
            date: Some("yesterday".to_string()),
            ..CommitRecord::default()
        };
        let err = record.validate("abc", REPO).unwrap_err();
        assert!(matches!(err, PerfError::MetadataFetch { .. }));
    }

    #[test]
    fn validate_requires_author() {
        let record = CommitRecord {
            message: Some("m".to_string()),
            author: Some("  ".to_string()),
            date: Some("2024-03-01T10:00:00Z".to_string()),
            ..CommitRecord::default()
        };
        assert!(record.validate("abc", REPO).is_err());
    }

    #[test]
    fn file_source_matches_prefixes() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("commits.json");
        fs::write(
            &path,
            r#"{
                "abc1234": {"message": "one", "author": "a", "date": "2024-01-01T00:00:00Z"},
                "def5678": {"message": "two", "author": "b", "date": "2024-01-02T00:00:00Z",
                            "html_url": "https://host/c/def5678", "parent": "abc1234"}
            }"#,
        )
        .expect("write");

        let source = FileMetadataSource::load(&path, REPO).expect("load");
        let one = source
            .fetch("abc1234ffffffff", Duration::from_secs(1))
            .expect("prefix key");
        assert_eq!(one.message, "one");
        assert_eq!(one.sha, "abc1234ffffffff");

        let two = source.fetch("def5678", Duration::from_secs(1)).expect("exact");
        assert_eq!(two.url, "https://host/c/def5678");
        assert_eq!(two.parent_sha.as_deref(), Some("abc1234"));

        assert!(source.fetch("0000000", Duration::from_secs(1)).is_err());
    }
}
