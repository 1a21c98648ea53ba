//! Core data types for `perfboard`.
//!
//! This module defines the fundamental types used throughout the application:
//! - `ReferenceEntry` - Best recorded time for a case
//! - `BenchmarkResult` - One scored case in one commit
//! - `CommitMetadata` - Validated commit record from the metadata source
//! - `CommitSnapshot` - All scored results for one commit
//! - `Dataset` - The persisted artifact
//! - `ComparisonRow` - One joined case across two commits
//! - `SortKey` / `SortDirection` - Comparison ordering

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Substitute for a zero best time when scoring non-zero runtimes.
pub const EPSILON: f64 = 0.0001;

/// Sentinel used for every unknown text field of a fallback commit record.
pub const UNKNOWN: &str = "Unknown";

fn is_fallback_identity(message: &str, author: &str, parent_sha: Option<&String>) -> bool {
    author == UNKNOWN && message == UNKNOWN && parent_sha.is_none()
}

/// Best recorded time for one case.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ReferenceEntry {
    /// Ordinal id; stable across commits for the same case name.
    pub id: i64,
    /// Best time used as the normalization denominator (0 remapped to epsilon).
    pub best_time: f64,
    /// Best time exactly as recorded, possibly 0.
    pub original_best_time: f64,
}

impl ReferenceEntry {
    #[must_use]
    pub fn new(id: i64, recorded_best_time: f64) -> Self {
        let best_time = if recorded_best_time == 0.0 {
            EPSILON
        } else {
            recorded_best_time
        };
        Self {
            id,
            best_time,
            original_best_time: recorded_best_time,
        }
    }
}

/// Reference table keyed by case name.
pub type ReferenceTable = BTreeMap<String, ReferenceEntry>;

/// One scored case in one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct BenchmarkResult {
    pub id: i64,
    pub name: String,
    pub runtime: f64,
    pub best_time: f64,
    pub score: f64,
    pub status: String,
}

/// Commit record supplied by the metadata source.
///
/// Either populated from a real lookup or built with [`CommitMetadata::fallback`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CommitMetadata {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
    pub url: String,
    pub parent_sha: Option<String>,
}

impl CommitMetadata {
    /// Default record used when the metadata lookup fails.
    ///
    /// The sha is known; every other text field is [`UNKNOWN`], the date is the
    /// Unix epoch and the url is synthesized from `repo_url`.
    #[must_use]
    pub fn fallback(sha: &str, repo_url: &str) -> Self {
        Self {
            sha: sha.to_string(),
            message: UNKNOWN.to_string(),
            author: UNKNOWN.to_string(),
            author_email: UNKNOWN.to_string(),
            date: DateTime::UNIX_EPOCH,
            url: commit_url(repo_url, sha),
            parent_sha: None,
        }
    }

    /// Whether this record is the fallback rather than a real lookup.
    #[must_use]
    pub fn is_fallback(&self) -> bool {
        is_fallback_identity(&self.message, &self.author, self.parent_sha.as_ref())
    }
}

/// Build the web url of a commit from the repository base url.
#[must_use]
pub fn commit_url(repo_url: &str, sha: &str) -> String {
    format!("{}/commit/{sha}", repo_url.trim_end_matches('/'))
}

/// All scored results for one commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CommitSnapshot {
    pub sha: String,
    pub message: String,
    pub author: String,
    pub author_email: String,
    pub date: DateTime<Utc>,
    pub url: String,
    pub parent_sha: Option<String>,
    pub average_score: f64,
    /// Ordered by id ascending.
    pub benchmarks: Vec<BenchmarkResult>,
}

impl CommitSnapshot {
    /// Short form of the sha used in listings and shareable links.
    #[must_use]
    pub fn short_sha(&self, len: usize) -> &str {
        let end = self
            .sha
            .char_indices()
            .nth(len)
            .map_or(self.sha.len(), |(idx, _)| idx);
        &self.sha[..end]
    }

    /// Whether the metadata is the fallback record.
    #[must_use]
    pub fn has_fallback_metadata(&self) -> bool {
        is_fallback_identity(&self.message, &self.author, self.parent_sha.as_ref())
    }

    /// First line of the commit message.
    #[must_use]
    pub fn summary(&self) -> &str {
        self.message.lines().next().unwrap_or("")
    }
}

/// The persisted artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    /// Ordered by date ascending.
    pub commits: Vec<CommitSnapshot>,
    pub best_times: ReferenceTable,
    pub generated_at: DateTime<Utc>,
}

/// One case joined across two commits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonRow {
    pub id: i64,
    pub name: String,
    pub best_time: f64,
    pub left_time: f64,
    pub right_time: f64,
    pub absolute_change: f64,
    /// Percent change relative to the left time; `None` when the left time is 0.
    pub relative_change: Option<f64>,
    pub left_score: f64,
    pub right_score: f64,
}

/// Column a comparison can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    Id,
    LeftTime,
    RightTime,
    AbsoluteChange,
    RelativeChange,
    LeftScore,
    RightScore,
}

impl SortKey {
    pub const ALL: [Self; 7] = [
        Self::Id,
        Self::LeftTime,
        Self::RightTime,
        Self::AbsoluteChange,
        Self::RelativeChange,
        Self::LeftScore,
        Self::RightScore,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::LeftTime => "left_time",
            Self::RightTime => "right_time",
            Self::AbsoluteChange => "absolute_change",
            Self::RelativeChange => "relative_change",
            Self::LeftScore => "left_score",
            Self::RightScore => "right_score",
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SortKey {
    type Err = crate::error::PerfError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase().replace('-', "_");
        match normalized.as_str() {
            "id" => Ok(Self::Id),
            "left_time" | "left" | "base_time" => Ok(Self::LeftTime),
            "right_time" | "right" | "compare_time" => Ok(Self::RightTime),
            "absolute_change" | "abs" => Ok(Self::AbsoluteChange),
            "relative_change" | "rel" => Ok(Self::RelativeChange),
            "left_score" => Ok(Self::LeftScore),
            "right_score" => Ok(Self::RightScore),
            _ => Err(crate::error::PerfError::InvalidSortKey {
                key: s.to_string(),
            }),
        }
    }
}

/// Ordering direction for a comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    #[must_use]
    pub const fn reversed(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_best_time_is_remapped_but_recorded() {
        let entry = ReferenceEntry::new(3, 0.0);
        assert!((entry.best_time - EPSILON).abs() < f64::EPSILON);
        assert!(entry.original_best_time.abs() < f64::EPSILON);

        let entry = ReferenceEntry::new(4, 1.5);
        assert!((entry.best_time - 1.5).abs() < f64::EPSILON);
    }

    #[test]
    fn fallback_metadata_uses_sentinels() {
        let meta = CommitMetadata::fallback("abc123", "https://example.com/org/repo/");
        assert_eq!(meta.sha, "abc123");
        assert_eq!(meta.author, UNKNOWN);
        assert_eq!(meta.url, "https://example.com/org/repo/commit/abc123");
        assert_eq!(meta.date.timestamp(), 0);
        assert!(meta.is_fallback());
    }

    fn snapshot_from(meta: CommitMetadata) -> CommitSnapshot {
        CommitSnapshot {
            sha: meta.sha,
            message: meta.message,
            author: meta.author,
            author_email: meta.author_email,
            date: meta.date,
            url: meta.url,
            parent_sha: meta.parent_sha,
            average_score: 0.0,
            benchmarks: Vec::new(),
        }
    }

    #[test]
    fn snapshot_and_record_agree_on_fallback() {
        let fallback = CommitMetadata::fallback("abc123", "https://example.com/org/repo");
        assert!(fallback.is_fallback());
        assert!(snapshot_from(fallback).has_fallback_metadata());

        let mut real = CommitMetadata::fallback("def456", "https://example.com/org/repo");
        real.parent_sha = Some("abc123".to_string());
        assert!(!real.is_fallback());
        assert!(!snapshot_from(real).has_fallback_metadata());
    }

    #[test]
    fn direction_reverses() {
        assert_eq!(SortDirection::default().reversed(), SortDirection::Descending);
        assert_eq!(SortDirection::Descending.reversed(), SortDirection::Ascending);
    }

    #[test]
    fn sort_key_parses_aliases() {
        assert_eq!("relative-change".parse::<SortKey>().unwrap(), SortKey::RelativeChange);
        assert_eq!("abs".parse::<SortKey>().unwrap(), SortKey::AbsoluteChange);
        assert!("speed".parse::<SortKey>().is_err());
        for key in SortKey::ALL {
            assert_eq!(key.as_str().parse::<SortKey>().unwrap(), key);
        }
    }

    #[test]
    fn short_sha_truncates() {
        let snapshot = CommitSnapshot {
            sha: "0123456789abcdef".to_string(),
            message: "Speed up loop\n\nDetails".to_string(),
            author: "dev".to_string(),
            author_email: "dev@example.com".to_string(),
            date: Utc::now(),
            url: String::new(),
            parent_sha: None,
            average_score: 0.0,
            benchmarks: Vec::new(),
        };
        assert_eq!(snapshot.short_sha(7), "0123456");
        assert_eq!(snapshot.short_sha(64), "0123456789abcdef");
        assert_eq!(snapshot.summary(), "Speed up loop");
    }

    #[test]
    fn sort_key_serializes_snake_case() {
        let json = serde_json::to_string(&SortKey::LeftScore).unwrap();
        assert_eq!(json, "\"left_score\"");
    }
}
