use crate::compare::{ChangeClass, ChangeThresholds, ComparisonSummary};
use crate::model::{BenchmarkResult, CommitSnapshot, ComparisonRow, SortDirection, SortKey};
use crate::pipeline::IngestWarning;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Commit identity without its benchmarks.
#[derive(Debug, Clone, Serialize)]
pub struct CommitRef {
    pub sha: String,
    pub short_sha: String,
    pub message: String,
    pub author: String,
    pub date: DateTime<Utc>,
    pub url: String,
    pub average_score: f64,
}

impl CommitRef {
    #[must_use]
    pub fn from_snapshot(commit: &CommitSnapshot, short_sha_len: usize) -> Self {
        Self {
            sha: commit.sha.clone(),
            short_sha: commit.short_sha(short_sha_len).to_string(),
            message: commit.summary().to_string(),
            author: commit.author.clone(),
            date: commit.date,
            url: commit.url.clone(),
            average_score: commit.average_score,
        }
    }
}

/// Comparison row with its presentation class.
#[derive(Debug, Clone, Serialize)]
pub struct ClassifiedRow<'a> {
    #[serde(flatten)]
    pub row: &'a ComparisonRow,
    pub class: ChangeClass,
    pub score_moved: bool,
}

/// JSON output of `compare`.
#[derive(Debug, Clone, Serialize)]
pub struct CompareOutput<'a> {
    pub base: CommitRef,
    pub head: CommitRef,
    pub sort: SortKey,
    pub direction: SortDirection,
    pub share_query: String,
    pub thresholds: ChangeThresholds,
    pub summary: ComparisonSummary,
    pub avg_relative_change: f64,
    pub rows: Vec<ClassifiedRow<'a>>,
}

/// Entry of `list` JSON output.
#[derive(Debug, Clone, Serialize)]
pub struct CommitListEntry {
    #[serde(flatten)]
    pub commit: CommitRef,
    pub benchmark_count: usize,
}

/// JSON output of `show`.
#[derive(Debug, Clone, Serialize)]
pub struct CommitDetails<'a> {
    #[serde(flatten)]
    pub commit: CommitRef,
    pub author_email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_sha: Option<&'a str>,
    pub benchmarks: &'a [BenchmarkResult],
}

/// JSON output of `build`.
#[derive(Debug, Clone, Serialize)]
pub struct BuildSummary {
    pub output: PathBuf,
    pub commits: usize,
    pub cases: usize,
    pub metadata_source: &'static str,
    pub fallback_commits: usize,
    pub warning_counts: BTreeMap<&'static str, usize>,
    pub warnings: Vec<IngestWarning>,
}
