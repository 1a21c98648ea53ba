//! Commit selection by sha prefix, and shareable comparison links.

use crate::error::{PerfError, Result};
use crate::model::{CommitSnapshot, Dataset};
use regex::Regex;
use std::sync::LazyLock;

static SHARE_PARAM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|[?&])(base|compare)=([^&#\s]+)").expect("share query regex")
});

/// Find the commit whose sha equals or starts with `prefix`.
///
/// An exact match wins over prefix matches.
///
/// # Errors
///
/// Returns `CommitNotFound` when nothing matches and `AmbiguousCommit` when
/// several commits share the prefix.
pub fn select_commit<'a>(dataset: &'a Dataset, prefix: &str) -> Result<&'a CommitSnapshot> {
    let prefix = prefix.trim();
    if prefix.is_empty() {
        return Err(PerfError::validation("commit", "sha prefix cannot be empty"));
    }

    if let Some(exact) = dataset.commits.iter().find(|c| c.sha == prefix) {
        return Ok(exact);
    }

    let lowered = prefix.to_lowercase();
    let matches: Vec<&CommitSnapshot> = dataset
        .commits
        .iter()
        .filter(|c| c.sha.to_lowercase().starts_with(&lowered))
        .collect();

    match matches.as_slice() {
        [] => Err(PerfError::CommitNotFound {
            prefix: prefix.to_string(),
            known: dataset.commits.iter().map(|c| c.sha.clone()).collect(),
        }),
        [single] => Ok(*single),
        many => Err(PerfError::AmbiguousCommit {
            prefix: prefix.to_string(),
            matches: many.iter().map(|c| c.sha.clone()).collect(),
        }),
    }
}

/// Shortest prefix of `commit.sha`, at least `min_len` long, that selects
/// exactly `commit` from `dataset`.
#[must_use]
pub fn unique_prefix<'a>(dataset: &Dataset, commit: &'a CommitSnapshot, min_len: usize) -> &'a str {
    let total = commit.sha.chars().count();
    (min_len.max(1)..total)
        .map(|len| commit.short_sha(len))
        .find(|prefix| {
            select_commit(dataset, prefix).is_ok_and(|found| found.sha == commit.sha)
        })
        .unwrap_or(commit.sha.as_str())
}

/// Query string selecting a base and a compare commit by sha prefix.
///
/// Each prefix is lengthened past `short_len` until it is unique in `dataset`.
#[must_use]
pub fn share_query(
    dataset: &Dataset,
    base: &CommitSnapshot,
    compare: &CommitSnapshot,
    short_len: usize,
) -> String {
    format!(
        "?base={}&compare={}",
        unique_prefix(dataset, base, short_len),
        unique_prefix(dataset, compare, short_len)
    )
}

/// Extract `(base, compare)` prefixes from a query string or full url.
///
/// Returns `None` unless both parameters are present.
#[must_use]
pub fn parse_share_query(query: &str) -> Option<(String, String)> {
    let mut base = None;
    let mut compare = None;
    for caps in SHARE_PARAM_RE.captures_iter(query) {
        let value = caps[2].to_string();
        match &caps[1] {
            "base" => base = Some(value),
            _ => compare = Some(value),
        }
    }
    Some((base?, compare?))
}
