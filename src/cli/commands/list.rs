//! List command: commits of a dataset, newest first.

use crate::cli::ListArgs;
use crate::cli::commands::{open_dataset, print_json, text_options};
use crate::config;
use crate::error::{PerfError, Result};
use crate::format::{CommitListEntry, CommitRef, render_commit_list};
use crate::model::{CommitSnapshot, Dataset};
use crate::util::time::parse_flexible_timestamp;
use chrono::{DateTime, Utc};

/// Execute the list command.
///
/// # Errors
///
/// Returns an error if the dataset is missing or a time filter does not parse.
pub fn execute(args: &ListArgs, json: bool, cli: &config::CliOverrides) -> Result<()> {
    let since = args
        .since
        .as_deref()
        .map(|s| parse_flexible_timestamp(s, "since"))
        .transpose()?;
    let until = args
        .until
        .as_deref()
        .map(|s| parse_flexible_timestamp(s, "until"))
        .transpose()?;
    if let (Some(since), Some(until)) = (since, until) {
        if since > until {
            return Err(PerfError::validation("since", "must not be after --until"));
        }
    }

    let loaded = config::load_from_cwd(cli)?;
    let settings = &loaded.settings;
    let dataset = open_dataset(settings)?;
    let commits = select_commits(&dataset, since, until, args.limit);

    if json {
        let entries: Vec<CommitListEntry> = commits
            .iter()
            .map(|commit| CommitListEntry {
                commit: CommitRef::from_snapshot(commit, settings.short_sha_len),
                benchmark_count: commit.benchmarks.len(),
            })
            .collect();
        return print_json(&entries);
    }

    if commits.is_empty() {
        println!("No commits.");
        return Ok(());
    }
    print!("{}", render_commit_list(&commits, text_options(settings)));
    Ok(())
}

/// Commits within `[since, until]`, newest first, at most `limit`.
fn select_commits(
    dataset: &Dataset,
    since: Option<DateTime<Utc>>,
    until: Option<DateTime<Utc>>,
    limit: Option<usize>,
) -> Vec<&CommitSnapshot> {
    dataset
        .commits
        .iter()
        .rev()
        .filter(|c| since.is_none_or(|t| c.date >= t))
        .filter(|c| until.is_none_or(|t| c.date <= t))
        .take(limit.unwrap_or(usize::MAX))
        .collect()
}
