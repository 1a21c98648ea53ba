//! Build command: score every result file and write the dataset.

use crate::cli::BuildArgs;
use crate::cli::commands::{print_json, should_use_color};
use crate::config::{self, Settings};
use crate::error::Result;
use crate::format::BuildSummary;
use crate::metadata::{FileMetadataSource, GitMetadataSource, MetadataSource, OfflineSource};
use crate::pipeline::snapshot::write_dataset;
use crate::pipeline::{BuildOptions, BuildOutcome, run_build};
use crate::util::progress::ProgressTracker;
use chrono::Utc;
use crossterm::style::Stylize;
use std::collections::BTreeMap;
use tracing::info;

/// Execute the build command.
///
/// # Errors
///
/// Returns an error if configuration is invalid, an input file is missing,
/// the reference table has a short row, or the dataset cannot be written.
pub fn execute(args: &BuildArgs, json: bool, cli: &config::CliOverrides) -> Result<()> {
    let loaded = config::load_from_cwd(cli)?;
    let settings = &loaded.settings;

    let source = select_source(args, settings)?;
    info!(source = source.name(), "Using metadata source");

    let options = BuildOptions {
        reference: settings.reference_file.clone(),
        results_dir: settings.results_dir.clone(),
        extension: settings.results_extension.clone(),
        fetch: settings.fetch_options(),
    };

    let progress = ProgressTracker::new(0, "Fetching commit metadata", !json);
    let outcome = run_build(&options, source.as_ref(), Utc::now(), Some(&progress))?;
    progress.finish_and_clear();

    write_dataset(&outcome.dataset, &settings.output)?;

    let summary = summarize(&outcome, settings, source.name());
    if json {
        print_json(&summary)?;
    } else {
        print_summary(&summary, should_use_color());
    }
    Ok(())
}

fn select_source(args: &BuildArgs, settings: &Settings) -> Result<Box<dyn MetadataSource>> {
    if args.no_fetch {
        return Ok(Box::new(OfflineSource));
    }
    if let Some(path) = &settings.metadata_file {
        return Ok(Box::new(FileMetadataSource::load(path, &settings.repo_url)?));
    }
    Ok(Box::new(GitMetadataSource::new(
        &settings.repo_path,
        &settings.repo_url,
    )))
}

fn summarize(outcome: &BuildOutcome, settings: &Settings, source: &'static str) -> BuildSummary {
    let mut warning_counts = BTreeMap::new();
    for warning in &outcome.report.warnings {
        *warning_counts.entry(warning.code.as_str()).or_insert(0) += 1;
    }

    BuildSummary {
        output: settings.output.clone(),
        commits: outcome.dataset.commits.len(),
        cases: outcome.dataset.best_times.len(),
        metadata_source: source,
        fallback_commits: outcome
            .dataset
            .commits
            .iter()
            .filter(|c| c.has_fallback_metadata())
            .count(),
        warning_counts,
        warnings: outcome.report.warnings.clone(),
    }
}

fn print_summary(summary: &BuildSummary, use_color: bool) {
    let headline = format!(
        "Wrote {} commits ({} reference cases) to {}",
        summary.commits,
        summary.cases,
        summary.output.display()
    );
    if use_color {
        println!("{}", headline.green());
    } else {
        println!("{headline}");
    }

    if summary.fallback_commits > 0 {
        println!(
            "{} commits have placeholder metadata (source: {})",
            summary.fallback_commits, summary.metadata_source
        );
    }

    if summary.warnings.is_empty() {
        return;
    }
    let counts: Vec<String> = summary
        .warning_counts
        .iter()
        .map(|(code, count)| format!("{code}={count}"))
        .collect();
    let line = format!(
        "{} warnings: {}",
        summary.warnings.len(),
        counts.join(", ")
    );
    if use_color {
        println!("{}", line.yellow());
    } else {
        println!("{line}");
    }
}
