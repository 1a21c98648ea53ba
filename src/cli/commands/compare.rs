//! Compare command: join two commits and print the ordered rows.

use crate::cli::commands::{open_dataset, print_json, text_options};
use crate::cli::{CompareArgs, CompareFormat};
use crate::compare::{
    ComparisonSummary, compare, parse_share_query, select_commit, share_query,
};
use crate::config;
use crate::error::{PerfError, Result};
use crate::format::{
    ClassifiedRow, CommitRef, CompareOutput, csv, format_commit_header, format_summary_line,
    render_comparison_table,
};
use crate::model::{ComparisonRow, SortDirection, SortKey};
use std::io::{self, Write};
use tracing::info;

/// Execute the compare command.
///
/// # Errors
///
/// Returns an error if the sort key is unknown, the dataset is missing, or
/// either commit cannot be selected.
pub fn execute(args: &CompareArgs, json: bool, cli: &config::CliOverrides) -> Result<()> {
    let key: SortKey = args.sort.parse()?;
    let direction = if args.desc {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    let (base_prefix, head_prefix) = resolve_prefixes(args)?;

    let loaded = config::load_from_cwd(cli)?;
    let settings = &loaded.settings;
    let dataset = open_dataset(settings)?;

    let base = select_commit(&dataset, &base_prefix)?;
    let head = select_commit(&dataset, &head_prefix)?;

    let result = compare(base, head, key, direction);
    let rows: Vec<&ComparisonRow> = result.rows.iter().collect();
    let thresholds = settings.thresholds;
    let summary = ComparisonSummary::from_rows(rows.iter().copied(), &thresholds);
    let query = share_query(&dataset, base, head, settings.short_sha_len);
    info!(
        base = %base.sha,
        head = %head.sha,
        joined = rows.len(),
        sort = %key,
        "Compared commits"
    );

    let format = if json { CompareFormat::Json } else { args.format };
    match format {
        CompareFormat::Json => {
            let output = CompareOutput {
                base: CommitRef::from_snapshot(base, settings.short_sha_len),
                head: CommitRef::from_snapshot(head, settings.short_sha_len),
                sort: key,
                direction,
                share_query: query,
                thresholds,
                summary,
                avg_relative_change: result.avg_relative_change,
                rows: rows
                    .iter()
                    .map(|&row| ClassifiedRow {
                        row,
                        class: thresholds.classify(row),
                        score_moved: thresholds.score_moved(row),
                    })
                    .collect(),
            };
            print_json(&output)?;
        }
        CompareFormat::Csv => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            csv::write_comparison_csv(&mut handle, &rows, &thresholds)?;
            handle.flush()?;
        }
        CompareFormat::Text => {
            let options = text_options(settings);
            println!("base: {}", format_commit_header(base, options));
            println!("head: {}", format_commit_header(head, options));
            println!();
            if rows.is_empty() {
                println!("No cases in common.");
            } else {
                print!(
                    "{}",
                    render_comparison_table(&rows, &thresholds, options)
                );
            }
            println!();
            println!(
                "{}",
                format_summary_line(&summary, result.avg_relative_change)
            );
            println!("Share: {query}");
        }
    }

    Ok(())
}

/// Commit prefixes from positionals or `--link`.
fn resolve_prefixes(args: &CompareArgs) -> Result<(String, String)> {
    if let Some(link) = &args.link {
        return parse_share_query(link).ok_or_else(|| {
            PerfError::validation("link", "expected a query with both base= and compare=")
        });
    }
    match (&args.base, &args.head) {
        (Some(base), Some(head)) => Ok((base.clone(), head.clone())),
        _ => Err(PerfError::validation(
            "commits",
            "provide BASE and HEAD, or --link",
        )),
    }
}
