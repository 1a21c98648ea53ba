//! Show command implementation.

use crate::cli::ShowArgs;
use crate::cli::commands::{open_dataset, print_json, text_options};
use crate::compare::select_commit;
use crate::config;
use crate::error::Result;
use crate::format::{
    CommitDetails, CommitRef, format_commit_header, format_score, render_benchmarks,
};

/// Execute the show command.
///
/// # Errors
///
/// Returns an error if the dataset is missing or the sha does not select
/// exactly one commit.
pub fn execute(args: &ShowArgs, json: bool, cli: &config::CliOverrides) -> Result<()> {
    let loaded = config::load_from_cwd(cli)?;
    let settings = &loaded.settings;
    let dataset = open_dataset(settings)?;
    let commit = select_commit(&dataset, &args.sha)?;

    if json {
        let details = CommitDetails {
            commit: CommitRef::from_snapshot(commit, settings.short_sha_len),
            author_email: &commit.author_email,
            parent_sha: commit.parent_sha.as_deref(),
            benchmarks: &commit.benchmarks,
        };
        return print_json(&details);
    }

    println!("{}", format_commit_header(commit, text_options(settings)));
    println!("sha:     {}", commit.sha);
    println!("url:     {}", commit.url);
    if let Some(parent) = &commit.parent_sha {
        println!("parent:  {parent}");
    }
    println!(
        "score:   {} over {} cases",
        format_score(commit.average_score),
        commit.benchmarks.len()
    );
    println!();
    print!("{}", render_benchmarks(&commit.benchmarks));
    Ok(())
}
