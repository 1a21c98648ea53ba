//! Version command implementation.

use crate::cli::commands::print_json;
use crate::error::Result;
use serde::Serialize;

#[derive(Serialize)]
struct VersionOutput<'a> {
    version: &'a str,
    build: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    commit: Option<&'a str>,
}

/// Execute the version command.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn execute(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    let build = if cfg!(debug_assertions) {
        "dev"
    } else {
        "release"
    };
    let commit = option_env!("PERFBOARD_GIT_SHA").filter(|s| !s.trim().is_empty());

    if json {
        return print_json(&VersionOutput {
            version,
            build,
            commit,
        });
    }

    match commit {
        Some(commit) => {
            let short = &commit[..commit.len().min(7)];
            println!("perfboard version {version} ({build}, {short})");
        }
        None => println!("perfboard version {version} ({build})"),
    }
    Ok(())
}
