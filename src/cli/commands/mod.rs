//! Subcommand implementations.
//!
//! Each command exposes `execute(...) -> Result<()>` and loads configuration
//! through [`config::load_from_cwd`] with the CLI overrides built in `main`.

pub mod build;
pub mod compare;
pub mod completions;
pub mod config;
pub mod list;
pub mod schema;
pub mod show;
pub mod version;

use crate::config::Settings;
use crate::error::Result;
use crate::format::{TextFormatOptions, terminal_width};
use crate::model::Dataset;
use crate::pipeline::snapshot::load_dataset;
use serde::Serialize;
use std::env;
use std::io::{self, IsTerminal};
use tracing::debug;

/// Whether stdout should get ANSI color.
#[must_use]
pub fn should_use_color() -> bool {
    env::var_os("NO_COLOR").is_none() && io::stdout().is_terminal()
}

/// Text options for stdout under the given settings.
#[must_use]
pub fn text_options(settings: &Settings) -> TextFormatOptions {
    let interactive = io::stdout().is_terminal();
    TextFormatOptions {
        use_color: should_use_color(),
        max_width: interactive.then(terminal_width),
        short_sha_len: settings.short_sha_len,
    }
}

/// Load the dataset named by `settings.output`.
///
/// # Errors
///
/// Returns `MissingFile` if there is no dataset, or a JSON error if it does
/// not parse.
pub fn open_dataset(settings: &Settings) -> Result<Dataset> {
    let dataset = load_dataset(&settings.output)?;
    debug!(
        path = %settings.output.display(),
        commits = dataset.commits.len(),
        "Loaded dataset"
    );
    Ok(dataset)
}

/// Print a value as pretty JSON on stdout.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let payload = serde_json::to_string_pretty(value)?;
    println!("{payload}");
    Ok(())
}
