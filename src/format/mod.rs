//! Output formatting for `perfboard`.
//!
//! Supports human-readable text tables, machine-parseable JSON, and CSV.
//! Data goes to stdout; logs and diagnostics go to stderr.
//!
//! # Output Types
//!
//! - [`CompareOutput`] - joined rows with classes and summary (compare)
//! - [`CommitListEntry`] - commit without benchmarks (list)
//! - [`CommitDetails`] - commit with benchmarks (show)
//! - [`BuildSummary`] - counts and warnings of a build run (build)

pub mod csv;
mod output;
mod text;

pub use output::{
    BuildSummary, ClassifiedRow, CommitDetails, CommitListEntry, CommitRef, CompareOutput,
};
pub use text::{
    NOT_AVAILABLE, TextFormatOptions, format_change_class, format_change_pct,
    format_commit_header, format_score, format_summary_line, format_time, render_benchmarks,
    render_commit_list, render_comparison_table, terminal_width, truncate_text,
};
