//! `perfboard`: per-commit benchmark scoring and commit-to-commit comparison.
//!
//! The ingest pipeline turns a best-time reference table and one result file
//! per commit into a [`model::Dataset`]; the comparison engine joins two
//! commits of a dataset by case name and orders the rows by any column.

pub mod cli;
pub mod compare;
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod metadata;
pub mod model;
pub mod pipeline;
pub mod util;

pub use error::{ErrorCode, PerfError, Result, StructuredError};
