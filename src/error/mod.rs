//! Error types and handling for `perfboard`.
//!
//! # Design
//!
//! - Uses `thiserror` for derive-based error types
//! - Accepts `anyhow` errors at the edges through [`PerfError::Other`]
//! - Splits fatal conditions from recoverable ones (see [`PerfError::is_recoverable`])
//! - Provides structured JSON output for scripted consumers

mod structured;

pub use structured::{ErrorCode, StructuredError, find_similar};

use std::path::PathBuf;
use thiserror::Error;

/// Primary error type for `perfboard` operations.
#[derive(Error, Debug)]
pub enum PerfError {
    // === Input Errors ===
    /// Reference or result file is absent.
    #[error("File not found: '{path}'")]
    MissingFile { path: PathBuf },

    /// A row has the wrong shape or an unusable field.
    #[error("Malformed row in '{path}' at line {line}: {reason}")]
    MalformedRow {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// The reference table itself is unusable; aborts the run.
    #[error("Malformed reference row in '{path}' at line {line}: {reason}")]
    MalformedReference {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    /// A numeric field failed to parse.
    #[error("Not a number in field '{field}': '{value}'")]
    NotANumber { field: String, value: String },

    /// A result row names a case absent from the reference table.
    #[error("Unknown case: {name}")]
    UnknownCase { name: String },

    // === Metadata Errors ===
    /// Commit metadata lookup failed or timed out.
    #[error("Metadata fetch failed for {sha}: {reason}")]
    MetadataFetch { sha: String, reason: String },

    // === Selection Errors ===
    /// No commit in the dataset matches the prefix.
    #[error("Commit not found: {prefix}")]
    CommitNotFound {
        prefix: String,
        /// Shas in the dataset, for suggestions.
        known: Vec<String>,
    },

    /// Prefix matches more than one commit.
    #[error("Ambiguous commit '{prefix}': matches {matches:?}")]
    AmbiguousCommit {
        prefix: String,
        matches: Vec<String>,
    },

    /// Unsupported comparison sort key.
    #[error("Invalid sort key: {key}")]
    InvalidSortKey { key: String },

    // === Validation Errors ===
    /// Field validation failed.
    #[error("Validation failed: {field}: {reason}")]
    Validation { field: String, reason: String },

    // === Configuration Errors ===
    /// Configuration file error.
    #[error("Configuration error: {0}")]
    Config(String),

    // === I/O Errors ===
    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML parsing error.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Wrapped anyhow error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl PerfError {
    /// Conditions the pipeline degrades around instead of aborting.
    ///
    /// Recovered errors are logged and counted, never returned from a run.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::MalformedRow { .. }
                | Self::NotANumber { .. }
                | Self::UnknownCase { .. }
                | Self::MetadataFetch { .. }
        )
    }

    /// Human-friendly suggestion for fixing this error.
    #[must_use]
    pub const fn suggestion(&self) -> Option<&'static str> {
        match self {
            Self::MissingFile { .. } => {
                Some("Check the path, or set it in .perfboard/config.yaml")
            }
            Self::CommitNotFound { .. } => Some("Run: perfboard list"),
            Self::AmbiguousCommit { .. } => Some("Provide more characters of the sha"),
            Self::InvalidSortKey { .. } => Some(
                "Valid keys: id, left_time, right_time, absolute_change, relative_change, left_score, right_score",
            ),
            _ => None,
        }
    }

    /// Create a validation error for a specific field.
    #[must_use]
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-a-number error for a specific field.
    #[must_use]
    pub fn not_a_number(field: impl Into<String>, value: impl Into<String>) -> Self {
        Self::NotANumber {
            field: field.into(),
            value: value.into(),
        }
    }
}

/// Result type using `PerfError`.
pub type Result<T> = std::result::Result<T, PerfError>;
