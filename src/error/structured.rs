//! Structured error output for scripted consumers.
//!
//! Provides machine-parseable error information with:
//! - Error codes for categorization
//! - Hints for self-correction
//! - Context for debugging

#![allow(clippy::option_if_let_else)]

use crate::error::PerfError;
use crossterm::style::Stylize;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

/// Machine-readable error codes.
///
/// These codes are stable and can be used for programmatic error handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // === Input Errors (exit code 2) ===
    /// Reference or result file missing
    MissingFile,

    // === Parse Errors (exit code 3) ===
    /// Row shape or field unusable
    MalformedRow,
    /// Numeric field failed to parse
    NotANumber,
    /// Case missing from the reference table
    UnknownCase,

    // === Selection Errors (exit code 4) ===
    /// No commit matches the prefix
    CommitNotFound,
    /// Prefix matches several commits
    AmbiguousCommit,

    // === Validation Errors (exit code 5) ===
    /// Field validation failed
    ValidationFailed,
    /// Unsupported sort key
    InvalidSortKey,

    // === Config Errors (exit code 6) ===
    /// Configuration error
    ConfigError,

    // === I/O Errors (exit code 7) ===
    /// File I/O error
    IoError,
    /// JSON serialization error
    JsonError,
    /// YAML parsing error
    YamlError,
    /// Metadata source failure
    MetadataFetchFailed,

    // === Internal Errors (exit code 1) ===
    /// Unexpected internal error
    InternalError,
}

impl ErrorCode {
    /// Get the string representation for JSON output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::MissingFile => "MISSING_FILE",
            Self::MalformedRow => "MALFORMED_ROW",
            Self::NotANumber => "NOT_A_NUMBER",
            Self::UnknownCase => "UNKNOWN_CASE",
            Self::CommitNotFound => "COMMIT_NOT_FOUND",
            Self::AmbiguousCommit => "AMBIGUOUS_COMMIT",
            Self::ValidationFailed => "VALIDATION_FAILED",
            Self::InvalidSortKey => "INVALID_SORT_KEY",
            Self::ConfigError => "CONFIG_ERROR",
            Self::IoError => "IO_ERROR",
            Self::JsonError => "JSON_ERROR",
            Self::YamlError => "YAML_ERROR",
            Self::MetadataFetchFailed => "METADATA_FETCH_FAILED",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Whether fixing the input and re-running can succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::AmbiguousCommit
                | Self::CommitNotFound
                | Self::InvalidSortKey
                | Self::ValidationFailed
                | Self::MetadataFetchFailed
        )
    }

    /// Get the exit code for this error category.
    ///
    /// - 1: Internal/unknown errors
    /// - 2: Missing input files
    /// - 3: Parse errors
    /// - 4: Commit selection errors
    /// - 5: Validation errors
    /// - 6: Config errors
    /// - 7: I/O errors
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::MissingFile => 2,
            Self::MalformedRow | Self::NotANumber | Self::UnknownCase => 3,
            Self::CommitNotFound | Self::AmbiguousCommit => 4,
            Self::ValidationFailed | Self::InvalidSortKey => 5,
            Self::ConfigError => 6,
            Self::IoError | Self::JsonError | Self::YamlError | Self::MetadataFetchFailed => 7,
            Self::InternalError => 1,
        }
    }
}

/// Structured error for machine-parseable output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// Machine-readable error code
    pub code: ErrorCode,
    /// Human-readable error message
    pub message: String,
    /// Optional hint for fixing the error
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether the operation can be retried
    pub retryable: bool,
    /// Additional context data
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,
}

impl StructuredError {
    /// Create a new structured error from a `PerfError`.
    #[must_use]
    pub fn from_error(err: &PerfError) -> Self {
        if let PerfError::CommitNotFound { prefix, known } = err {
            return Self::commit_not_found(prefix, known);
        }
        let (code, context) = Self::extract_code_and_context(err);
        let hint = err.suggestion().map(str::to_string);

        Self {
            code,
            message: err.to_string(),
            hint,
            retryable: code.is_retryable(),
            context,
        }
    }

    /// Create a structured error with similar sha suggestions.
    #[must_use]
    pub fn commit_not_found(prefix: &str, known: &[String]) -> Self {
        let similar = find_similar(prefix, known, 3);

        let hint = if similar.is_empty() {
            Some("Run 'perfboard list' to see available commits.".to_string())
        } else if similar.len() == 1 {
            Some(format!("Did you mean '{}'?", similar[0]))
        } else {
            Some(format!("Did you mean one of: {}?", similar.join(", ")))
        };

        Self {
            code: ErrorCode::CommitNotFound,
            message: format!("Commit not found: {prefix}"),
            hint,
            retryable: true,
            context: Some(json!({
                "prefix": prefix,
                "similar": similar,
            })),
        }
    }

    /// Get the exit code for this error.
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.code.exit_code()
    }

    /// Convert to JSON value for output.
    #[must_use]
    pub fn to_json(&self) -> Value {
        json!({
            "error": {
                "code": self.code.as_str(),
                "message": self.message,
                "hint": self.hint,
                "retryable": self.retryable,
                "context": self.context,
            }
        })
    }

    /// Format for human-readable terminal output.
    #[must_use]
    pub fn to_human(&self, color: bool) -> String {
        let label = |text: &str, paint: fn(String) -> String| {
            if color { paint(text.to_string()) } else { text.to_string() }
        };

        let mut output = format!(
            "{} {}",
            label("Error:", |t| t.red().to_string()),
            self.message
        );
        if let Some(hint) = &self.hint {
            output.push_str(&format!(
                "\n{} {hint}",
                label("Hint:", |t| t.yellow().to_string())
            ));
        }
        output
    }

    fn extract_code_and_context(err: &PerfError) -> (ErrorCode, Option<Value>) {
        match err {
            PerfError::MissingFile { path } => (
                ErrorCode::MissingFile,
                Some(json!({"path": path.display().to_string()})),
            ),
            PerfError::MalformedRow { path, line, reason }
            | PerfError::MalformedReference { path, line, reason } => (
                ErrorCode::MalformedRow,
                Some(json!({
                    "path": path.display().to_string(),
                    "line": line,
                    "reason": reason,
                })),
            ),
            PerfError::NotANumber { field, value } => (
                ErrorCode::NotANumber,
                Some(json!({"field": field, "value": value})),
            ),
            PerfError::UnknownCase { name } => {
                (ErrorCode::UnknownCase, Some(json!({"name": name})))
            }
            PerfError::MetadataFetch { sha, reason } => (
                ErrorCode::MetadataFetchFailed,
                Some(json!({"sha": sha, "reason": reason})),
            ),
            PerfError::CommitNotFound { prefix, .. } => {
                (ErrorCode::CommitNotFound, Some(json!({"prefix": prefix})))
            }
            PerfError::AmbiguousCommit { prefix, matches } => (
                ErrorCode::AmbiguousCommit,
                Some(json!({
                    "prefix": prefix,
                    "matches": matches,
                    "match_count": matches.len(),
                })),
            ),
            PerfError::InvalidSortKey { key } => {
                (ErrorCode::InvalidSortKey, Some(json!({"key": key})))
            }
            PerfError::Validation { field, reason } => (
                ErrorCode::ValidationFailed,
                Some(json!({"field": field, "reason": reason})),
            ),
            PerfError::Config(_) => (ErrorCode::ConfigError, None),
            PerfError::Io(_) => (ErrorCode::IoError, None),
            PerfError::Json(_) => (ErrorCode::JsonError, None),
            PerfError::Yaml(_) => (ErrorCode::YamlError, None),
            PerfError::Other(_) => (ErrorCode::InternalError, None),
        }
    }
}

// === Levenshtein Distance ===

/// Calculate the Levenshtein distance between two strings.
fn levenshtein_distance(a: &str, b: &str) -> usize {
    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }

    let mut prev: Vec<usize> = (0..=b_chars.len()).collect();
    let mut curr = vec![0; b_chars.len() + 1];

    for (i, a_char) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, b_char) in b_chars.iter().enumerate() {
            let cost = usize::from(a_char != b_char);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b_chars.len()]
}

/// Find candidates similar to `searched`, comparing against prefixes of the
/// same length so short shas match long ones.
///
/// Returns up to `max_suggestions` candidates with distance <= 2.
pub fn find_similar(searched: &str, existing: &[String], max_suggestions: usize) -> Vec<String> {
    let width = searched.chars().count();
    let mut candidates: Vec<(usize, &str)> = existing
        .iter()
        .map(|candidate| {
            let head: String = candidate.chars().take(width).collect();
            (levenshtein_distance(searched, &head), candidate.as_str())
        })
        .filter(|(dist, _)| *dist <= 2)
        .collect();

    candidates.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(b.1)));

    candidates
        .into_iter()
        .take(max_suggestions)
        .map(|(_, candidate)| candidate.to_string())
        .collect()
}
