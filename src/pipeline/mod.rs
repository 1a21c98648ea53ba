//! Ingest pipeline: reference table + result files -> `Dataset`.
//!
//! Stages, leaves first:
//! - [`reference`] - best-time reference table loader
//! - [`results`] - per-commit result file parser
//! - [`score`] - bounded score engine
//! - [`aggregate`] - per-commit snapshot assembly
//! - [`snapshot`] - dataset assembly and persistence
//!
//! Only missing inputs abort a run. Every other problem is recorded in the
//! [`IngestReport`] and logged as a warning.

pub mod aggregate;
pub mod reference;
pub mod results;
pub mod score;
pub mod snapshot;

use crate::error::{ErrorCode, PerfError, Result, StructuredError};
use crate::metadata::{FetchOptions, MetadataSource, fetch_all};
use crate::model::Dataset;
use crate::util::discover_result_files;
use crate::util::progress::ProgressTracker;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// One parsed result row that passed both the runtime and case checks.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub name: String,
    pub status: String,
    pub runtime: f64,
}

/// A recovered problem surfaced during ingest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IngestWarning {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
}

/// Warning channel for a build run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct IngestReport {
    pub warnings: Vec<IngestWarning>,
}

impl IngestReport {
    /// Record a recovered error and log it.
    pub fn record(&mut self, err: PerfError) {
        self.push(&err, None, None);
    }

    /// Record a recovered error tied to a file position and log it.
    pub fn record_at(&mut self, err: PerfError, path: &Path, line: usize) {
        self.push(&err, Some(path), Some(line));
    }

    fn push(&mut self, err: &PerfError, path: Option<&Path>, line: Option<usize>) {
        debug_assert!(err.is_recoverable(), "fatal error recorded as warning: {err}");
        let code = StructuredError::from_error(err).code;
        let file = path.map(|p| p.display().to_string());
        warn!(
            code = code.as_str(),
            file = file.as_deref().unwrap_or("-"),
            line = line.unwrap_or(0),
            "{err}"
        );
        self.warnings.push(IngestWarning {
            code,
            message: err.to_string(),
            file,
            line,
        });
    }

    /// Number of warnings with the given code.
    #[must_use]
    pub fn count(&self, code: ErrorCode) -> usize {
        self.warnings.iter().filter(|w| w.code == code).count()
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }
}

/// Inputs for [`run_build`].
#[derive(Debug, Clone)]
pub struct BuildOptions {
    pub reference: PathBuf,
    pub results_dir: PathBuf,
    /// File extension of result files, without the dot.
    pub extension: String,
    pub fetch: FetchOptions,
}

/// Result of a build run.
#[derive(Debug, Clone)]
pub struct BuildOutcome {
    pub dataset: Dataset,
    pub report: IngestReport,
}

/// Run the whole ingest pipeline.
///
/// Each result file is named after its commit (`<sha>.<extension>`).
///
/// # Errors
///
/// Returns `MissingFile` when the reference table, the results directory or
/// a result file is absent, and `MalformedReference` when the reference table has
/// a short row.
pub fn run_build(
    options: &BuildOptions,
    source: &dyn MetadataSource,
    generated_at: DateTime<Utc>,
    progress: Option<&ProgressTracker>,
) -> Result<BuildOutcome> {
    let mut report = IngestReport::default();
    let reference_table = reference::load_reference(&options.reference, &mut report)?;

    let files = discover_result_files(&options.results_dir, &options.extension)?;
    info!(
        results_dir = %options.results_dir.display(),
        files = files.len(),
        "Discovered result files"
    );

    let mut shas = Vec::with_capacity(files.len());
    let mut scored = Vec::with_capacity(files.len());
    for file in &files {
        let records = results::load_results(&file.path, &reference_table, &mut report)?;
        scored.push(aggregate::score_records(&records, &reference_table));
        shas.push(file.sha.clone());
    }

    if let Some(tracker) = progress {
        tracker.set_length(shas.len() as u64);
    }
    let metadata = fetch_all(source, &shas, &options.fetch, &mut report, progress);

    let snapshots = metadata
        .into_iter()
        .zip(scored)
        .map(|(meta, benchmarks)| aggregate::build_snapshot(meta, benchmarks))
        .collect();

    let dataset = snapshot::build_dataset(snapshots, reference_table, generated_at);
    info!(
        commits = dataset.commits.len(),
        warnings = report.warnings.len(),
        "Build complete"
    );

    Ok(BuildOutcome { dataset, report })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_counts_by_code() {
        let mut report = IngestReport::default();
        assert!(report.is_clean());
        report.record(PerfError::UnknownCase {
            name: "a".to_string(),
        });
        report.record_at(
            PerfError::not_a_number("runtime", "x"),
            Path::new("r.tsv"),
            3,
        );
        assert_eq!(report.count(ErrorCode::UnknownCase), 1);
        assert_eq!(report.count(ErrorCode::NotANumber), 1);
        assert_eq!(report.warnings[1].file.as_deref(), Some("r.tsv"));
        assert_eq!(report.warnings[1].line, Some(3));
    }

    #[cfg(debug_assertions)]
    #[test]
    #[should_panic(expected = "fatal error recorded as warning")]
    fn report_rejects_fatal_errors() {
        let mut report = IngestReport::default();
        report.record(PerfError::MalformedReference {
            path: "best_times.csv".into(),
            line: 2,
            reason: "expected 3 columns, found 2".to_string(),
        });
    }

    #[test]
    fn report_serializes_codes() {
        let mut report = IngestReport::default();
        report.record(PerfError::UnknownCase {
            name: "a".to_string(),
        });
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["warnings"][0]["code"], "UNKNOWN_CASE");
        assert!(json["warnings"][0].get("file").is_none());
    }
}
