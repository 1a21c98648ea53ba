//! Commit aggregator: scored results + commit metadata -> `CommitSnapshot`.

use crate::model::{BenchmarkResult, CommitMetadata, CommitSnapshot, ReferenceTable};
use crate::pipeline::RawRecord;
use crate::pipeline::score::score_record;
use tracing::debug;

/// Score parsed records against the reference table.
///
/// Records whose case is missing from `reference` are skipped; the parser
/// already reported them.
#[must_use]
pub fn score_records(records: &[RawRecord], reference: &ReferenceTable) -> Vec<BenchmarkResult> {
    records
        .iter()
        .filter_map(|record| {
            reference
                .get(&record.name)
                .map(|entry| score_record(record, entry))
        })
        .collect()
}

/// Arithmetic mean of the scores, or 0 for an empty list.
#[must_use]
pub fn average_score(benchmarks: &[BenchmarkResult]) -> f64 {
    if benchmarks.is_empty() {
        return 0.0;
    }
    benchmarks.iter().map(|b| b.score).sum::<f64>() / benchmarks.len() as f64
}

/// Build the snapshot for one commit.
///
/// Benchmarks are ordered by id ascending.
#[must_use]
pub fn build_snapshot(
    metadata: CommitMetadata,
    mut benchmarks: Vec<BenchmarkResult>,
) -> CommitSnapshot {
    benchmarks.sort_by_key(|b| b.id);
    let average_score = average_score(&benchmarks);

    debug!(
        sha = %metadata.sha,
        benchmarks = benchmarks.len(),
        average_score,
        fallback = metadata.is_fallback(),
        "Built commit snapshot"
    );

    let CommitMetadata {
        sha,
        message,
        author,
        author_email,
        date,
        url,
        parent_sha,
    } = metadata;

    CommitSnapshot {
        sha,
        message,
        author,
        author_email,
        date,
        url,
        parent_sha,
        average_score,
        benchmarks,
    }
}
