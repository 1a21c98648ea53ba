//! Score engine.
//!
//! A score expresses how close a runtime is to the best recorded time for its
//! case, bounded to `[0, 100]`. The branch order below is significant: the
//! zero/zero case is caught before the "at or under best" case, and the zero
//! best-time case substitutes [`EPSILON`] for the denominator.

use crate::model::{BenchmarkResult, EPSILON, ReferenceEntry};
use crate::pipeline::RawRecord;

/// Highest possible score.
pub const MAX_SCORE: f64 = 100.0;

/// Score one runtime against the recorded best time of its case.
///
/// `original_best_time` is the value as recorded, before any epsilon remap.
#[must_use]
#[allow(clippy::float_cmp)]
pub fn score(runtime: f64, original_best_time: f64) -> f64 {
    let raw = if runtime == 0.0 && original_best_time == 0.0 {
        MAX_SCORE
    } else if original_best_time > 0.0 && runtime <= original_best_time {
        MAX_SCORE
    } else if original_best_time == 0.0 {
        MAX_SCORE / (runtime / EPSILON)
    } else if runtime == 0.0 {
        // Unreachable after the branch above; kept so the table stays total.
        MAX_SCORE / (EPSILON / original_best_time)
    } else {
        MAX_SCORE / (runtime / original_best_time)
    };

    raw.min(MAX_SCORE)
}

/// Turn a parsed record into a scored result using its reference entry.
#[must_use]
pub fn score_record(record: &RawRecord, entry: &ReferenceEntry) -> BenchmarkResult {
    BenchmarkResult {
        id: entry.id,
        name: record.name.clone(),
        runtime: record.runtime,
        best_time: entry.best_time,
        score: score(record.runtime, entry.original_best_time),
        status: record.status.clone(),
    }
}
