//! Comparison engine.
//!
//! Joining and sorting are separate steps: [`Comparison::join`] builds the
//! row set once, in the left snapshot's benchmark order, and
//! [`Comparison::sorted`] orders a view of it by any [`SortKey`] without
//! re-joining.
//!
//! Ordering rules:
//! - ascending sorts are stable, so ties keep join order
//! - descending is the exact reverse of ascending, ties included
//! - rows with no relative change order before every defined value

mod select;

pub use select::{parse_share_query, select_commit, share_query, unique_prefix};

use crate::model::{BenchmarkResult, CommitSnapshot, ComparisonRow, SortDirection, SortKey};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Rows for two commits joined by case name.
#[derive(Debug, Clone, PartialEq)]
pub struct Comparison {
    rows: Vec<ComparisonRow>,
    avg_relative_change: f64,
}

/// Sorted, serializable comparison output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    pub rows: Vec<ComparisonRow>,
    pub avg_relative_change: f64,
}

impl Comparison {
    /// Inner-join two snapshots on case name.
    ///
    /// Cases present on only one side are left out.
    #[must_use]
    pub fn join(left: &CommitSnapshot, right: &CommitSnapshot) -> Self {
        let right_index: HashMap<&str, &BenchmarkResult> = right
            .benchmarks
            .iter()
            .map(|b| (b.name.as_str(), b))
            .collect();

        let rows: Vec<ComparisonRow> = left
            .benchmarks
            .iter()
            .filter_map(|l| right_index.get(l.name.as_str()).map(|r| join_row(l, r)))
            .collect();

        let avg_relative_change = mean_relative_change(&rows);
        debug!(
            left = %left.sha,
            right = %right.sha,
            joined = rows.len(),
            left_only = left.benchmarks.len() - rows.len(),
            avg_relative_change,
            "Joined snapshots"
        );

        Self {
            rows,
            avg_relative_change,
        }
    }

    /// Rows in join order.
    #[must_use]
    pub fn rows(&self) -> &[ComparisonRow] {
        &self.rows
    }

    /// Mean relative change over rows where it is defined; 0 when none is.
    #[must_use]
    pub const fn avg_relative_change(&self) -> f64 {
        self.avg_relative_change
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// A view of the rows ordered by `key` and `direction`.
    #[must_use]
    pub fn sorted(&self, key: SortKey, direction: SortDirection) -> Vec<&ComparisonRow> {
        let mut view: Vec<&ComparisonRow> = self.rows.iter().collect();
        view.sort_by(|a, b| compare_rows(a, b, key));
        if direction == SortDirection::Descending {
            view.reverse();
        }
        view
    }

    /// Owned, sorted output.
    #[must_use]
    pub fn to_result(&self, key: SortKey, direction: SortDirection) -> ComparisonResult {
        ComparisonResult {
            rows: self.sorted(key, direction).into_iter().cloned().collect(),
            avg_relative_change: self.avg_relative_change,
        }
    }
}

/// Join and sort in one call.
#[must_use]
pub fn compare(
    left: &CommitSnapshot,
    right: &CommitSnapshot,
    key: SortKey,
    direction: SortDirection,
) -> ComparisonResult {
    Comparison::join(left, right).to_result(key, direction)
}

fn join_row(left: &BenchmarkResult, right: &BenchmarkResult) -> ComparisonRow {
    ComparisonRow {
        id: left.id,
        name: left.name.clone(),
        best_time: left.best_time,
        left_time: left.runtime,
        right_time: right.runtime,
        absolute_change: right.runtime - left.runtime,
        relative_change: relative_change(left.runtime, right.runtime),
        left_score: left.score,
        right_score: right.score,
    }
}

/// Percent change from `left` to `right`; `None` when `left` is 0.
#[must_use]
pub fn relative_change(left: f64, right: f64) -> Option<f64> {
    if left == 0.0 {
        None
    } else {
        Some((right - left) / left * 100.0)
    }
}

fn mean_relative_change(rows: &[ComparisonRow]) -> f64 {
    let defined: Vec<f64> = rows.iter().filter_map(|r| r.relative_change).collect();
    if defined.is_empty() {
        return 0.0;
    }
    defined.iter().sum::<f64>() / defined.len() as f64
}

fn compare_rows(a: &ComparisonRow, b: &ComparisonRow, key: SortKey) -> Ordering {
    match key {
        SortKey::Id => a.id.cmp(&b.id),
        SortKey::LeftTime => a.left_time.total_cmp(&b.left_time),
        SortKey::RightTime => a.right_time.total_cmp(&b.right_time),
        SortKey::AbsoluteChange => a.absolute_change.total_cmp(&b.absolute_change),
        SortKey::RelativeChange => match (a.relative_change, b.relative_change) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        },
        SortKey::LeftScore => a.left_score.total_cmp(&b.left_score),
        SortKey::RightScore => a.right_score.total_cmp(&b.right_score),
    }
}

/// Presentation thresholds, in percent.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChangeThresholds {
    /// Relative runtime changes within ±this are neutral.
    pub neutral_change_pct: f64,
    /// Score moves of at least this many points are flagged.
    pub score_change_pct: f64,
}

impl Default for ChangeThresholds {
    fn default() -> Self {
        Self {
            neutral_change_pct: 2.0,
            score_change_pct: 5.0,
        }
    }
}

/// Direction of a runtime change; lower runtimes are better.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeClass {
    Improved,
    Regressed,
    Neutral,
    /// Left time was 0, so there is no relative change.
    Undefined,
}

impl ChangeClass {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Improved => "improved",
            Self::Regressed => "regressed",
            Self::Neutral => "neutral",
            Self::Undefined => "undefined",
        }
    }
}

impl ChangeThresholds {
    /// Classify the runtime change of one row.
    #[must_use]
    pub fn classify(&self, row: &ComparisonRow) -> ChangeClass {
        match row.relative_change {
            None => ChangeClass::Undefined,
            Some(pct) if pct < -self.neutral_change_pct => ChangeClass::Improved,
            Some(pct) if pct > self.neutral_change_pct => ChangeClass::Regressed,
            Some(_) => ChangeClass::Neutral,
        }
    }

    /// Whether the score moved by at least `score_change_pct` points.
    #[must_use]
    pub fn score_moved(&self, row: &ComparisonRow) -> bool {
        (row.right_score - row.left_score).abs() >= self.score_change_pct
    }
}

/// Counts per change class.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ComparisonSummary {
    pub joined: usize,
    pub improved: usize,
    pub regressed: usize,
    pub neutral: usize,
    pub undefined: usize,
    pub score_moved: usize,
}

impl ComparisonSummary {
    #[must_use]
    pub fn from_rows<'a>(
        rows: impl IntoIterator<Item = &'a ComparisonRow>,
        thresholds: &ChangeThresholds,
    ) -> Self {
        let mut summary = Self::default();
        for row in rows {
            summary.joined += 1;
            match thresholds.classify(row) {
                ChangeClass::Improved => summary.improved += 1,
                ChangeClass::Regressed => summary.regressed += 1,
                ChangeClass::Neutral => summary.neutral += 1,
                ChangeClass::Undefined => summary.undefined += 1,
            }
            if thresholds.score_moved(row) {
                summary.score_moved += 1;
            }
        }
        summary
    }
}
