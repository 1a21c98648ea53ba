//! CSV formatting for comparison output.
//!
//! Handles escaping of fields containing commas, quotes, or newlines.

use crate::compare::ChangeThresholds;
use crate::model::ComparisonRow;
use std::io::{self, Write};

/// Columns written for each comparison row, in order.
pub const COMPARISON_FIELDS: &[&str] = &[
    "id",
    "name",
    "best_time",
    "left_time",
    "right_time",
    "absolute_change",
    "relative_change",
    "left_score",
    "right_score",
    "class",
];

/// Escape a CSV field value.
///
/// Wraps in double quotes if the value contains commas, quotes, or newlines.
/// Doubles any existing quotes within the value.
#[must_use]
pub fn escape_field(value: &str) -> String {
    let needs_quoting = value.contains(',')
        || value.contains('"')
        || value.contains('\n')
        || value.contains('\r');

    if needs_quoting {
        let escaped = value.replace('"', "\"\"");
        format!("\"{escaped}\"")
    } else {
        value.to_string()
    }
}

/// Format one comparison row. An undefined relative change is an empty cell.
#[must_use]
pub fn format_comparison_row(row: &ComparisonRow, thresholds: &ChangeThresholds) -> String {
    [
        row.id.to_string(),
        escape_field(&row.name),
        row.best_time.to_string(),
        row.left_time.to_string(),
        row.right_time.to_string(),
        row.absolute_change.to_string(),
        row.relative_change.map_or_else(String::new, |v| v.to_string()),
        row.left_score.to_string(),
        row.right_score.to_string(),
        thresholds.classify(row).as_str().to_string(),
    ]
    .join(",")
}

/// Write comparison rows as CSV, header first.
///
/// # Errors
///
/// Returns an error if writing fails.
pub fn write_comparison_csv<W: Write>(
    writer: &mut W,
    rows: &[&ComparisonRow],
    thresholds: &ChangeThresholds,
) -> io::Result<()> {
    writeln!(writer, "{}", COMPARISON_FIELDS.join(","))?;
    for row in rows {
        writeln!(writer, "{}", format_comparison_row(row, thresholds))?;
    }
    Ok(())
}
