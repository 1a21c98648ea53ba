//! Reference table loader.
//!
//! Input is comma-separated text: a header row followed by
//! `id,name,best_time` rows.

use crate::error::{PerfError, Result};
use crate::model::{ReferenceEntry, ReferenceTable};
use crate::pipeline::IngestReport;
use std::fs;
use std::path::Path;
use tracing::{debug, info};

const MIN_COLUMNS: usize = 3;

/// Read and parse the reference table at `path`.
///
/// # Errors
///
/// Returns `MissingFile` if the file does not exist and `MalformedReference` if a
/// row has fewer than three columns. Rows with unparsable numbers are skipped
/// and recorded in `report`.
pub fn load_reference(path: &Path, report: &mut IngestReport) -> Result<ReferenceTable> {
    if !path.is_file() {
        return Err(PerfError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    let table = parse_reference(&contents, path, report)?;
    info!(
        path = %path.display(),
        cases = table.len(),
        "Loaded reference table"
    );
    Ok(table)
}

/// Parse reference text; `path` is only used for diagnostics.
///
/// # Errors
///
/// Returns `MalformedReference` if a non-empty row has fewer than three columns.
pub fn parse_reference(
    contents: &str,
    path: &Path,
    report: &mut IngestReport,
) -> Result<ReferenceTable> {
    let mut table = ReferenceTable::new();

    for (idx, line) in contents.lines().enumerate().skip(1) {
        let line_no = idx + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        if fields.len() < MIN_COLUMNS {
            return Err(PerfError::MalformedReference {
                path: path.to_path_buf(),
                line: line_no,
                reason: format!("expected {MIN_COLUMNS} columns, found {}", fields.len()),
            });
        }

        let (id_text, name, best_text) = (fields[0], fields[1], fields[2]);

        let Ok(id) = id_text.parse::<i64>() else {
            report.record_at(PerfError::not_a_number("id", id_text), path, line_no);
            continue;
        };
        let best_time = match best_text.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                report.record_at(PerfError::not_a_number("best_time", best_text), path, line_no);
                continue;
            }
        };

        if table.contains_key(name) {
            report.record_at(
                PerfError::MalformedRow {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: format!("duplicate case '{name}', keeping the first entry"),
                },
                path,
                line_no,
            );
            continue;
        }

        debug!(case = name, id, best_time, "Reference entry");
        table.insert(name.to_string(), ReferenceEntry::new(id, best_time));
    }

    Ok(table)
}
