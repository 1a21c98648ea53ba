//! Result parser for one commit's tab-separated run output.
//!
//! Columns (0-indexed): `[1]` case name, `[2]` status, `[3]` runtime.
//! Rows need at least five columns.

use crate::error::{PerfError, Result};
use crate::model::ReferenceTable;
use crate::pipeline::{IngestReport, RawRecord};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, trace};

const MIN_COLUMNS: usize = 5;
const NAME_COLUMN: usize = 1;
const STATUS_COLUMN: usize = 2;
const RUNTIME_COLUMN: usize = 3;

/// Read and parse one result file.
///
/// # Errors
///
/// Returns `MissingFile` if the file does not exist, or an I/O error if it
/// cannot be read. Bad rows never fail the parse.
pub fn load_results(
    path: &Path,
    reference: &ReferenceTable,
    report: &mut IngestReport,
) -> Result<Vec<RawRecord>> {
    if !path.is_file() {
        return Err(PerfError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    Ok(parse_results(&contents, path, reference, report))
}

/// Parse result text against the reference table.
///
/// Short rows are skipped silently. Rows with an unparsable runtime or a case
/// missing from `reference` are skipped and recorded in `report`. A case seen
/// twice keeps its first row.
#[must_use]
pub fn parse_results(
    contents: &str,
    path: &Path,
    reference: &ReferenceTable,
    report: &mut IngestReport,
) -> Vec<RawRecord> {
    let mut records = Vec::new();
    let mut seen = HashSet::new();

    for (idx, line) in contents.lines().enumerate().skip(1) {
        let line_no = idx + 1;
        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < MIN_COLUMNS {
            trace!(line = line_no, columns = fields.len(), "Skipping short row");
            continue;
        }

        let name = fields[NAME_COLUMN].trim();
        let status = fields[STATUS_COLUMN].trim();
        let runtime_text = fields[RUNTIME_COLUMN].trim();

        let runtime = match runtime_text.parse::<f64>() {
            Ok(value) if value.is_finite() && value >= 0.0 => value,
            _ => {
                report.record_at(PerfError::not_a_number("runtime", runtime_text), path, line_no);
                continue;
            }
        };

        if !reference.contains_key(name) {
            report.record_at(
                PerfError::UnknownCase {
                    name: name.to_string(),
                },
                path,
                line_no,
            );
            continue;
        }

        if !seen.insert(name.to_string()) {
            report.record_at(
                PerfError::MalformedRow {
                    path: path.to_path_buf(),
                    line: line_no,
                    reason: format!("duplicate case '{name}', keeping the first row"),
                },
                path,
                line_no,
            );
            continue;
        }

        records.push(RawRecord {
            name: name.to_string(),
            status: status.to_string(),
            runtime,
        });
    }

    debug!(
        path = %path.display(),
        records = records.len(),
        "Parsed result file"
    );
    records
}
