//! Snapshot builder: collects commit snapshots into the persisted `Dataset`.

use crate::error::{PerfError, Result};
use crate::model::{CommitSnapshot, Dataset, ReferenceTable};
use chrono::{DateTime, Utc};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::Path;
use tracing::{debug, info};

/// Wrap snapshots into a dataset, ordered by date ascending.
///
/// The sort is stable, so commits sharing a date keep their input order.
#[must_use]
pub fn build_dataset(
    mut commits: Vec<CommitSnapshot>,
    best_times: ReferenceTable,
    generated_at: DateTime<Utc>,
) -> Dataset {
    commits.sort_by_key(|commit| commit.date);
    Dataset {
        commits,
        best_times,
        generated_at,
    }
}

/// Serialize the dataset to `path` (temp file, then atomic rename).
///
/// # Errors
///
/// Returns an error if the parent directory cannot be created or the file
/// cannot be written.
pub fn write_dataset(dataset: &Dataset, path: &Path) -> Result<()> {
    let parent_dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        Some(_) => Path::new("."),
        None => {
            return Err(PerfError::Config(format!(
                "Invalid output path: {}",
                path.display()
            )));
        }
    };
    fs::create_dir_all(parent_dir)?;

    let temp_path = path.with_extension("json.tmp");
    debug!(temp_path = %temp_path.display(), "Writing dataset to temp file");

    let temp_file = File::create(&temp_path)?;
    let mut writer = BufWriter::new(temp_file);
    serde_json::to_writer_pretty(&mut writer, dataset)?;
    writeln!(writer)?;
    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| PerfError::Io(e.into_error()))?
        .sync_all()?;

    fs::rename(&temp_path, path)?;

    info!(
        path = %path.display(),
        commits = dataset.commits.len(),
        "Wrote dataset"
    );
    Ok(())
}

/// Load a previously written dataset.
///
/// # Errors
///
/// Returns `MissingFile` if `path` does not exist, or a JSON error if the
/// document does not match the dataset shape.
pub fn load_dataset(path: &Path) -> Result<Dataset> {
    if !path.is_file() {
        return Err(PerfError::MissingFile {
            path: path.to_path_buf(),
        });
    }
    let contents = fs::read_to_string(path)?;
    let dataset: Dataset = serde_json::from_str(&contents)?;
    debug!(commits = dataset.commits.len(), "Loaded dataset");
    Ok(dataset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{BenchmarkResult, ReferenceEntry};
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn snapshot(sha: &str, day: u32) -> CommitSnapshot {
        CommitSnapshot {
            sha: sha.to_string(),
            message: format!("commit {sha}"),
            author: "dev".to_string(),
            author_email: "dev@example.com".to_string(),
            date: Utc.with_ymd_and_hms(2024, 3, day, 12, 0, 0).unwrap(),
            url: format!("https://example.com/commit/{sha}"),
            parent_sha: None,
            average_score: 75.5,
            benchmarks: vec![BenchmarkResult {
                id: 1,
                name: "loop".to_string(),
                runtime: 2.6666,
                best_time: 2.0,
                score: 75.0018,
                status: "PASS".to_string(),
            }],
        }
    }

    #[test]
    fn commits_sorted_by_date_stable() {
        let dataset = build_dataset(
            vec![
                snapshot("c", 3),
                snapshot("a1", 1),
                snapshot("b", 2),
                snapshot("a2", 1),
            ],
            ReferenceTable::new(),
            Utc::now(),
        );
        let shas: Vec<&str> = dataset.commits.iter().map(|c| c.sha.as_str()).collect();
        assert_eq!(shas, vec!["a1", "a2", "b", "c"]);
    }

    #[test]
    fn write_then_load_is_identical() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("out").join("dataset.json");

        let mut best_times = ReferenceTable::new();
        best_times.insert("loop".to_string(), ReferenceEntry::new(1, 2.0));
        best_times.insert("x".to_string(), ReferenceEntry::new(2, 0.0));
        let dataset = build_dataset(
            vec![snapshot("b", 2), snapshot("a", 1)],
            best_times,
            Utc.with_ymd_and_hms(2024, 4, 1, 0, 0, 0).unwrap(),
        );

        write_dataset(&dataset, &path).expect("write");
        assert!(!path.with_extension("json.tmp").exists());
        let loaded = load_dataset(&path).expect("load");
        assert_eq!(loaded, dataset);
    }

    #[test]
    fn load_missing_dataset_is_missing_file() {
        let temp = TempDir::new().expect("temp dir");
        let err = load_dataset(&temp.path().join("none.json")).unwrap_err();
        assert!(matches!(err, PerfError::MissingFile { .. }));
    }
}
