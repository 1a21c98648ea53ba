//! Shared utilities for `perfboard`.
//!
//! - Result file discovery
//! - Time parsing and formatting
//! - Progress indicators

pub mod progress;
pub mod time;

use crate::error::{PerfError, Result};
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// A result file and the commit it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultFile {
    /// Commit sha taken from the file stem.
    pub sha: String,
    pub path: PathBuf,
}

/// List `<sha>.<extension>` files directly inside `dir`, sorted by name.
///
/// # Errors
///
/// Returns `MissingFile` if `dir` is not a directory, or an I/O error if it
/// cannot be read.
pub fn discover_result_files(dir: &Path, extension: &str) -> Result<Vec<ResultFile>> {
    if !dir.is_dir() {
        return Err(PerfError::MissingFile {
            path: dir.to_path_buf(),
        });
    }

    let extension = extension.trim_start_matches('.');
    let mut files = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| PerfError::Io(e.into()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|ext| ext.to_str()) != Some(extension) {
            debug!(path = %path.display(), "Skipping non-result file");
            continue;
        }
        let Some(sha) = path.file_stem().and_then(|stem| stem.to_str()) else {
            continue;
        };
        if sha.is_empty() {
            continue;
        }
        files.push(ResultFile {
            sha: sha.to_string(),
            path: path.to_path_buf(),
        });
    }

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn discovers_sorted_result_files() {
        let temp = TempDir::new().expect("temp dir");
        let dir = temp.path();
        fs::write(dir.join("bbb222.tsv"), "h\n").unwrap();
        fs::write(dir.join("aaa111.tsv"), "h\n").unwrap();
        fs::write(dir.join("notes.txt"), "x").unwrap();
        fs::create_dir(dir.join("nested")).unwrap();
        fs::write(dir.join("nested").join("ccc333.tsv"), "h\n").unwrap();

        let files = discover_result_files(dir, ".tsv").unwrap();
        let shas: Vec<&str> = files.iter().map(|f| f.sha.as_str()).collect();
        assert_eq!(shas, vec!["aaa111", "bbb222"]);
    }

    #[test]
    fn missing_dir_is_missing_file() {
        let temp = TempDir::new().expect("temp dir");
        let err = discover_result_files(&temp.path().join("absent"), "tsv").unwrap_err();
        assert!(matches!(err, PerfError::MissingFile { .. }));
    }
}
