//! Commit metadata collaborators.
//!
//! A [`MetadataSource`] turns a commit sha into a validated
//! [`CommitMetadata`] record or reports that it is unavailable. Callers never
//! see a failure from [`fetch_all`]: unavailable commits get
//! [`CommitMetadata::fallback`] and a warning in the ingest report.
//!
//! Sources:
//! - [`GitMetadataSource`] - reads a local checkout with `git show`
//! - [`FileMetadataSource`] - reads a JSON document keyed by sha
//! - [`OfflineSource`] - always unavailable (`--no-fetch`)

mod git;
mod record;

pub use git::GitMetadataSource;
pub use record::{CommitRecord, FileMetadataSource};

use crate::error::{PerfError, Result};
use crate::model::CommitMetadata;
use crate::pipeline::IngestReport;
use crate::util::progress::ProgressTracker;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;
use tracing::{debug, info};

/// Something that can describe a commit.
pub trait MetadataSource: Sync {
    /// Look up one commit; `timeout` bounds this single lookup.
    ///
    /// # Errors
    ///
    /// Returns `MetadataFetch` when the commit cannot be described.
    fn fetch(&self, sha: &str, timeout: Duration) -> Result<CommitMetadata>;

    /// Short label for logs.
    fn name(&self) -> &'static str;
}

/// Source used when lookups are disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineSource;

impl MetadataSource for OfflineSource {
    fn fetch(&self, sha: &str, _timeout: Duration) -> Result<CommitMetadata> {
        Err(PerfError::MetadataFetch {
            sha: sha.to_string(),
            reason: "metadata lookup disabled".to_string(),
        })
    }

    fn name(&self) -> &'static str {
        "offline"
    }
}

/// Knobs for [`fetch_all`].
#[derive(Debug, Clone)]
pub struct FetchOptions {
    pub timeout: Duration,
    pub workers: usize,
    /// Base url used to synthesize fallback commit urls.
    pub repo_url: String,
}

/// Look up every sha, concurrently, degrading failures to fallback records.
///
/// The output is in the same order as `shas`.
pub fn fetch_all(
    source: &dyn MetadataSource,
    shas: &[String],
    options: &FetchOptions,
    report: &mut IngestReport,
    progress: Option<&ProgressTracker>,
) -> Vec<CommitMetadata> {
    if shas.is_empty() {
        return Vec::new();
    }

    let workers = options.workers.clamp(1, shas.len());
    info!(
        source = source.name(),
        commits = shas.len(),
        workers,
        "Fetching commit metadata"
    );

    let next = AtomicUsize::new(0);
    let (tx, rx) = mpsc::channel();

    thread::scope(|scope| {
        for _ in 0..workers {
            let tx = tx.clone();
            let next = &next;
            scope.spawn(move || {
                loop {
                    let idx = next.fetch_add(1, Ordering::Relaxed);
                    let Some(sha) = shas.get(idx) else { break };
                    let outcome = source.fetch(sha, options.timeout);
                    if let Some(tracker) = progress {
                        tracker.inc(1);
                    }
                    if tx.send((idx, outcome)).is_err() {
                        break;
                    }
                }
            });
        }
    });
    drop(tx);

    let mut slots: Vec<Option<CommitMetadata>> = vec![None; shas.len()];
    for (idx, outcome) in rx {
        match outcome {
            Ok(metadata) => {
                debug!(sha = %metadata.sha, "Fetched commit metadata");
                slots[idx] = Some(metadata);
            }
            Err(err) => report.record(err),
        }
    }

    slots
        .into_iter()
        .zip(shas)
        .map(|(slot, sha)| {
            slot.unwrap_or_else(|| CommitMetadata::fallback(sha, &options.repo_url))
        })
        .collect()
}
