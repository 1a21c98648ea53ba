//! Metadata from a local git checkout.

use crate::error::{PerfError, Result};
use crate::metadata::{CommitRecord, MetadataSource};
use crate::model::CommitMetadata;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::debug;

/// Field separator for `git show --format`.
const SEP: char = '\u{1f}';
/// Full sha, author name, author email, strict ISO date, parents, raw body.
const FORMAT: &str = "--format=%H%x1f%an%x1f%ae%x1f%aI%x1f%P%x1f%B";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Reads commit metadata with `git show` from a local checkout.
#[derive(Debug, Clone)]
pub struct GitMetadataSource {
    repo_path: PathBuf,
    repo_url: String,
}

impl GitMetadataSource {
    #[must_use]
    pub fn new(repo_path: &Path, repo_url: &str) -> Self {
        Self {
            repo_path: repo_path.to_path_buf(),
            repo_url: repo_url.to_string(),
        }
    }

    fn run_git(&self, sha: &str, timeout: Duration) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(["show", "-s", "--no-color", FORMAT, sha, "--"])
            .current_dir(&self.repo_path);

        let output = run_with_timeout(cmd, timeout).map_err(|reason| PerfError::MetadataFetch {
            sha: sha.to_string(),
            reason,
        })?;

        if !output.status.success() {
            debug!(sha, stderr = %output.stderr.trim(), "git show failed");
            return Err(PerfError::MetadataFetch {
                sha: sha.to_string(),
                reason: format!("git show exited with {}", output.status),
            });
        }

        Ok(output.stdout)
    }
}

#[derive(Debug)]
struct CommandOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

/// Drain a child pipe on its own thread so the child never blocks on a full pipe.
fn drain<R: Read + Send + 'static>(pipe: Option<R>) -> JoinHandle<io::Result<Vec<u8>>> {
    thread::spawn(move || {
        let mut buf = Vec::new();
        if let Some(mut pipe) = pipe {
            pipe.read_to_end(&mut buf)?;
        }
        Ok(buf)
    })
}

/// Run `cmd` to completion, killing it once `timeout` elapses.
fn run_with_timeout(
    mut cmd: Command,
    timeout: Duration,
) -> std::result::Result<CommandOutput, String> {
    let mut child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| format!("failed to spawn {}: {e}", cmd.get_program().to_string_lossy()))?;

    let stdout_reader = drain(child.stdout.take());
    let stderr_reader = drain(child.stderr.take());

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(format!("timed out after {}ms", timeout.as_millis()));
            }
            Ok(None) => thread::sleep(POLL_INTERVAL),
            Err(e) => return Err(format!("failed to wait for child: {e}")),
        }
    };

    let collect = |reader: JoinHandle<io::Result<Vec<u8>>>| {
        reader
            .join()
            .map_err(|_| "pipe reader thread panicked".to_string())?
            .map_err(|e| format!("failed to read child output: {e}"))
    };
    let stdout = String::from_utf8(collect(stdout_reader)?)
        .map_err(|e| format!("output is not utf-8: {e}"))?;
    let stderr = String::from_utf8_lossy(&collect(stderr_reader)?).into_owned();

    Ok(CommandOutput {
        status,
        stdout,
        stderr,
    })
}

/// Split `git show` output into a commit record.
///
/// Returns the full sha alongside the record.
fn parse_show_output(output: &str) -> Option<(String, CommitRecord)> {
    let mut parts = output.splitn(6, SEP);
    let sha = parts.next()?.trim().to_string();
    let author = parts.next()?.to_string();
    let author_email = parts.next()?.to_string();
    let date = parts.next()?.trim().to_string();
    let parents = parts.next()?;
    let message = parts.next()?.trim_end().to_string();

    if sha.is_empty() {
        return None;
    }

    Some((
        sha,
        CommitRecord {
            message: Some(message),
            author: Some(author),
            author_email: Some(author_email),
            date: Some(date),
            url: None,
            parent_sha: parents.split_whitespace().next().map(str::to_string),
        },
    ))
}

impl MetadataSource for GitMetadataSource {
    fn fetch(&self, sha: &str, timeout: Duration) -> Result<CommitMetadata> {
        let output = self.run_git(sha, timeout)?;
        let (full_sha, record) =
            parse_show_output(&output).ok_or_else(|| PerfError::MetadataFetch {
                sha: sha.to_string(),
                reason: "unexpected git show output".to_string(),
            })?;
        debug!(sha, full_sha = %full_sha, "Resolved commit");
        // Keep the sha the dataset was keyed by; the url uses the full one.
        let mut metadata = record.validate(&full_sha, &self.repo_url)?;
        metadata.sha = sha.to_string();
        Ok(metadata)
    }

    fn name(&self) -> &'static str {
        "git"
    }
}
