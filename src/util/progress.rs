//! Progress indicators for long-running build steps.
//!
//! Progress is drawn on stderr only when it is an interactive terminal, so
//! piped and JSON runs stay quiet.

use indicatif::{ProgressBar, ProgressDrawTarget, ProgressStyle};
use std::io::{IsTerminal, stderr};

/// Check if we should show progress indicators.
#[must_use]
pub fn should_show_progress() -> bool {
    stderr().is_terminal()
}

/// Create a determinate progress bar, hidden unless `show` is set.
#[must_use]
pub fn create_progress_bar(total: u64, message: &str, show: bool) -> ProgressBar {
    let pb = ProgressBar::new(total);

    if show {
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        {
            pb.set_style(style.progress_chars("=>-"));
        }
        pb.set_message(message.to_string());
    } else {
        pb.set_draw_target(ProgressDrawTarget::hidden());
    }

    pb
}

/// Progress bar wrapper that remembers whether it is drawn.
///
/// Shared by reference across fetch workers.
pub struct ProgressTracker {
    bar: ProgressBar,
    showing: bool,
}

impl ProgressTracker {
    /// Tracker that draws when stderr is a terminal and `enabled` is set.
    #[must_use]
    pub fn new(total: u64, message: &str, enabled: bool) -> Self {
        let showing = enabled && should_show_progress();
        Self {
            bar: create_progress_bar(total, message, showing),
            showing,
        }
    }

    /// Tracker that never draws.
    #[must_use]
    pub fn hidden() -> Self {
        Self {
            bar: create_progress_bar(0, "", false),
            showing: false,
        }
    }

    pub fn inc(&self, delta: u64) {
        self.bar.inc(delta);
    }

    pub fn set_length(&self, len: u64) {
        self.bar.set_length(len);
    }

    #[must_use]
    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish_and_clear(&self) {
        self.bar.finish_and_clear();
    }

    #[must_use]
    pub const fn is_showing(&self) -> bool {
        self.showing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_tracker_counts() {
        let tracker = ProgressTracker::hidden();
        tracker.set_length(10);
        for _ in 0..10 {
            tracker.inc(1);
        }
        assert_eq!(tracker.position(), 10);
        assert!(!tracker.is_showing());
        tracker.finish_and_clear();
    }

    #[test]
    fn test_disabled_tracker_never_shows() {
        let tracker = ProgressTracker::new(5, "Fetching", false);
        assert!(!tracker.is_showing());
    }
}
