//! Text formatting functions for `perfboard`.
//!
//! Plain tables for terminal output, with optional ANSI color via
//! `crossterm`. Column widths are measured in visible columns so commit
//! messages with wide characters line up.

use crate::compare::{ChangeClass, ChangeThresholds, ComparisonSummary};
use crate::model::{BenchmarkResult, CommitSnapshot, ComparisonRow};
use crate::util::time::format_short;
use crossterm::style::Stylize;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Shown wherever a relative change is undefined.
pub const NOT_AVAILABLE: &str = "n/a";

/// Formatting options for text output.
#[derive(Debug, Clone, Copy)]
pub struct TextFormatOptions {
    pub use_color: bool,
    pub max_width: Option<usize>,
    pub short_sha_len: usize,
}

impl TextFormatOptions {
    #[must_use]
    pub const fn plain() -> Self {
        Self {
            use_color: false,
            max_width: None,
            short_sha_len: 7,
        }
    }
}

/// Determine terminal width from environment (falls back to 80).
#[must_use]
pub fn terminal_width() -> usize {
    if let Ok(columns) = std::env::var("COLUMNS") {
        if let Ok(value) = columns.trim().parse::<usize>() {
            if value > 0 {
                return value;
            }
        }
    }
    80
}

/// Truncate text to fit within `max_len` visible columns.
#[must_use]
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if max_len == 0 {
        return String::new();
    }
    if visible_len(text) <= max_len {
        return text.to_string();
    }

    let (target_len, ellipsis) = if max_len <= 3 {
        (max_len, "")
    } else {
        (max_len - 3, "...")
    };
    let mut w = 0;
    let mut s = String::new();
    for c in text.chars() {
        let cw = UnicodeWidthChar::width(c).unwrap_or(0);
        if w + cw > target_len {
            break;
        }
        w += cw;
        s.push(c);
    }
    s.push_str(ellipsis);
    s
}

fn visible_len(text: &str) -> usize {
    UnicodeWidthStr::width(text)
}

fn pad_right(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(visible_len(text));
    format!("{text}{}", " ".repeat(pad))
}

fn pad_left(text: &str, width: usize) -> String {
    let pad = width.saturating_sub(visible_len(text));
    format!("{}{text}", " ".repeat(pad))
}

/// Format a runtime in seconds.
#[must_use]
pub fn format_time(seconds: f64) -> String {
    format!("{seconds:.4}")
}

#[must_use]
pub fn format_score(score: f64) -> String {
    format!("{score:.2}")
}

/// Format a relative change as a signed percentage, or `n/a`.
#[must_use]
pub fn format_change_pct(change: Option<f64>) -> String {
    change.map_or_else(|| NOT_AVAILABLE.to_string(), |pct| format!("{pct:+.2}%"))
}

/// Format a change class label with optional color.
#[must_use]
pub fn format_change_class(class: ChangeClass, use_color: bool) -> String {
    let label = class.as_str();
    if !use_color {
        return label.to_string();
    }

    match class {
        ChangeClass::Improved => label.green().to_string(),
        ChangeClass::Regressed => label.red().bold().to_string(),
        ChangeClass::Neutral => label.dark_grey().to_string(),
        ChangeClass::Undefined => label.yellow().to_string(),
    }
}

struct Table {
    headers: Vec<&'static str>,
    right_aligned: Vec<bool>,
    rows: Vec<Vec<String>>,
}

impl Table {
    fn new(columns: &[(&'static str, bool)]) -> Self {
        Self {
            headers: columns.iter().map(|(h, _)| *h).collect(),
            right_aligned: columns.iter().map(|(_, r)| *r).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| visible_len(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(visible_len(cell));
            }
        }
        widths
    }

    /// Render the table. `decorate` may color a cell after padding.
    fn render(&self, decorate: impl Fn(usize, usize, String) -> String) -> String {
        let widths = self.widths();
        let align = |i: usize, text: &str| {
            if self.right_aligned[i] {
                pad_left(text, widths[i])
            } else {
                pad_right(text, widths[i])
            }
        };

        let mut out = String::new();
        let header: Vec<String> = self
            .headers
            .iter()
            .enumerate()
            .map(|(i, h)| align(i, h))
            .collect();
        out.push_str(header.join("  ").trim_end());
        out.push('\n');
        let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
        out.push_str(&rule.join("  "));
        out.push('\n');

        for (r, row) in self.rows.iter().enumerate() {
            let cells: Vec<String> = row
                .iter()
                .enumerate()
                .map(|(i, cell)| decorate(r, i, align(i, cell)))
                .collect();
            out.push_str(cells.join("  ").trim_end());
            out.push('\n');
        }
        out
    }
}

/// Render comparison rows as an aligned table.
///
/// Columns: id, case, best, left, right, delta, change, class, and scores.
/// Score moves of at least the threshold are marked with `*`.
#[must_use]
pub fn render_comparison_table(
    rows: &[&ComparisonRow],
    thresholds: &ChangeThresholds,
    options: TextFormatOptions,
) -> String {
    const CLASS_COLUMN: usize = 7;

    let mut table = Table::new(&[
        ("ID", true),
        ("CASE", false),
        ("BEST", true),
        ("LEFT", true),
        ("RIGHT", true),
        ("DELTA", true),
        ("CHANGE", true),
        ("CLASS", false),
        ("L.SCORE", true),
        ("R.SCORE", true),
    ]);
    let name_width = options.max_width.map(|w| (w / 4).max(12));

    let mut classes = Vec::with_capacity(rows.len());
    for row in rows {
        let class = thresholds.classify(row);
        classes.push(class);
        let name = name_width.map_or_else(|| row.name.clone(), |w| truncate_text(&row.name, w));
        let marker = if thresholds.score_moved(row) { "*" } else { "" };
        table.push(vec![
            row.id.to_string(),
            name,
            format_time(row.best_time),
            format_time(row.left_time),
            format_time(row.right_time),
            format!("{:+.4}", row.absolute_change),
            format_change_pct(row.relative_change),
            class.as_str().to_string(),
            format_score(row.left_score),
            format!("{}{marker}", format_score(row.right_score)),
        ]);
    }

    table.render(|r, col, cell| {
        if col == CLASS_COLUMN && options.use_color {
            let class = classes[r];
            let label = class.as_str();
            cell.replacen(label, &format_change_class(class, true), 1)
        } else {
            cell
        }
    })
}

/// One-line summary of a comparison.
#[must_use]
pub fn format_summary_line(summary: &ComparisonSummary, avg_relative_change: f64) -> String {
    format!(
        "{} cases joined: {} improved, {} regressed, {} neutral, {} n/a; {} score moves; average change {:+.2}%",
        summary.joined,
        summary.improved,
        summary.regressed,
        summary.neutral,
        summary.undefined,
        summary.score_moved,
        avg_relative_change
    )
}

/// Header line naming a commit: `{short} {date} {author} {summary}`.
#[must_use]
pub fn format_commit_header(commit: &CommitSnapshot, options: TextFormatOptions) -> String {
    let short = commit.short_sha(options.short_sha_len);
    let sha = if options.use_color {
        short.yellow().to_string()
    } else {
        short.to_string()
    };
    format!(
        "{sha} {} {} {}",
        format_short(&commit.date),
        commit.author,
        commit.summary()
    )
}

/// Render commits as a table, in the given order.
#[must_use]
pub fn render_commit_list(commits: &[&CommitSnapshot], options: TextFormatOptions) -> String {
    let mut table = Table::new(&[
        ("SHA", false),
        ("DATE", false),
        ("SCORE", true),
        ("CASES", true),
        ("AUTHOR", false),
        ("MESSAGE", false),
    ]);
    let message_width = options.max_width.map(|w| w.saturating_sub(60).max(20));

    for commit in commits {
        let summary = commit.summary();
        table.push(vec![
            commit.short_sha(options.short_sha_len).to_string(),
            format_short(&commit.date),
            format_score(commit.average_score),
            commit.benchmarks.len().to_string(),
            truncate_text(&commit.author, 20),
            message_width.map_or_else(|| summary.to_string(), |w| truncate_text(summary, w)),
        ]);
    }

    table.render(|_, col, cell| {
        if col == 0 && options.use_color {
            cell.yellow().to_string()
        } else {
            cell
        }
    })
}

/// Render one commit's benchmarks.
#[must_use]
pub fn render_benchmarks(benchmarks: &[BenchmarkResult]) -> String {
    let mut table = Table::new(&[
        ("ID", true),
        ("CASE", false),
        ("STATUS", false),
        ("RUNTIME", true),
        ("BEST", true),
        ("SCORE", true),
    ]);
    for bench in benchmarks {
        table.push(vec![
            bench.id.to_string(),
            bench.name.clone(),
            bench.status.clone(),
            format_time(bench.runtime),
            format_time(bench.best_time),
            format_score(bench.score),
        ]);
    }
    table.render(|_, _, cell| cell)
}
