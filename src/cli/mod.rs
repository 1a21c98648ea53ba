//! CLI definitions and entry point.

use crate::logging::LogFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

pub mod commands;

/// Per-commit benchmark scoring and commit-to-commit comparison
#[derive(Parser, Debug)]
#[command(name = "perfboard", author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Log line format on stderr
    #[arg(long, value_enum, default_value_t = LogFormat::Text, global = true)]
    pub log_format: LogFormat,

    /// Project config file (default: .perfboard/config.yaml)
    #[arg(long, global = true, env = "PERFBOARD_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score result files and write the dataset
    Build(BuildArgs),

    /// Compare two commits of a dataset
    Compare(CompareArgs),

    /// List commits in a dataset
    List(ListArgs),

    /// Show one commit's benchmarks
    Show(ShowArgs),

    /// Print the JSON Schema of the dataset file
    Schema,

    /// Inspect configuration
    Config(ConfigArgs),

    /// Show version information
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}

/// Arguments for the build command.
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Reference table (case name, id, best time)
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Directory of per-commit result files
    #[arg(long)]
    pub results_dir: Option<PathBuf>,

    /// Dataset file to write
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Skip metadata lookup; every commit gets placeholder metadata
    #[arg(long)]
    pub no_fetch: bool,

    /// Read commit metadata from a JSON file instead of git
    #[arg(long, conflicts_with = "no_fetch")]
    pub metadata_file: Option<PathBuf>,

    /// Git checkout used for metadata lookup
    #[arg(long)]
    pub repo_path: Option<PathBuf>,

    /// Base url for commit links
    #[arg(long)]
    pub repo_url: Option<String>,

    /// Concurrent metadata lookups
    #[arg(long)]
    pub workers: Option<usize>,

    /// Per-commit lookup timeout in ms
    #[arg(long)]
    pub timeout_ms: Option<u64>,
}

/// Output format for compare.
#[derive(ValueEnum, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CompareFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Arguments for the compare command.
#[derive(Args, Debug, Clone, Default)]
pub struct CompareArgs {
    /// Base commit (sha or unique prefix)
    #[arg(required_unless_present = "link")]
    pub base: Option<String>,

    /// Commit compared against the base
    #[arg(required_unless_present = "link")]
    pub head: Option<String>,

    /// Take both commits from a `?base=..&compare=..` query or url
    #[arg(long, conflicts_with_all = ["base", "head"])]
    pub link: Option<String>,

    /// Sort column
    #[arg(long, short = 's', default_value = "id")]
    pub sort: String,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Output format
    #[arg(long, short = 'f', value_enum, default_value_t = CompareFormat::Text)]
    pub format: CompareFormat,

    /// Dataset file (default: configured output)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

/// Arguments for the list command.
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    /// Only commits on or after this time (RFC 3339, YYYY-MM-DD, -7d)
    #[arg(long)]
    pub since: Option<String>,

    /// Only commits on or before this time
    #[arg(long)]
    pub until: Option<String>,

    /// Show at most N commits, newest first
    #[arg(long)]
    pub limit: Option<usize>,

    /// Dataset file (default: configured output)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

/// Arguments for the show command.
#[derive(Args, Debug, Clone, Default)]
pub struct ShowArgs {
    /// Commit sha or unique prefix
    pub sha: String,

    /// Dataset file (default: configured output)
    #[arg(long)]
    pub dataset: Option<PathBuf>,
}

/// Arguments for the config command.
#[derive(Args, Debug, Clone, Default)]
pub struct ConfigArgs {
    /// List every key with its value and source
    #[arg(long, short = 'l')]
    pub list: bool,

    /// Get a specific config value by key
    #[arg(long, short = 'g', value_name = "KEY", conflicts_with = "list")]
    pub get: Option<String>,

    /// Show config file paths
    #[arg(long, short = 'p')]
    pub path: bool,
}

/// Arguments for the completions command.
#[derive(Args, Debug, Clone)]
pub struct CompletionsArgs {
    /// Shell to generate completions for
    #[arg(value_enum)]
    pub shell: ShellType,

    /// Output file (default: stdout)
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,
}

/// Supported shells for completion generation.
#[derive(ValueEnum, Debug, Clone, Copy, Eq, PartialEq)]
pub enum ShellType {
    Bash,
    Zsh,
    Fish,
    #[value(name = "powershell")]
    #[value(alias = "pwsh")]
    /// `PowerShell`
    PowerShell,
    Elvish,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn compare_accepts_positional_pair() {
        let cli = Cli::try_parse_from([
            "perfboard", "compare", "abc", "def", "--sort", "relative_change", "--desc",
        ])
        .expect("parse");
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.base.as_deref(), Some("abc"));
        assert_eq!(args.head.as_deref(), Some("def"));
        assert!(args.desc);
        assert_eq!(args.format, CompareFormat::Text);
    }

    #[test]
    fn compare_link_replaces_positionals() {
        let cli = Cli::try_parse_from(["perfboard", "compare", "--link", "?base=a&compare=b"])
            .expect("parse");
        let Commands::Compare(args) = cli.command else {
            panic!("expected compare");
        };
        assert_eq!(args.base, None);
        assert!(args.link.is_some());

        assert!(Cli::try_parse_from(["perfboard", "compare", "abc"]).is_err());
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["perfboard", "list", "--json", "-vv"]).expect("parse");
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
    }

    #[test]
    fn no_fetch_conflicts_with_metadata_file() {
        assert!(
            Cli::try_parse_from([
                "perfboard",
                "build",
                "--no-fetch",
                "--metadata-file",
                "m.json"
            ])
            .is_err()
        );
    }
}
