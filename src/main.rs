use clap::Parser;
use perfboard::cli::commands;
use perfboard::cli::{Cli, Commands};
use perfboard::config;
use perfboard::logging::init_logging;
use perfboard::{PerfError, StructuredError};
use std::io::{self, IsTerminal};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = init_logging(cli.verbose, cli.quiet, cli.log_format) {
        eprintln!("Failed to initialize logging: {e}");
    }

    let overrides = build_cli_overrides(&cli);

    let result = match &cli.command {
        Commands::Build(args) => commands::build::execute(args, cli.json, &overrides),
        Commands::Compare(args) => commands::compare::execute(args, cli.json, &overrides),
        Commands::List(args) => commands::list::execute(args, cli.json, &overrides),
        Commands::Show(args) => commands::show::execute(args, cli.json, &overrides),
        Commands::Schema => commands::schema::execute(),
        Commands::Config(args) => commands::config::execute(args, cli.json, &overrides),
        Commands::Version => commands::version::execute(cli.json),
        Commands::Completions(args) => commands::completions::execute(args),
    };

    if let Err(e) = result {
        handle_error(&e, cli.json);
    }
}

/// Handle errors with structured output support.
///
/// When --json is set or stdout is not a TTY, outputs structured JSON to stderr.
/// Otherwise, outputs a human-readable error with optional color.
fn handle_error(err: &PerfError, json_mode: bool) -> ! {
    let structured = StructuredError::from_error(err);
    let exit_code = structured.exit_code();

    let use_json = json_mode || !io::stdout().is_terminal();

    if use_json {
        let json = structured.to_json();
        eprintln!(
            "{}",
            serde_json::to_string_pretty(&json).unwrap_or_else(|_| json.to_string())
        );
    } else {
        let use_color = io::stderr().is_terminal();
        eprintln!("{}", structured.to_human(use_color));
    }

    std::process::exit(exit_code);
}

fn build_cli_overrides(cli: &Cli) -> config::CliOverrides {
    let mut overrides = config::CliOverrides {
        config_path: cli.config.clone(),
        ..config::CliOverrides::default()
    };

    match &cli.command {
        Commands::Build(args) => {
            overrides.reference_file.clone_from(&args.reference);
            overrides.results_dir.clone_from(&args.results_dir);
            overrides.output.clone_from(&args.output);
            overrides.metadata_file.clone_from(&args.metadata_file);
            overrides.repo_path.clone_from(&args.repo_path);
            overrides.repo_url.clone_from(&args.repo_url);
            overrides.fetch_workers = args.workers;
            overrides.fetch_timeout_ms = args.timeout_ms;
        }
        Commands::Compare(args) => overrides.output.clone_from(&args.dataset),
        Commands::List(args) => overrides.output.clone_from(&args.dataset),
        Commands::Show(args) => overrides.output.clone_from(&args.dataset),
        Commands::Schema | Commands::Config(_) | Commands::Version | Commands::Completions(_) => {}
    }

    overrides
}
