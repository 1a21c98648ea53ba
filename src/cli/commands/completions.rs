//! Shell completions generation command.
//!
//! ```bash
//! perfboard completions bash > ~/.local/share/bash-completion/completions/perfboard
//! perfboard completions zsh -o ~/.zfunc/_perfboard
//! ```

use crate::cli::{Cli, CompletionsArgs, ShellType};
use crate::error::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::fs::File;
use std::io::{self, Write};
use tracing::info;

const BIN_NAME: &str = "perfboard";

/// Execute the completions command.
///
/// # Errors
///
/// Returns an error if the output file cannot be written.
pub fn execute(args: &CompletionsArgs) -> Result<()> {
    let shell = convert_shell_type(args.shell);
    info!(shell = %shell, output = ?args.output, "Generating shell completions");

    match &args.output {
        Some(path) => {
            let mut file = File::create(path)?;
            write_completions(shell, &mut file)?;
            eprintln!("Generated {shell} completions to {}", path.display());
        }
        None => write_completions(shell, &mut io::stdout().lock())?,
    }
    Ok(())
}

fn write_completions<W: Write>(shell: Shell, out: &mut W) -> io::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, BIN_NAME, out);
    out.flush()
}

const fn convert_shell_type(shell: ShellType) -> Shell {
    match shell {
        ShellType::Bash => Shell::Bash,
        ShellType::Zsh => Shell::Zsh,
        ShellType::Fish => Shell::Fish,
        ShellType::PowerShell => Shell::PowerShell,
        ShellType::Elvish => Shell::Elvish,
    }
}
