//! `completions` command: shell completion scripts.

use anyhow::Result;
use calc_core::cli::ExitCode;
use clap::Command;
use clap_complete::{Shell, generate};
use std::io::{self, Write};
use tracing::debug;

/// Writes the completion script for `shell` to `out`.
///
/// # Examples
///
/// ```
/// use calc_cli::commands::completions;
/// use clap::Command;
/// use clap_complete::Shell;
///
/// let mut cmd = Command::new("plugin-calc").subcommand(Command::new("eval"));
/// let mut script = Vec::new();
/// completions::write_completions(Shell::Bash, &mut cmd, &mut script);
/// assert!(String::from_utf8(script).unwrap().contains("plugin-calc"));
/// ```
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    debug!("generating {shell} completions");
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

/// Prints the completion script for `shell` to stdout.
pub async fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    write_completions(shell, cmd, &mut io::stdout());
    Ok(ExitCode::SUCCESS)
}
