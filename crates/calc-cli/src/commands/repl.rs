//! `repl` command: an interactive calculator session.
//!
//! Each input line is a key sequence (with `@Name` tokens invoking
//! plugins) or one of the session commands below. The display is printed
//! after every key line.
//!
//! | Command | Effect |
//! |---|---|
//! | `:plugins` | list the registered plugins |
//! | `:refresh` | fetch the plugin listing again |
//! | `:upload <file>` | upload plugin source and refresh |
//! | `:help` | show this table |
//! | `:quit` | leave (end of input works too) |

use crate::commands::common::{self, Connected};
use anyhow::Result;
use calc_core::cli::ExitCode;
use calc_core::{ClientConfig, Error};
use colored::Colorize;
use std::io::{IsTerminal, Write};
use std::path::Path;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::debug;

const HELP: &str = "\
keys       digits . + - * / = C BS +/- and @Name to run a plugin
:plugins   list registered plugins
:refresh   fetch the plugin listing again
:upload F  upload plugin source file F
:quit      leave";

/// A parsed input line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank line
    Empty,
    /// Key sequence for the engine
    Keys(&'a str),
    /// `:plugins`
    Plugins,
    /// `:refresh`
    Refresh,
    /// `:upload <file>`
    Upload(&'a str),
    /// `:help`
    Help,
    /// `:quit`
    Quit,
    /// Any other `:` command
    Unknown(&'a str),
}

impl<'a> Line<'a> {
    /// Classifies one input line.
    #[must_use]
    pub fn parse(line: &'a str) -> Self {
        let line = line.trim();
        let Some(command) = line.strip_prefix(':') else {
            return if line.is_empty() {
                Self::Empty
            } else {
                Self::Keys(line)
            };
        };
        let (name, arg) = command
            .split_once(char::is_whitespace)
            .map_or((command, ""), |(name, arg)| (name, arg.trim()));
        match (name, arg) {
            ("plugins", "") => Self::Plugins,
            ("refresh", "") => Self::Refresh,
            ("upload", file) if !file.is_empty() => Self::Upload(file),
            ("help", "") => Self::Help,
            ("quit" | "q" | "exit", "") => Self::Quit,
            _ => Self::Unknown(line),
        }
    }
}

/// Runs the session loop over `input`, writing feedback to `out`.
///
/// The registry is refreshed once before the first line. Failures are
/// reported on `out` and never end the loop.
///
/// # Errors
///
/// Returns an error only if reading input or writing output fails.
pub async fn run_lines<R, W>(
    connected: &Connected,
    input: R,
    out: &mut W,
    prompt: bool,
) -> Result<ExitCode>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let result = connected.session.refresh().await;
    report(connected, out, result.map(|_| ()))?;

    let mut lines = input.lines();
    loop {
        if prompt {
            write!(out, "{} ", ">".bold())?;
            out.flush()?;
        }
        let Some(raw) = lines.next_line().await? else {
            break;
        };
        debug!(line = %raw, "repl input");

        match Line::parse(&raw) {
            Line::Empty => {}
            Line::Quit => break,
            Line::Help => writeln!(out, "{HELP}")?,
            Line::Unknown(text) => writeln!(out, "{} unknown command {text}, try :help", "?".yellow())?,
            Line::Plugins => {
                let registry = connected.session.snapshot().await;
                if registry.is_empty() {
                    writeln!(out, "{}", "no plugins registered".dimmed())?;
                }
                for name in registry.names() {
                    writeln!(out, "{name}")?;
                }
            }
            Line::Refresh => {
                let result = connected.session.refresh().await;
                if let Ok(outcome) = &result {
                    writeln!(out, "{} plugins", outcome.registry.len())?;
                }
                report(connected, out, result.map(|_| ()))?;
            }
            Line::Upload(file) => {
                let result = connected.session.upload_file(Path::new(file)).await;
                if let Ok(outcome) = &result {
                    let status = if outcome.registered {
                        "registered".green()
                    } else {
                        "not listed by host".yellow()
                    };
                    writeln!(out, "uploaded {}: {status}", outcome.plugin_name)?;
                }
                report(connected, out, result.map(|_| ()))?;
            }
            Line::Keys(keys) => {
                let result = connected.session.run_script(keys).await;
                if let Ok(display) = &result {
                    writeln!(out, "{display}")?;
                }
                report(connected, out, result.map(|_| ()))?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Writes the diagnostics recorded since the last call, then `result`'s
/// error unless it was one of them.
fn report<W: Write>(connected: &Connected, out: &mut W, result: Result<(), Error>) -> Result<()> {
    let recorded = connected.diagnostics.drain();
    for diagnostic in &recorded {
        writeln!(out, "{} {diagnostic}", "!".red().bold())?;
    }
    if let Err(err) = result {
        let message = err.to_string();
        if !recorded.iter().any(|d| d.message == message) {
            writeln!(out, "{} {message}", "error:".red().bold())?;
        }
    }
    Ok(())
}

/// Runs the repl command on stdin and stdout.
///
/// # Errors
///
/// Returns an error if the host URL is unusable or the terminal fails.
pub async fn run(config: &ClientConfig) -> Result<ExitCode> {
    let connected = common::connect_buffered(config)?;
    let prompt = std::io::stdin().is_terminal();
    let input = BufReader::new(tokio::io::stdin());
    let mut out = std::io::stdout();
    run_lines(&connected, input, &mut out, prompt).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lines() {
        assert_eq!(Line::parse("   "), Line::Empty);
        assert_eq!(Line::parse("2 + 2 ="), Line::Keys("2 + 2 ="));
        assert_eq!(Line::parse(":plugins"), Line::Plugins);
        assert_eq!(Line::parse(" :refresh "), Line::Refresh);
        assert_eq!(Line::parse(":upload  src/Square.java"), Line::Upload("src/Square.java"));
        assert_eq!(Line::parse(":q"), Line::Quit);
        assert_eq!(Line::parse(":help"), Line::Help);
    }

    #[test]
    fn test_parse_rejects_malformed_commands() {
        assert_eq!(Line::parse(":upload"), Line::Unknown(":upload"));
        assert_eq!(Line::parse(":plugins now"), Line::Unknown(":plugins now"));
        assert_eq!(Line::parse(":frobnicate"), Line::Unknown(":frobnicate"));
    }
}
