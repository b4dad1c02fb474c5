//! Helpers shared by the commands that talk to the plugin host.

use anyhow::{Context, Result};
use calc_core::cli::{ExitCode, OutputFormat};
use calc_core::{ClientConfig, Diagnostic, DiagnosticSink, Error, FanoutSink, MemorySink, TracingSink};
use calc_plugins::CalculatorSession;
use colored::Colorize;
use serde::Serialize;
use std::sync::Arc;

/// A session plus the buffer its diagnostics are collected in.
#[derive(Debug)]
pub struct Connected {
    /// Session wired to the configured host
    pub session: CalculatorSession,
    /// Every diagnostic recorded by the session, also logged via `tracing`
    pub diagnostics: MemorySink,
}

/// Connects a session to the host named in `config`.
///
/// Diagnostics go to the log and to [`Connected::diagnostics`].
///
/// # Errors
///
/// Returns an error if the host URL is unusable.
pub fn connect(config: &ClientConfig) -> Result<Connected> {
    connect_to(config, true)
}

/// Connects a session whose diagnostics are only buffered, for callers
/// that print them themselves.
///
/// # Errors
///
/// Returns an error if the host URL is unusable.
pub fn connect_buffered(config: &ClientConfig) -> Result<Connected> {
    connect_to(config, false)
}

fn connect_to(config: &ClientConfig, log: bool) -> Result<Connected> {
    let diagnostics = MemorySink::new();
    let sink: Arc<dyn DiagnosticSink> = if log {
        Arc::new(FanoutSink::new(vec![
            Arc::new(TracingSink),
            Arc::new(diagnostics.clone()),
        ]))
    } else {
        Arc::new(diagnostics.clone())
    };
    let session = CalculatorSession::connect(config, sink)
        .with_context(|| format!("cannot use plugin host {}", config.host.base_url))?;
    Ok(Connected {
        session,
        diagnostics,
    })
}

/// Prints a report to stdout in the requested format.
///
/// # Errors
///
/// Returns an error if the report cannot be formatted.
pub fn print_report<T: Serialize>(report: &T, format: OutputFormat) -> Result<()> {
    let formatted =
        crate::formatters::format_output(report, format).context("failed to format output")?;
    println!("{formatted}");
    Ok(())
}

/// Reports a failed operation and maps it to an exit code.
///
/// Failures that were recorded as diagnostics have been logged already;
/// anything else is printed to stderr here.
#[must_use]
pub fn failure(err: &Error, diagnostics: &MemorySink) -> ExitCode {
    let message = err.to_string();
    let recorded = diagnostics
        .snapshot()
        .last()
        .is_some_and(|d| d.message == message);
    if !recorded {
        eprintln!("{} {message}", "error:".red().bold());
    }
    ExitCode::for_error(err)
}

/// Exit code for a run that finished but recorded diagnostics.
///
/// The first diagnostic decides, so a script that hit an unreachable host
/// reports a host error even if it produced a display value.
#[must_use]
pub fn exit_code_for(diagnostics: &[Diagnostic]) -> ExitCode {
    diagnostics
        .first()
        .map_or(ExitCode::SUCCESS, |d| ExitCode::for_kind(d.kind))
}

#[cfg(test)]
mod tests {
    use super::*;
    use calc_core::{ErrorKind, PipelineOperation};

    #[test]
    fn test_exit_code_for_no_diagnostics() {
        assert_eq!(exit_code_for(&[]), ExitCode::SUCCESS);
    }

    #[test]
    fn test_exit_code_for_first_diagnostic() {
        let diagnostics = [
            Diagnostic {
                operation: PipelineOperation::Invoke,
                kind: ErrorKind::UnknownPlugin,
                message: "Cube".to_string(),
            },
            Diagnostic {
                operation: PipelineOperation::Refresh,
                kind: ErrorKind::Config,
                message: "late".to_string(),
            },
        ];
        assert_eq!(exit_code_for(&diagnostics), ExitCode::HOST_ERROR);
    }

    #[test]
    fn test_connect_rejects_unusable_host() {
        let mut config = ClientConfig::default();
        config.host.base_url = "http://".to_string();
        assert!(connect(&config).is_err());
    }

    #[test]
    fn test_failure_maps_kind() {
        let sink = MemorySink::new();
        let err = Error::InvalidArgument("unknown key".to_string());
        assert_eq!(failure(&err, &sink), ExitCode::INVALID_INPUT);
    }
}
