//! `eval` command: run a key sequence and print the result.

use crate::commands::common::{self, Connected};
use anyhow::Result;
use calc_core::cli::{ExitCode, OutputFormat};
use calc_core::{ClientConfig, Diagnostic};
use calc_engine::{PendingOperation, Phase};
use calc_plugins::PLUGIN_PREFIX;
use serde::Serialize;
use tracing::{debug, warn};

/// Outcome of an evaluated key sequence.
#[derive(Debug, Clone, Serialize)]
pub struct EvalReport {
    /// Final display text
    pub display: String,
    /// Entry phase the engine ended in
    pub phase: Phase,
    /// Operator still waiting for `=`, if any
    pub pending: Option<PendingOperation>,
    /// Plugin steps that failed and were skipped
    pub diagnostics: Vec<Diagnostic>,
}

/// Returns true if any token of `script` invokes a plugin.
#[must_use]
pub fn uses_plugins(script: &str) -> bool {
    script
        .split_whitespace()
        .any(|token| token.starts_with(PLUGIN_PREFIX))
}

/// Evaluates `script` on a fresh session.
///
/// The registry is refreshed first only when the script invokes a plugin,
/// so plain arithmetic never touches the network. A failed refresh leaves
/// the registry as it was (empty for a fresh session). Its diagnostic stays
/// in the report and the script still runs, skipping plugin steps the
/// registry does not know.
///
/// # Errors
///
/// Returns the first key or engine error. Refresh and plugin step
/// failures do not stop the script; they end up in
/// [`EvalReport::diagnostics`].
pub async fn evaluate(connected: &Connected, script: &str) -> calc_core::Result<EvalReport> {
    if uses_plugins(script) {
        debug!("script invokes plugins, refreshing registry");
        if let Err(err) = connected.session.refresh().await {
            warn!(error = %err, "registry refresh failed, running without plugins");
        }
    }
    let display = connected.session.run_script(script).await?;
    let state = connected.session.state();
    Ok(EvalReport {
        display: display.to_string(),
        phase: state.phase(),
        pending: state.pending,
        diagnostics: connected.diagnostics.drain(),
    })
}

/// Runs the eval command.
///
/// # Errors
///
/// Returns an error if the host URL is unusable or output cannot be
/// formatted.
pub async fn run(
    keys: Vec<String>,
    config: &ClientConfig,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let script = keys.join(" ");
    let connected = common::connect(config)?;

    match evaluate(&connected, &script).await {
        Ok(report) => {
            common::print_report(&report, output_format)?;
            Ok(common::exit_code_for(&report.diagnostics))
        }
        Err(err) => Ok(common::failure(&err, &connected.diagnostics)),
    }
}
