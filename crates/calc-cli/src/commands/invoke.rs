//! `invoke` command: run one plugin on an explicit operand.

use crate::commands::common::{self, Connected};
use anyhow::Result;
use calc_core::cli::{ExitCode, OutputFormat};
use calc_core::{ClientConfig, PluginName};
use calc_engine::DisplayValue;
use serde::Serialize;
use tracing::info;

/// Outcome of a single plugin invocation.
#[derive(Debug, Clone, Serialize)]
pub struct InvokeReport {
    /// Plugin that was run
    pub plugin: String,
    /// Operand text as sent to the host
    pub operand: String,
    /// Result rendered the way the display would show it
    pub result: String,
}

/// Refreshes the registry, then invokes `plugin` on `value`.
///
/// Input is validated before any request is made.
///
/// # Errors
///
/// Returns a validation error for a bad plugin name or operand, the
/// refresh error, or the invocation error.
pub async fn invoke(
    connected: &Connected,
    plugin: &str,
    value: &str,
) -> calc_core::Result<InvokeReport> {
    let plugin = PluginName::new(plugin)?;
    let operand = DisplayValue::new(value)?;

    connected.session.refresh().await?;
    let result = connected.session.calculate(&plugin, &operand).await?;

    Ok(InvokeReport {
        plugin: plugin.to_string(),
        operand: operand.to_string(),
        result: DisplayValue::from_number(result).to_string(),
    })
}

/// Runs the invoke command.
///
/// # Errors
///
/// Returns an error if the host URL is unusable or output cannot be
/// formatted.
pub async fn run(
    plugin: String,
    value: String,
    config: &ClientConfig,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let connected = common::connect(config)?;
    match invoke(&connected, &plugin, &value).await {
        Ok(report) => {
            info!(plugin = %report.plugin, result = %report.result, "invocation complete");
            common::print_report(&report, output_format)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => Ok(common::failure(&err, &connected.diagnostics)),
    }
}
