//! `plugins` command: list and upload plugins.

use crate::actions::PluginsAction;
use crate::commands::common::{self, Connected};
use anyhow::Result;
use calc_core::cli::{ExitCode, OutputFormat};
use calc_core::{ClientConfig, PluginName};
use calc_plugins::{PluginRegistry, UploadOutcome};
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

/// Plugins registered on the host.
#[derive(Debug, Clone, Serialize)]
pub struct PluginList {
    /// Host base URL
    pub host: String,
    /// Number of registered plugins
    pub count: usize,
    /// Plugin names with the metadata the host reported for each
    pub plugins: PluginRegistry,
}

/// Outcome of an accepted upload.
#[derive(Debug, Clone, Serialize)]
pub struct UploadReport {
    /// Name that was requested
    pub plugin: String,
    /// Whether the refreshed listing contains the plugin
    pub registered: bool,
    /// Names in the refreshed listing
    pub plugins: Vec<String>,
}

impl From<&UploadOutcome> for UploadReport {
    fn from(outcome: &UploadOutcome) -> Self {
        Self {
            plugin: outcome.plugin_name.to_string(),
            registered: outcome.registered,
            plugins: outcome.registry.names().map(ToString::to_string).collect(),
        }
    }
}

/// Fetches the host's plugin listing.
///
/// # Errors
///
/// Returns the refresh error.
pub async fn list(connected: &Connected, host: &str) -> calc_core::Result<PluginList> {
    let outcome = connected.session.refresh().await?;
    Ok(PluginList {
        host: host.to_string(),
        count: outcome.registry.len(),
        plugins: PluginRegistry::clone(&outcome.registry),
    })
}

/// Uploads a plugin source file, optionally under an explicit name.
///
/// # Errors
///
/// Returns a validation error for a bad `name`, or the upload error.
pub async fn upload(
    connected: &Connected,
    file: &Path,
    name: Option<&str>,
) -> calc_core::Result<UploadReport> {
    let outcome = match name {
        Some(name) => {
            let name = PluginName::new(name)?;
            connected.session.upload_file_as(file, name).await?
        }
        None => connected.session.upload_file(file).await?,
    };
    if !outcome.registered {
        warn!(plugin = %outcome.plugin_name, "host accepted the upload but does not list the plugin");
    }
    Ok(UploadReport::from(&outcome))
}

/// Runs the plugins command.
///
/// An upload the host accepted but did not register exits with
/// [`ExitCode::HOST_ERROR`] after printing the report.
///
/// # Errors
///
/// Returns an error if the host URL is unusable or output cannot be
/// formatted.
pub async fn run(
    action: PluginsAction,
    config: &ClientConfig,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let connected = common::connect(config)?;
    match action {
        PluginsAction::List => match list(&connected, &config.host.base_url).await {
            Ok(listing) => {
                info!(count = listing.count, "listed plugins");
                common::print_report(&listing, output_format)?;
                Ok(ExitCode::SUCCESS)
            }
            Err(err) => Ok(common::failure(&err, &connected.diagnostics)),
        },
        PluginsAction::Upload { file, name } => {
            match upload(&connected, &file, name.as_deref()).await {
                Ok(report) => {
                    common::print_report(&report, output_format)?;
                    Ok(if report.registered {
                        ExitCode::SUCCESS
                    } else {
                        ExitCode::HOST_ERROR
                    })
                }
                Err(err) => Ok(common::failure(&err, &connected.diagnostics)),
            }
        }
    }
}
