//! `config` command: inspect and create the configuration file.
//!
//! The file lives at `<config dir>/plugin-calc/config.toml` unless
//! `--config` points elsewhere:
//! - Linux: `~/.config/plugin-calc/config.toml`
//! - macOS: `~/Library/Application Support/plugin-calc/config.toml`
//! - Windows: `%APPDATA%\plugin-calc\config.toml`

use crate::actions::ConfigAction;
use crate::commands::common;
use anyhow::{Context, Result, anyhow};
use calc_core::ClientConfig;
use calc_core::cli::{ExitCode, OutputFormat};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

/// Effective configuration and where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigShow {
    /// Configuration file location
    pub path: String,
    /// Whether the file exists; defaults are in effect when it does not
    pub exists: bool,
    /// Effective settings, including command-line overrides
    pub config: ClientConfig,
}

/// Result of `config init`.
#[derive(Debug, Clone, Serialize)]
pub struct InitResult {
    /// Whether a new file was written
    pub created: bool,
    /// Human-readable outcome
    pub message: String,
    /// Configuration file location
    pub path: String,
}

/// Configuration file location.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigPath {
    /// Configuration file location
    pub path: String,
    /// Whether the file exists
    pub exists: bool,
}

/// Resolves the configuration file location.
///
/// # Errors
///
/// Returns an error if no path was given and the platform has no
/// configuration directory.
pub fn resolve_path(explicit: Option<&Path>) -> Result<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(ClientConfig::default_path)
        .ok_or_else(|| anyhow!("no configuration directory on this platform, pass --config"))
}

/// Writes a default configuration file unless one already exists.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn init(path: &Path) -> Result<InitResult> {
    let shown = path.display().to_string();
    if path.exists() {
        return Ok(InitResult {
            created: false,
            message: "configuration file already exists".to_string(),
            path: shown,
        });
    }

    ClientConfig::default()
        .save(path)
        .with_context(|| format!("failed to write {shown}"))?;
    info!("created configuration file {shown}");
    Ok(InitResult {
        created: true,
        message: "configuration file created with default values".to_string(),
        path: shown,
    })
}

/// Runs the config command.
///
/// # Errors
///
/// Returns an error if the path cannot be resolved, the file cannot be
/// written, or output cannot be formatted.
pub async fn run(
    action: ConfigAction,
    config: &ClientConfig,
    config_path: Option<&Path>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    let path = resolve_path(config_path)?;
    match action {
        ConfigAction::Show => {
            let report = ConfigShow {
                path: path.display().to_string(),
                exists: path.exists(),
                config: config.clone(),
            };
            common::print_report(&report, output_format)?;
        }
        ConfigAction::Init => common::print_report(&init(&path)?, output_format)?,
        ConfigAction::Path => {
            let report = ConfigPath {
                path: path.display().to_string(),
                exists: path.exists(),
            };
            common::print_report(&report, output_format)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_resolve_path_prefers_explicit() {
        let path = resolve_path(Some(Path::new("/tmp/custom.toml"))).unwrap();
        assert_eq!(path, PathBuf::from("/tmp/custom.toml"));
    }

    #[test]
    fn test_init_creates_loadable_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let result = init(&path).unwrap();
        assert!(result.created);

        let loaded = ClientConfig::load(Some(path.as_path())).unwrap();
        assert_eq!(loaded, ClientConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[host]\nrequest_timeout_secs = 4\n").unwrap();

        let result = init(&path).unwrap();
        assert!(!result.created);
        assert_eq!(
            ClientConfig::load(Some(path.as_path()))
                .unwrap()
                .host
                .request_timeout_secs,
            4
        );
    }

    #[test]
    fn test_show_serializes_sections() {
        let report = ConfigShow {
            path: "config.toml".to_string(),
            exists: false,
            config: ClientConfig::default(),
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["config"]["retry"]["max_attempts"], 3);
        assert_eq!(json["config"]["general"]["plugin_extension"], "java");
    }
}
