//! Action type definitions for CLI commands.
//!
//! Defines the action enums used by the `plugins` and `config` commands.

use clap::Subcommand;
use std::path::PathBuf;

/// Plugin management actions.
#[derive(Subcommand, Debug)]
pub enum PluginsAction {
    /// List the plugins registered on the host
    List,

    /// Upload plugin source to the host
    ///
    /// The plugin is named after the file with the configured extension
    /// stripped, unless `--name` is given. The host compiles and registers
    /// the plugin; the listing is refreshed afterwards to confirm it.
    Upload {
        /// Plugin source file
        file: PathBuf,

        /// Plugin name to request instead of the file name
        #[arg(long)]
        name: Option<String>,
    },
}

/// Configuration management actions.
#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Write a configuration file with default values
    Init,

    /// Print the configuration file location
    Path,
}
