//! Plugin calculator CLI.
//!
//! A four-function calculator whose extra functions are plugins compiled
//! and run by a remote plugin host.
//!
//! # Architecture
//!
//! - `eval` - run a key sequence, invoking plugins with `@Name`
//! - `repl` - interactive session
//! - `plugins` - list and upload plugins
//! - `invoke` - run one plugin on an explicit operand
//! - `config` - inspect and create the configuration file
//! - `completions` - generate shell completions
//!
//! # Examples
//!
//! ```bash
//! # Plain arithmetic, no network
//! plugin-calc eval 12 + 30 =
//!
//! # Upload a plugin, then use it
//! plugin-calc plugins upload Square.java
//! plugin-calc eval 4 @Square + 1 =
//! ```

use anyhow::{Context, Result, anyhow};
use calc_cli::actions::{ConfigAction, PluginsAction};
use calc_cli::commands;
use calc_core::ClientConfig;
use calc_core::cli::{ExitCode, OutputFormat};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Plugin calculator - arithmetic with remotely hosted plugin functions.
#[derive(Parser, Debug)]
#[command(name = "plugin-calc")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty); defaults to the configured one
    #[arg(long = "format", global = true)]
    format: Option<String>,

    /// Configuration file to use instead of the platform default
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Plugin host base URL, overriding the configuration
    #[arg(long, global = true, env = "PLUGIN_CALC_HOST")]
    host: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long = "log-json", global = true)]
    log_json: bool,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a key sequence and print the display.
    ///
    /// Keys are digits, `.`, `+ - * /`, `=`, `C` (clear), `BS`
    /// (backspace) and `+/-` (sign). A token `@Name` runs plugin `Name` on
    /// the display; the host is contacted only when such a token is
    /// present.
    ///
    /// # Examples
    ///
    /// ```bash
    /// plugin-calc eval 2 + 3 = '*' 4 =
    /// plugin-calc eval 9 @Square
    /// ```
    Eval {
        /// Key tokens
        #[arg(required = true, num_args = 1.., allow_hyphen_values = true)]
        keys: Vec<String>,
    },

    /// Start an interactive session.
    ///
    /// Lines are key sequences or `:plugins`, `:refresh`, `:upload <file>`,
    /// `:help`, `:quit`.
    Repl,

    /// Manage plugins on the host
    Plugins {
        /// Plugin action
        #[command(subcommand)]
        action: PluginsAction,
    },

    /// Run a plugin on an explicit operand.
    ///
    /// # Examples
    ///
    /// ```bash
    /// plugin-calc invoke Square 12
    /// plugin-calc invoke Negate -3.5
    /// ```
    Invoke {
        /// Plugin name
        plugin: String,

        /// Operand, sent to the host exactly as written
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Manage configuration
    Config {
        /// Configuration action
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions.
    ///
    /// # Examples
    ///
    /// ```bash
    /// plugin-calc completions bash > /etc/bash_completion.d/plugin-calc
    /// plugin-calc completions zsh > ~/.zfunc/_plugin-calc
    /// ```
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = load_config(&cli)?;
    init_logging(cli.verbose, &config.general.log_level, cli.log_json)?;

    let output_format = cli
        .format
        .as_deref()
        .unwrap_or(&config.general.default_format)
        .parse::<OutputFormat>()
        .map_err(|e| anyhow!("{e}"))?;

    let exit_code =
        execute_command(cli.command, &config, cli.config.as_deref(), output_format).await?;

    std::process::exit(exit_code.as_i32());
}

/// Reads the configuration file, applies command-line overrides, then
/// validates the merged result.
///
/// # Errors
///
/// Returns an error if the file cannot be read or the result is invalid.
fn load_config(cli: &Cli) -> Result<ClientConfig> {
    let mut config =
        ClientConfig::read(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(host) = &cli.host {
        config.host.base_url.clone_from(host);
    }
    config.validate().context("invalid configuration")?;
    Ok(config)
}

/// Initializes logging to stderr.
///
/// `RUST_LOG` wins over the configured level; `--verbose` wins over both.
///
/// # Errors
///
/// Returns an error if the configured level is not a valid filter.
fn init_logging(verbose: bool, level: &str, json: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else if let Ok(filter) = EnvFilter::try_from_default_env() {
        filter
    } else {
        EnvFilter::try_new(level).with_context(|| format!("invalid log level '{level}'"))?
    };

    let registry = tracing_subscriber::registry().with(filter);
    if json {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    Ok(())
}

/// Routes a command to its handler and returns the exit code.
///
/// # Errors
///
/// Returns an error if command execution fails outside the pipeline.
async fn execute_command(
    command: Commands,
    config: &ClientConfig,
    config_path: Option<&std::path::Path>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    match command {
        Commands::Eval { keys } => commands::eval::run(keys, config, output_format).await,
        Commands::Repl => commands::repl::run(config).await,
        Commands::Plugins { action } => commands::plugins::run(action, config, output_format).await,
        Commands::Invoke { plugin, value } => {
            commands::invoke::run(plugin, value, config, output_format).await
        }
        Commands::Config { action } => {
            commands::config::run(action, config, config_path, output_format).await
        }
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd).await
        }
    }
}
