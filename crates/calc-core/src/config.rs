//! Client configuration.
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/plugin-calc/config.toml`
//! - macOS: `~/Library/Application Support/plugin-calc/config.toml`
//! - Windows: `%APPDATA%\plugin-calc\config.toml`
//!
//! A missing file yields [`ClientConfig::default`]; every section and field
//! is optional.
//!
//! # Examples
//!
//! ```toml
//! [host]
//! base_url = "http://localhost:8082/api/calculator"
//! request_timeout_secs = 10
//!
//! [retry]
//! max_attempts = 3
//! initial_backoff_ms = 200
//! max_backoff_ms = 2000
//!
//! [general]
//! default_format = "pretty"
//! log_level = "info"
//! plugin_extension = "java"
//! ```
//!
//! ```
//! use calc_core::ClientConfig;
//! use std::time::Duration;
//!
//! let config = ClientConfig::from_toml_str("[host]\nrequest_timeout_secs = 3\n").unwrap();
//! assert_eq!(config.host.request_timeout(), Duration::from_secs(3));
//! assert_eq!(config.retry.max_attempts, 3);
//! ```

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name used under the platform config directory.
pub const CONFIG_DIR_NAME: &str = "plugin-calc";

/// Configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Default base URL of the plugin host.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8082/api/calculator";

/// Complete client configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct ClientConfig {
    /// Plugin host connection settings
    #[serde(default)]
    pub host: HostConfig,

    /// Retry policy for idempotent calls
    #[serde(default)]
    pub retry: RetryPolicy,

    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,
}

/// Plugin host connection settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HostConfig {
    /// Base URL, including the `/api/calculator` prefix
    pub base_url: String,

    /// Deadline applied to every network call, in seconds
    pub request_timeout_secs: u64,
}

impl HostConfig {
    /// Returns the request deadline.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Bounded retry with exponential backoff.
///
/// Applies to idempotent calls only (registry refresh and plugin
/// invocation). Uploads are attempted once.
///
/// # Examples
///
/// ```
/// use calc_core::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(policy.backoff_for(1), Duration::from_millis(200));
/// assert_eq!(policy.backoff_for(2), Duration::from_millis(400));
/// assert_eq!(policy.backoff_for(10), Duration::from_millis(2000));
/// ```
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetryPolicy {
    /// Total attempts including the first one
    pub max_attempts: u32,

    /// Delay before the second attempt, in milliseconds
    pub initial_backoff_ms: u64,

    /// Upper bound for any single delay, in milliseconds
    pub max_backoff_ms: u64,
}

impl RetryPolicy {
    /// A policy that attempts each call exactly once.
    #[must_use]
    pub const fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            initial_backoff_ms: 0,
            max_backoff_ms: 0,
        }
    }

    /// Returns the delay to wait after failed attempt number `attempt`
    /// (1-based), doubling each time and capped at `max_backoff_ms`.
    #[must_use]
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(31);
        let delay = self
            .initial_backoff_ms
            .saturating_mul(1_u64 << exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 200,
            max_backoff_ms: 2000,
        }
    }
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format (json, text, pretty)
    pub default_format: String,

    /// Logging level (trace, debug, info, warn, error)
    pub log_level: String,

    /// Extension stripped from plugin source file names to derive the
    /// plugin name, without the leading dot
    pub plugin_extension: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_format: "pretty".to_string(),
            log_level: "info".to_string(),
            plugin_extension: "java".to_string(),
        }
    }
}

impl ClientConfig {
    /// Returns the platform default configuration file path.
    ///
    /// Returns `None` if the platform has no configuration directory.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Parses configuration from TOML text without validating it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the text is not valid TOML for this
    /// schema.
    pub fn parse_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| Error::ConfigError {
            message: format!("failed to parse configuration: {e}"),
        })
    }

    /// Parses configuration from TOML text and validates it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the text is not valid TOML for this
    /// schema or fails [`validate`](Self::validate).
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config = Self::parse_toml_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads configuration from `path`, or from [`default_path`](Self::default_path)
    /// when `path` is `None`, without validating it.
    ///
    /// Callers that layer overrides on top validate the merged result.
    /// A missing file is not an error and yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file exists but cannot be read
    /// or parsed.
    pub fn read(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => {
                    tracing::debug!("no platform config directory, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        if !path.exists() {
            tracing::debug!("config file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }

        let text = fs::read_to_string(&path).map_err(|e| Error::ConfigError {
            message: format!("failed to read {}: {e}", path.display()),
        })?;
        tracing::debug!("loaded config from {}", path.display());
        Self::parse_toml_str(&text)
    }

    /// Loads and validates configuration; see [`read`](Self::read).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file exists but cannot be read,
    /// parsed or validated.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Serializes the configuration as pretty TOML.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if serialization fails.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::ConfigError {
            message: format!("failed to serialize configuration: {e}"),
        })
    }

    /// Writes the configuration to `path`, creating parent directories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| Error::ConfigError {
                message: format!("failed to create {}: {e}", parent.display()),
            })?;
        }
        fs::write(path, self.to_toml_string()?).map_err(|e| Error::ConfigError {
            message: format!("failed to write {}: {e}", path.display()),
        })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if:
    /// - The base URL is not `http://` or `https://`
    /// - The request deadline is zero
    /// - `max_attempts` is zero
    /// - `max_backoff_ms` is below `initial_backoff_ms`
    /// - The plugin extension is empty or starts with a dot
    ///
    /// # Examples
    ///
    /// ```
    /// use calc_core::ClientConfig;
    ///
    /// assert!(ClientConfig::default().validate().is_ok());
    ///
    /// let mut invalid = ClientConfig::default();
    /// invalid.retry.max_attempts = 0;
    /// assert!(invalid.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<()> {
        let fail = |message: &str| {
            Err(Error::ConfigError {
                message: message.to_string(),
            })
        };

        let url = self.host.base_url.as_str();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return fail("host.base_url must start with http:// or https://");
        }
        if self.host.request_timeout_secs == 0 {
            return fail("host.request_timeout_secs must be greater than zero");
        }
        if self.retry.max_attempts == 0 {
            return fail("retry.max_attempts must be greater than zero");
        }
        if self.retry.max_backoff_ms < self.retry.initial_backoff_ms {
            return fail("retry.max_backoff_ms must not be below retry.initial_backoff_ms");
        }
        let ext = self.general.plugin_extension.as_str();
        if ext.is_empty() || ext.starts_with('.') {
            return fail("general.plugin_extension must be non-empty and given without a leading dot");
        }
        Ok(())
    }
}
