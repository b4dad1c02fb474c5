//! Error types for the plugin calculator.
//!
//! Every fallible operation in the workspace returns [`Error`]. The variants
//! mirror the failure kinds of the plugin pipeline (transport failures, host
//! rejections, deadlines, bad operands, unknown plugins) plus configuration
//! and argument validation.
//!
//! # Examples
//!
//! ```
//! use calc_core::{Error, Result};
//!
//! fn require_host(url: &str) -> Result<()> {
//!     if url.is_empty() {
//!         return Err(Error::ConfigError {
//!             message: "host base URL cannot be empty".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//!
//! let err = require_host("").unwrap_err();
//! assert!(err.is_config_error());
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Main error type for the plugin calculator.
#[derive(Error, Debug)]
pub enum Error {
    /// The plugin host could not be reached or the transport failed.
    ///
    /// Covers DNS failures, refused connections, resets mid-request and
    /// body read errors. Always recoverable: the caller keeps its prior state.
    #[error("network error during {operation}: {source}")]
    Network {
        /// Pipeline operation that was in flight
        operation: String,
        /// Underlying transport error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The plugin host answered with a non-success status.
    #[error("host rejected {operation} with status {status}: {body}")]
    HostRejected {
        /// Pipeline operation that was rejected
        operation: String,
        /// HTTP status code returned by the host
        status: u16,
        /// Text body returned by the host, possibly empty
        body: String,
    },

    /// A network call exceeded its deadline.
    #[error("{operation} timed out after {duration:?}")]
    Timeout {
        /// Pipeline operation that timed out
        operation: String,
        /// Deadline that elapsed
        duration: Duration,
    },

    /// The display value cannot be parsed as a number where one is required.
    #[error("invalid operand: '{value}' is not a number")]
    InvalidOperand {
        /// The offending display text
        value: String,
    },

    /// Invocation targeted a plugin absent from the local registry.
    #[error("unknown plugin: {name}")]
    UnknownPlugin {
        /// Requested plugin name
        name: String,
    },

    /// The host answered 2xx but the body could not be interpreted.
    #[error("invalid response to {operation}: {message}")]
    InvalidResponse {
        /// Pipeline operation whose response was malformed
        operation: String,
        /// Description of what was wrong with the body
        message: String,
    },

    /// Configuration error.
    ///
    /// Raised when configuration is invalid, cannot be read, or contains
    /// contradictory settings.
    #[error("Configuration error: {message}")]
    ConfigError {
        /// Description of the configuration problem
        message: String,
    },

    /// Invalid argument error.
    ///
    /// Raised when CLI arguments or function parameters are invalid.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Validation error for domain types.
    #[error("Validation error in {field}: {reason}")]
    ValidationError {
        /// The field that failed validation
        field: String,
        /// Detailed reason for the validation failure
        reason: String,
    },
}

/// Flat classification of [`Error`] used for diagnostics and exit codes.
///
/// # Examples
///
/// ```
/// use calc_core::{Error, ErrorKind};
///
/// let err = Error::UnknownPlugin { name: "Square".to_string() };
/// assert_eq!(err.kind(), ErrorKind::UnknownPlugin);
/// assert_eq!(ErrorKind::UnknownPlugin.to_string(), "unknown_plugin");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Transport failure
    Network,
    /// Non-success status from the host
    HostRejected,
    /// Deadline elapsed
    Timeout,
    /// Display value not numeric
    InvalidOperand,
    /// Plugin not in the registry
    UnknownPlugin,
    /// Unparseable success body
    InvalidResponse,
    /// Bad configuration
    Config,
    /// Bad argument or domain value
    InvalidInput,
}

impl ErrorKind {
    /// Returns the snake-case name of the kind.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Network => "network",
            Self::HostRejected => "host_rejected",
            Self::Timeout => "timeout",
            Self::InvalidOperand => "invalid_operand",
            Self::UnknownPlugin => "unknown_plugin",
            Self::InvalidResponse => "invalid_response",
            Self::Config => "config",
            Self::InvalidInput => "invalid_input",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Error {
    /// Builds a [`Error::Network`] from any transport error.
    ///
    /// # Examples
    ///
    /// ```
    /// use calc_core::Error;
    ///
    /// let err = Error::network("refresh", "connection refused");
    /// assert!(err.is_network_error());
    /// ```
    pub fn network(
        operation: impl Into<String>,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self::Network {
            operation: operation.into(),
            source: source.into(),
        }
    }

    /// Returns the flat kind of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Network { .. } => ErrorKind::Network,
            Self::HostRejected { .. } => ErrorKind::HostRejected,
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::InvalidOperand { .. } => ErrorKind::InvalidOperand,
            Self::UnknownPlugin { .. } => ErrorKind::UnknownPlugin,
            Self::InvalidResponse { .. } => ErrorKind::InvalidResponse,
            Self::ConfigError { .. } => ErrorKind::Config,
            Self::InvalidArgument(_) | Self::ValidationError { .. } => ErrorKind::InvalidInput,
        }
    }

    /// Returns `true` if this is a transport error.
    #[must_use]
    pub const fn is_network_error(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Returns `true` if the host answered with a non-success status.
    #[must_use]
    pub const fn is_host_rejected(&self) -> bool {
        matches!(self, Self::HostRejected { .. })
    }

    /// Returns `true` if this is a timeout error.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if this is an invalid operand error.
    #[must_use]
    pub const fn is_invalid_operand(&self) -> bool {
        matches!(self, Self::InvalidOperand { .. })
    }

    /// Returns `true` if this is an unknown plugin error.
    #[must_use]
    pub const fn is_unknown_plugin(&self) -> bool {
        matches!(self, Self::UnknownPlugin { .. })
    }

    /// Returns `true` if this is a configuration error.
    #[must_use]
    pub const fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError { .. })
    }

    /// Returns `true` if this is a validation error.
    #[must_use]
    pub const fn is_validation_error(&self) -> bool {
        matches!(self, Self::ValidationError { .. })
    }

    /// Returns `true` if retrying the same request may succeed.
    ///
    /// Transport failures, timeouts and 5xx rejections are transient.
    /// 4xx rejections and every local error are not.
    ///
    /// # Examples
    ///
    /// ```
    /// use calc_core::Error;
    ///
    /// let busy = Error::HostRejected {
    ///     operation: "invoke".to_string(),
    ///     status: 503,
    ///     body: String::new(),
    /// };
    /// assert!(busy.is_transient());
    ///
    /// let bad = Error::HostRejected {
    ///     operation: "invoke".to_string(),
    ///     status: 400,
    ///     body: "bad value".to_string(),
    /// };
    /// assert!(!bad.is_transient());
    /// ```
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::HostRejected { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

/// Result type alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;
