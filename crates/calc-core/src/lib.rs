//! Core types, errors, diagnostics and configuration for the plugin calculator.
//!
//! This crate provides the vocabulary shared by every other crate in the
//! workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`PluginName`, `Digit`, `Operator`)
//! - The error hierarchy and its flat `ErrorKind` classification
//! - Number parsing and display formatting
//! - The diagnostic sink that receives recoverable pipeline failures
//! - Client configuration loaded from TOML
//! - CLI value types (`OutputFormat`, `ExitCode`)

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod config;
mod error;
mod types;

pub mod cli;
pub mod diagnostics;
pub mod number;

pub use config::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, ClientConfig, DEFAULT_BASE_URL, GeneralConfig, HostConfig,
    RetryPolicy,
};
pub use diagnostics::{
    Diagnostic, DiagnosticSink, FanoutSink, MemorySink, PipelineOperation, TracingSink,
};
pub use error::{Error, ErrorKind, Result};
pub use types::{Digit, Operator, PluginName};
