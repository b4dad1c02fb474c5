//! Command implementations for the plugin calculator CLI.
//!
//! Each command builds its report, renders it through
//! [`crate::formatters::format_output`] and returns a semantic exit code.
//! Pipeline failures are not turned into `anyhow` errors: they have
//! already been recorded and only select the exit code.

pub mod common;
pub mod completions;
pub mod config;
pub mod eval;
pub mod invoke;
pub mod plugins;
pub mod repl;
