//! Plugin calculator CLI library.
//!
//! Exposes the command implementations and output formatters behind the
//! `plugin-calc` binary so they can be tested without spawning a process.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::unused_async)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::format_push_string)]

pub mod actions;
pub mod commands;
pub mod formatters;

pub use actions::{ConfigAction, PluginsAction};
