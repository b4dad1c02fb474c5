//! Plugin pipeline for the plugin calculator.
//!
//! Plugins are arithmetic functions compiled and run by a remote host. This
//! crate never inspects plugin code: it transports source text, keeps a
//! local copy of the host's plugin listing and forwards operands.
//!
//! # Architecture
//!
//! - [`PluginHost`]: transport seam, implemented over HTTP by
//!   [`HttpPluginHost`]
//! - [`PluginRegistryClient`]: owns the local [`PluginRegistry`] and
//!   refreshes it, discarding responses superseded by a newer refresh
//! - [`PluginUploadCoordinator`]: uploads source, then reconciles through a
//!   refresh instead of trusting the upload status
//! - [`PluginInvocationDispatcher`]: runs a registered plugin on the
//!   display value and merges the result back into the engine
//! - [`CalculatorSession`]: one engine wired to all of the above
//!
//! Every pipeline failure is recoverable. It is recorded once with the
//! [`calc_core::DiagnosticSink`] by the component where it happened, and
//! the display, pending operation and registry keep their prior values.

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod dispatch;
mod host;
mod registry;
mod retry;
mod session;
mod upload;

pub use dispatch::PluginInvocationDispatcher;
pub use host::{HttpPluginHost, PluginHost};
pub use registry::{PluginRegistry, PluginRegistryClient, RefreshOutcome};
pub use retry::{CallPolicy, with_retry};
pub use session::{CalculatorSession, PLUGIN_PREFIX};
pub use upload::{PluginUploadCoordinator, UploadOutcome, UploadRequest, plugin_name_from_path};
