//! Diagnostic sink for recoverable pipeline failures.
//!
//! Plugin pipeline operations never propagate failures into calculator
//! state. Instead each failure is recorded once, by the component where it
//! occurred, in a [`DiagnosticSink`].
//!
//! # Examples
//!
//! ```
//! use calc_core::diagnostics::{Diagnostic, DiagnosticSink, MemorySink, PipelineOperation};
//! use calc_core::Error;
//!
//! let sink = MemorySink::new();
//! let err = Error::UnknownPlugin { name: "Square".to_string() };
//! sink.record(Diagnostic::from_error(PipelineOperation::Invoke, &err));
//!
//! assert_eq!(sink.len(), 1);
//! assert_eq!(sink.snapshot()[0].operation, PipelineOperation::Invoke);
//! ```

use crate::{Error, ErrorKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Pipeline operation during which a diagnostic was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineOperation {
    /// Registry refresh (`GET /plugins`)
    Refresh,
    /// Plugin upload (`POST /upload-plugin`)
    Upload,
    /// Plugin invocation (`POST /calculate/{name}`)
    Invoke,
}

impl PipelineOperation {
    /// Returns the snake-case name of the operation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Refresh => "refresh",
            Self::Upload => "upload",
            Self::Invoke => "invoke",
        }
    }
}

impl fmt::Display for PipelineOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded pipeline failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// Operation that failed
    pub operation: PipelineOperation,
    /// Kind of failure
    pub kind: ErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl Diagnostic {
    /// Builds a diagnostic from an error.
    #[must_use]
    pub fn from_error(operation: PipelineOperation, error: &Error) -> Self {
        Self {
            operation,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{} {}] {}", self.operation, self.kind, self.message)
    }
}

/// Receiver of pipeline diagnostics.
///
/// Implementations must be cheap and must not fail: recording happens on
/// the error path of every pipeline operation.
pub trait DiagnosticSink: Send + Sync + fmt::Debug {
    /// Records a diagnostic.
    fn record(&self, diagnostic: Diagnostic);
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for Arc<S> {
    fn record(&self, diagnostic: Diagnostic) {
        (**self).record(diagnostic);
    }
}

/// Sink that logs every diagnostic through `tracing` at error level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, diagnostic: Diagnostic) {
        tracing::error!(
            operation = %diagnostic.operation,
            kind = %diagnostic.kind,
            "{}",
            diagnostic.message
        );
    }
}

/// Sink that keeps diagnostics in memory.
///
/// Cloning shares the underlying buffer.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    entries: Arc<Mutex<Vec<Diagnostic>>>,
}

impl MemorySink {
    /// Creates an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of all recorded diagnostics, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<Diagnostic> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Removes and returns all recorded diagnostics.
    #[must_use]
    pub fn drain(&self) -> Vec<Diagnostic> {
        std::mem::take(&mut *self.entries.lock().unwrap_or_else(PoisonError::into_inner))
    }

    /// Returns the number of recorded diagnostics.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl DiagnosticSink for MemorySink {
    fn record(&self, diagnostic: Diagnostic) {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(diagnostic);
    }
}

/// Sink that forwards each diagnostic to several sinks in order.
#[derive(Debug, Default)]
pub struct FanoutSink {
    sinks: Vec<Arc<dyn DiagnosticSink>>,
}

impl FanoutSink {
    /// Creates a fan-out over the given sinks.
    #[must_use]
    pub fn new(sinks: Vec<Arc<dyn DiagnosticSink>>) -> Self {
        Self { sinks }
    }
}

impl DiagnosticSink for FanoutSink {
    fn record(&self, diagnostic: Diagnostic) {
        for sink in &self.sinks {
            sink.record(diagnostic.clone());
        }
    }
}
