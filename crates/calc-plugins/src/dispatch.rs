//! Running registered plugins against the display value.

use crate::host::PluginHost;
use crate::registry::PluginRegistryClient;
use crate::retry::{CallPolicy, with_retry};
use calc_core::{Diagnostic, DiagnosticSink, Error, PipelineOperation, PluginName, Result};
use calc_engine::{ArithmeticEngine, DisplayValue};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

/// Sends the display value to a plugin and merges the result back.
///
/// Only the display is ever changed, and only on success. The pending
/// operator and the waiting flag are never touched.
pub struct PluginInvocationDispatcher {
    host: Arc<dyn PluginHost>,
    registry: Arc<PluginRegistryClient>,
    policy: CallPolicy,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for PluginInvocationDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginInvocationDispatcher")
            .field("host", &"dyn PluginHost")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl PluginInvocationDispatcher {
    /// Creates a dispatcher.
    #[must_use]
    pub fn new(
        host: Arc<dyn PluginHost>,
        registry: Arc<PluginRegistryClient>,
        policy: CallPolicy,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        Self {
            host,
            registry,
            policy,
            sink,
        }
    }

    /// Invokes `plugin` on the engine's current display.
    ///
    /// The engine lock is released while the request is in flight. If
    /// several invocations overlap, the last one to complete sets the
    /// display.
    ///
    /// # Errors
    ///
    /// See [`calculate`](Self::calculate). On error the display is left
    /// unchanged.
    pub async fn invoke(
        &self,
        plugin: &PluginName,
        engine: &Mutex<ArithmeticEngine>,
    ) -> Result<DisplayValue> {
        let operand = lock(engine).display().clone();
        let value = self.calculate(plugin, &operand).await?;
        let mut engine = lock(engine);
        Ok(engine.apply_external_result(value).clone())
    }

    /// Invokes `plugin` on `operand` without touching any engine.
    ///
    /// The plugin must be in the current registry snapshot; otherwise no
    /// request is sent. The operand text is sent verbatim. Transient
    /// failures are retried.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownPlugin`], [`Error::InvalidOperand`], or the
    /// host call's error. Every error is recorded exactly once with the
    /// diagnostic sink.
    pub async fn calculate(&self, plugin: &PluginName, operand: &DisplayValue) -> Result<f64> {
        let result = self.try_calculate(plugin, operand).await;
        match &result {
            Ok(value) => tracing::info!(%plugin, %operand, result = value, "plugin invoked"),
            Err(err) => self
                .sink
                .record(Diagnostic::from_error(PipelineOperation::Invoke, err)),
        }
        result
    }

    async fn try_calculate(&self, plugin: &PluginName, operand: &DisplayValue) -> Result<f64> {
        if !self.registry.contains(plugin).await {
            return Err(Error::UnknownPlugin {
                name: plugin.to_string(),
            });
        }
        operand.to_number()?;

        let host = self.host.as_ref();
        let text = operand.as_str();
        with_retry(PipelineOperation::Invoke, self.policy, move || {
            host.calculate(plugin, text)
        })
        .await
    }
}

fn lock(engine: &Mutex<ArithmeticEngine>) -> std::sync::MutexGuard<'_, ArithmeticEngine> {
    engine.lock().unwrap_or_else(PoisonError::into_inner)
}
