//! Event routing between the keypad, the engine and the plugin pipeline.

use crate::dispatch::PluginInvocationDispatcher;
use crate::host::{HttpPluginHost, PluginHost};
use crate::registry::{PluginRegistry, PluginRegistryClient, RefreshOutcome};
use crate::retry::CallPolicy;
use crate::upload::{PluginUploadCoordinator, UploadOutcome, UploadRequest};
use calc_core::{
    ClientConfig, Diagnostic, DiagnosticSink, ErrorKind, PipelineOperation, PluginName, Result,
};
use calc_engine::{ArithmeticEngine, CalculatorState, DisplayValue, Event, keys};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Prefix marking a plugin invocation in a key script.
pub const PLUGIN_PREFIX: char = '@';

/// One calculator: an engine plus the plugin pipeline wired to one host.
///
/// Keypad input is applied synchronously. Pipeline calls are async and
/// never hold the engine lock while a request is in flight, so key presses
/// stay responsive and each completion is merged on its own.
///
/// # Examples
///
/// ```no_run
/// use calc_core::{ClientConfig, TracingSink};
/// use calc_plugins::CalculatorSession;
/// use std::sync::Arc;
///
/// # async fn example() -> calc_core::Result<()> {
/// let session = CalculatorSession::connect(&ClientConfig::default(), Arc::new(TracingSink))?;
/// session.refresh().await?;
/// let display = session.run_script("4 @Square + 1 =").await?;
/// println!("{display}");
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct CalculatorSession {
    engine: Mutex<ArithmeticEngine>,
    registry: Arc<PluginRegistryClient>,
    uploads: PluginUploadCoordinator,
    dispatcher: PluginInvocationDispatcher,
    sink: Arc<dyn DiagnosticSink>,
    plugin_extension: String,
}

impl CalculatorSession {
    /// Wires a session to `host`.
    #[must_use]
    pub fn new(
        host: Arc<dyn PluginHost>,
        config: &ClientConfig,
        sink: Arc<dyn DiagnosticSink>,
    ) -> Self {
        let policy = CallPolicy::from_config(config);
        let registry = Arc::new(PluginRegistryClient::new(
            Arc::clone(&host),
            policy,
            Arc::clone(&sink),
        ));
        let uploads = PluginUploadCoordinator::new(
            Arc::clone(&host),
            Arc::clone(&registry),
            policy,
            Arc::clone(&sink),
        );
        let dispatcher = PluginInvocationDispatcher::new(
            host,
            Arc::clone(&registry),
            policy,
            Arc::clone(&sink),
        );

        Self {
            engine: Mutex::new(ArithmeticEngine::new()),
            registry,
            uploads,
            dispatcher,
            sink,
            plugin_extension: config.general.plugin_extension.clone(),
        }
    }

    /// Wires a session to the HTTP host named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`calc_core::Error::ConfigError`] if the host URL is unusable.
    pub fn connect(config: &ClientConfig, sink: Arc<dyn DiagnosticSink>) -> Result<Self> {
        let host = HttpPluginHost::new(&config.host)?;
        tracing::debug!(base_url = %host.base_url(), "connecting session");
        Ok(Self::new(Arc::new(host), config, sink))
    }

    fn engine(&self) -> MutexGuard<'_, ArithmeticEngine> {
        self.engine.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies one keypad event.
    ///
    /// # Errors
    ///
    /// Returns [`calc_core::Error::InvalidOperand`] if the event needs a
    /// numeric display and it does not parse.
    pub fn press(&self, event: Event) -> Result<DisplayValue> {
        self.engine().apply(event).cloned()
    }

    /// Applies a whitespace-separated key sequence.
    ///
    /// # Errors
    ///
    /// An unknown key rejects the whole sequence before anything is applied.
    /// A rejected event stops the sequence with the earlier events applied.
    pub fn press_keys(&self, keys: &str) -> Result<DisplayValue> {
        let events = keys::parse_sequence(keys)?;
        self.engine().apply_all(events).cloned()
    }

    /// Returns the current display.
    #[must_use]
    pub fn display(&self) -> DisplayValue {
        self.engine().display().clone()
    }

    /// Returns a copy of the engine state.
    #[must_use]
    pub fn state(&self) -> CalculatorState {
        self.engine().state().clone()
    }

    /// Refreshes the plugin registry from the host.
    ///
    /// # Errors
    ///
    /// See [`PluginRegistryClient::refresh`].
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        self.registry.refresh().await
    }

    /// Returns the registry currently in effect.
    pub async fn snapshot(&self) -> Arc<PluginRegistry> {
        self.registry.snapshot().await
    }

    /// Uploads a request.
    ///
    /// # Errors
    ///
    /// See [`PluginUploadCoordinator::upload`].
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        self.uploads.upload(request).await
    }

    /// Reads a plugin source file and uploads it, naming the plugin after the
    /// file with the configured extension stripped.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or named (recorded as an
    /// upload diagnostic), or any error from [`upload`](Self::upload).
    pub async fn upload_file(&self, path: &Path) -> Result<UploadOutcome> {
        let request = UploadRequest::from_path(path, &self.plugin_extension).await;
        self.upload_read(request).await
    }

    /// Reads a plugin source file and uploads it under `name`.
    ///
    /// # Errors
    ///
    /// Same as [`upload_file`](Self::upload_file).
    pub async fn upload_file_as(&self, path: &Path, name: PluginName) -> Result<UploadOutcome> {
        let request = UploadRequest::from_path_named(path, name).await;
        self.upload_read(request).await
    }

    async fn upload_read(&self, request: Result<UploadRequest>) -> Result<UploadOutcome> {
        match request {
            Ok(request) => self.upload(&request).await,
            Err(err) => {
                self.sink
                    .record(Diagnostic::from_error(PipelineOperation::Upload, &err));
                Err(err)
            }
        }
    }

    /// Invokes a plugin on the current display.
    ///
    /// # Errors
    ///
    /// See [`PluginInvocationDispatcher::invoke`].
    pub async fn invoke(&self, plugin: &PluginName) -> Result<DisplayValue> {
        self.dispatcher.invoke(plugin, &self.engine).await
    }

    /// Invokes a plugin on an explicit operand, leaving the engine alone.
    ///
    /// # Errors
    ///
    /// See [`PluginInvocationDispatcher::calculate`].
    pub async fn calculate(&self, plugin: &PluginName, operand: &DisplayValue) -> Result<f64> {
        self.dispatcher.calculate(plugin, operand).await
    }

    /// Runs a key script in which `@Name` tokens invoke plugins.
    ///
    /// Plugin failures are recoverable: they are recorded, the display is
    /// left as it was and the script continues. Invalid keys and rejected
    /// engine events stop the script.
    ///
    /// # Errors
    ///
    /// Returns the first key or engine error. Keys before it stay applied.
    pub async fn run_script(&self, script: &str) -> Result<DisplayValue> {
        for token in script.split_whitespace() {
            if let Some(name) = token.strip_prefix(PLUGIN_PREFIX) {
                let plugin = PluginName::new(name)?;
                if let Err(err) = self.invoke(&plugin).await {
                    if !is_recoverable(err.kind()) {
                        return Err(err);
                    }
                    tracing::warn!(%plugin, error = %err, "plugin step failed, continuing");
                }
            } else {
                let events = keys::parse_token(token)?;
                self.engine().apply_all(events)?;
            }
        }
        Ok(self.display())
    }
}

const fn is_recoverable(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::Network
            | ErrorKind::HostRejected
            | ErrorKind::Timeout
            | ErrorKind::UnknownPlugin
            | ErrorKind::InvalidResponse
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockPluginHost;
    use calc_core::{Error, MemorySink};

    fn session(host: MockPluginHost, sink: &MemorySink) -> CalculatorSession {
        let mut config = ClientConfig::default();
        config.retry.initial_backoff_ms = 1;
        config.retry.max_backoff_ms = 1;
        CalculatorSession::new(Arc::new(host), &config, Arc::new(sink.clone()))
    }

    #[test]
    fn test_press_keys() {
        let sink = MemorySink::new();
        let session = session(MockPluginHost::new(), &sink);
        assert_eq!(session.press_keys("2 + 3 =").unwrap().as_str(), "5");
        assert_eq!(session.press(Event::Clear).unwrap().as_str(), "0");
    }

    #[test]
    fn test_press_keys_unknown_key_applies_nothing() {
        let sink = MemorySink::new();
        let session = session(MockPluginHost::new(), &sink);
        assert!(session.press_keys("12 % 3").is_err());
        assert_eq!(session.display().as_str(), "0");
        assert!(session.press_keys("12 +").is_ok());
        assert!(session.state().waiting_for_second_operand);
    }

    #[tokio::test]
    async fn test_run_script_invokes_plugins() {
        let mut host = MockPluginHost::new();
        host.expect_list_plugins()
            .returning(|| Ok([PluginName::new("Square").unwrap()].into_iter().collect()));
        host.expect_calculate()
            .withf(|_, operand| operand.to_string() == "4")
            .times(1)
            .returning(|_, _| Ok(16.0));

        let sink = MemorySink::new();
        let session = session(host, &sink);
        session.refresh().await.unwrap();

        let display = session.run_script("4 @Square + 1 =").await.unwrap();
        assert_eq!(display.as_str(), "17");
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_run_script_continues_past_unknown_plugin() {
        let sink = MemorySink::new();
        let session = session(MockPluginHost::new(), &sink);

        let display = session.run_script("9 @Missing * 2 =").await.unwrap();
        assert_eq!(display.as_str(), "18");
        assert_eq!(sink.len(), 1);
    }

    #[tokio::test]
    async fn test_run_script_stops_on_bad_key() {
        let sink = MemorySink::new();
        let session = session(MockPluginHost::new(), &sink);
        let err = session.run_script("1 + ?").await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        assert!(session.state().pending.is_some());
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_upload_file_as_overrides_file_name() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("draft-1.java");
        std::fs::write(&path, "class Cube {}").unwrap();

        let mut host = MockPluginHost::new();
        host.expect_upload_plugin()
            .withf(|request| request.plugin_name.as_str() == "Cube")
            .times(1)
            .returning(|_| Ok(()));
        host.expect_list_plugins()
            .returning(|| Ok([PluginName::new("Cube").unwrap()].into_iter().collect()));
        let sink = MemorySink::new();
        let session = session(host, &sink);

        let outcome = session
            .upload_file_as(&path, PluginName::new("Cube").unwrap())
            .await
            .unwrap();
        assert!(outcome.registered);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_upload_file_with_unusable_name_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".java");
        std::fs::write(&path, "class X {}").unwrap();

        let mut host = MockPluginHost::new();
        host.expect_upload_plugin().times(0);
        let sink = MemorySink::new();
        let session = session(host, &sink);

        let err = session.upload_file(&path).await.unwrap_err();
        assert!(err.is_validation_error());
        assert_eq!(sink.snapshot()[0].operation, PipelineOperation::Upload);
    }
}
