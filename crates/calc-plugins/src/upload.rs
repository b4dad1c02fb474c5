//! Uploading plugin source and reconciling the registry afterwards.

use crate::host::PluginHost;
use crate::registry::{PluginRegistry, PluginRegistryClient};
use crate::retry::{CallPolicy, with_retry};
use calc_core::{Diagnostic, DiagnosticSink, Error, PipelineOperation, PluginName, Result};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// Plugin source to be sent to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    /// Name requested for the plugin; the host has the final say
    pub plugin_name: PluginName,
    /// Source text, transported verbatim
    pub source_text: String,
}

impl UploadRequest {
    /// Creates a request.
    #[must_use]
    pub fn new(plugin_name: PluginName, source_text: impl Into<String>) -> Self {
        Self {
            plugin_name,
            source_text: source_text.into(),
        }
    }

    /// Reads a source file and names the plugin after it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the file cannot be read as
    /// UTF-8, or [`Error::ValidationError`] if no usable name remains after
    /// stripping the extension.
    pub async fn from_path(path: &Path, extension: &str) -> Result<Self> {
        let plugin_name = plugin_name_from_path(path, extension)?;
        Self::from_path_named(path, plugin_name).await
    }

    /// Reads a source file under an explicit plugin name.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the file cannot be read as
    /// UTF-8.
    pub async fn from_path_named(path: &Path, plugin_name: PluginName) -> Result<Self> {
        let source_text = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::InvalidArgument(format!("cannot read plugin source {}: {e}", path.display()))
        })?;
        Ok(Self {
            plugin_name,
            source_text,
        })
    }

    /// Replaces the requested plugin name.
    #[must_use]
    pub fn with_name(mut self, plugin_name: PluginName) -> Self {
        self.plugin_name = plugin_name;
        self
    }
}

/// Derives a plugin name from a file name by stripping a trailing
/// `.<extension>`.
///
/// # Errors
///
/// Returns [`Error::ValidationError`] if the path has no file name or the
/// remaining name is not a valid plugin name.
///
/// # Examples
///
/// ```
/// use calc_plugins::plugin_name_from_path;
/// use std::path::Path;
///
/// let name = plugin_name_from_path(Path::new("plugins/Square.java"), "java").unwrap();
/// assert_eq!(name.as_str(), "Square");
/// assert!(plugin_name_from_path(Path::new(".java"), "java").is_err());
/// ```
pub fn plugin_name_from_path(path: &Path, extension: &str) -> Result<PluginName> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::ValidationError {
            field: "plugin_name".to_string(),
            reason: format!("{} has no usable file name", path.display()),
        })?;
    let suffix = format!(".{extension}");
    let stem = if extension.is_empty() {
        file_name
    } else {
        file_name.strip_suffix(&suffix).unwrap_or(file_name)
    };
    PluginName::new(stem)
}

/// Result of an accepted upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Name that was requested
    pub plugin_name: PluginName,
    /// Whether the refreshed registry contains the requested name
    pub registered: bool,
    /// Registry after the follow-up refresh
    pub registry: Arc<PluginRegistry>,
}

/// Sends plugin source to the host and reconciles the registry.
///
/// An accepted upload is never inserted into the registry directly. The
/// coordinator refreshes instead, so the registry shows what the host
/// actually registered.
pub struct PluginUploadCoordinator {
    host: Arc<dyn PluginHost>,
    registry: Arc<PluginRegistryClient>,
    policy: CallPolicy,
    sink: Arc<dyn DiagnosticSink>,
}

impl fmt::Debug for PluginUploadCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginUploadCoordinator")
            .field("host", &"dyn PluginHost")
            .field("registry", &self.registry)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl PluginUploadCoordinator {
    /// Creates a coordinator. Uploads are attempted once under the deadline
    /// of `policy`; its retry settings are ignored.
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
            policy: policy.once(),
            sink,
        }
    }

    /// Uploads plugin source, then refreshes the registry.
    ///
    /// # Errors
    ///
    /// If the host rejects the upload or cannot be reached, the error is
    /// recorded, no refresh happens and the registry is unchanged. If the
    /// upload is accepted but the follow-up refresh fails, the refresh error
    /// is returned; the registry client has already recorded it.
    pub async fn upload(&self, request: &UploadRequest) -> Result<UploadOutcome> {
        tracing::info!(
            plugin = %request.plugin_name,
            bytes = request.source_text.len(),
            "uploading plugin"
        );

        let host = self.host.as_ref();
        let sent = with_retry(PipelineOperation::Upload, self.policy, move || {
            host.upload_plugin(request)
        })
        .await;
        if let Err(err) = sent {
            self.sink
                .record(Diagnostic::from_error(PipelineOperation::Upload, &err));
            return Err(err);
        }

        let refreshed = self.registry.refresh().await?;
        let registered = refreshed.registry.contains(&request.plugin_name);
        if registered {
            tracing::info!(plugin = %request.plugin_name, "plugin registered");
        } else {
            tracing::warn!(
                plugin = %request.plugin_name,
                "upload accepted but plugin is not in the host listing"
            );
        }

        Ok(UploadOutcome {
            plugin_name: request.plugin_name.clone(),
            registered,
            registry: refreshed.registry,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::MockPluginHost;
    use calc_core::{MemorySink, RetryPolicy};
    use std::io::Write;
    use std::time::Duration;

    fn name(s: &str) -> PluginName {
        PluginName::new(s).unwrap()
    }

    fn coordinator(host: MockPluginHost, sink: &MemorySink) -> PluginUploadCoordinator {
        let host: Arc<dyn PluginHost> = Arc::new(host);
        let policy = CallPolicy::new(RetryPolicy::default(), Duration::from_secs(5));
        let sink: Arc<dyn DiagnosticSink> = Arc::new(sink.clone());
        let registry = Arc::new(PluginRegistryClient::new(
            Arc::clone(&host),
            policy,
            Arc::clone(&sink),
        ));
        PluginUploadCoordinator::new(host, registry, policy, sink)
    }

    #[test]
    fn test_plugin_name_from_path() {
        let cases = [
            ("Square.java", "java", "Square"),
            ("dir/Cube.java", "java", "Cube"),
            ("Readme.txt", "java", "Readme.txt"),
            ("Double.java", "", "Double.java"),
            ("Inverse.java.java", "java", "Inverse.java"),
        ];
        for (path, ext, expected) in cases {
            assert_eq!(
                plugin_name_from_path(Path::new(path), ext).unwrap().as_str(),
                expected
            );
        }
        assert!(plugin_name_from_path(Path::new("/"), "java").is_err());
    }

    #[tokio::test]
    async fn test_from_path_reads_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Square.java");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "public class Square {{}}").unwrap();

        let request = UploadRequest::from_path(&path, "java").await.unwrap();
        assert_eq!(request.plugin_name.as_str(), "Square");
        assert!(request.source_text.contains("class Square"));
    }

    #[tokio::test]
    async fn test_from_path_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = UploadRequest::from_path(&dir.path().join("Gone.java"), "java")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn test_accepted_upload_refreshes() {
        let mut host = MockPluginHost::new();
        host.expect_upload_plugin()
            .withf(|request| request.plugin_name.as_str() == "Square")
            .times(1)
            .returning(|_| Ok(()));
        host.expect_list_plugins()
            .times(1)
            .returning(|| Ok([name("Square")].into_iter().collect()));

        let sink = MemorySink::new();
        let outcome = coordinator(host, &sink)
            .upload(&UploadRequest::new(name("Square"), "class Square {}"))
            .await
            .unwrap();

        assert!(outcome.registered);
        assert!(sink.is_empty());
    }

    #[tokio::test]
    async fn test_host_may_register_under_other_name() {
        let mut host = MockPluginHost::new();
        host.expect_upload_plugin().returning(|_| Ok(()));
        host.expect_list_plugins()
            .returning(|| Ok([name("SquarePlugin")].into_iter().collect()));

        let sink = MemorySink::new();
        let outcome = coordinator(host, &sink)
            .upload(&UploadRequest::new(name("Square"), "class Square {}"))
            .await
            .unwrap();

        assert!(!outcome.registered);
        assert_eq!(outcome.registry.len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_upload_is_not_retried_and_skips_refresh() {
        let mut host = MockPluginHost::new();
        host.expect_upload_plugin().times(1).returning(|_| {
            Err(Error::HostRejected {
                operation: "upload".into(),
                status: 503,
                body: "compiler unavailable".into(),
            })
        });
        host.expect_list_plugins().times(0);

        let sink = MemorySink::new();
        let err = coordinator(host, &sink)
            .upload(&UploadRequest::new(name("Square"), "class Square {}"))
            .await
            .unwrap_err();

        assert!(err.is_host_rejected());
        let recorded = sink.snapshot();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].operation, PipelineOperation::Upload);
    }
}
