//! Local view of the plugins the host has registered.

use crate::host::PluginHost;
use crate::retry::{CallPolicy, with_retry};
use calc_core::{Diagnostic, DiagnosticSink, PipelineOperation, PluginName, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::RwLock;

/// Plugin names known to the host, each with opaque host metadata.
///
/// Snapshots are shared as `Arc<PluginRegistry>` and never modified in
/// place; a refresh swaps in a new one.
///
/// # Examples
///
/// ```
/// use calc_plugins::PluginRegistry;
/// use serde_json::json;
///
/// let registry = PluginRegistry::from_listing(
///     json!({"Square": {"loaded": true}, "Cube": null})
///         .as_object()
///         .unwrap()
///         .clone(),
/// );
/// let names: Vec<_> = registry.names().map(|n| n.as_str()).collect();
/// assert_eq!(names, ["Cube", "Square"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PluginRegistry {
    plugins: BTreeMap<PluginName, Value>,
}

impl PluginRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry from the host's listing object.
    ///
    /// The result holds exactly the listing's keys that pass
    /// [`PluginName`] validation. Other keys are dropped with a warning, so
    /// a plugin the host lists under an unusable name is never registered
    /// locally and invoking it reports an unknown plugin.
    #[must_use]
    pub fn from_listing(listing: Map<String, Value>) -> Self {
        listing
            .into_iter()
            .filter_map(|(key, metadata)| match PluginName::new(key.as_str()) {
                Ok(name) => Some((name, metadata)),
                Err(err) => {
                    tracing::warn!(key = %key, error = %err, "ignoring unusable plugin name");
                    None
                }
            })
            .collect()
    }

    /// Returns `true` if `name` is registered.
    #[must_use]
    pub fn contains(&self, name: &PluginName) -> bool {
        self.plugins.contains_key(name)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &PluginName> {
        self.plugins.keys()
    }

    /// Entries in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&PluginName, &Value)> {
        self.plugins.iter()
    }

    /// Host metadata for `name`.
    #[must_use]
    pub fn metadata(&self, name: &PluginName) -> Option<&Value> {
        self.plugins.get(name)
    }

    /// Number of registered plugins.
    #[must_use]
    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    /// Returns `true` if nothing is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}

impl FromIterator<(PluginName, Value)> for PluginRegistry {
    fn from_iter<I: IntoIterator<Item = (PluginName, Value)>>(iter: I) -> Self {
        Self {
            plugins: iter.into_iter().collect(),
        }
    }
}

impl FromIterator<PluginName> for PluginRegistry {
    fn from_iter<I: IntoIterator<Item = PluginName>>(iter: I) -> Self {
        iter.into_iter().map(|name| (name, Value::Null)).collect()
    }
}

/// Result of a successful refresh.
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    /// Registry in effect after this refresh completed
    pub registry: Arc<PluginRegistry>,
    /// Sequence number this refresh was issued with
    pub sequence: u64,
    /// `false` when a newer refresh had already been applied and this
    /// response was discarded
    pub applied: bool,
}

#[derive(Debug, Default)]
struct Applied {
    sequence: u64,
    registry: Arc<PluginRegistry>,
}

/// Owns the local registry and keeps it in step with the host.
///
/// Each [`refresh`](Self::refresh) takes a sequence number before its
/// request goes out. A response is applied only if no refresh with a higher
/// number has been applied already, so concurrent refreshes converge on the
/// most recently issued one that succeeded.
pub struct PluginRegistryClient {
    host: Arc<dyn PluginHost>,
    policy: CallPolicy,
    sink: Arc<dyn DiagnosticSink>,
    issued: AtomicU64,
    current: RwLock<Applied>,
}

impl fmt::Debug for PluginRegistryClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PluginRegistryClient")
            .field("host", &"dyn PluginHost")
            .field("policy", &self.policy)
            .field("sink", &self.sink)
            .field("issued", &self.issued.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}

impl PluginRegistryClient {
    /// Creates a client with an empty registry.
    #[must_use]
    pub fn new(host: Arc<dyn PluginHost>, policy: CallPolicy, sink: Arc<dyn DiagnosticSink>) -> Self {
        Self {
            host,
            policy,
            sink,
            issued: AtomicU64::new(0),
            current: RwLock::new(Applied::default()),
        }
    }

    /// Replaces the registry with the host's current listing, minus the
    /// names [`PluginRegistry::from_listing`] drops.
    ///
    /// Retried on transient failures. On failure the error is recorded with
    /// the diagnostic sink and the registry is left exactly as it was.
    ///
    /// # Errors
    ///
    /// Returns the error of the last attempt. It has already been recorded.
    pub async fn refresh(&self) -> Result<RefreshOutcome> {
        let sequence = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::debug!(sequence, "refreshing plugin registry");

        let host = self.host.as_ref();
        let fetched = with_retry(PipelineOperation::Refresh, self.policy, move || {
            host.list_plugins()
        })
        .await;
        let registry = match fetched {
            Ok(registry) => Arc::new(registry),
            Err(err) => {
                self.sink
                    .record(Diagnostic::from_error(PipelineOperation::Refresh, &err));
                return Err(err);
            }
        };

        let mut current = self.current.write().await;
        if sequence <= current.sequence {
            tracing::warn!(
                sequence,
                applied = current.sequence,
                "discarding superseded registry response"
            );
            return Ok(RefreshOutcome {
                registry: Arc::clone(&current.registry),
                sequence,
                applied: false,
            });
        }
        *current = Applied {
            sequence,
            registry: Arc::clone(&registry),
        };
        drop(current);

        tracing::info!(sequence, plugins = registry.len(), "plugin registry refreshed");
        Ok(RefreshOutcome {
            registry,
            sequence,
            applied: true,
        })
    }

    /// Returns the registry currently in effect.
    pub async fn snapshot(&self) -> Arc<PluginRegistry> {
        Arc::clone(&self.current.read().await.registry)
    }

    /// Returns `true` if `name` is in the current registry.
    pub async fn contains(&self, name: &PluginName) -> bool {
        self.current.read().await.registry.contains(name)
    }
}
