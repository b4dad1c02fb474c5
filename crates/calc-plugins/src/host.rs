//! Transport to the plugin host.
//!
//! [`PluginHost`] is the seam between the pipeline and the network. The
//! production implementation, [`HttpPluginHost`], speaks the host's three
//! HTTP endpoints relative to a base URL such as
//! `http://localhost:8082/api/calculator`:
//!
//! | Call | Request |
//! |---|---|
//! | list | `GET /plugins` |
//! | upload | `POST /upload-plugin?className=<name>`, body = source text |
//! | invoke | `POST /calculate/<name>?value=<operand>` |

use crate::{PluginRegistry, UploadRequest};
use async_trait::async_trait;
use calc_core::number::parse_number;
use calc_core::{Error, HostConfig, PluginName, Result};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, Url};
use serde_json::{Map, Value};
use std::time::Duration;

/// Operations offered by a plugin host.
///
/// Implementations translate transport failures into [`Error::Network`],
/// non-success statuses into [`Error::HostRejected`] and unreadable bodies
/// into [`Error::InvalidResponse`]. They never record diagnostics; the
/// pipeline component that issued the call does.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PluginHost: Send + Sync {
    /// Fetches the host's current plugin listing.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is unreachable, rejects the request or
    /// answers with something other than a JSON object.
    async fn list_plugins(&self) -> Result<PluginRegistry>;

    /// Sends plugin source code for registration.
    ///
    /// Success means the host accepted the request, not that the plugin is
    /// registered under the requested name.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is unreachable or rejects the upload.
    async fn upload_plugin(&self, request: &UploadRequest) -> Result<()>;

    /// Runs a plugin against one operand.
    ///
    /// `operand` is sent exactly as given.
    ///
    /// # Errors
    ///
    /// Returns an error if the host is unreachable, rejects the call or the
    /// result is not numeric.
    async fn calculate(&self, plugin: &PluginName, operand: &str) -> Result<f64>;
}

/// [`PluginHost`] over HTTP using `reqwest`.
///
/// # Examples
///
/// ```
/// use calc_core::HostConfig;
/// use calc_plugins::HttpPluginHost;
///
/// let host = HttpPluginHost::new(&HostConfig::default()).unwrap();
/// assert_eq!(host.base_url().path(), "/api/calculator");
/// ```
#[derive(Debug, Clone)]
pub struct HttpPluginHost {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpPluginHost {
    /// Creates a host client from connection settings.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if the base URL does not parse, cannot
    /// carry a path, or the HTTP client cannot be built.
    pub fn new(config: &HostConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| Error::ConfigError {
            message: format!("invalid host base URL '{}': {e}", config.base_url),
        })?;
        if base_url.cannot_be_a_base() {
            return Err(Error::ConfigError {
                message: format!("host base URL '{base_url}' cannot carry a path"),
            });
        }

        let timeout = config.request_timeout();
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::ConfigError {
                message: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Returns the base URL all endpoints are resolved against.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // cannot_be_a_base was rejected in new()
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn transport_error(&self, operation: &str, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::Timeout {
                operation: operation.to_string(),
                duration: self.timeout,
            }
        } else {
            Error::network(operation, error)
        }
    }

    /// Returns the body of a 2xx response, or [`Error::HostRejected`] with
    /// the text body otherwise.
    async fn success_body(&self, operation: &str, response: Response) -> Result<String> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::HostRejected {
                operation: operation.to_string(),
                status: status.as_u16(),
                body,
            });
        }
        response
            .text()
            .await
            .map_err(|e| self.transport_error(operation, e))
    }
}

#[async_trait]
impl PluginHost for HttpPluginHost {
    async fn list_plugins(&self) -> Result<PluginRegistry> {
        const OPERATION: &str = "refresh";
        let url = self.endpoint(&["plugins"]);
        tracing::debug!(%url, "listing plugins");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.transport_error(OPERATION, e))?;
        let body = self.success_body(OPERATION, response).await?;

        let listing: Map<String, Value> =
            serde_json::from_str(&body).map_err(|e| Error::InvalidResponse {
                operation: OPERATION.to_string(),
                message: format!("expected a JSON object of plugins: {e}"),
            })?;
        Ok(PluginRegistry::from_listing(listing))
    }

    async fn upload_plugin(&self, request: &UploadRequest) -> Result<()> {
        const OPERATION: &str = "upload";
        let mut url = self.endpoint(&["upload-plugin"]);
        url.query_pairs_mut()
            .append_pair("className", request.plugin_name.as_str());
        tracing::debug!(%url, bytes = request.source_text.len(), "uploading plugin source");

        let response = self
            .client
            .post(url)
            .header(CONTENT_TYPE, "text/plain; charset=utf-8")
            .body(request.source_text.clone())
            .send()
            .await
            .map_err(|e| self.transport_error(OPERATION, e))?;
        self.success_body(OPERATION, response).await?;
        Ok(())
    }

    async fn calculate(&self, plugin: &PluginName, operand: &str) -> Result<f64> {
        const OPERATION: &str = "invoke";
        let mut url = self.endpoint(&["calculate", plugin.as_str()]);
        url.query_pairs_mut().append_pair("value", operand);
        tracing::debug!(%url, "invoking plugin");

        let response = self
            .client
            .post(url)
            .send()
            .await
            .map_err(|e| self.transport_error(OPERATION, e))?;
        let body = self.success_body(OPERATION, response).await?;

        parse_numeric_body(&body).ok_or_else(|| Error::InvalidResponse {
            operation: OPERATION.to_string(),
            message: format!("expected a numeric result, got '{}'", body.trim()),
        })
    }
}

/// Accepts a JSON number, a JSON string holding a number, or bare numeric
/// text such as `Infinity`.
fn parse_numeric_body(body: &str) -> Option<f64> {
    let trimmed = body.trim();
    match serde_json::from_str::<Value>(trimmed) {
        Ok(Value::Number(number)) => number.as_f64(),
        Ok(Value::String(text)) => parse_number(text.trim()).ok(),
        Ok(_) => None,
        Err(_) => parse_number(trimmed).ok(),
    }
}
