//! Client configuration types.

use crate::error::CoreError;
use std::fmt;
use std::time::Duration;
use url::Url;

/// Credential context shared by every client.
///
/// Built once at startup and passed to each client by value; nothing in this
/// crate reads the environment on its own.
#[derive(Clone)]
pub struct ClientConfig {
    /// Daytona API key, sent as a bearer token.
    pub api_key: String,
    /// Base URL of the Daytona API (e.g. `https://app.daytona.io/api`).
    pub server_url: Url,
    /// Target region for newly created sandboxes.
    pub target: Option<String>,
    /// Per-request timeout. `None` leaves it to the transport.
    pub timeout: Option<Duration>,
    /// Retries after a transport failure (default: 0).
    pub max_retries: u32,
    /// Delay before the first retry, doubled on each further attempt.
    pub retry_backoff: Duration,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("server_url", &self.server_url.as_str())
            .field("target", &self.target)
            .field("timeout", &self.timeout)
            .field("max_retries", &self.max_retries)
            .field("retry_backoff", &self.retry_backoff)
            .finish()
    }
}

impl ClientConfig {
    /// Create a new config builder.
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }
}

/// Builder for ClientConfig.
#[derive(Debug)]
pub struct ClientConfigBuilder {
    api_key: String,
    server_url: String,
    target: Option<String>,
    timeout: Option<Duration>,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Default for ClientConfigBuilder {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            server_url: String::new(),
            target: None,
            timeout: None,
            max_retries: 0,
            retry_backoff: Duration::from_millis(200),
        }
    }
}

impl ClientConfigBuilder {
    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Set the server base URL.
    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.server_url = url.into();
        self
    }

    /// Set the target region.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Set the number of retries after a transport failure.
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    /// Set the initial retry backoff.
    pub fn retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    /// Build the configuration, validating all required fields.
    pub fn build(self) -> Result<ClientConfig, CoreError> {
        if self.api_key.trim().is_empty() {
            return Err(CoreError::Validation("api_key is required".into()));
        }
        if self.server_url.trim().is_empty() {
            return Err(CoreError::Validation("server_url is required".into()));
        }

        let server_url = Url::parse(self.server_url.trim())
            .map_err(|e| CoreError::Validation(format!("invalid server_url: {e}")))?;
        if !matches!(server_url.scheme(), "http" | "https") {
            return Err(CoreError::Validation(format!(
                "server_url must be http or https, got {}",
                server_url.scheme()
            )));
        }

        Ok(ClientConfig {
            api_key: self.api_key,
            server_url,
            target: self.target.filter(|t| !t.trim().is_empty()),
            timeout: self.timeout,
            max_retries: self.max_retries,
            retry_backoff: self.retry_backoff,
        })
    }
}
