//! Sandbox resource types and the CRUD client over `/sandbox`.

use crate::client::HttpClient;
use crate::error::{require, CoreError};
use chrono::{DateTime, Utc};
use reqwest::Method;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Lifecycle state of a remote sandbox, as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SandboxState {
    /// Being provisioned (includes snapshot build/pull phases).
    Creating,
    /// Booting after a stop.
    Starting,
    /// Running and accepting toolbox calls.
    Running,
    /// Shutting down or archiving.
    Stopping,
    /// Stopped or archived.
    Stopped,
    /// Being deleted.
    Destroying,
    /// Deleted, still visible in listings.
    Destroyed,
    /// Failed to build or start.
    Error,
    /// A state this client does not know about, kept verbatim.
    Unknown(String),
}

impl Default for SandboxState {
    /// A sandbox the server reported without any state.
    fn default() -> Self {
        Self::Unknown(String::new())
    }
}

impl From<String> for SandboxState {
    fn from(raw: String) -> Self {
        match raw.to_lowercase().as_str() {
            "creating" | "pending_build" | "building_snapshot" | "pulling_snapshot"
            | "restoring" => Self::Creating,
            "starting" => Self::Starting,
            "started" | "running" => Self::Running,
            "stopping" | "archiving" => Self::Stopping,
            "stopped" | "archived" => Self::Stopped,
            "destroying" => Self::Destroying,
            "destroyed" => Self::Destroyed,
            "error" | "build_failed" => Self::Error,
            _ => Self::Unknown(raw),
        }
    }
}

impl From<SandboxState> for String {
    fn from(state: SandboxState) -> Self {
        state.to_string()
    }
}

impl fmt::Display for SandboxState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Creating => write!(f, "creating"),
            Self::Starting => write!(f, "starting"),
            Self::Running => write!(f, "running"),
            Self::Stopping => write!(f, "stopping"),
            Self::Stopped => write!(f, "stopped"),
            Self::Destroying => write!(f, "destroying"),
            Self::Destroyed => write!(f, "destroyed"),
            Self::Error => write!(f, "error"),
            Self::Unknown(raw) if raw.is_empty() => write!(f, "unknown"),
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

/// Snapshot of a remote sandbox at the time of the call.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sandbox {
    /// Server-assigned identifier.
    pub id: String,
    /// Current lifecycle state.
    #[serde(default, deserialize_with = "null_as_default")]
    pub state: SandboxState,
    /// Git repository the sandbox was created from.
    #[serde(default, alias = "repository")]
    pub repository_url: Option<String>,
    /// Creation timestamp.
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    /// Region the sandbox runs in.
    #[serde(default)]
    pub target: Option<String>,
    /// User-defined labels.
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: BTreeMap<String, String>,
}

/// Treat an explicit `null` like a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// The list endpoint returns either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum SandboxList {
    Plain(Vec<Sandbox>),
    Paged { items: Vec<Sandbox> },
}

#[derive(Debug, Serialize)]
struct CreateSandboxRequest<'a> {
    repository: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target: Option<&'a str>,
}

/// CRUD client for sandboxes.
///
/// Each method is exactly one HTTP round trip; nothing is cached.
#[derive(Debug, Clone)]
pub struct SandboxClient {
    http: HttpClient,
}

impl SandboxClient {
    /// Create a sandbox client sharing the given HTTP client.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// List all sandboxes, in server order.
    pub async fn list(&self) -> Result<Vec<Sandbox>, CoreError> {
        tracing::debug!("Listing sandboxes");
        let list: SandboxList = self
            .http
            .send_as(Method::GET, &["sandbox"], &[], None::<&Value>)
            .await?;

        let sandboxes = match list {
            SandboxList::Plain(items) | SandboxList::Paged { items } => items,
        };
        tracing::debug!(count = sandboxes.len(), "Sandboxes listed");
        Ok(sandboxes)
    }

    /// Create a sandbox from a Git repository URL.
    ///
    /// Only emptiness is checked here; the server validates the URL itself.
    pub async fn create(&self, repository_url: &str) -> Result<Sandbox, CoreError> {
        let repository_url = require(repository_url, "repository_url")?;
        let request = CreateSandboxRequest {
            repository: repository_url,
            target: self.http.config().target.as_deref(),
        };

        tracing::info!(repository_url = %repository_url, target = ?request.target, "Creating sandbox");
        let mut sandbox: Sandbox = self
            .http
            .send_as(Method::POST, &["sandbox"], &[], Some(&request))
            .await?;

        if sandbox.repository_url.is_none() {
            sandbox.repository_url = Some(repository_url.to_string());
        }

        tracing::info!(sandbox_id = %sandbox.id, state = %sandbox.state, "Sandbox created");
        Ok(sandbox)
    }

    /// Fetch a single sandbox.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if the id does not exist.
    pub async fn get_info(&self, sandbox_id: &str) -> Result<Sandbox, CoreError> {
        let sandbox_id = require(sandbox_id, "sandbox_id")?;
        tracing::debug!(sandbox_id = %sandbox_id, "Fetching sandbox");
        self.http
            .send_as(Method::GET, &["sandbox", sandbox_id], &[], None::<&Value>)
            .await
    }

    /// Delete a sandbox.
    ///
    /// A repeat delete surfaces whatever the server answers, usually
    /// [`CoreError::NotFound`]; it is not folded into success.
    pub async fn remove(&self, sandbox_id: &str) -> Result<(), CoreError> {
        let sandbox_id = require(sandbox_id, "sandbox_id")?;
        tracing::info!(sandbox_id = %sandbox_id, "Removing sandbox");
        self.http
            .send(Method::DELETE, &["sandbox", sandbox_id], None::<&Value>)
            .await?;
        tracing::info!(sandbox_id = %sandbox_id, "Sandbox removed");
        Ok(())
    }
}
