//! Tool parameter and response types for MCP tools.
//!
//! These types use serde for serialization and schemars for automatic
//! JSON Schema generation required by MCP.

use daytona_core::{CommandResult, FileEntry, FileKind, Sandbox};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Sandbox Lifecycle
// ============================================================================

/// Parameters for creating a new sandbox.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct CreateSandboxParams {
    /// URL of the Git repository to create the sandbox from.
    pub repository_url: String,
}

/// Parameters for tools that address a single sandbox.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SandboxIdParams {
    /// ID of the sandbox.
    pub sandbox_id: String,
}

/// Result of removing a sandbox.
#[derive(Debug, Serialize, JsonSchema)]
pub struct RemoveSandboxResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// ID of the removed sandbox.
    pub sandbox_id: String,
}

/// Result of listing sandboxes.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ListSandboxesResult {
    /// Sandboxes in the order the server returned them.
    pub sandboxes: Vec<SandboxInfo>,
}

/// Information about a sandbox.
#[derive(Debug, Serialize, JsonSchema)]
pub struct SandboxInfo {
    /// Unique identifier for the sandbox.
    pub sandbox_id: String,
    /// Current state of the sandbox.
    pub state: String,
    /// Git repository the sandbox was created from.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,
    /// When the sandbox was created (ISO 8601).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    /// Region the sandbox runs in.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<String>,
    /// User-defined labels.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,
}

impl From<Sandbox> for SandboxInfo {
    fn from(sandbox: Sandbox) -> Self {
        Self {
            sandbox_id: sandbox.id,
            state: sandbox.state.to_string(),
            repository_url: sandbox.repository_url,
            created_at: sandbox.created_at.map(|t| t.to_rfc3339()),
            target: sandbox.target,
            labels: sandbox.labels,
        }
    }
}

// ============================================================================
// Command Execution
// ============================================================================

/// Parameters for executing a shell command.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct ExecuteCommandParams {
    /// ID of the sandbox to execute in.
    pub sandbox_id: String,

    /// Shell command to execute.
    pub command: String,
}

/// Result of command execution.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ExecResponse {
    /// Exit code of the command (0 = success).
    pub exit_code: i32,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,
}

impl From<CommandResult> for ExecResponse {
    fn from(result: CommandResult) -> Self {
        Self {
            exit_code: result.exit_code,
            stdout: result.stdout,
            stderr: result.stderr,
        }
    }
}

// ============================================================================
// File Operations
// ============================================================================

/// Parameters for tools that address a path inside a sandbox.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct SandboxPathParams {
    /// ID of the sandbox.
    pub sandbox_id: String,

    /// Path inside the sandbox filesystem.
    pub path: String,
}

/// How file content is encoded in a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, JsonSchema)]
pub enum ContentEncoding {
    /// Content is the file's text.
    #[serde(rename = "utf-8")]
    Utf8,
    /// Content is base64 of the file's bytes (not valid UTF-8).
    #[serde(rename = "base64")]
    Base64,
}

/// Result of reading a file.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ReadFileResult {
    /// File contents.
    pub content: String,
    /// Encoding of `content`.
    pub encoding: ContentEncoding,
}

/// Parameters for writing a file.
#[derive(Debug, Deserialize, JsonSchema)]
pub struct WriteFileParams {
    /// ID of the sandbox.
    pub sandbox_id: String,

    /// Path to the file.
    pub path: String,

    /// Content to write.
    pub content: String,
}

/// Result of writing a file.
#[derive(Debug, Serialize, JsonSchema)]
pub struct WriteFileResult {
    /// Whether the operation succeeded.
    pub success: bool,
    /// Number of bytes written.
    pub bytes_written: usize,
}

/// Result of listing a directory.
#[derive(Debug, Serialize, JsonSchema)]
pub struct ListFilesResult {
    /// Entries in the directory, in server order.
    pub entries: Vec<FileEntryResponse>,
}

/// Information about a file or directory entry.
#[derive(Debug, Serialize, JsonSchema)]
pub struct FileEntryResponse {
    /// Path of the entry.
    pub path: String,

    /// `file` or `directory`.
    #[serde(rename = "type")]
    pub kind: String,

    /// File size in bytes (omitted for directories).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
}

impl From<FileEntry> for FileEntryResponse {
    fn from(entry: FileEntry) -> Self {
        Self {
            path: entry.path,
            kind: match entry.kind {
                FileKind::File => "file",
                FileKind::Directory => "directory",
            }
            .to_string(),
            size: entry.size,
        }
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Structured body of a failed tool call.
#[derive(Debug, Serialize)]
pub struct ToolError {
    /// Error details.
    pub error: ToolErrorDetail,
}

/// Category and message of a failed tool call.
#[derive(Debug, Serialize)]
pub struct ToolErrorDetail {
    /// Machine-readable category (`auth`, `not_found`, `remote`, `transport`,
    /// `validation`, `decode`).
    pub kind: String,
    /// Human-readable message.
    pub message: String,
}

impl ToolError {
    /// Build an error body.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ToolErrorDetail {
                kind: kind.into(),
                message: message.into(),
            },
        }
    }
}
