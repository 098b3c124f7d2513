//! In-sandbox operations: command execution and file access.
//!
//! All calls go through `/toolbox/{sandbox_id}/toolbox/...`. A sandbox that
//! does not exist is reported by the server as 404 and surfaces as
//! [`CoreError::NotFound`].

use crate::client::HttpClient;
use crate::error::{require, CoreError};
use bytes::Bytes;
use reqwest::Method;
use serde::{Deserialize, Serialize};

/// Result from command execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResult {
    /// The command that was run.
    #[serde(default)]
    pub command: String,
    /// Process exit code.
    pub exit_code: i32,
    /// Standard output.
    pub stdout: String,
    /// Standard error.
    pub stderr: String,
}

impl CommandResult {
    /// Check if the command succeeded (exit code 0).
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    /// Regular file.
    File,
    /// Directory.
    Directory,
}

/// File entry from a directory listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileEntry {
    /// Path of the entry: the listed directory joined with the entry name.
    pub path: String,
    /// File or directory.
    pub kind: FileKind,
    /// File size in bytes (absent for directories).
    pub size: Option<u64>,
}

/// Options for [`ToolboxClient::execute_command_with`].
#[derive(Debug, Clone, Default)]
pub struct ExecuteOptions {
    /// Working directory inside the sandbox.
    pub cwd: Option<String>,
    /// Server-side execution timeout in seconds.
    pub timeout_secs: Option<u64>,
}

// Wire types matching the toolbox API's JSON structure

#[derive(Debug, Serialize)]
struct ExecuteRequest<'a> {
    command: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cwd: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    timeout: Option<u64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExecuteResponse {
    exit_code: i32,
    #[serde(default, alias = "result")]
    stdout: String,
    #[serde(default)]
    stderr: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileInfo {
    name: String,
    #[serde(default)]
    is_dir: bool,
    #[serde(default)]
    size: Option<u64>,
}

/// Client for toolbox operations inside a sandbox.
#[derive(Debug, Clone)]
pub struct ToolboxClient {
    http: HttpClient,
}

impl ToolboxClient {
    /// Create a toolbox client sharing the given HTTP client.
    pub fn new(http: HttpClient) -> Self {
        Self { http }
    }

    /// Execute a shell command inside the sandbox.
    ///
    /// The command string is forwarded verbatim; exit code and output
    /// streams are returned as the server reports them.
    pub async fn execute_command(
        &self,
        sandbox_id: &str,
        command: &str,
    ) -> Result<CommandResult, CoreError> {
        self.execute_command_with(sandbox_id, command, &ExecuteOptions::default())
            .await
    }

    /// Execute a shell command with a working directory and/or timeout.
    pub async fn execute_command_with(
        &self,
        sandbox_id: &str,
        command: &str,
        options: &ExecuteOptions,
    ) -> Result<CommandResult, CoreError> {
        let sandbox_id = require(sandbox_id, "sandbox_id")?;
        require(command, "command")?;

        tracing::debug!(sandbox_id = %sandbox_id, command_len = command.len(), "Executing command via toolbox");
        let request = ExecuteRequest {
            command,
            cwd: options.cwd.as_deref(),
            timeout: options.timeout_secs,
        };
        let response: ExecuteResponse = self
            .http
            .send_as(
                Method::POST,
                &toolbox_path(sandbox_id, &["process", "execute"]),
                &[],
                Some(&request),
            )
            .await?;

        tracing::debug!(sandbox_id = %sandbox_id, exit_code = response.exit_code, "Command finished");
        Ok(CommandResult {
            command: command.to_string(),
            exit_code: response.exit_code,
            stdout: response.stdout,
            stderr: response.stderr,
        })
    }

    /// List directory contents, in server order.
    pub async fn list_files(&self, sandbox_id: &str, path: &str) -> Result<Vec<FileEntry>, CoreError> {
        let sandbox_id = require(sandbox_id, "sandbox_id")?;
        require(path, "path")?;

        tracing::debug!(sandbox_id = %sandbox_id, path = %path, "Listing directory");
        let infos: Vec<FileInfo> = self
            .http
            .send_as(
                Method::GET,
                &toolbox_path(sandbox_id, &["files"]),
                &[("path", path)],
                None::<&serde_json::Value>,
            )
            .await?;
        tracing::trace!(count = infos.len(), "Directory entries received");

        Ok(infos
            .into_iter()
            .map(|info| FileEntry {
                path: join_path(path, &info.name),
                kind: if info.is_dir {
                    FileKind::Directory
                } else {
                    FileKind::File
                },
                size: if info.is_dir { None } else { info.size },
            })
            .collect())
    }

    /// Read a file's raw bytes. No size limit is applied here.
    pub async fn read_file(&self, sandbox_id: &str, path: &str) -> Result<Bytes, CoreError> {
        let sandbox_id = require(sandbox_id, "sandbox_id")?;
        require(path, "path")?;

        tracing::debug!(sandbox_id = %sandbox_id, path = %path, "Reading file");
        let content = self
            .http
            .get_bytes(
                &toolbox_path(sandbox_id, &["files", "download"]),
                &[("path", path)],
            )
            .await?;
        tracing::trace!(sandbox_id = %sandbox_id, bytes = content.len(), "File read");
        Ok(content)
    }

    /// Write a file, replacing any existing content.
    pub async fn write_file(
        &self,
        sandbox_id: &str,
        path: &str,
        content: impl Into<Bytes>,
    ) -> Result<(), CoreError> {
        let sandbox_id = require(sandbox_id, "sandbox_id")?;
        require(path, "path")?;
        let content = content.into();

        tracing::debug!(sandbox_id = %sandbox_id, path = %path, content_len = content.len(), "Writing file");
        self.http
            .upload(
                &toolbox_path(sandbox_id, &["files", "upload"]),
                &[("path", path)],
                file_name(path),
                content,
            )
            .await
    }
}

/// Path segments for a toolbox endpoint of one sandbox.
fn toolbox_path<'a>(sandbox_id: &'a str, rest: &[&'a str]) -> Vec<&'a str> {
    let mut segments = vec!["toolbox", sandbox_id, "toolbox"];
    segments.extend_from_slice(rest);
    segments
}

/// Join a directory and an entry name with exactly one separator.
fn join_path(dir: &str, name: &str) -> String {
    if dir.ends_with('/') {
        format!("{dir}{name}")
    } else {
        format!("{dir}/{name}")
    }
}

/// Last component of a path, used as the multipart file name.
fn file_name(path: &str) -> &str {
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .filter(|name| !name.is_empty())
        .unwrap_or("file")
}
