//! Resource URIs served by the MCP server.
//!
//! - `daytona://sandboxes` lists all sandboxes.
//! - `daytona://{sandbox_id}/files/{path}` is the content of one file.
//!
//! `{path}` is percent-decoded and passed to the toolbox as-is, so it is
//! relative to the sandbox working directory unless it starts with `/`
//! (`daytona://sb-1/files//etc/hostname`).

/// URI scheme for all resources.
pub const URI_SCHEME: &str = "daytona";

/// URI of the sandbox list resource.
pub const SANDBOXES_URI: &str = "daytona://sandboxes";

/// URI template of the file content resource.
pub const FILE_URI_TEMPLATE: &str = "daytona://{sandbox_id}/files/{path}";

/// A parsed resource URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceUri {
    /// The sandbox list.
    Sandboxes,
    /// Content of a single file.
    File {
        /// ID of the sandbox holding the file.
        sandbox_id: String,
        /// Decoded path of the file.
        path: String,
    },
}

/// Error parsing a resource URI.
#[derive(Debug, thiserror::Error)]
pub enum ResourceUriError {
    #[error("unsupported resource URI (expected daytona://...): {0}")]
    UnsupportedScheme(String),

    #[error("malformed resource URI: {0}")]
    Malformed(String),
}

impl ResourceUri {
    /// Parse a `daytona://` URI.
    pub fn parse(uri: &str) -> Result<Self, ResourceUriError> {
        let rest = uri
            .strip_prefix(URI_SCHEME)
            .and_then(|r| r.strip_prefix("://"))
            .ok_or_else(|| ResourceUriError::UnsupportedScheme(uri.to_string()))?;

        if rest.trim_end_matches('/') == "sandboxes" {
            return Ok(Self::Sandboxes);
        }

        let (sandbox_id, raw_path) = rest
            .split_once("/files/")
            .ok_or_else(|| ResourceUriError::Malformed(uri.to_string()))?;

        if sandbox_id.is_empty() || sandbox_id.contains('/') || raw_path.is_empty() {
            return Err(ResourceUriError::Malformed(uri.to_string()));
        }

        let sandbox_id = urlencoding::decode(sandbox_id)
            .map_err(|_| ResourceUriError::Malformed(uri.to_string()))?
            .into_owned();
        let path = urlencoding::decode(raw_path)
            .map_err(|_| ResourceUriError::Malformed(uri.to_string()))?
            .into_owned();

        Ok(Self::File { sandbox_id, path })
    }
}
