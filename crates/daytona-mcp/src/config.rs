//! Configuration for the MCP server.
//!
//! Configuration is loaded from environment variables once at startup. The
//! API key and server URL are required; everything else has a default.

use daytona_core::ClientConfig;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::time::Duration;

/// Maximum size for file content written through `write_file` (10 MB).
pub const MAX_INPUT_SIZE_BYTES: usize = 10 * 1024 * 1024;

/// Maximum command length in bytes.
pub const MAX_COMMAND_LENGTH: usize = 1024 * 1024; // 1 MB

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransportMode {
    /// Stdio only (for local AI tools like Claude Desktop)
    #[default]
    Stdio,
    /// HTTP/SSE only (for remote AI agents)
    Http,
    /// Both stdio and HTTP
    Both,
}

impl TransportMode {
    /// Parse from string (case-insensitive).
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "http" | "sse" | "remote" => Self::Http,
            "both" | "all" => Self::Both,
            _ => Self::Stdio,
        }
    }

    /// Check if stdio transport should be enabled.
    pub fn stdio_enabled(&self) -> bool {
        matches!(self, Self::Stdio | Self::Both)
    }

    /// Check if HTTP transport should be enabled.
    pub fn http_enabled(&self) -> bool {
        matches!(self, Self::Http | Self::Both)
    }
}

/// Configuration for the Daytona MCP server.
#[derive(Debug, Clone)]
pub struct DaytonaMcpConfig {
    /// Credential context handed to the Daytona clients.
    pub client: ClientConfig,

    /// Transport mode (default: stdio).
    pub transport_mode: TransportMode,

    /// HTTP server bind address.
    pub http_addr: SocketAddr,
}

/// Configuration error. Any of these stops the process before the server
/// is constructed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("DAYTONA_API_KEY environment variable is not set")]
    MissingApiKey,

    #[error("DAYTONA_SERVER_URL environment variable is not set")]
    MissingServerUrl,

    #[error("invalid value for {var}: {value:?}")]
    InvalidValue { var: &'static str, value: String },

    #[error("invalid client configuration: {0}")]
    Client(#[from] daytona_core::CoreError),
}

impl DaytonaMcpConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `DAYTONA_API_KEY` | required |
    /// | `DAYTONA_SERVER_URL` | required |
    /// | `DAYTONA_TARGET` | unset |
    /// | `DAYTONA_TIMEOUT_SECS` | unset (no timeout) |
    /// | `DAYTONA_MAX_RETRIES` | `0` |
    /// | `DAYTONA_MCP_TRANSPORT` | `stdio` (stdio, http, both) |
    /// | `DAYTONA_MCP_HTTP_HOST` | `127.0.0.1` |
    /// | `DAYTONA_MCP_HTTP_PORT` | `8080` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    ///
    /// Empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_key = get("DAYTONA_API_KEY").ok_or(ConfigError::MissingApiKey)?;
        let server_url = get("DAYTONA_SERVER_URL").ok_or(ConfigError::MissingServerUrl)?;

        let mut builder = ClientConfig::builder()
            .api_key(api_key)
            .server_url(server_url);

        if let Some(target) = get("DAYTONA_TARGET") {
            builder = builder.target(target);
        }
        if let Some(secs) = parse_var::<u64>(&get, "DAYTONA_TIMEOUT_SECS")? {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(retries) = parse_var::<u32>(&get, "DAYTONA_MAX_RETRIES")? {
            builder = builder.max_retries(retries);
        }

        let http_host: IpAddr = parse_var(&get, "DAYTONA_MCP_HTTP_HOST")?
            .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST));
        let http_port: u16 = parse_var(&get, "DAYTONA_MCP_HTTP_PORT")?.unwrap_or(8080);

        Ok(Self {
            client: builder.build()?,
            transport_mode: get("DAYTONA_MCP_TRANSPORT")
                .map(|v| TransportMode::parse(&v))
                .unwrap_or_default(),
            http_addr: SocketAddr::new(http_host, http_port),
        })
    }
}

/// Parse an optional variable, rejecting values that are set but malformed.
fn parse_var<T: std::str::FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError> {
    match get(var) {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue { var, value }),
    }
}
