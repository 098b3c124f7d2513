//! # daytona-core
//!
//! Typed client for the Daytona sandbox-management REST API.
//!
//! This crate wraps the remote API in two small clients that share one
//! authenticated HTTP connection pool. Nothing is cached: every call is a
//! single request against the server, which remains the source of truth.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      daytona-core                        │
//! ├──────────────────────────────────────────────────────────┤
//! │                                                          │
//! │  ┌─────────────────┐     ┌──────────────────────────┐    │
//! │  │ SandboxClient   │     │  ToolboxClient           │    │
//! │  │   - list()      │     │   - execute_command()    │    │
//! │  │   - create()    │     │   - list_files()         │    │
//! │  │   - get_info()  │     │   - read_file()          │    │
//! │  │   - remove()    │     │   - write_file()         │    │
//! │  └─────────────────┘     └──────────────────────────┘    │
//! │           │                          │                   │
//! │           └────────────┬─────────────┘                   │
//! │                        ▼                                 │
//! │             ┌─────────────────────┐                      │
//! │             │  HttpClient         │  ClientConfig        │
//! │             │   - send()          │  (api key, url)      │
//! │             └─────────────────────┘                      │
//! └──────────────────────────────────────────────────────────┘
//!                           │ HTTPS, bearer token
//!                           ▼
//!                   Daytona REST API
//! ```
//!
//! ## Quick Start
//!
//! ```no_run
//! use daytona_core::{ClientConfig, HttpClient, SandboxClient, ToolboxClient};
//!
//! # async fn example() -> daytona_core::Result<()> {
//! let config = ClientConfig::builder()
//!     .api_key("dtn_...")
//!     .server_url("https://app.daytona.io/api")
//!     .build()?;
//!
//! let http = HttpClient::new(config)?;
//! let sandboxes = SandboxClient::new(http.clone());
//! let toolbox = ToolboxClient::new(http);
//!
//! let sandbox = sandboxes
//!     .create("https://github.com/daytonaio/sample-repo.git")
//!     .await?;
//!
//! let result = toolbox.execute_command(&sandbox.id, "ls -la").await?;
//! println!("exit {}: {}", result.exit_code, result.stdout);
//!
//! toolbox.write_file(&sandbox.id, "/tmp/hello.txt", "Hello!").await?;
//! let content = toolbox.read_file(&sandbox.id, "/tmp/hello.txt").await?;
//! assert_eq!(&content[..], b"Hello!");
//!
//! sandboxes.remove(&sandbox.id).await?;
//! # Ok(())
//! # }
//! ```

mod client;
mod config;
mod error;
mod sandbox;
mod toolbox;

pub use client::HttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{CoreError, Result};
pub use sandbox::{Sandbox, SandboxClient, SandboxState};
pub use toolbox::{CommandResult, ExecuteOptions, FileEntry, FileKind, ToolboxClient};

/// Re-exported so callers can name HTTP methods for [`HttpClient::send`].
pub use reqwest::Method;
