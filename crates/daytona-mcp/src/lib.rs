//! # daytona-mcp
//!
//! MCP (Model Context Protocol) server exposing Daytona sandboxes to AI agents.
//!
//! ## Quick Start
//!
//! ```bash
//! export DAYTONA_API_KEY=dtn_...
//! export DAYTONA_SERVER_URL=https://app.daytona.io/api
//! cargo run -p daytona-mcp
//! ```
//!
//! ## MCP Tools
//!
//! | Tool | Description |
//! |------|-------------|
//! | `list_sandboxes` | List all sandboxes |
//! | `create_sandbox` | Create a sandbox from a Git repository |
//! | `get_sandbox_info` | Get sandbox details |
//! | `remove_sandbox` | Remove a sandbox |
//! | `execute_command` | Execute a shell command |
//! | `list_files` | List directory contents |
//! | `read_file` | Read file from sandbox |
//! | `write_file` | Write file to sandbox |
//!
//! ## Resources
//!
//! | URI | Content |
//! |-----|---------|
//! | `daytona://sandboxes` | Sandbox list (JSON) |
//! | `daytona://{sandbox_id}/files/{path}` | File content |
//!
//! ## Prompts
//!
//! `sandbox_assistant`, `explore_repository`, `run_task`.

mod config;
pub mod http;
pub mod prompts;
pub mod resources;
mod server;
mod types;

pub use config::{
    ConfigError, DaytonaMcpConfig, TransportMode, MAX_COMMAND_LENGTH, MAX_INPUT_SIZE_BYTES,
};
pub use server::DaytonaServer;
pub use types::*;
