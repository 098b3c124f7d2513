//! Integration tests for daytona-mcp.
//!
//! The live tests require a reachable Daytona server:
//! - `DAYTONA_API_KEY`
//! - `DAYTONA_SERVER_URL`
//!
//! Run with: `cargo test -p daytona-mcp -- --ignored`

use daytona_core::{HttpClient, SandboxClient, SandboxState, ToolboxClient};
use daytona_mcp::{ConfigError, DaytonaMcpConfig, DaytonaServer};
use std::time::Duration;

/// Repository used to create throwaway sandboxes.
const TEST_REPOSITORY: &str = "https://github.com/octocat/Hello-World.git";

#[test]
fn test_server_refuses_to_start_without_credentials() {
    let result = DaytonaMcpConfig::from_lookup(|_| None);
    assert!(matches!(result, Err(ConfigError::MissingApiKey)));
}

#[tokio::test]
async fn test_server_builds_from_valid_config() {
    let config = DaytonaMcpConfig::from_lookup(|key| match key {
        "DAYTONA_API_KEY" => Some("dtn_test".to_string()),
        "DAYTONA_SERVER_URL" => Some("https://app.daytona.io/api".to_string()),
        "DAYTONA_MCP_TRANSPORT" => Some("http".to_string()),
        _ => None,
    })
    .expect("valid config");

    let server = DaytonaServer::new(config).expect("server");
    assert!(server.config().transport_mode.http_enabled());
    let _router = daytona_mcp::http::build_router(server);
}

fn live_clients() -> Option<(SandboxClient, ToolboxClient)> {
    let config = match DaytonaMcpConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Skipping test: {e}");
            return None;
        }
    };
    let http = HttpClient::new(config.client).expect("HTTP client");
    Some((SandboxClient::new(http.clone()), ToolboxClient::new(http)))
}

/// Test full sandbox lifecycle: create -> running -> exec -> files -> remove
#[tokio::test]
#[ignore = "requires a Daytona server and API key"]
async fn test_sandbox_lifecycle() {
    let Some((sandboxes, toolbox)) = live_clients() else {
        return;
    };

    let sandbox = sandboxes
        .create(TEST_REPOSITORY)
        .await
        .expect("Failed to create sandbox");
    let id = sandbox.id.clone();

    // Wait for the sandbox to come up
    let mut state = sandbox.state;
    for _ in 0..60 {
        if state == SandboxState::Running {
            break;
        }
        tokio::time::sleep(Duration::from_secs(2)).await;
        state = sandboxes.get_info(&id).await.expect("get_info").state;
    }
    assert_eq!(state, SandboxState::Running);

    let listed = sandboxes.list().await.expect("list");
    assert!(listed.iter().any(|s| s.id == id));

    let result = toolbox
        .execute_command(&id, "echo hello")
        .await
        .expect("execute_command");
    assert_eq!(result.exit_code, 0);
    assert!(result.stdout.contains("hello"));

    let result = toolbox
        .execute_command(&id, "sh -c 'exit 3'")
        .await
        .expect("execute_command");
    assert_eq!(result.exit_code, 3);

    toolbox
        .write_file(&id, "/tmp/daytona-mcp.txt", "round trip")
        .await
        .expect("write_file");
    let content = toolbox
        .read_file(&id, "/tmp/daytona-mcp.txt")
        .await
        .expect("read_file");
    assert_eq!(&content[..], b"round trip");

    let entries = toolbox.list_files(&id, "/tmp").await.expect("list_files");
    assert!(entries.iter().any(|e| e.path.ends_with("daytona-mcp.txt")));

    sandboxes.remove(&id).await.expect("Failed to remove sandbox");
}
