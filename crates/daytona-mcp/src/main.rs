//! Daytona MCP Server entry point.
//!
//! Loads configuration from the environment and serves MCP over stdio,
//! HTTP, or both.
//!
//! ## Transport Modes
//!
//! - **stdio** (default): Only stdio transport
//! - **http**: Only HTTP transport
//! - **both**: Runs stdio + HTTP simultaneously

use daytona_mcp::{http, DaytonaMcpConfig, DaytonaServer, TransportMode};
use rmcp::transport::stdio;
use rmcp::ServiceExt;
use tokio::signal;
use tokio::sync::broadcast;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Logs go to stderr (stdout is MCP transport)
    tracing_subscriber::registry()
        .with(
            EnvFilter::from_default_env()
                .add_directive("daytona_mcp=info".parse()?)
                .add_directive("daytona_core=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    tracing::info!("Starting Daytona MCP Server");

    // Missing credentials stop the process before anything is served
    let config = match DaytonaMcpConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            return Err(e.into());
        }
    };
    tracing::info!(?config, "Configuration loaded");

    let server = DaytonaServer::new(config.clone())?;

    let (shutdown_tx, _) = broadcast::channel::<()>(1);
    let mut handles = Vec::new();

    if config.transport_mode.http_enabled() {
        let http_server = server.clone();
        let http_addr = config.http_addr;
        let mut shutdown_rx = shutdown_tx.subscribe();

        handles.push(tokio::spawn(async move {
            let shutdown = async move {
                let _ = shutdown_rx.recv().await;
            };

            if let Err(e) = http::serve(http_server, http_addr, shutdown).await {
                tracing::error!(error = %e, "HTTP server error");
            }
        }));
        tracing::info!(addr = %config.http_addr, "HTTP transport enabled");
    }

    // Completes when the stdio client disconnects
    let (stdio_done_tx, mut stdio_done_rx) = tokio::sync::oneshot::channel::<()>();

    if config.transport_mode.stdio_enabled() {
        let stdio_server = server.clone();
        let mut shutdown_rx = shutdown_tx.subscribe();

        handles.push(tokio::spawn(async move {
            match stdio_server.serve(stdio()).await {
                Ok(service) => {
                    tokio::select! {
                        result = service.waiting() => {
                            if let Err(e) = result {
                                tracing::error!(error = %e, "Stdio service error");
                            }
                        }
                        _ = shutdown_rx.recv() => {
                            tracing::info!("Stdio transport shutting down");
                        }
                    }
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to start stdio transport");
                }
            }
            let _ = stdio_done_tx.send(());
        }));
        tracing::info!("Stdio transport enabled");
    }

    match config.transport_mode {
        TransportMode::Both => {
            tracing::info!(http_addr = %config.http_addr, "Server ready (stdio + HTTP)");
        }
        TransportMode::Http => {
            tracing::info!(http_addr = %config.http_addr, "Server ready (HTTP only)");
        }
        TransportMode::Stdio => {
            tracing::info!("Server ready (stdio only)");
        }
    }

    let stdio_only = config.transport_mode == TransportMode::Stdio;
    tokio::select! {
        result = signal::ctrl_c() => {
            result?;
            tracing::info!("Received shutdown signal");
        }
        _ = &mut stdio_done_rx, if stdio_only => {
            tracing::info!("Stdio client disconnected");
        }
    }

    // Sandboxes are remote and outlive this process; nothing to clean up
    let _ = shutdown_tx.send(());

    for handle in handles {
        let _ = handle.await;
    }

    tracing::info!("Server shutdown complete");
    Ok(())
}
