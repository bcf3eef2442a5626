//! GaaP MCP Server - MCP stdio server for Claude Desktop.
//!
//! Exposes the GaaP compliance and payment tools as MCP tools. Each
//! `tools/call` becomes one HMAC-signed POST to the GaaP API.
//!
//! # Environment Variables
//!
//! - `GAAP_TENANT_ID`, `GAAP_API_KEY`, `GAAP_WEBHOOK_SECRET`: required credentials
//! - `GAAP_MCP_URL`: endpoint override
//! - `GAAP_HTTP_CONFIG`: optional TOML file with HTTP timeouts
//! - `LOG_FORMAT`: `json` or `pretty` (default: `pretty`)
//! - `RUST_LOG`: log level filter (default: `info`)

#![allow(
    clippy::multiple_crate_versions,
    reason = "transitive dependencies from reqwest and axum"
)]

mod observability;
mod server;

use std::process::ExitCode;

use gaap_mcp_bridge::{BridgeConfig, GaapClient, mcp::ToolDispatcher};
use tokio::io::BufReader;
use tracing::{error, info};

use crate::{
    observability::{LogFormat, init_observability},
    server::McpServer,
};

#[tokio::main]
async fn main() -> ExitCode {
    init_observability(LogFormat::from_env());

    let server = match build_server() {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "failed to start GaaP MCP server");
            return ExitCode::FAILURE;
        }
    };

    match server.serve(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await {
        Ok(()) => {
            info!("GaaP MCP server stopped");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(error = %e, "stdio transport failed");
            ExitCode::FAILURE
        }
    }
}

/// Loads configuration and wires the dispatcher.
fn build_server() -> gaap_mcp_bridge::Result<McpServer> {
    let config = BridgeConfig::from_env()?;
    let client = GaapClient::new(&config)?;

    info!(
        endpoint = %config.endpoint,
        tenant_id = %config.credentials.tenant_id(),
        version = env!("CARGO_PKG_VERSION"),
        "GaaP MCP server running on stdio"
    );

    Ok(McpServer::new(ToolDispatcher::new(client, config.credentials.tenant_id())))
}
