//! # Tenet MCP Server
//!
//! Entry point for the MCP (Model Context Protocol) bridge to Tenet.
//!
//! Reads configuration from environment variables:
//! - `TENET_URL`: Tenet HTTP host URL (default: `http://localhost:8080`)
//! - `TENET_API_KEY`: Optional Bearer token for authentication
//!
//! Talks MCP over stdio and forwards tool calls to the HTTP host.

mod client;
mod server;

use client::TenetClient;
use rmcp::{ServiceExt, transport::stdio};
use server::TenetMcp;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logging to stderr only. stdout is reserved for the MCP transport.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .init();

    let url = std::env::var("TENET_URL").unwrap_or_else(|_| "http://localhost:8080".into());
    let api_key = std::env::var("TENET_API_KEY")
        .ok()
        .filter(|k| !k.is_empty());

    tracing::info!("Tenet MCP server starting, target: {}", url);

    let client = TenetClient::new(url, api_key);
    let mcp = TenetMcp::new(client);

    let service = mcp.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("MCP serve error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
