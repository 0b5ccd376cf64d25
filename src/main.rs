//! Topz OData MCP Server
//!
//! Entry point for the MCP server binary.
//! Implements MCP protocol over stdio using JSON-RPC 2.0.

use std::sync::Arc;
use topz_odata_mcp::config::Config;
use topz_odata_mcp::mcp::{self, TopzMcpServer};
use topz_odata_mcp::odata::ODataClient;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging to stderr (MCP uses stdout for protocol)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Configured for {}", config.base_url);

    let client = Arc::new(ODataClient::new(&config)?);
    let server = TopzMcpServer::new(client);

    tracing::info!("MCP Server ready, listening on stdio...");

    mcp::serve(&server, tokio::io::stdin(), tokio::io::stdout()).await?;
    Ok(())
}
