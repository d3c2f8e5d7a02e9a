//! Greeter MCP server CLI
//!
//! Serves the greeter tool, prompt and resource over stdio, or over
//! streamable HTTP and SSE at the configured addresses.

use clap::Parser;
use std::sync::Arc;
use tracing::error;

use greeter_server::greeter::{build_registry, SERVER_NAME};
use greeter_server::{McpServer, ServerConfig, ServerError};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::parse();

    // Logs go to stderr so stdio mode keeps stdout for the protocol
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let registry = Arc::new(build_registry().map_err(ServerError::from)?);

    let server = McpServer::new(registry, SERVER_NAME, config.transport_plan());

    if let Err(e) = server.run().await {
        error!("Server exited: {}", e);
        return Err(e.into());
    }

    Ok(())
}
