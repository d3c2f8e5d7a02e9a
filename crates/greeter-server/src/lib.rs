//! # greeter-server
//!
//! MCP (Model Context Protocol) server for the greeter capabilities.
//! Supports stdio, streamable HTTP and HTTP/SSE transports.

pub mod config;
pub mod error;
pub mod greeter;
pub mod protocol;
mod server;
pub mod transport;

pub use config::{NetworkMode, ServerConfig, TransportMode, TransportPlan};
pub use error::{Result, ServerError};
pub use protocol::{McpError, McpMessage, RequestHandler, ServerCapabilities};
pub use server::{McpServer, TransportState};
pub use transport::{HttpTransport, SseTransport, StdioTransport};
