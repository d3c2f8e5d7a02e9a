//! Error types for the server

use thiserror::Error;

use greeter_core::CapabilityError;

/// Result type alias for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server error types
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("{transport} transport failed at {addr}: {source}")]
    Transport {
        transport: &'static str,
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0} transport stopped unexpectedly")]
    TransportStopped(&'static str),

    #[error("{0} transport panicked")]
    TransportPanicked(&'static str),

    #[error("No transport configured - set an HTTP or SSE address, or pass --stdio")]
    NoTransport,

    #[error("Capability error: {0}")]
    Capability(#[from] CapabilityError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ServerError {
    pub(crate) fn transport(transport: &'static str, addr: &str, source: std::io::Error) -> Self {
        ServerError::Transport {
            transport,
            addr: addr.to_string(),
            source,
        }
    }
}
