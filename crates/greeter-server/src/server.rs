//! Main MCP server orchestration

use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{error, info};

use crate::config::{NetworkMode, TransportMode, TransportPlan};
use crate::error::{Result, ServerError};
use crate::protocol::RequestHandler;
use crate::transport::{HttpTransport, SseTransport, StdioTransport};
use greeter_core::CapabilityRegistry;

/// Lifecycle of the server's transports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportState {
    Unstarted,
    Running(Vec<TransportMode>),
    Stopped,
}

/// MCP server
pub struct McpServer {
    handler: Arc<RequestHandler>,
    plan: TransportPlan,
    state: watch::Sender<TransportState>,
}

impl McpServer {
    /// Create a new MCP server over a populated registry
    pub fn new(registry: Arc<CapabilityRegistry>, server_name: &str, plan: TransportPlan) -> Self {
        let (state, _) = watch::channel(TransportState::Unstarted);
        Self {
            handler: Arc::new(RequestHandler::new(registry, server_name)),
            plan,
            state,
        }
    }

    /// The plan this server runs
    pub fn plan(&self) -> &TransportPlan {
        &self.plan
    }

    /// Observe state changes
    pub fn subscribe_state(&self) -> watch::Receiver<TransportState> {
        self.state.subscribe()
    }

    /// Run the server
    ///
    /// stdio returns `Ok` once stdin closes. Network transports serve until
    /// one of them fails; that first failure stops the rest and is returned.
    pub async fn run(&self) -> Result<()> {
        self.run_with_io(tokio::io::stdin(), tokio::io::stdout()).await
    }

    /// Run the server, with `reader` and `writer` standing in for stdin/stdout
    ///
    /// The streams are only used by a stdio plan.
    pub async fn run_with_io<R, W>(&self, reader: R, writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let result = match &self.plan {
            TransportPlan::Stdio => {
                info!("Starting MCP server in stdio mode");
                self.state
                    .send_replace(TransportState::Running(vec![TransportMode::Stdio]));
                StdioTransport::new(self.handler.clone())
                    .serve(reader, writer)
                    .await
            }
            TransportPlan::Network { .. } => self.run_network().await,
        };

        self.state.send_replace(TransportState::Stopped);
        result
    }

    async fn run_network(&self) -> Result<()> {
        let listeners = self.plan.listeners();
        if listeners.is_empty() {
            return Err(ServerError::NoTransport);
        }

        let mut tasks = JoinSet::new();
        let mut modes = Vec::with_capacity(listeners.len());

        for (mode, addr) in listeners {
            let handler = self.handler.clone();
            let addr = addr.to_string();
            modes.push(TransportMode::from(mode));

            tasks.spawn(async move {
                let result = match mode {
                    NetworkMode::Http => HttpTransport::new(handler, addr).run().await,
                    NetworkMode::Sse => SseTransport::new(handler, addr).run().await,
                };
                (mode, result)
            });
        }

        info!("If you want to use stdin/stdout, pass the --stdio flag");
        self.state.send_replace(TransportState::Running(modes));

        let first = tasks.join_next().await;

        // Fail fast: whatever ended first takes the siblings down with it
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}

        match first {
            Some(Ok((_, Err(e)))) => {
                error!("Transport failed: {}", e);
                Err(e)
            }
            Some(Ok((mode, Ok(())))) => Err(ServerError::TransportStopped(mode.as_str())),
            Some(Err(join_error)) => {
                error!("Transport task failed: {}", join_error);
                Err(ServerError::TransportPanicked("network"))
            }
            None => Err(ServerError::NoTransport),
        }
    }
}
