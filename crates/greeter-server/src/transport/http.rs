//! Streamable HTTP transport for MCP
//!
//! One JSON-RPC message per POST; requests are answered in the response body.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::error::{Result, ServerError};
use crate::protocol::RequestHandler;

const TRANSPORT: &str = "HTTP";

/// Streamable HTTP transport for MCP protocol
pub struct HttpTransport {
    handler: Arc<RequestHandler>,
    addr: String,
}

impl HttpTransport {
    /// Create a new HTTP transport
    pub fn new(handler: Arc<RequestHandler>, addr: impl Into<String>) -> Self {
        Self {
            handler,
            addr: addr.into(),
        }
    }

    /// Bind the configured address and serve until failure
    pub async fn run(&self) -> Result<()> {
        let listener = TcpListener::bind(&self.addr)
            .await
            .map_err(|e| ServerError::transport(TRANSPORT, &self.addr, e))?;

        info!("MCP handler listening at {}", self.addr);
        self.serve(listener).await
    }

    /// Serve on an already bound listener
    pub async fn serve(&self, listener: TcpListener) -> Result<()> {
        let addr = listener
            .local_addr()
            .map(|addr| addr.to_string())
            .unwrap_or_else(|_| self.addr.clone());

        axum::serve(listener, router(self.handler.clone()))
            .await
            .map_err(|e| ServerError::transport(TRANSPORT, &addr, e))?;

        Err(ServerError::TransportStopped(TRANSPORT))
    }
}

/// Routes for the streamable HTTP transport
pub fn router(handler: Arc<RequestHandler>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", post(handle_mcp_request))
        .route("/mcp", post(handle_mcp_request))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(handler)
}

/// Health check endpoint
async fn health() -> &'static str {
    "OK"
}

/// Handle MCP JSON-RPC message via HTTP POST
async fn handle_mcp_request(State(handler): State<Arc<RequestHandler>>, body: String) -> Response {
    debug!("HTTP request: {}", body);

    match handler.handle_raw(&body).await {
        Some(response) => Json(response).into_response(),
        // Notifications and stray responses have nothing to answer
        None => StatusCode::ACCEPTED.into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greeter::build_registry;
    use serde_json::{json, Value};

    async fn spawn_server() -> String {
        let registry = Arc::new(build_registry().unwrap());
        let handler = Arc::new(RequestHandler::new(registry, "greeter"));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let _ = HttpTransport::new(handler, addr.to_string())
                .serve(listener)
                .await;
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_post_request_gets_json_response() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/mcp", base))
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "prompts/get",
                "params": {"name": "greet", "arguments": {"name": "Ada"}}
            }))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["messages"][0]["content"]["text"], "Say hi to Ada");
    }

    #[tokio::test]
    async fn test_post_notification_is_accepted() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let response = client
            .post(&base)
            .json(&json!({"jsonrpc": "2.0", "method": "notifications/initialized"}))
            .send()
            .await
            .unwrap();

        assert_eq!(response.status(), reqwest::StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_post_malformed_body() {
        let base = spawn_server().await;
        let client = reqwest::Client::new();

        let response = client
            .post(format!("{}/mcp", base))
            .body("{oops")
            .send()
            .await
            .unwrap();

        let body: Value = response.json().await.unwrap();
        assert_eq!(body["error"]["code"], -32700);
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_server().await;
        let body = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .text()
            .await
            .unwrap();
        assert_eq!(body, "OK");
    }
}
