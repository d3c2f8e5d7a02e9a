//! HTTP + Server-Sent Events transport for MCP
//!
//! `GET /sse` opens an event stream whose first event, `endpoint`, names the
//! URL to POST messages to. Responses to those POSTs arrive on the stream
//! as `message` events.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse, Response,
    },
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, RwLock};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{Result, ServerError};
use crate::protocol::{McpMessage, RequestHandler};

const TRANSPORT: &str = "SSE";

/// Path clients POST messages to
const MESSAGE_PATH: &str = "/message";

/// Outgoing messages buffered per session
const SESSION_BUFFER: usize = 32;

type Sessions = Arc<RwLock<HashMap<Uuid, mpsc::Sender<McpMessage>>>>;

/// Shared state for SSE handlers
#[derive(Clone)]
struct AppState {
    handler: Arc<RequestHandler>,
    sessions: Sessions,
}

/// SSE transport for MCP protocol
pub struct SseTransport {
    handler: Arc<RequestHandler>,
    addr: String,
}

impl SseTransport {
    /// Create a new SSE transport
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

        info!("MCP SSE handler listening at {}", self.addr);
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

/// Routes for the SSE transport
pub fn router(handler: Arc<RequestHandler>) -> Router {
    let state = AppState {
        handler,
        sessions: Arc::new(RwLock::new(HashMap::new())),
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_sse))
        .route("/sse", get(handle_sse))
        .route(MESSAGE_PATH, post(handle_message))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Removes the session once its event stream is dropped
struct SessionGuard {
    id: Uuid,
    sessions: Sessions,
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        let id = self.id;
        let sessions = self.sessions.clone();
        if let Ok(runtime) = tokio::runtime::Handle::try_current() {
            runtime.spawn(async move {
                sessions.write().await.remove(&id);
                info!("SSE session {} closed", id);
            });
        }
    }
}

/// Open an event stream for a new session
async fn handle_sse(
    State(state): State<AppState>,
) -> Sse<impl Stream<Item = std::result::Result<Event, Infallible>>> {
    let id = Uuid::new_v4();
    let (tx, mut rx) = mpsc::channel::<McpMessage>(SESSION_BUFFER);
    state.sessions.write().await.insert(id, tx);

    info!("SSE session {} established", id);

    let guard = SessionGuard {
        id,
        sessions: state.sessions.clone(),
    };

    let stream = async_stream::stream! {
        let _guard = guard;

        yield Ok(Event::default()
            .event("endpoint")
            .data(format!("{}?sessionId={}", MESSAGE_PATH, id)));

        while let Some(message) = rx.recv().await {
            match serde_json::to_string(&message) {
                Ok(data) => yield Ok(Event::default().event("message").data(data)),
                Err(e) => warn!("Failed to encode SSE message: {}", e),
            }
        }
    };

    Sse::new(stream).keep_alive(KeepAlive::default())
}

#[derive(Debug, Deserialize)]
struct MessageQuery {
    #[serde(rename = "sessionId")]
    session_id: Option<String>,
}

/// Accept a JSON-RPC message for an open session
async fn handle_message(
    State(state): State<AppState>,
    Query(query): Query<MessageQuery>,
    body: String,
) -> Response {
    let Some(raw_id) = query.session_id else {
        return (StatusCode::BAD_REQUEST, "missing sessionId").into_response();
    };
    let Ok(id) = Uuid::parse_str(&raw_id) else {
        return (StatusCode::BAD_REQUEST, "invalid sessionId").into_response();
    };

    let sender = state.sessions.read().await.get(&id).cloned();
    let Some(sender) = sender else {
        return (StatusCode::NOT_FOUND, "unknown session").into_response();
    };

    let message: McpMessage = match serde_json::from_str(&body) {
        Ok(message) => message,
        Err(e) => {
            warn!("Failed to parse SSE message: {}", e);
            return (StatusCode::BAD_REQUEST, format!("invalid message: {}", e)).into_response();
        }
    };

    debug!("SSE session {} request: {:?}", id, message.method);

    if let Some(response) = state.handler.handle(message).await {
        if sender.send(response).await.is_err() {
            state.sessions.write().await.remove(&id);
            return (StatusCode::GONE, "session closed").into_response();
        }
    }

    StatusCode::ACCEPTED.into_response()
}
