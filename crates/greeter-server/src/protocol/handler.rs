//! MCP request handler

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info, warn};

use super::capabilities::ServerCapabilities;
use super::types::*;
use greeter_core::{CapabilityError, CapabilityRegistry};

/// Handler for MCP requests
///
/// Stateless: every transport shares one handler over the read-only registry.
pub struct RequestHandler {
    /// Capabilities served
    registry: Arc<CapabilityRegistry>,
    /// Server name
    server_name: String,
    /// Server version
    server_version: String,
}

impl RequestHandler {
    /// Create a new request handler
    pub fn new(registry: Arc<CapabilityRegistry>, server_name: impl Into<String>) -> Self {
        Self {
            registry,
            server_name: server_name.into(),
            server_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// Parse one raw frame and handle it
    ///
    /// Malformed JSON yields a parse error response rather than an `Err`,
    /// so transports can always reply on the same channel.
    pub async fn handle_raw(&self, raw: &str) -> Option<McpMessage> {
        match serde_json::from_str::<McpMessage>(raw) {
            Ok(message) => self.handle(message).await,
            Err(e) => {
                warn!("Failed to parse message: {}", e);
                Some(McpMessage::error_response(
                    None,
                    McpError::parse_error().with_data(Value::String(e.to_string())),
                ))
            }
        }
    }

    /// Handle an incoming message
    pub async fn handle(&self, message: McpMessage) -> Option<McpMessage> {
        if message.jsonrpc != JSONRPC_VERSION {
            return Some(McpMessage::error_response(
                message.id,
                McpError::invalid_request(),
            ));
        }

        match (message.method.as_deref(), message.id.clone()) {
            (Some(method), Some(id)) => {
                debug!("Handling request: {}", method);

                let result = match method {
                    "initialize" => self.handle_initialize(message.params),
                    "ping" => Ok(serde_json::json!({})),
                    "tools/list" => self.handle_tools_list(),
                    "tools/call" => self.handle_tools_call(message.params),
                    "prompts/list" => self.handle_prompts_list(),
                    "prompts/get" => self.handle_prompts_get(message.params),
                    "resources/list" => self.handle_resources_list(),
                    "resources/read" => self.handle_resources_read(message.params),
                    _ => Err(McpError::method_not_found()),
                };

                Some(match result {
                    Ok(result) => McpMessage::response(id, result),
                    Err(error) => McpMessage::error_response(Some(id), error),
                })
            }
            (Some(method), None) => {
                match method {
                    "notifications/initialized" | "initialized" => {
                        info!("Client initialized");
                    }
                    "notifications/cancelled" => {
                        debug!("Request cancelled");
                    }
                    _ => {
                        debug!("Unknown notification: {}", method);
                    }
                }
                None
            }
            (None, _) => {
                // Responses - a server never asked anything, so nothing to match them to
                debug!("Received unexpected response");
                None
            }
        }
    }

    /// Handle initialize request
    fn handle_initialize(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: InitializeParams = parse_params(params)?;

        info!(
            "Initializing session with client: {} v{} (protocol {})",
            params.client_info.name, params.client_info.version, params.protocol_version
        );

        to_result(InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities::from_registry(&self.registry),
            server_info: ServerInfo {
                name: self.server_name.clone(),
                version: self.server_version.clone(),
            },
        })
    }

    /// Handle tools/list request
    fn handle_tools_list(&self) -> Result<Value, McpError> {
        to_result(ToolsListResult {
            tools: self.registry.tools().into_iter().cloned().collect(),
        })
    }

    /// Handle tools/call request
    fn handle_tools_call(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ToolCallParams = parse_params(params)?;

        debug!("Calling tool: {}", params.name);

        match self.registry.call_tool(&params.name, params.arguments) {
            Ok(output) => to_result(ToolCallResult::from(output)),
            Err(CapabilityError::HandlerFailed(message)) => {
                warn!("Tool {} failed: {}", params.name, message);
                to_result(ToolCallResult::error(message))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Handle prompts/list request
    fn handle_prompts_list(&self) -> Result<Value, McpError> {
        to_result(PromptsListResult {
            prompts: self.registry.prompts().into_iter().cloned().collect(),
        })
    }

    /// Handle prompts/get request
    fn handle_prompts_get(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: PromptGetParams = parse_params(params)?;

        debug!("Getting prompt: {}", params.name);

        let output = self.registry.get_prompt(&params.name, &params.arguments)?;
        to_result(PromptGetResult::from(output))
    }

    /// Handle resources/list request
    fn handle_resources_list(&self) -> Result<Value, McpError> {
        to_result(ResourcesListResult {
            resources: self.registry.resources().into_iter().cloned().collect(),
        })
    }

    /// Handle resources/read request
    fn handle_resources_read(&self, params: Option<Value>) -> Result<Value, McpError> {
        let params: ResourceReadParams = parse_params(params)?;

        debug!("Reading resource: {}", params.uri);

        let contents = self.registry.read_resource(&params.uri)?;
        to_result(ResourceReadResult {
            contents: vec![contents],
        })
    }
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, McpError> {
    params
        .map(serde_json::from_value)
        .transpose()
        .map_err(|e| McpError::invalid_params(e.to_string()))?
        .ok_or_else(|| McpError::invalid_params("Missing params"))
}

fn to_result<T: Serialize>(result: T) -> Result<Value, McpError> {
    serde_json::to_value(result).map_err(|e| McpError::internal_error(e.to_string()))
}
