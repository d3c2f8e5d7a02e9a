//! stdio transport for MCP (newline-delimited JSON-RPC)

use serde_json::Value;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader};
use tracing::{info, warn};

use crate::error::{Result, ServerError};
use crate::protocol::{McpError, McpMessage, RequestHandler};

const TRANSPORT: &str = "stdio";

/// stdio transport for MCP protocol
///
/// Every frame read and written is logged, so traffic can be followed on
/// stderr while stdout carries the protocol.
pub struct StdioTransport {
    handler: Arc<RequestHandler>,
}

impl StdioTransport {
    /// Create a new stdio transport
    pub fn new(handler: Arc<RequestHandler>) -> Self {
        Self { handler }
    }

    /// Serve a byte stream pair (stdin/stdout in production) until the reader reaches EOF
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<()>
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut reader = BufReader::new(reader);
        let mut buffer = Vec::new();

        loop {
            buffer.clear();

            let bytes_read = reader
                .read_until(b'\n', &mut buffer)
                .await
                .map_err(|e| ServerError::transport(TRANSPORT, "stdin", e))?;
            if bytes_read == 0 {
                info!("EOF received, shutting down");
                break;
            }

            let response = match std::str::from_utf8(&buffer) {
                Ok(line) => {
                    let frame = line.trim();
                    if frame.is_empty() {
                        continue;
                    }

                    info!(direction = "read", "{}", frame);
                    self.handler.handle_raw(frame).await
                }
                Err(e) => {
                    warn!("Frame is not valid UTF-8: {}", e);
                    Some(McpMessage::error_response(
                        None,
                        McpError::parse_error().with_data(Value::String(e.to_string())),
                    ))
                }
            };

            if let Some(response) = response {
                let response_line = serde_json::to_string(&response)?;
                info!(direction = "write", "{}", response_line);
                write_frame(&mut writer, &response_line)
                    .await
                    .map_err(|e| ServerError::transport(TRANSPORT, "stdout", e))?;
            }
        }

        Ok(())
    }
}

async fn write_frame<W: AsyncWrite + Unpin>(writer: &mut W, frame: &str) -> std::io::Result<()> {
    writer.write_all(frame.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::greeter::build_registry;
    use serde_json::json;

    fn transport() -> StdioTransport {
        let registry = Arc::new(build_registry().unwrap());
        StdioTransport::new(Arc::new(RequestHandler::new(registry, "greeter")))
    }

    fn responses(output: Vec<u8>) -> Vec<McpMessage> {
        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|line| serde_json::from_str(line).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_serve_answers_each_request() {
        let input = [
            r#"{"jsonrpc":"2.0","id":1,"method":"tools/call","params":{"name":"greet","arguments":{"name":"Ada"}}}"#,
            r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#,
            "",
            r#"{"jsonrpc":"2.0","id":2,"method":"resources/read","params":{"uri":"embedded:info"}}"#,
        ]
        .join("\n");

        let mut output = Vec::new();
        transport()
            .serve(input.as_bytes(), &mut output)
            .await
            .unwrap();

        let responses = responses(output);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].id, Some(json!(1)));
        assert_eq!(responses[0].result.as_ref().unwrap()["content"][0]["text"], "Hi Ada");
        assert_eq!(responses[1].id, Some(json!(2)));
        assert_eq!(
            responses[1].result.as_ref().unwrap()["contents"][0]["text"],
            "This is the hello example server."
        );
    }

    #[tokio::test]
    async fn test_serve_reports_parse_errors_and_continues() {
        let input = "not json\n{\"jsonrpc\":\"2.0\",\"id\":3,\"method\":\"ping\"}\n";

        let mut output = Vec::new();
        transport()
            .serve(input.as_bytes(), &mut output)
            .await
            .unwrap();

        let responses = responses(output);
        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].error.as_ref().unwrap().code, -32700);
        assert_eq!(responses[1].result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_serve_survives_invalid_utf8() {
        let mut input = b"{\"jsonrpc\":\"2.0\",\"id\":1,\"method\":\"ping\",\"x\":\"".to_vec();
        input.push(0xff);
        input.extend_from_slice(b"\"}\n{\"jsonrpc\":\"2.0\",\"id\":2,\"method\":\"ping\"}\n");

        let mut output = Vec::new();
        transport()
            .serve(input.as_slice(), &mut output)
            .await
            .unwrap();

        let responses = responses(output);
        assert_eq!(responses.len(), 2);
        assert!(responses[0].id.is_none());
        assert_eq!(responses[0].error.as_ref().unwrap().code, -32700);
        assert_eq!(responses[1].id, Some(json!(2)));
        assert_eq!(responses[1].result, Some(json!({})));
    }

    #[tokio::test]
    async fn test_serve_empty_input_stops_cleanly() {
        let mut output = Vec::new();
        transport().serve(&b""[..], &mut output).await.unwrap();
        assert!(output.is_empty());
    }
}
