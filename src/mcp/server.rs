use super::protocol::{error_response, success_response, Incoming, Protocol};
use super::types::*;
use crate::handlers::tool_handlers::ToolHandlers;
use crate::map::CodebaseMapper;
use anyhow::Result;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::io::{AsyncBufRead, AsyncWrite};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "codebase-map";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Main MCP Server
pub struct McpServer {
    tool_handlers: ToolHandlers,
}

impl McpServer {
    pub fn new(mapper: Arc<CodebaseMapper>) -> Self {
        Self {
            tool_handlers: ToolHandlers::new(mapper),
        }
    }

    /// Serve over stdin/stdout until the client disconnects
    pub async fn start(self) -> Result<()> {
        self.serve(Protocol::stdio()).await
    }

    pub async fn serve<R, W>(&self, mut protocol: Protocol<R, W>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        tracing::info!("MCP server started, waiting for requests...");

        loop {
            let response = match protocol.read_request().await? {
                Incoming::Closed => {
                    tracing::info!("Client disconnected");
                    break;
                }
                Incoming::Malformed(e) => {
                    tracing::error!("Failed to parse request: {}", e);
                    Some(error_response(Value::Null, JsonRpcError::parse_error()))
                }
                Incoming::Request(request) => self.handle_request(request).await,
            };

            if let Some(response) = response {
                if let Err(e) = protocol.send_response(&response).await {
                    tracing::error!("Failed to send response: {}", e);
                }
            }
        }

        Ok(())
    }

    /// Notifications get no response
    async fn handle_request(&self, request: JsonRpcRequest) -> Option<JsonRpcResponse> {
        tracing::debug!("Received request: method={}, id={:?}", request.method, request.id);

        if request.is_notification() {
            return None;
        }
        let id = request.id.unwrap_or(Value::Null);

        Some(match request.method.as_str() {
            "initialize" => self.handle_initialize(id, request.params),
            "ping" => success_response(id, json!({})),
            "tools/list" => self.handle_tools_list(id),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            method => error_response(id, JsonRpcError::method_not_found(method)),
        })
    }

    fn handle_initialize(&self, id: Value, params: Value) -> JsonRpcResponse {
        // Clients vary in how much they send, so a partial request is accepted
        let request: InitializeRequest = serde_json::from_value(params).unwrap_or_default();
        if let Some(client) = &request.client_info {
            tracing::info!("Client connected: {} v{}", client.name, client.version);
        }
        if let Some(version) = &request.protocol_version {
            if version != PROTOCOL_VERSION {
                tracing::info!(
                    "Client requested protocol {}, answering with {}",
                    version,
                    PROTOCOL_VERSION
                );
            }
        }

        let response = InitializeResponse {
            protocol_version: PROTOCOL_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
            server_info: ServerInfo {
                name: SERVER_NAME.to_string(),
                version: SERVER_VERSION.to_string(),
            },
        };

        success_response(id, response)
    }

    fn handle_tools_list(&self, id: Value) -> JsonRpcResponse {
        let tools = vec![Tool {
            name: "map_codebase".to_string(),
            description: r#"Generate a compressed map of a codebase: functions, types, classes, interfaces, methods and constants with their line numbers, without the full source.

Use this to understand the shape of a project in a fraction of the tokens its source would need.

- `format`: "markdown" (default), "json" or "summary".
- `compact`: hide nested symbols such as interface methods (markdown only).
- Dependency, build and hidden directories and .gitignore'd paths are skipped."#
                .to_string(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "path": {
                        "type": "string",
                        "description": "Directory to map. Relative paths resolve against the server's working directory."
                    },
                    "format": {
                        "type": "string",
                        "enum": ["markdown", "md", "json", "summary"],
                        "default": "markdown"
                    },
                    "compact": {
                        "type": "boolean",
                        "default": false
                    },
                    "include": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Only map files matching one of these globs or substrings"
                    },
                    "exclude": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Skip files matching any of these globs or substrings"
                    },
                    "max_files": {
                        "type": "integer",
                        "minimum": 0,
                        "description": "Stop after this many files (0 = no limit)"
                    }
                },
                "required": ["path"]
            }),
        }];

        success_response(id, ListToolsResponse { tools })
    }

    async fn handle_tools_call(&self, id: Value, params: Value) -> JsonRpcResponse {
        let call_request: CallToolRequest = match serde_json::from_value(params) {
            Ok(req) => req,
            Err(e) => {
                return error_response(
                    id,
                    JsonRpcError::invalid_params(format!("Invalid params: {}", e)),
                );
            }
        };

        let result = match call_request.name.as_str() {
            "map_codebase" => {
                self.tool_handlers
                    .handle_map_codebase(&call_request.arguments)
                    .await
            }
            name => {
                return error_response(
                    id,
                    JsonRpcError::invalid_params(format!("Unknown tool: {}", name)),
                );
            }
        };

        let response = match result {
            Ok(content) => CallToolResponse {
                content,
                is_error: None,
            },
            Err(e) => {
                tracing::warn!("map_codebase failed: {:#}", e);
                CallToolResponse {
                    content: vec![Content::text(format!("Error: {:#}", e))],
                    is_error: Some(true),
                }
            }
        };
        success_response(id, response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    async fn exchange(lines: &[Value]) -> Vec<Value> {
        let input: String = lines.iter().map(|l| format!("{}\n", l)).collect();
        let server = McpServer::new(Arc::new(CodebaseMapper::default()));
        let mut output = Vec::new();

        server
            .serve(Protocol::new(input.as_bytes(), &mut output))
            .await
            .unwrap();

        String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect()
    }

    #[tokio::test]
    async fn test_initialize_and_list_tools() {
        let responses = exchange(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {
                "protocolVersion": PROTOCOL_VERSION,
                "capabilities": {},
                "clientInfo": {"name": "test", "version": "1.0"}
            }}),
            json!({"jsonrpc": "2.0", "method": "notifications/initialized"}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/list"}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "resources/list"}),
        ])
        .await;

        assert_eq!(responses.len(), 3);
        assert_eq!(responses[0]["result"]["serverInfo"]["name"], SERVER_NAME);
        assert_eq!(responses[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
        assert_eq!(responses[1]["result"]["tools"][0]["name"], "map_codebase");
        assert!(responses[1]["result"]["tools"][0]["inputSchema"].is_object());
        assert_eq!(responses[2]["error"]["code"], -32601);
    }

    #[tokio::test]
    async fn test_initialize_answers_with_server_protocol() {
        let params = json!({
            "protocolVersion": "2025-03-26",
            "clientInfo": {"name": "newer-client", "version": "2.0"}
        });
        let request: InitializeRequest = serde_json::from_value(params.clone()).unwrap();
        assert_eq!(request.protocol_version.as_deref(), Some("2025-03-26"));

        let responses = exchange(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": params}),
        ])
        .await;
        assert_eq!(responses[0]["result"]["protocolVersion"], PROTOCOL_VERSION);
    }

    #[tokio::test]
    async fn test_tools_call_map_codebase() {
        let tmp = tempdir().unwrap();
        fs::write(tmp.path().join("main.go"), "package main\n\nfunc main() {}\n").unwrap();

        let responses = exchange(&[
            json!({"jsonrpc": "2.0", "id": 1, "method": "tools/call", "params": {
                "name": "map_codebase",
                "arguments": {"path": tmp.path().to_string_lossy(), "format": "json"}
            }}),
            json!({"jsonrpc": "2.0", "id": 2, "method": "tools/call", "params": {
                "name": "map_codebase",
                "arguments": {"path": tmp.path().join("missing").to_string_lossy()}
            }}),
            json!({"jsonrpc": "2.0", "id": 3, "method": "tools/call", "params": {
                "name": "search_code",
                "arguments": {}
            }}),
        ])
        .await;

        let text = responses[0]["result"]["content"][0]["text"].as_str().unwrap();
        let map: Value = serde_json::from_str(text).unwrap();
        assert_eq!(map["files"][0]["symbols"][0]["signature"], "main()");
        assert!(responses[0]["result"].get("isError").is_none());

        assert_eq!(responses[1]["result"]["isError"], true);
        assert_eq!(responses[2]["error"]["code"], -32602);
    }

    #[tokio::test]
    async fn test_malformed_line_gets_parse_error() {
        let server = McpServer::new(Arc::new(CodebaseMapper::default()));
        let mut output = Vec::new();
        server
            .serve(Protocol::new(&b"{oops\n"[..], &mut output))
            .await
            .unwrap();

        let response: Value = serde_json::from_slice(&output[..output.len() - 1]).unwrap();
        assert_eq!(response["error"]["code"], -32700);
        assert!(response["id"].is_null());
    }
}
