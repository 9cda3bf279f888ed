//! MCP wire types: JSON-RPC 2.0 framing plus the handful of MCP payloads
//! the bridge speaks (`initialize`, `tools/list`, `tools/call`).

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The MCP protocol revision this client negotiates.
pub const PROTOCOL_VERSION: &str = "2024-11-05";

/// A JSON-RPC request frame.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: &'static str,
    pub id: u64,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcRequest {
    pub fn new(id: u64, method: impl Into<String>, params: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            method: method.into(),
            params,
        }
    }
}

/// A JSON-RPC notification frame (no id, no reply expected).
#[derive(Debug, Serialize)]
pub struct JsonRpcNotification {
    pub jsonrpc: &'static str,
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,
}

impl JsonRpcNotification {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0",
            method: method.into(),
            params: None,
        }
    }
}

/// A JSON-RPC response frame.
///
/// The peer may also write notifications or its own requests to stdout;
/// those frames have no `id` or carry a `method` and are skipped by the
/// reader, so both fields are optional here.
#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse {
    #[allow(dead_code)]
    pub jsonrpc: Option<String>,
    pub id: Option<u64>,
    #[serde(default)]
    pub method: Option<String>,
    pub result: Option<Value>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[allow(dead_code)]
    pub data: Option<Value>,
}

/// Tool information as reported by `tools/list`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct McpTool {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "inputSchema")]
    pub input_schema: Option<Value>,
}

/// `tools/list` result payload.
#[derive(Debug, Deserialize)]
pub struct ListToolsResult {
    pub tools: Vec<McpTool>,
}

/// `tools/call` result payload.
#[derive(Debug, Deserialize)]
pub struct CallToolResult {
    #[serde(default)]
    pub content: Vec<ContentItem>,
    #[serde(rename = "isError")]
    pub is_error: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    pub text: Option<String>,
    #[allow(dead_code)]
    pub data: Option<String>,
    #[serde(rename = "mimeType")]
    #[allow(dead_code)]
    pub mime_type: Option<String>,
}

impl CallToolResult {
    /// Extract the text content items into a single structured value:
    /// joined text, parsed as JSON when possible (MCP servers commonly
    /// return JSON serialized into a text item).
    pub fn into_value(self) -> Value {
        let mut output = String::new();
        for item in self.content {
            if item.content_type == "text" {
                if let Some(text) = item.text {
                    if !output.is_empty() {
                        output.push('\n');
                    }
                    output.push_str(&text);
                }
            }
        }

        match serde_json::from_str::<Value>(&output) {
            Ok(json_value) => json_value,
            Err(_) => Value::String(output),
        }
    }
}
