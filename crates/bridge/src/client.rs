//! The MCP bridge client: subprocess lifecycle plus request/response
//! plumbing over the child's stdin/stdout.

use std::process::Stdio;

use async_trait::async_trait;
use quill_config::BridgeConfig;
use quill_core::error::BridgeError;
use quill_core::tool::{ToolBridge, ToolDescriptor};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;
use tracing::{debug, trace, warn};

use crate::protocol::{
    CallToolResult, JsonRpcError, JsonRpcNotification, JsonRpcRequest, JsonRpcResponse,
    ListToolsResult, PROTOCOL_VERSION,
};

/// Build the exact environment handed to the tool peer: the allow-listed
/// ambient variables, the configured literals, and the sheet identifier.
/// Nothing else from the parent environment ever reaches the child.
pub fn child_env(config: &BridgeConfig) -> Vec<(String, String)> {
    let mut env = Vec::new();

    for key in &config.pass_env {
        if let Ok(value) = std::env::var(key) {
            env.push((key.clone(), value));
        }
    }

    for (key, value) in &config.env {
        env.push((key.clone(), value.clone()));
    }

    if let Some(sheet_id) = &config.sheet_id {
        env.push(("SHEET_ID".to_string(), sheet_id.clone()));
    }

    env
}

/// An active session with the tool peer.
struct Connection {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,
    /// Descriptors cached at connect time; read-only until reconnect.
    tools: Vec<ToolDescriptor>,
}

impl Connection {
    /// Send one request and wait for the matching response. Frames with a
    /// different id, notifications, and server-initiated requests are
    /// skipped. Returns the peer's own error object unmapped so callers
    /// can attach context.
    async fn request(
        &mut self,
        method: &str,
        params: Option<Value>,
    ) -> Result<Result<Value, JsonRpcError>, BridgeError> {
        let id = self.next_id;
        self.next_id += 1;

        let frame = serde_json::to_string(&JsonRpcRequest::new(id, method, params))
            .map_err(|e| BridgeError::Protocol(e.to_string()))?;

        self.stdin
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        self.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;

        loop {
            let line = self
                .stdout
                .next_line()
                .await
                .map_err(|e| BridgeError::Transport(e.to_string()))?
                .ok_or_else(|| BridgeError::Transport("tool peer closed its stdout".into()))?;

            if line.trim().is_empty() {
                continue;
            }

            let response: JsonRpcResponse = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    trace!(error = %e, line = %line, "Skipping unparseable frame from peer");
                    continue;
                }
            };

            // Notifications and requests from the peer carry a method;
            // responses to someone else carry a different id.
            if response.method.is_some() || response.id != Some(id) {
                trace!(method = ?response.method, id = ?response.id, "Skipping non-matching frame");
                continue;
            }

            if let Some(error) = response.error {
                return Ok(Err(error));
            }

            let result = response
                .result
                .ok_or_else(|| BridgeError::Protocol(format!("no result for '{method}'")))?;
            return Ok(Ok(result));
        }
    }

    /// Send a notification (no reply expected).
    async fn notify(&mut self, method: &str) -> Result<(), BridgeError> {
        let frame = serde_json::to_string(&JsonRpcNotification::new(method))
            .map_err(|e| BridgeError::Protocol(e.to_string()))?;

        self.stdin
            .write_all(frame.as_bytes())
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        self.stdin
            .write_all(b"\n")
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))?;
        self.stdin
            .flush()
            .await
            .map_err(|e| BridgeError::Transport(e.to_string()))
    }
}

/// MCP client over a stdio subprocess.
///
/// Connection state is instance state — two bridges never share a child, so
/// tests can run side by side. The connection mutex also serializes
/// requests: the transport carries at most one in-flight call per bridge.
pub struct McpBridge {
    connection: Mutex<Option<Connection>>,
}

impl McpBridge {
    pub fn new() -> Self {
        Self {
            connection: Mutex::new(None),
        }
    }

    /// Spawn the tool peer and perform the MCP handshake.
    ///
    /// The child receives only the explicit environment from
    /// [`child_env`]. On success the peer's tool descriptors are cached
    /// for the lifetime of the connection.
    pub async fn connect(&self, config: &BridgeConfig) -> Result<(), BridgeError> {
        let command = config
            .command
            .as_deref()
            .ok_or_else(|| BridgeError::Connection("no tool peer command configured".into()))?;

        let mut guard = self.connection.lock().await;
        if let Some(old) = guard.take() {
            warn!("Reconnecting bridge; tearing down previous tool peer");
            teardown(old);
        }

        debug!(command, "Spawning tool peer");

        let mut child = Command::new(command)
            .args(&config.args)
            .env_clear()
            .envs(child_env(config))
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| BridgeError::Connection(format!("failed to spawn '{command}': {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| BridgeError::Connection("tool peer has no stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| BridgeError::Connection("tool peer has no stdout".into()))?;

        let mut connection = Connection {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            tools: Vec::new(),
        };

        // MCP handshake: initialize, then the initialized notification.
        let init_params = json!({
            "protocolVersion": PROTOCOL_VERSION,
            "capabilities": {},
            "clientInfo": {
                "name": "quill",
                "version": env!("CARGO_PKG_VERSION"),
            }
        });

        match connection.request("initialize", Some(init_params)).await {
            Ok(Ok(result)) => {
                trace!(server_info = ?result.get("serverInfo"), "Handshake complete");
            }
            Ok(Err(error)) => {
                teardown(connection);
                return Err(BridgeError::Connection(format!(
                    "initialize rejected: [{}] {}",
                    error.code, error.message
                )));
            }
            Err(e) => {
                teardown(connection);
                return Err(BridgeError::Connection(format!("handshake failed: {e}")));
            }
        }

        if let Err(e) = connection.notify("notifications/initialized").await {
            teardown(connection);
            return Err(BridgeError::Connection(format!("handshake failed: {e}")));
        }

        // Discover tools once per connection.
        let tools: Vec<ToolDescriptor> = match connection.request("tools/list", None).await {
            Ok(Ok(result)) => {
                let list: ListToolsResult = serde_json::from_value(result)
                    .map_err(|e| BridgeError::Protocol(format!("bad tools/list result: {e}")))?;
                list.tools
                    .into_iter()
                    .map(|t| ToolDescriptor {
                        name: t.name,
                        description: t.description.unwrap_or_default(),
                        input_schema: t.input_schema.unwrap_or_else(|| json!({"type": "object"})),
                    })
                    .collect()
            }
            Ok(Err(error)) => {
                teardown(connection);
                return Err(BridgeError::Connection(format!(
                    "tools/list rejected: [{}] {}",
                    error.code, error.message
                )));
            }
            Err(e) => {
                teardown(connection);
                return Err(BridgeError::Connection(format!("tools/list failed: {e}")));
            }
        };

        debug!(tool_count = tools.len(), "Tool peer connected");
        connection.tools = tools;
        *guard = Some(connection);
        Ok(())
    }

    /// Tear the session down. Safe to call when not connected.
    pub async fn disconnect(&self) {
        let mut guard = self.connection.lock().await;
        if let Some(connection) = guard.take() {
            debug!("Disconnecting tool peer");
            teardown(connection);
        }
    }

    /// Whether a connection is currently established.
    pub async fn is_connected(&self) -> bool {
        self.connection.lock().await.is_some()
    }
}

impl Default for McpBridge {
    fn default() -> Self {
        Self::new()
    }
}

fn teardown(mut connection: Connection) {
    if let Err(e) = connection.child.start_kill() {
        trace!(error = %e, "Tool peer already gone");
    }
}

#[async_trait]
impl ToolBridge for McpBridge {
    async fn discover_tools(&self) -> Result<Vec<ToolDescriptor>, BridgeError> {
        let guard = self.connection.lock().await;
        let connection = guard.as_ref().ok_or(BridgeError::NotConnected)?;
        Ok(connection.tools.clone())
    }

    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, BridgeError> {
        let mut guard = self.connection.lock().await;
        let connection = guard.as_mut().ok_or(BridgeError::NotConnected)?;

        let params = json!({
            "name": name,
            "arguments": arguments,
        });

        match connection.request("tools/call", Some(params)).await? {
            Ok(result) => {
                let call_result: CallToolResult = serde_json::from_value(result)
                    .map_err(|e| BridgeError::Protocol(format!("bad tools/call result: {e}")))?;

                if call_result.is_error == Some(true) {
                    let message = match call_result.into_value() {
                        Value::String(s) => s,
                        other => other.to_string(),
                    };
                    return Err(BridgeError::Invocation {
                        tool: name.to_string(),
                        message,
                    });
                }

                Ok(call_result.into_value())
            }
            Err(error) => Err(BridgeError::Invocation {
                tool: name.to_string(),
                message: format!("[{}] {}", error.code, error.message),
            }),
        }
    }
}
