//! Tool bridge seam and tool-related value objects.
//!
//! Tools live in an external peer process; quill never executes anything
//! locally. The bridge exposes exactly two operations: discover what the
//! peer offers, and forward one named call to it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BridgeError;

/// A tool exposed by the external peer: name, description, and the JSON
/// Schema of its input. Unique by name within a session; read-only once
/// discovered (refreshed only by reconnecting).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,

    #[serde(default)]
    pub description: String,

    /// JSON Schema for the tool's arguments
    pub input_schema: serde_json::Value,
}

/// A completed tool invocation, as recorded in the session's action log.
/// Immutable once appended; the log is append-only and ordered exactly as
/// invocations executed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Name of the invoked tool
    pub tool: String,

    /// The arguments the decision service requested
    pub input: serde_json::Value,

    /// The peer's result payload, or an `{"error": ...}` object when the
    /// call failed
    pub result: serde_json::Value,
}

/// The tool-peer seam.
///
/// Both operations fail with [`BridgeError::NotConnected`] before a
/// successful connect. Peer-reported failures propagate verbatim as
/// [`BridgeError::Invocation`] — no retry, no interpretation.
#[async_trait]
pub trait ToolBridge: Send + Sync {
    /// The tools the peer offers.
    async fn discover_tools(&self) -> Result<Vec<ToolDescriptor>, BridgeError>;

    /// Forward one named call with structured arguments to the peer and
    /// return its structured result unmodified.
    async fn invoke(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, BridgeError>;
}
