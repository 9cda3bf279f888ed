//! Decider trait — the abstraction over the decision service.
//!
//! A Decider takes the session so far plus the available tool descriptors
//! and returns either a final answer (text only) or a batch of
//! tool-invocation requests. The production implementation talks to
//! Anthropic's Messages API; tests substitute scripted fakes.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DeciderError;
use crate::message::{ContentBlock, Message};
use crate::tool::ToolDescriptor;

/// One request to the decision service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    /// The model to use (e.g., "claude-sonnet-4-20250514")
    pub model: String,

    /// The fixed system instruction
    pub system: String,

    /// Maximum tokens to generate
    pub max_tokens: u32,

    /// Temperature (0.0 = deterministic)
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// The session messages, oldest first
    pub messages: Vec<Message>,

    /// Tools the model may request invocations of
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tools: Vec<ToolDescriptor>,
}

fn default_temperature() -> f32 {
    0.7
}

/// The decision service's reply: ordered content segments plus the
/// stop reason reported by the service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    /// Content blocks in the order the service produced them
    pub content: Vec<ContentBlock>,

    /// Why generation stopped (e.g., "end_turn", "tool_use", "max_tokens")
    #[serde(default)]
    pub stop_reason: Option<String>,
}

impl Decision {
    /// The tool-invocation requests in this decision, in order.
    pub fn requested_invocations(&self) -> impl Iterator<Item = &ContentBlock> {
        self.content
            .iter()
            .filter(|b| matches!(b, ContentBlock::ToolUse { .. }))
    }

    /// A decision is terminal when it requests no tool invocations.
    ///
    /// The stop-reason field usually agrees ("tool_use" vs "end_turn") but
    /// is not load-bearing: a reply claiming tool_use with no actual
    /// requests would otherwise wedge the loop.
    pub fn is_terminal(&self) -> bool {
        self.requested_invocations().next().is_none()
    }

    /// All text segments concatenated in order, no separator.
    pub fn joined_text(&self) -> String {
        let mut out = String::new();
        for block in &self.content {
            if let ContentBlock::Text { text } = block {
                out.push_str(text);
            }
        }
        out
    }
}

/// The decision-service seam.
#[async_trait]
pub trait Decider: Send + Sync {
    /// A short name for logging ("anthropic", "mock", ...).
    fn name(&self) -> &str;

    /// Ask the service for the next decision.
    async fn decide(&self, request: DecisionRequest) -> Result<Decision, DeciderError>;
}
