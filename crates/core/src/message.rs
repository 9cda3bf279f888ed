//! Message domain types.
//!
//! A session is an ordered sequence of messages. Each message carries a list
//! of content blocks rather than a flat string because tool-invocation
//! requests and tool results travel *inside* messages, each tagged with a
//! correlation id. The serde representation matches the decision service's
//! wire shape, so these types serialize straight into API requests.

use serde::{Deserialize, Serialize};

/// The role of a message sender in a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// The end user (also carries tool results back to the model)
    User,
    /// The decision-making model
    Assistant,
}

/// One segment of a message's content.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    /// Plain text.
    Text { text: String },

    /// A tool-invocation request from the model.
    ToolUse {
        /// Correlation id; the matching ToolResult must echo it.
        id: String,
        name: String,
        input: serde_json::Value,
    },

    /// The result of a tool invocation, fed back to the model.
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

impl ContentBlock {
    /// Convenience constructor for a text block.
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Convenience constructor for a tool-result block.
    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }
}

/// A single message in a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who sent this message
    pub role: Role,

    /// Ordered content segments
    pub content: Vec<ContentBlock>,
}

impl Message {
    /// Create a user message holding a single text block.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: vec![ContentBlock::text(text)],
        }
    }

    /// Create an assistant message from raw content blocks.
    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content,
        }
    }

    /// Create a user message carrying tool results back to the model.
    pub fn tool_results(results: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::User,
            content: results,
        }
    }
}
