//! # quill Core
//!
//! Domain types, traits, and error definitions for the quill agent.
//! This crate has **no runtime or transport dependencies** — it defines the
//! domain model that all other crates implement against.
//!
//! ## Design Philosophy
//!
//! The two external collaborators — the decision service (an LLM deciding
//! which tools to call) and the tool peer (an MCP server executing them) —
//! are defined as traits here. Implementations live in their respective
//! crates. This enables:
//! - Swapping implementations via configuration
//! - Deterministic fakes in tests (no network, no subprocess)
//! - Clean dependency graph (all crates depend inward on core)

pub mod decision;
pub mod error;
pub mod message;
pub mod tool;

// Re-export key types at crate root for ergonomics
pub use decision::{Decider, Decision, DecisionRequest};
pub use error::{BridgeError, DeciderError, Error, Result};
pub use message::{ContentBlock, Message, Role};
pub use tool::{Action, ToolBridge, ToolDescriptor};
