//! MCP tool-bridge client for quill.
//!
//! The tool peer is an external MCP server reached over a subprocess's
//! stdin/stdout (JSON-RPC 2.0, one object per line). The bridge exposes
//! exactly the two operations the orchestration loop needs — discover the
//! peer's tools and forward a single named call — behind the
//! [`quill_core::ToolBridge`] trait.

pub mod client;
pub mod protocol;

pub use client::McpBridge;
