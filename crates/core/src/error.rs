//! Error types for the quill domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error variant.

use thiserror::Error;

/// The top-level error type for all quill operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Tool bridge errors ---
    #[error("Bridge error: {0}")]
    Bridge(#[from] BridgeError),

    // --- Decision service errors ---
    #[error("Decider error: {0}")]
    Decider(#[from] DeciderError),

    // --- Orchestration loop circuit breaker ---
    #[error("No final response after {limit} turns; giving up")]
    MaxTurnsExceeded { limit: u32 },
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Errors from the tool bridge (the MCP peer and its transport).
#[derive(Debug, Error)]
pub enum BridgeError {
    #[error("Bridge is not connected; call connect() first")]
    NotConnected,

    #[error("Failed to connect to tool peer: {0}")]
    Connection(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Tool '{tool}' failed: {message}")]
    Invocation { tool: String, message: String },
}

/// Errors from the decision service (the hosted LLM API).
#[derive(Debug, Clone, Error)]
pub enum DeciderError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Rate limited by decision service, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Decider not configured: {0}")]
    NotConfigured(String),
}
