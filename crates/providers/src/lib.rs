//! Decision-service implementations for quill.
//!
//! Currently a single backend: Anthropic's native Messages API. The
//! [`quill_core::Decider`] trait keeps the orchestration loop independent
//! of the backend, so tests run against scripted fakes instead.

pub mod anthropic;

pub use anthropic::AnthropicDecider;
