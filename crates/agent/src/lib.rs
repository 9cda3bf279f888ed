//! The orchestration loop — the heart of quill.
//!
//! One user utterance becomes zero or more tool invocations against the
//! external peer:
//!
//! 1. **Ground** the utterance with a calendar-anchor block (so "last
//!    Tuesday" resolves to an absolute date)
//! 2. **Ask** the decision service for a final answer or a batch of
//!    tool-invocation requests
//! 3. **If invocations**: execute them in order via the tool bridge, feed
//!    the results back, loop to step 2
//! 4. **If text only**: return it together with the action log
//!
//! The loop is bounded by a hard turn cap — the only defense against
//! runaway tool-calling.

pub mod context;
pub mod loop_runner;
pub mod prompt;

pub use context::build_date_context;
pub use loop_runner::{AgentLoop, Outcome};
