//! The bounded tool-calling loop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use quill_core::decision::{Decider, DecisionRequest};
use quill_core::error::Error;
use quill_core::message::{ContentBlock, Message};
use quill_core::tool::{Action, ToolBridge};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::context::build_date_context;
use crate::prompt::SYSTEM_PROMPT;

/// Hard cap on decision-service round trips per utterance.
pub const DEFAULT_MAX_TURNS: u32 = 10;

/// What one processed utterance produced: the final text plus every tool
/// invocation executed along the way, in execution order.
#[derive(Debug)]
pub struct Outcome {
    pub response: String,
    pub actions: Vec<Action>,
}

/// The orchestration loop: one utterance in, a final answer and an action
/// log out.
///
/// Holds no session state of its own — every `process` call owns its
/// message sequence and action log exclusively. The loop assumes at most
/// one in-flight `process` call per instance; concurrent calls would
/// interleave tool invocations over the shared bridge transport.
pub struct AgentLoop {
    decider: Arc<dyn Decider>,
    bridge: Arc<dyn ToolBridge>,
    model: String,
    max_tokens: u32,
    temperature: f32,
    max_turns: u32,
}

impl AgentLoop {
    /// Create a new loop with the default turn cap.
    pub fn new(
        decider: Arc<dyn Decider>,
        bridge: Arc<dyn ToolBridge>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            decider,
            bridge,
            model: model.into(),
            max_tokens: 4096,
            temperature: 0.7,
            max_turns: DEFAULT_MAX_TURNS,
        }
    }

    /// Set the maximum number of decision rounds.
    pub fn with_max_turns(mut self, max: u32) -> Self {
        self.max_turns = max;
        self
    }

    /// Set the maximum tokens per decision-service response.
    pub fn with_max_tokens(mut self, max: u32) -> Self {
        self.max_tokens = max;
        self
    }

    /// Set the sampling temperature.
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }

    /// Process a user utterance against the current clock.
    pub async fn process(&self, utterance: &str) -> Result<Outcome, Error> {
        self.process_at(utterance, Utc::now()).await
    }

    /// Process a user utterance with an explicit reference instant.
    ///
    /// The instant grounds relative-date phrases; taking it as a parameter
    /// keeps the loop deterministic under test.
    pub async fn process_at(
        &self,
        utterance: &str,
        now: DateTime<Utc>,
    ) -> Result<Outcome, Error> {
        // Tool discovery doubles as the connection checkpoint: an
        // unconnected bridge fails here, before the decision service is
        // ever contacted.
        let tools = self.bridge.discover_tools().await?;

        info!(tool_count = tools.len(), "Processing utterance");

        let grounded = format!("{}\n\n{}", build_date_context(now), utterance);
        let mut messages = vec![Message::user(grounded)];
        let mut actions: Vec<Action> = Vec::new();
        let mut turn = 0;

        while turn < self.max_turns {
            turn += 1;
            debug!(turn, "Decision round");

            let request = DecisionRequest {
                model: self.model.clone(),
                system: SYSTEM_PROMPT.into(),
                max_tokens: self.max_tokens,
                temperature: self.temperature,
                messages: messages.clone(),
                tools: tools.clone(),
            };

            let decision = self.decider.decide(request).await?;

            if decision.is_terminal() {
                let response = decision.joined_text().trim().to_string();
                debug!(turns = turn, actions = actions.len(), "Final response");
                return Ok(Outcome { response, actions });
            }

            // Pull the invocation requests out before the raw content is
            // appended as the assistant message.
            let requests: Vec<(String, String, Value)> = decision
                .content
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::ToolUse { id, name, input } => {
                        Some((id.clone(), name.clone(), input.clone()))
                    }
                    _ => None,
                })
                .collect();

            messages.push(Message::assistant(decision.content));

            // Execute strictly in the order requested; all results of the
            // round travel back in a single user message.
            let mut results = Vec::with_capacity(requests.len());
            for (id, name, input) in requests {
                debug!(tool = %name, "Invoking tool");

                match self.bridge.invoke(&name, input.clone()).await {
                    Ok(result) => {
                        results.push(ContentBlock::tool_result(id, render_result(&result)));
                        actions.push(Action {
                            tool: name,
                            input,
                            result,
                        });
                    }
                    Err(e) => {
                        warn!(tool = %name, error = %e, "Tool invocation failed");
                        actions.push(Action {
                            tool: name,
                            input,
                            result: serde_json::json!({ "error": e.to_string() }),
                        });
                        return Err(e.into());
                    }
                }
            }

            messages.push(Message::tool_results(results));
        }

        warn!(limit = self.max_turns, "Turn cap reached without a final response");
        Err(Error::MaxTurnsExceeded {
            limit: self.max_turns,
        })
    }
}

/// Render a tool result for the model: strings pass through verbatim,
/// anything structured becomes compact JSON.
fn render_result(result: &Value) -> String {
    match result {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
