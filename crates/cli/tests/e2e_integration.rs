//! End-to-end integration tests for the quill pipeline.
//!
//! These exercise the full path from utterance to outcome — date grounding,
//! decision rounds, tool invocations, and the action log — with scripted
//! stand-ins for the two external collaborators.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use chrono::{TimeZone, Utc};
use quill_agent::AgentLoop;
use quill_core::decision::{Decider, Decision, DecisionRequest};
use quill_core::error::{BridgeError, DeciderError, Error};
use quill_core::message::ContentBlock;
use quill_core::tool::{ToolBridge, ToolDescriptor};
use serde_json::{json, Value};

// ── Scripted decision service ────────────────────────────────────────────

struct ScriptedDecider {
    responses: Mutex<VecDeque<Decision>>,
    requests: Mutex<Vec<DecisionRequest>>,
}

impl ScriptedDecider {
    fn new(responses: Vec<Decision>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl Decider for ScriptedDecider {
    fn name(&self) -> &str {
        "e2e_mock"
    }

    async fn decide(&self, request: DecisionRequest) -> Result<Decision, DeciderError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| DeciderError::Network("script exhausted".into()))
    }
}

fn text(segments: &[&str]) -> Decision {
    Decision {
        content: segments.iter().map(|s| ContentBlock::text(*s)).collect(),
        stop_reason: Some("end_turn".into()),
    }
}

fn tool_use(id: &str, name: &str, input: Value) -> ContentBlock {
    ContentBlock::ToolUse {
        id: id.into(),
        name: name.into(),
        input,
    }
}

// ── Scripted tool peer ───────────────────────────────────────────────────

/// A sheet-flavored fake peer: knows two tools and answers from a script.
struct SheetBridge {
    results: Mutex<VecDeque<Value>>,
    invocations: Mutex<Vec<(String, Value)>>,
}

impl SheetBridge {
    fn new(results: Vec<Value>) -> Self {
        Self {
            results: Mutex::new(results.into()),
            invocations: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait::async_trait]
impl ToolBridge for SheetBridge {
    async fn discover_tools(&self) -> Result<Vec<ToolDescriptor>, BridgeError> {
        Ok(vec![
            ToolDescriptor {
                name: "search_rows".into(),
                description: "Search the sheet".into(),
                input_schema: json!({"type": "object"}),
            },
            ToolDescriptor {
                name: "create_row".into(),
                description: "Append a row".into(),
                input_schema: json!({"type": "object"}),
            },
        ])
    }

    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, BridgeError> {
        self.invocations
            .lock()
            .unwrap()
            .push((name.to_string(), arguments));
        self.results
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| BridgeError::Invocation {
                tool: name.to_string(),
                message: "no scripted result".into(),
            })
    }
}

// ── Scenarios ────────────────────────────────────────────────────────────

#[tokio::test]
async fn relative_date_flows_into_a_tool_call() {
    // Wednesday 2026-02-18; "last Monday" must ground to 2026-02-16
    let now = Utc.with_ymd_and_hms(2026, 2, 18, 9, 30, 0).unwrap();

    let decider = Arc::new(ScriptedDecider::new(vec![
        Decision {
            content: vec![
                ContentBlock::text("Logging the rent payment."),
                tool_use(
                    "toolu_01",
                    "create_row",
                    json!({"date": "2026-02-16", "category": "rent", "amount": 950}),
                ),
            ],
            stop_reason: Some("tool_use".into()),
        },
        text(&["Logged $950 of rent for 2026-02-16."]),
    ]));
    let bridge = Arc::new(SheetBridge::new(vec![json!({"row": 12})]));

    let agent = AgentLoop::new(decider.clone(), bridge.clone(), "test-model");
    let outcome = agent
        .process_at("log my $950 rent payment from last Monday", now)
        .await
        .unwrap();

    assert_eq!(outcome.response, "Logged $950 of rent for 2026-02-16.");
    assert_eq!(outcome.actions.len(), 1);
    assert_eq!(outcome.actions[0].tool, "create_row");
    assert_eq!(outcome.actions[0].input["date"], "2026-02-16");
    assert_eq!(outcome.actions[0].result, json!({"row": 12}));

    // The model actually received the grounding it needed
    let requests = decider.requests.lock().unwrap();
    let ContentBlock::Text { text } = &requests[0].messages[0].content[0] else {
        panic!("grounded message should be text");
    };
    assert!(text.contains("Monday: 2026-02-16"));

    // And the full tool catalog
    assert_eq!(requests[0].tools.len(), 2);
}

#[tokio::test]
async fn two_rounds_with_search_then_create() {
    let now = Utc.with_ymd_and_hms(2026, 2, 18, 9, 30, 0).unwrap();

    let decider = Arc::new(ScriptedDecider::new(vec![
        Decision {
            content: vec![tool_use("toolu_01", "search_rows", json!({"query": "groceries"}))],
            stop_reason: Some("tool_use".into()),
        },
        Decision {
            content: vec![tool_use(
                "toolu_02",
                "create_row",
                json!({"category": "groceries", "amount": 80}),
            )],
            stop_reason: Some("tool_use".into()),
        },
        text(&["Found 3 grocery rows and added the new one."]),
    ]));
    let bridge = Arc::new(SheetBridge::new(vec![
        json!({"matches": 3}),
        json!({"row": 40}),
    ]));

    let agent = AgentLoop::new(decider.clone(), bridge.clone(), "test-model");
    let outcome = agent.process_at("add $80 groceries", now).await.unwrap();

    assert_eq!(decider.calls(), 3);
    let logged: Vec<&str> = outcome.actions.iter().map(|a| a.tool.as_str()).collect();
    assert_eq!(logged, vec!["search_rows", "create_row"]);

    // Each round's results went back before the next decision
    let requests = decider.requests.lock().unwrap();
    assert_eq!(requests[1].messages.len(), 3);
    assert_eq!(requests[2].messages.len(), 5);
}

#[tokio::test]
async fn decider_failure_surfaces_unwrapped() {
    let now = Utc.with_ymd_and_hms(2026, 2, 18, 9, 30, 0).unwrap();

    let decider = Arc::new(ScriptedDecider::new(vec![]));
    let bridge = Arc::new(SheetBridge::new(vec![]));

    let agent = AgentLoop::new(decider, bridge, "test-model");
    let err = agent.process_at("hello", now).await.unwrap_err();

    assert!(matches!(err, Error::Decider(DeciderError::Network(_))));
}

#[tokio::test]
async fn sessions_do_not_leak_between_process_calls() {
    let now = Utc.with_ymd_and_hms(2026, 2, 18, 9, 30, 0).unwrap();

    let decider = Arc::new(ScriptedDecider::new(vec![
        text(&["first answer"]),
        text(&["second answer"]),
    ]));
    let bridge = Arc::new(SheetBridge::new(vec![]));
    let agent = AgentLoop::new(decider.clone(), bridge, "test-model");

    let first = agent.process_at("one", now).await.unwrap();
    let second = agent.process_at("two", now).await.unwrap();

    assert_eq!(first.response, "first answer");
    assert_eq!(second.response, "second answer");

    // Each call started a fresh session: one user message, no carryover
    let requests = decider.requests.lock().unwrap();
    assert_eq!(requests[0].messages.len(), 1);
    assert_eq!(requests[1].messages.len(), 1);
}
