//! Wires config, bridge, and decider into an [`AgentLoop`] and drives it
//! in single-shot or interactive mode.

use std::sync::Arc;

use quill_agent::AgentLoop;
use quill_bridge::McpBridge;
use quill_config::AppConfig;
use quill_providers::AnthropicDecider;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

pub async fn run(
    utterance: Option<String>,
    interactive: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load().map_err(|e| format!("Failed to load config: {e}"))?;

    // Check for an API key early — give a clear error
    if !config.has_api_key() {
        eprintln!();
        eprintln!("  ERROR: No API key configured!");
        eprintln!();
        eprintln!("  Set one of these environment variables:");
        eprintln!("    ANTHROPIC_API_KEY = 'sk-ant-...'");
        eprintln!("    QUILL_API_KEY     = 'sk-ant-...'");
        eprintln!();
        eprintln!("  Or add `api_key` to your config file:");
        eprintln!("    {}", AppConfig::config_dir().join("config.toml").display());
        eprintln!();
        return Err("No API key found. See above for setup instructions.".into());
    }

    if config.bridge.command.is_none() {
        return Err(
            "No tool server configured. Set QUILL_SERVER_COMMAND or add \
             `command` to the [bridge] section of your config file."
                .into(),
        );
    }

    let bridge = Arc::new(McpBridge::new());
    bridge
        .connect(&config.bridge)
        .await
        .map_err(|e| format!("Failed to connect to tool server: {e}"))?;

    let api_key = config.api_key.clone().unwrap_or_default();
    let decider = Arc::new(AnthropicDecider::new(api_key));

    let agent = AgentLoop::new(decider, bridge.clone(), &config.model)
        .with_max_tokens(config.max_tokens)
        .with_temperature(config.temperature)
        .with_max_turns(config.max_turns);

    let result = match (utterance, interactive) {
        (Some(text), _) => single_shot(&agent, &text).await,
        (None, true) => interactive_loop(&agent).await,
        (None, false) => Err("Provide an utterance, or pass --interactive.".into()),
    };

    bridge.disconnect().await;
    result
}

async fn single_shot(
    agent: &AgentLoop,
    utterance: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let outcome = agent.process(utterance).await?;

    for action in &outcome.actions {
        debug!(tool = %action.tool, input = %action.input, "Executed action");
    }

    println!("{}", outcome.response);
    Ok(())
}

async fn interactive_loop(agent: &AgentLoop) -> Result<(), Box<dyn std::error::Error>> {
    println!("quill interactive mode — type a request, or 'exit' to quit.");

    let stdin = tokio::io::stdin();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        print!("> ");
        use std::io::Write;
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break; // EOF
        };
        let line = line.trim();

        if line.is_empty() {
            continue;
        }
        if line == "exit" || line == "quit" {
            break;
        }

        // One process() call per utterance; a failed utterance does not
        // end the session
        match agent.process(line).await {
            Ok(outcome) => {
                for action in &outcome.actions {
                    debug!(tool = %action.tool, input = %action.input, "Executed action");
                }
                println!("{}", outcome.response);
            }
            Err(e) => eprintln!("error: {e}"),
        }
    }

    Ok(())
}
