//! quill CLI — the main entry point.
//!
//! Modes:
//! - `quill "<utterance>"` — process one utterance and print the response
//! - `quill --interactive` — line-oriented shell, one utterance per line

use clap::Parser;

mod commands;

#[derive(Parser)]
#[command(
    name = "quill",
    about = "quill — natural language in, spreadsheet operations out",
    version,
    author
)]
struct Cli {
    /// The utterance to process (single-shot mode)
    utterance: Option<String>,

    /// Enter interactive line mode
    #[arg(short, long)]
    interactive: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing (stderr only; stdout is for responses)
    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    commands::run::run(cli.utterance, cli.interactive).await
}
