//! Interaction Analysis Agent for Zentinel
//!
//! Replays captured interaction event streams through the behavioral
//! engine and prints the resulting report.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::BufRead;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zentinel_agent_interaction_analysis::{
    InteractionAnalysisAgent, InteractionAnalysisConfig, InteractionEvent,
};

#[derive(Parser, Debug)]
#[command(name = "zentinel-agent-interaction-analysis")]
#[command(author, version, about = "Behavioral interaction analysis agent for Zentinel")]
struct Args {
    /// Captured event stream, one JSON event per line ("-" for stdin)
    #[arg(short, long, default_value = "-")]
    input: PathBuf,

    /// Path to configuration file (JSON or YAML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable JSON logging format
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn init_logging(json: bool, level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let env_filter = EnvFilter::from_default_env().add_directive(level.into());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer())
            .init();
    }
}

/// Parse events from JSONL, skipping unparseable lines with a warning.
fn read_events(reader: impl BufRead) -> Result<Vec<InteractionEvent>> {
    let mut events = Vec::new();
    for (lineno, line) in reader.lines().enumerate() {
        let line = line.context("failed to read input")?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        match serde_json::from_str::<InteractionEvent>(line) {
            Ok(event) => events.push(event),
            Err(e) => {
                tracing::warn!(line = lineno + 1, error = %e, "skipping malformed event");
            }
        }
    }
    Ok(events)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    init_logging(args.json_logs, &args.log_level);

    // Load configuration
    let config = if let Some(config_path) = &args.config {
        let content = std::fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        if config_path.extension().is_some_and(|e| e == "yaml" || e == "yml") {
            serde_yaml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        }
    } else {
        InteractionAnalysisConfig::default()
    };

    // Read the captured event stream
    let events = if args.input.as_os_str() == "-" {
        read_events(std::io::stdin().lock())?
    } else {
        let file = std::fs::File::open(&args.input)
            .with_context(|| format!("failed to open {}", args.input.display()))?;
        read_events(std::io::BufReader::new(file))?
    };

    info!(events = events.len(), "replaying captured session");

    let agent = InteractionAnalysisAgent::new(config);
    let report = agent.replay(events);

    info!(
        detected = report.summary.detected_count,
        risk = report.summary.risk_level.as_str(),
        "analysis complete"
    );

    println!("{}", serde_json::to_string_pretty(&report)?);

    Ok(())
}
