//! Interactive Gemini function-calling agent.

use anyhow::Context;
use clap::Parser;
use gemini_tool_agent::config::{AgentConfig, Credentials};
use gemini_tool_agent::repl::{self, ConsoleEventSink, GOODBYE};
use gemini_tool_agent::Toolset;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tokio::io::BufReader;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "gemini-agent", version, about = "Chat with a Gemini agent that can call local tools")]
struct Cli {
    /// Agent profile to run
    #[arg(long, short, value_enum)]
    toolset: Option<Toolset>,

    /// YAML configuration file
    #[arg(long, short, env = "AGENT_CONFIG")]
    config: Option<PathBuf>,

    /// Gemini model name
    #[arg(long, short)]
    model: Option<String>,

    /// Root directory for the file tools
    #[arg(long)]
    workdir: Option<PathBuf>,

    /// Maximum tool rounds per request
    #[arg(long)]
    max_tool_rounds: Option<u32>,

    /// Sampling temperature
    #[arg(long)]
    temperature: Option<f64>,
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env file is fine.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let credentials = match Credentials::from_env() {
        Ok(credentials) => credentials,
        Err(_) => {
            println!("Error: API key not found. Please add it to your .env file.");
            return ExitCode::FAILURE;
        }
    };

    match run(cli, credentials).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn load_config(cli: &Cli) -> anyhow::Result<AgentConfig> {
    let base = match &cli.config {
        Some(path) => AgentConfig::from_yaml_file(path)?,
        None => AgentConfig::default(),
    };
    let mut config = base.with_env_overrides()?;

    if let Some(toolset) = cli.toolset {
        config.toolset = toolset;
    }
    if let Some(model) = &cli.model {
        config.model = model.clone();
    }
    if let Some(workdir) = &cli.workdir {
        config.workdir = Some(workdir.clone());
    }
    if let Some(rounds) = cli.max_tool_rounds {
        config.max_tool_rounds = rounds;
    }
    if let Some(temperature) = cli.temperature {
        config.temperature = Some(temperature);
    }
    config.validate()?;
    Ok(config)
}

async fn run(cli: Cli, credentials: Credentials) -> anyhow::Result<()> {
    let config = load_config(&cli)?;
    let client = config
        .build_client(&credentials)
        .context("failed to create Gemini client")?;
    let workdir = match &config.workdir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().context("cannot determine working directory")?,
    };

    info!(
        toolset = ?config.toolset,
        model = %config.model,
        workdir = %workdir.display(),
        "starting agent"
    );

    let mut driver = config
        .toolset
        .driver(
            Arc::new(client),
            workdir,
            config.driver_settings(),
            config.max_history_turns,
        )
        .with_event_sink(Arc::new(ConsoleEventSink));

    println!("\n{}", config.toolset.banner());

    let input = BufReader::new(tokio::io::stdin());
    let mut output = tokio::io::stdout();

    tokio::select! {
        res = repl::run(&mut driver, input, &mut output) => res?,
        _ = tokio::signal::ctrl_c() => {
            println!("\n{GOODBYE}");
        }
    }
    Ok(())
}
