//! Parley CLI: entry point.
//!
//! # Commands
//!
//! - `parley chat [-m MESSAGE] [--chat-id ID] [--image PATH]`: single-shot or REPL
//! - `parley status`: show configuration and provider status

mod helpers;
mod repl;
mod status;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use parley_agent::{Agent, MemoryPromptComposer, MemoryStore, ToolRegistry};
use parley_agent::tools::RememberTool;
use parley_core::config::{load_config, resolve_config_path, Config};
use parley_core::utils::expand_home;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Parley: a tool-calling chat assistant
#[derive(Parser)]
#[command(name = "parley", version, about, long_about = None)]
struct Cli {
    /// Config file (defaults to ~/.parley/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Conversation identifier
        #[arg(long, default_value = "cli")]
        chat_id: String,

        /// Attach an image to the single message
        #[arg(long, requires = "message")]
        image: Option<PathBuf>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Show configuration and provider status
    Status,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            chat_id,
            image,
            logs,
        } => {
            init_logging(logs);
            let config = load_config(cli.config.as_deref());
            run_chat(&config, message, &chat_id, image).await
        }
        Commands::Status => {
            let config_path = resolve_config_path(cli.config.as_deref());
            status::run(&load_config(Some(&config_path)), &config_path)
        }
    }
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    config: &Config,
    message: Option<String>,
    chat_id: &str,
    image: Option<PathBuf>,
) -> Result<()> {
    let agent = build_agent(config)?;

    match message {
        Some(msg) => {
            info!(chat_id, "processing single message");
            let image = image.as_deref().map(helpers::load_image).transpose()?;
            let response = agent
                .get_ai_response(config, chat_id, &msg, image)
                .await
                .context("chat turn failed")?;
            helpers::print_response(&response);
        }
        None => repl::run(&agent, config, chat_id).await?,
    }

    Ok(())
}

/// Build an `Agent` with the built-in tools and memory-backed prompt.
pub fn build_agent(config: &Config) -> Result<Agent> {
    let workspace = expand_home(&config.memory.workspace);
    std::fs::create_dir_all(&workspace)
        .with_context(|| format!("failed to create workspace: {}", workspace.display()))?;

    let memory = MemoryStore::new(&workspace);

    let mut tools = ToolRegistry::new();
    tools.register(Arc::new(RememberTool::new(memory.clone())));

    info!(
        provider = %config.ai.provider,
        tools = ?tools.tool_names(),
        tools_enabled = config.tools_enabled(),
        "agent initialized"
    );

    Ok(Agent::new(
        Arc::new(tools),
        Arc::new(MemoryPromptComposer::new(memory)),
    ))
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("parley=debug,info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}
