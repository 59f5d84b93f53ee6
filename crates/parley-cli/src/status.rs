//! `parley status`: show resolved configuration and provider status.

use std::path::Path;

use anyhow::Result;
use colored::Colorize;

use parley_core::config::Config;
use parley_core::utils::{expand_home, truncate_string};
use parley_providers::registry::{find_by_name, PROVIDERS};

pub fn run(config: &Config, config_path: &Path) -> Result<()> {
    println!();
    println!("{}", "Parley Status".cyan().bold());
    println!();

    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        found_marker(config_path.exists())
    );

    let workspace = expand_home(&config.memory.workspace);
    println!(
        "  {:<18} {} {}",
        "Workspace:".bold(),
        workspace.display(),
        found_marker(workspace.exists())
    );

    let ai = &config.ai;
    let provider = match find_by_name(&ai.provider) {
        Some(spec) => spec.display_name.to_string(),
        None if ai.provider.is_empty() => "(none)".red().to_string(),
        None => format!("{} {}", ai.provider, "(unknown)".red()),
    };
    println!("  {:<18} {}", "Provider:".bold(), provider);
    if !ai.is_configured() {
        println!(
            "  {:<18} {}",
            "",
            "set ai.provider and ai.apiKey in the config file".yellow()
        );
    }

    let model = if ai.model.is_empty() {
        find_by_name(&ai.provider)
            .map(|spec| format!("{} {}", spec.default_model, "(default)".dimmed()))
            .unwrap_or_else(|| "-".to_string())
    } else {
        ai.model.clone()
    };
    println!("  {:<18} {}", "Model:".bold(), model);

    println!(
        "  {:<18} {}",
        "Parameters:".bold(),
        format!(
            "temp: {} | max_tokens: {} | tool rounds: {} | history: {}",
            ai.temperature, ai.max_tokens, ai.max_tool_rounds, ai.history_limit
        )
        .dimmed()
    );
    println!(
        "  {:<18} {}",
        "System prompt:".bold(),
        truncate_string(&ai.system_prompt, 60).dimmed()
    );
    println!(
        "  {:<18} {}",
        "Tools:".bold(),
        if config.tools_enabled() {
            "enabled".green().to_string()
        } else {
            "disabled".dimmed().to_string()
        }
    );

    println!();
    println!("  {}", "API keys:".bold());
    for spec in PROVIDERS {
        let has_key = (spec.name == ai.provider && !ai.api_key.is_empty())
            || std::env::var(spec.env_key).is_ok_and(|v| !v.is_empty());
        let status = if has_key {
            format!("{} (key set)", "✓".green())
        } else {
            format!("{}", "· not configured".dimmed())
        };
        println!("    {:<20} {}", spec.display_name, status);
    }
    println!();

    Ok(())
}

fn found_marker(exists: bool) -> String {
    if exists {
        "✓".green().to_string()
    } else {
        "(not found)".red().to_string()
    }
}
