//! Config loader: reads `~/.parley/config.json` and merges env vars.
//!
//! # Loading precedence
//! 1. Defaults (from `Config::default()`)
//! 2. JSON file at `~/.parley/config.json`
//! 3. Environment variables `PARLEY_<SECTION>__<FIELD>` (override JSON)
//! 4. Provider-native key variables (`ANTHROPIC_API_KEY`, `OPENROUTER_API_KEY`)
//!    when no key is configured

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use super::schema::Config;

/// Default config file path.
pub fn get_config_path() -> PathBuf {
    crate::utils::get_data_path().join("config.json")
}

/// The explicit path when given, else [`get_config_path`].
pub fn resolve_config_path(path: Option<&Path>) -> PathBuf {
    path.map(PathBuf::from).unwrap_or_else(get_config_path)
}

/// Load configuration from `path` (or the default path) + env vars.
///
/// Falls back to `Config::default()` if the file doesn't exist or can't be parsed.
pub fn load_config(path: Option<&Path>) -> Config {
    let config_path = resolve_config_path(path);
    apply_env_overrides(load_config_from_path(&config_path))
}

/// Load config from a specific file path, without env overrides.
fn load_config_from_path(path: &Path) -> Config {
    if !path.exists() {
        info!("No config file found at {}, using defaults", path.display());
        return Config::default();
    }

    debug!("Loading config from {}", path.display());

    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to read config file {}: {}", path.display(), e);
            return Config::default();
        }
    };

    match serde_json::from_str(&content) {
        Ok(config) => config,
        Err(e) => {
            warn!("Failed to parse config JSON: {}", e);
            Config::default()
        }
    }
}

/// Save configuration to disk (pretty-printed JSON with camelCase keys).
pub fn save_config(config: &Config, path: Option<&Path>) -> std::io::Result<()> {
    let config_path = resolve_config_path(path);

    if let Some(parent) = config_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let json = serde_json::to_string_pretty(config).map_err(std::io::Error::other)?;

    std::fs::write(&config_path, json)?;
    debug!("Config saved to {}", config_path.display());
    Ok(())
}

/// Apply environment variable overrides on top of a loaded config.
///
/// Supported overrides:
/// - `PARLEY_AI__PROVIDER`, `PARLEY_AI__API_KEY`, `PARLEY_AI__MODEL`, `PARLEY_AI__API_BASE`
/// - `PARLEY_AI__MAX_TOKENS`, `PARLEY_AI__TEMPERATURE`, `PARLEY_AI__MAX_TOOL_ROUNDS`
/// - `PARLEY_AI__HISTORY_LIMIT`, `PARLEY_AI__REQUEST_TIMEOUT_SECS`
/// - `PARLEY_EMAIL__ENABLED`, `PARLEY_TOOLS__ENABLED`
/// - `PARLEY_MEMORY__WORKSPACE`
fn apply_env_overrides(mut config: Config) -> Config {
    if let Ok(val) = std::env::var("PARLEY_AI__PROVIDER") {
        config.ai.provider = val;
    }
    if let Ok(val) = std::env::var("PARLEY_AI__API_KEY") {
        config.ai.api_key = val;
    }
    if let Ok(val) = std::env::var("PARLEY_AI__MODEL") {
        config.ai.model = val;
    }
    if let Ok(val) = std::env::var("PARLEY_AI__API_BASE") {
        config.ai.api_base = Some(val);
    }
    if let Ok(val) = std::env::var("PARLEY_AI__MAX_TOKENS") {
        if let Ok(n) = val.parse::<u32>() {
            config.ai.max_tokens = n;
        }
    }
    if let Ok(val) = std::env::var("PARLEY_AI__TEMPERATURE") {
        if let Ok(t) = val.parse::<f64>() {
            config.ai.temperature = t;
        }
    }
    if let Ok(val) = std::env::var("PARLEY_AI__MAX_TOOL_ROUNDS") {
        if let Ok(n) = val.parse::<usize>() {
            config.ai.max_tool_rounds = n;
        }
    }
    if let Ok(val) = std::env::var("PARLEY_AI__HISTORY_LIMIT") {
        if let Ok(n) = val.parse::<usize>() {
            config.ai.history_limit = n;
        }
    }
    if let Ok(val) = std::env::var("PARLEY_AI__REQUEST_TIMEOUT_SECS") {
        if let Ok(secs) = val.parse::<u64>() {
            config.ai.request_timeout_secs = secs;
        }
    }
    if let Ok(val) = std::env::var("PARLEY_EMAIL__ENABLED") {
        config.email.enabled = parse_flag(&val);
    }
    if let Ok(val) = std::env::var("PARLEY_TOOLS__ENABLED") {
        config.tools.enabled = Some(parse_flag(&val));
    }
    if let Ok(val) = std::env::var("PARLEY_MEMORY__WORKSPACE") {
        config.memory.workspace = val;
    }

    if config.ai.api_key.is_empty() {
        let native = match config.ai.provider.as_str() {
            "anthropic" => Some("ANTHROPIC_API_KEY"),
            "openrouter" => Some("OPENROUTER_API_KEY"),
            _ => None,
        };
        if let Some(Ok(key)) = native.map(std::env::var) {
            debug!(provider = %config.ai.provider, "using provider key from environment");
            config.ai.api_key = key;
        }
    }

    config
}

fn parse_flag(val: &str) -> bool {
    val == "true" || val == "1"
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
