//! Configuration schema.
//!
//! Hierarchy: `Config` → `AiConfig`, `EmailConfig`, `ToolsConfig`, `MemoryConfig`,
//! plus a free-form `apiKeys` map consumed by tool implementations.
//!
//! JSON on disk uses **camelCase** keys; Rust uses snake_case.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::session::DEFAULT_HISTORY_LIMIT;

// ─────────────────────────────────────────────
// Root Config
// ─────────────────────────────────────────────

/// Root configuration: loaded from `~/.parley/config.json` + env vars.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub ai: AiConfig,
    /// API keys for external services used by tools (e.g. `"brave"`).
    pub api_keys: HashMap<String, String>,
    pub email: EmailConfig,
    pub tools: ToolsConfig,
    pub memory: MemoryConfig,
}

impl Config {
    /// Whether tool schemas are sent to the model.
    ///
    /// `tools.enabled` decides when set. Older configs only carry
    /// `email.enabled`, which historically gated every tool, so that flag is
    /// the fallback.
    pub fn tools_enabled(&self) -> bool {
        self.tools.enabled.unwrap_or(self.email.enabled)
    }
}

// ─────────────────────────────────────────────
// AI
// ─────────────────────────────────────────────

/// Model backend settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct AiConfig {
    /// Provider id: `"anthropic"` or `"openrouter"`. Empty means unconfigured.
    pub provider: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0). Only sent to chat-completion providers.
    pub temperature: f64,
    /// Base system prompt, before memory is appended.
    pub system_prompt: String,
    /// Override the provider's API base URL (proxies, tests).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,
    /// Maximum tool rounds per turn before giving up.
    pub max_tool_rounds: usize,
    /// Messages kept per conversation after trimming.
    pub history_limit: usize,
    /// HTTP request timeout for provider calls.
    pub request_timeout_secs: u64,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            provider: String::new(),
            api_key: String::new(),
            model: String::new(),
            max_tokens: 4096,
            temperature: 0.7,
            system_prompt: "You are a helpful assistant.".to_string(),
            api_base: None,
            max_tool_rounds: 10,
            history_limit: DEFAULT_HISTORY_LIMIT,
            request_timeout_secs: 120,
        }
    }
}

impl AiConfig {
    /// Whether an API key is present.
    pub fn is_configured(&self) -> bool {
        !self.provider.is_empty() && !self.api_key.is_empty()
    }
}

// ─────────────────────────────────────────────
// Email / Tools / Memory
// ─────────────────────────────────────────────

/// Email integration settings. Only `enabled` is read by the core.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct EmailConfig {
    pub enabled: bool,
}

/// Tool exposure settings.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct ToolsConfig {
    /// Explicit tool gate; falls back to `email.enabled` when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Long-term memory settings.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct MemoryConfig {
    /// Workspace holding `memory/MEMORY.md` and daily notes.
    pub workspace: String,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            workspace: "~/.parley/workspace".to_string(),
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert!(config.ai.provider.is_empty());
        assert_eq!(config.ai.max_tokens, 4096);
        assert_eq!(config.ai.max_tool_rounds, 10);
        assert_eq!(config.ai.history_limit, 20);
        assert!(!config.tools_enabled());
    }

    #[test]
    fn test_camel_case_parsing() {
        let config: Config = serde_json::from_str(
            r#"{
                "ai": {
                    "provider": "openrouter",
                    "apiKey": "sk-or-1",
                    "model": "meta-llama/llama-3",
                    "maxTokens": 1024,
                    "systemPrompt": "Be brief.",
                    "maxToolRounds": 3
                },
                "apiKeys": { "brave": "bk" },
                "email": { "enabled": true }
            }"#,
        )
        .unwrap();

        assert_eq!(config.ai.provider, "openrouter");
        assert_eq!(config.ai.api_key, "sk-or-1");
        assert_eq!(config.ai.max_tokens, 1024);
        assert_eq!(config.ai.system_prompt, "Be brief.");
        assert_eq!(config.ai.max_tool_rounds, 3);
        // Unset fields keep defaults
        assert_eq!(config.ai.temperature, 0.7);
        assert_eq!(config.api_keys.get("brave").map(String::as_str), Some("bk"));
        assert!(config.email.enabled);
    }

    #[test]
    fn test_tools_gate_falls_back_to_email() {
        let mut config = Config::default();
        config.email.enabled = true;
        assert!(config.tools_enabled());

        config.tools.enabled = Some(false);
        assert!(!config.tools_enabled());

        config.email.enabled = false;
        config.tools.enabled = Some(true);
        assert!(config.tools_enabled());
    }

    #[test]
    fn test_is_configured() {
        let mut ai = AiConfig::default();
        assert!(!ai.is_configured());
        ai.provider = "anthropic".into();
        ai.api_key = "sk-ant".into();
        assert!(ai.is_configured());
    }
}
