//! Provider registry: static specs for the supported LLM backends.
//!
//! Each `ProviderSpec` describes how to reach one provider: its config id,
//! display name (used in error messages), default API base and endpoint.

use parley_core::config::AiConfig;

use crate::error::ProviderError;

/// The two supported protocol families.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    /// Content-block protocol (`/v1/messages`).
    Anthropic,
    /// Chat-completion protocol (`/chat/completions`).
    OpenRouter,
}

/// Static specification describing one LLM provider.
#[derive(Clone, Debug)]
pub struct ProviderSpec {
    pub kind: ProviderKind,
    /// Config id (e.g. `"openrouter"`).
    pub name: &'static str,
    /// Human-readable name for logs and errors. E.g. `"OpenRouter"`.
    pub display_name: &'static str,
    /// Environment variable holding the API key.
    pub env_key: &'static str,
    /// Default API base URL, without the endpoint path.
    pub default_api_base: &'static str,
    /// Endpoint path appended to the base.
    pub endpoint: &'static str,
    /// Model used when the config leaves `ai.model` empty.
    pub default_model: &'static str,
}

/// Supported providers.
pub static PROVIDERS: &[ProviderSpec] = &[
    ProviderSpec {
        kind: ProviderKind::Anthropic,
        name: "anthropic",
        display_name: "Anthropic",
        env_key: "ANTHROPIC_API_KEY",
        default_api_base: "https://api.anthropic.com/v1",
        endpoint: "/messages",
        default_model: "claude-sonnet-4-20250514",
    },
    ProviderSpec {
        kind: ProviderKind::OpenRouter,
        name: "openrouter",
        display_name: "OpenRouter",
        env_key: "OPENROUTER_API_KEY",
        default_api_base: "https://openrouter.ai/api/v1",
        endpoint: "/chat/completions",
        default_model: "anthropic/claude-sonnet-4",
    },
];

/// Find a provider spec by config id.
pub fn find_by_name(name: &str) -> Option<&'static ProviderSpec> {
    PROVIDERS.iter().find(|s| s.name == name)
}

impl ProviderKind {
    /// Resolve the provider selected by configuration.
    pub fn from_config(ai: &AiConfig) -> Result<Self, ProviderError> {
        find_by_name(ai.provider.trim())
            .map(|spec| spec.kind)
            .ok_or(ProviderError::NotConfigured)
    }

    pub fn spec(self) -> &'static ProviderSpec {
        PROVIDERS
            .iter()
            .find(|s| s.kind == self)
            .unwrap_or(&PROVIDERS[0])
    }

    /// Config id, also the `providerId` handed to tool-schema formatting.
    pub fn id(self) -> &'static str {
        self.spec().name
    }

    pub fn display_name(self) -> &'static str {
        self.spec().display_name
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// Build the full endpoint URL from an optional base override.
pub fn endpoint_url(spec: &ProviderSpec, api_base: Option<&str>) -> String {
    let base = api_base.unwrap_or(spec.default_api_base).trim_end_matches('/');
    format!("{base}{}", spec.endpoint)
}
