//! Model provider layer for Parley.
//!
//! # Architecture
//!
//! - [`traits::ProviderAdapter`]: one round against a backend, normalized to [`ProviderReply`]
//! - [`anthropic::AnthropicAdapter`]: content-block protocol
//! - [`openrouter::OpenRouterAdapter`]: chat-completion protocol with text tool-call fallback
//! - [`text_calls`]: grammar for tool calls written as plain text
//! - [`registry`]: static specs for the supported providers

pub mod anthropic;
pub mod error;
mod http;
pub mod openrouter;
pub mod registry;
pub mod text_calls;
pub mod traits;

pub use anthropic::AnthropicAdapter;
pub use error::ProviderError;
pub use openrouter::OpenRouterAdapter;
pub use registry::{find_by_name, ProviderKind, ProviderSpec, PROVIDERS};
pub use traits::{ChatRequest, IsKnownTool, ProviderAdapter, ProviderReply};

use parley_core::config::AiConfig;
use tracing::debug;

/// Build the adapter selected by `ai.provider`.
///
/// The `reqwest::Client` is shared across adapters; timeouts are applied per request.
pub fn create_adapter(
    ai: &AiConfig,
    client: reqwest::Client,
) -> Result<Box<dyn ProviderAdapter>, ProviderError> {
    let kind = ProviderKind::from_config(ai)?;
    debug!(
        provider = kind.display_name(),
        model = %ai.model,
        api_base = ai.api_base.as_deref().unwrap_or("default"),
        "Creating provider adapter"
    );
    Ok(match kind {
        ProviderKind::Anthropic => Box::new(AnthropicAdapter::new(ai, client)),
        ProviderKind::OpenRouter => Box::new(OpenRouterAdapter::new(ai, client)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_adapter() {
        let mut ai = AiConfig {
            provider: "openrouter".into(),
            ..Default::default()
        };
        let adapter = create_adapter(&ai, reqwest::Client::new()).unwrap();
        assert_eq!(adapter.kind(), ProviderKind::OpenRouter);
        assert_eq!(adapter.display_name(), "OpenRouter");

        ai.provider = "anthropic".into();
        let adapter = create_adapter(&ai, reqwest::Client::new()).unwrap();
        assert_eq!(adapter.kind(), ProviderKind::Anthropic);
    }

    #[test]
    fn test_create_adapter_unconfigured() {
        let err = create_adapter(&AiConfig::default(), reqwest::Client::new()).err().expect("expected an error");
        assert!(matches!(err, ProviderError::NotConfigured));
    }
}
