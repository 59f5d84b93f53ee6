//! Provider error taxonomy.

use thiserror::Error;

/// Errors raised while talking to a model provider.
///
/// None of these are retried; they propagate out of the turn unchanged.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// No provider set, or an unknown provider id.
    #[error("No AI provider configured")]
    NotConfigured,

    /// Non-2xx HTTP status from the provider.
    #[error("{provider} API error: {status} - {body}")]
    Api {
        provider: String,
        status: u16,
        body: String,
    },

    /// The provider answered 2xx with a body we cannot use.
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// Connection, TLS, or timeout failure before a status was received.
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),
}
