//! Shared POST helper for the adapters.

use serde_json::Value;
use tracing::{debug, error};

use crate::error::ProviderError;

/// Send a prepared request and decode its JSON body.
///
/// Non-2xx statuses become [`ProviderError::Api`] carrying the raw body.
pub(crate) async fn post_json(
    request: reqwest::RequestBuilder,
    provider: &str,
) -> Result<Value, ProviderError> {
    let response = request.send().await.map_err(|e| {
        error!(provider, error = %e, "HTTP request failed");
        ProviderError::Transport(e)
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Failed to read error body".to_string());
        error!(provider, status = %status, body = %body, "API error");
        return Err(ProviderError::Api {
            provider: provider.to_string(),
            status: status.as_u16(),
            body,
        });
    }

    let body = response.json::<Value>().await.map_err(|e| {
        error!(provider, error = %e, "Failed to parse response body");
        ProviderError::InvalidResponse(e.to_string())
    })?;
    debug!(provider, status = %status, "response received");
    Ok(body)
}
