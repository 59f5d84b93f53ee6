//! OpenRouter adapter (OpenAI-compatible `/chat/completions`).
//!
//! Neutral history is already in chat-completion shape, so only the system
//! prompt and image parts need rendering. Responses without native
//! `tool_calls` are scanned for calls written as text.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use parley_core::config::AiConfig;
use parley_core::types::{ContentPart, Message, MessageContent, ToolCall, ToolInvocation};

use crate::error::ProviderError;
use crate::http::post_json;
use crate::registry::{endpoint_url, ProviderKind};
use crate::text_calls;
use crate::traits::{ChatRequest, IsKnownTool, ProviderAdapter, ProviderReply};

pub struct OpenRouterAdapter {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    temperature: f64,
    timeout: Duration,
}

impl std::fmt::Debug for OpenRouterAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenRouterAdapter")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

impl OpenRouterAdapter {
    pub fn new(ai: &AiConfig, client: reqwest::Client) -> Self {
        let spec = ProviderKind::OpenRouter.spec();
        let model = if ai.model.is_empty() {
            spec.default_model.to_string()
        } else {
            ai.model.clone()
        };
        Self {
            client,
            url: endpoint_url(spec, ai.api_base.as_deref()),
            api_key: ai.api_key.clone(),
            model,
            max_tokens: ai.max_tokens,
            temperature: ai.temperature,
            timeout: Duration::from_secs(ai.request_timeout_secs),
        }
    }

    fn build_body(&self, request: &ChatRequest<'_>) -> Value {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        messages.push(json!({ "role": "system", "content": request.system }));
        messages.extend(request.messages.iter().map(render_message));

        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "temperature": self.temperature,
            "messages": messages,
        });
        if let Some(tools) = request.tools.filter(|t| !t.is_empty()) {
            body["tools"] = Value::Array(tools.to_vec());
        }
        body
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenRouter
    }

    async fn send(&self, request: &ChatRequest<'_>) -> Result<Value, ProviderError> {
        debug!(
            provider = self.display_name(),
            model = %self.model,
            messages = request.messages.len(),
            tools = request.tools.map_or(0, |t| t.len()),
            "Calling LLM"
        );

        let builder = self
            .client
            .post(&self.url)
            .timeout(self.timeout)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request));

        post_json(builder, self.display_name()).await
    }

    fn normalize(
        &self,
        body: Value,
        is_known: IsKnownTool<'_>,
    ) -> Result<ProviderReply, ProviderError> {
        let message = body
            .get("choices")
            .and_then(Value::as_array)
            .and_then(|choices| choices.first())
            .map(|choice| &choice["message"])
            .ok_or_else(|| ProviderError::InvalidResponse("no choices returned".into()))?;

        let content = message["content"].as_str().unwrap_or_default();

        let native: Vec<ToolInvocation> = message
            .get("tool_calls")
            .and_then(Value::as_array)
            .map(|calls| calls.iter().filter_map(native_invocation).collect())
            .unwrap_or_default();
        let native: Vec<ToolInvocation> = native
            .into_iter()
            .filter(|inv| {
                let known = is_known(&inv.name);
                if !known {
                    debug!(tool = %inv.name, "dropping call to unregistered tool");
                }
                known
            })
            .collect();

        if !native.is_empty() {
            let calls: Vec<ToolCall> = native.iter().map(ToolInvocation::to_tool_call).collect();
            return Ok(ProviderReply::ToolInvocations {
                assistant: Message::assistant_tool_calls(Some(content.to_string()), calls),
                invocations: native,
            });
        }

        let extracted = text_calls::extract(content, is_known);
        if !extracted.is_empty() {
            debug!(calls = extracted.len(), "using tool calls written as text");
            let remainder = text_calls::strip(content, is_known).trim().to_string();
            let calls: Vec<ToolCall> = extracted.iter().map(ToolInvocation::to_tool_call).collect();
            return Ok(ProviderReply::ToolInvocations {
                assistant: Message::assistant_tool_calls(Some(remainder), calls),
                invocations: extracted,
            });
        }

        Ok(ProviderReply::Text(content.to_string()))
    }
}

/// Read one native `tool_calls` entry. Arguments may arrive as a JSON string
/// or, from some upstream models, as an object.
fn native_invocation(call: &Value) -> Option<ToolInvocation> {
    let function = call.get("function")?;
    let name = function.get("name")?.as_str()?;
    let id = call
        .get("id")
        .and_then(Value::as_str)
        .map(String::from)
        .unwrap_or_else(text_calls::new_call_id);
    let arguments = match function.get("arguments") {
        Some(Value::String(raw)) => raw.clone(),
        Some(Value::Null) | None => "{}".to_string(),
        Some(other) => other.to_string(),
    };
    Some(ToolInvocation::new(id, name, arguments))
}

// ─────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────

fn render_message(message: &Message) -> Value {
    match message {
        Message::User {
            content: MessageContent::Parts(parts),
        } => json!({
            "role": "user",
            "content": parts.iter().map(render_part).collect::<Vec<_>>(),
        }),
        other => serde_json::to_value(other).unwrap_or(Value::Null),
    }
}

fn render_part(part: &ContentPart) -> Value {
    match part {
        ContentPart::Text { text } => json!({ "type": "text", "text": text }),
        ContentPart::Image { mime_type, data } => json!({
            "type": "image_url",
            "image_url": { "url": format!("data:{mime_type};base64,{data}") },
        }),
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
