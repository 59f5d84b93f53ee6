//! Anthropic Messages API adapter (content-block protocol).
//!
//! Neutral history is rendered into content blocks: assistant tool calls
//! become `tool_use` blocks, and each run of consecutive tool results
//! becomes one `user` message of `tool_result` blocks.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Map, Value};
use tracing::debug;

use parley_core::config::AiConfig;
use parley_core::types::{ContentPart, Message, MessageContent, ToolCall, ToolInvocation};

use crate::error::ProviderError;
use crate::http::post_json;
use crate::registry::{endpoint_url, ProviderKind};
use crate::text_calls::new_call_id;
use crate::traits::{ChatRequest, IsKnownTool, ProviderAdapter, ProviderReply};

const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicAdapter {
    client: reqwest::Client,
    url: String,
    api_key: String,
    model: String,
    max_tokens: u32,
    timeout: Duration,
}

impl std::fmt::Debug for AnthropicAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicAdapter")
            .field("url", &self.url)
            .field("model", &self.model)
            .finish()
    }
}

impl AnthropicAdapter {
    pub fn new(ai: &AiConfig, client: reqwest::Client) -> Self {
        let spec = ProviderKind::Anthropic.spec();
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
            timeout: Duration::from_secs(ai.request_timeout_secs),
        }
    }

    fn build_body(&self, request: &ChatRequest<'_>) -> Value {
        let mut body = json!({
            "model": self.model,
            "max_tokens": self.max_tokens,
            "system": request.system,
            "messages": render_messages(request.messages),
        });
        if let Some(tools) = request.tools.filter(|t| !t.is_empty()) {
            body["tools"] = Value::Array(tools.to_vec());
        }
        body
    }
}

#[async_trait]
impl ProviderAdapter for AnthropicAdapter {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Anthropic
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
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&self.build_body(request));

        post_json(builder, self.display_name()).await
    }

    fn normalize(
        &self,
        body: Value,
        is_known: IsKnownTool<'_>,
    ) -> Result<ProviderReply, ProviderError> {
        let blocks = body
            .get("content")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let mut invocations = Vec::new();
        for block in blocks.iter().filter(|b| b["type"] == "tool_use") {
            let name = block["name"].as_str().unwrap_or_default();
            if !is_known(name) {
                debug!(tool = name, "dropping call to unregistered tool");
                continue;
            }
            let input = block.get("input").cloned().unwrap_or_else(|| json!({}));
            let id = block["id"]
                .as_str()
                .filter(|id| !id.is_empty())
                .map_or_else(new_call_id, str::to_string);
            invocations.push(ToolInvocation::new(
                id,
                name,
                input.to_string(),
            ));
        }

        let first_text = blocks
            .iter()
            .find(|b| b["type"] == "text")
            .and_then(|b| b["text"].as_str())
            .unwrap_or_default()
            .to_string();

        if invocations.is_empty() {
            return Ok(ProviderReply::Text(first_text));
        }

        let calls: Vec<ToolCall> = invocations.iter().map(ToolInvocation::to_tool_call).collect();
        Ok(ProviderReply::ToolInvocations {
            assistant: Message::assistant_tool_calls(Some(first_text), calls),
            invocations,
        })
    }
}

// ─────────────────────────────────────────────
// Rendering
// ─────────────────────────────────────────────

/// Render neutral history as Anthropic `messages`.
pub fn render_messages(messages: &[Message]) -> Vec<Value> {
    let mut out: Vec<Value> = Vec::with_capacity(messages.len());
    let mut pending_results: Vec<Value> = Vec::new();

    for message in messages {
        if let Message::Tool {
            content,
            tool_call_id,
        } = message
        {
            let mut block = Map::new();
            block.insert("type".into(), json!("tool_result"));
            block.insert("tool_use_id".into(), json!(tool_call_id));
            block.insert("content".into(), json!(content));
            if result_is_error(content) {
                block.insert("is_error".into(), json!(true));
            }
            pending_results.push(Value::Object(block));
            continue;
        }

        if !pending_results.is_empty() {
            out.push(json!({ "role": "user", "content": std::mem::take(&mut pending_results) }));
        }

        match message {
            Message::User { content } => {
                out.push(json!({ "role": "user", "content": render_user_content(content) }));
            }
            Message::Assistant {
                content,
                tool_calls,
            } => {
                // The API rejects empty assistant turns.
                let has_calls = tool_calls.as_deref().is_some_and(|c| !c.is_empty());
                let has_text = content.as_deref().is_some_and(|t| !t.trim().is_empty());
                if !has_calls && !has_text {
                    continue;
                }
                out.push(json!({
                    "role": "assistant",
                    "content": render_assistant_content(content.as_deref(), tool_calls.as_deref()),
                }));
            }
            Message::Tool { .. } => {}
        }
    }

    if !pending_results.is_empty() {
        out.push(json!({ "role": "user", "content": pending_results }));
    }
    out
}

fn render_user_content(content: &MessageContent) -> Value {
    match content {
        MessageContent::Text(text) => json!(text),
        MessageContent::Parts(parts) => Value::Array(
            parts
                .iter()
                .map(|part| match part {
                    ContentPart::Text { text } => json!({ "type": "text", "text": text }),
                    ContentPart::Image { mime_type, data } => json!({
                        "type": "image",
                        "source": { "type": "base64", "media_type": mime_type, "data": data },
                    }),
                })
                .collect(),
        ),
    }
}

fn render_assistant_content(text: Option<&str>, tool_calls: Option<&[ToolCall]>) -> Value {
    let calls = tool_calls.unwrap_or_default();
    if calls.is_empty() {
        return json!(text.unwrap_or_default());
    }

    let mut blocks = Vec::with_capacity(calls.len() + 1);
    if let Some(text) = text.filter(|t| !t.is_empty()) {
        blocks.push(json!({ "type": "text", "text": text }));
    }
    for call in calls {
        let input = serde_json::from_str::<Value>(&call.function.arguments)
            .ok()
            .filter(Value::is_object)
            .unwrap_or_else(|| json!({}));
        blocks.push(json!({
            "type": "tool_use",
            "id": call.id,
            "name": call.function.name,
            "input": input,
        }));
    }
    Value::Array(blocks)
}

fn result_is_error(content: &str) -> bool {
    serde_json::from_str::<Value>(content)
        .ok()
        .is_some_and(|v| v.get("error").is_some_and(|e| !e.is_null()))
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
