//! Tool host: the collaborator the agent loop executes tools through.
//!
//! The loop never touches a concrete tool. It asks the host which names are
//! registered, which schemas to send, and to run an invocation with an
//! explicit [`ToolContext`].

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use parley_core::types::{ToolDescriptor, ToolParams};
use parley_providers::ProviderKind;

/// Per-call context handed to every tool execution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ToolContext {
    /// Chat the invocation belongs to.
    pub chat_id: String,
}

impl ToolContext {
    pub fn new(chat_id: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
        }
    }
}

/// Lifecycle stage reported to [`ToolHost::log_tool_call`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ToolCallStatus {
    Running,
    Success,
    Error,
}

impl ToolCallStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ToolCallStatus::Running => "running",
            ToolCallStatus::Success => "success",
            ToolCallStatus::Error => "error",
        }
    }
}

impl std::fmt::Display for ToolCallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait ToolHost: Send + Sync {
    /// Look up a registered tool.
    fn get_tool(&self, name: &str) -> Option<ToolDescriptor>;

    /// Tool schemas in the shape `provider` expects.
    fn format_tools_for_ai(&self, provider: ProviderKind) -> Vec<Value>;

    /// Run a tool. Failures are reported inside the returned object as an
    /// `error` field, never as a Rust error.
    async fn execute_tool(&self, name: &str, params: ToolParams, ctx: &ToolContext) -> Value;

    /// Legacy hook for hosts that track the active chat in shared state.
    /// Called before every batch of invocations.
    fn set_current_chat_id(&self, _chat_id: &str) {}

    fn log_tool_call(&self, name: &str, status: ToolCallStatus, params: &ToolParams) {
        match status {
            ToolCallStatus::Running => info!(tool = name, params = params.len(), "tool call started"),
            ToolCallStatus::Success => info!(tool = name, "tool call succeeded"),
            ToolCallStatus::Error => warn!(tool = name, "tool call returned an error"),
        }
    }
}

/// Render descriptors as provider tool schemas.
///
/// Anthropic takes `{name, description, input_schema}`; chat-completion
/// providers take `{type: "function", function: {name, description, parameters}}`.
pub fn format_descriptors(descriptors: &[ToolDescriptor], provider: ProviderKind) -> Vec<Value> {
    descriptors
        .iter()
        .map(|d| match provider {
            ProviderKind::Anthropic => json!({
                "name": d.name,
                "description": d.description,
                "input_schema": d.parameters,
            }),
            ProviderKind::OpenRouter => json!({
                "type": "function",
                "function": {
                    "name": d.name,
                    "description": d.description,
                    "parameters": d.parameters,
                },
            }),
        })
        .collect()
}
