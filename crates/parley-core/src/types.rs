//! Core types for Parley: the provider-neutral conversation model.
//!
//! Messages are stored in one canonical shape (role-tagged, OpenAI-like) and
//! rendered into each provider's wire format by the adapters. The agent loop
//! only ever deals with these types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Parameters passed to a tool: a flat JSON object keyed by argument name.
pub type ToolParams = HashMap<String, serde_json::Value>;

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// A chat message in a conversation.
///
/// Each variant maps to a `role` field value. System prompts are never stored
/// in a conversation; the adapters inject them per request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "role")]
pub enum Message {
    #[serde(rename = "user")]
    User { content: MessageContent },

    #[serde(rename = "assistant")]
    Assistant {
        #[serde(skip_serializing_if = "Option::is_none")]
        content: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_calls: Option<Vec<ToolCall>>,
    },

    #[serde(rename = "tool")]
    Tool {
        content: String,
        tool_call_id: String,
    },
}

impl Message {
    /// Create a user message with text content.
    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: MessageContent::Text(content.into()),
        }
    }

    /// Create a user message with ordered parts (image + optional text).
    pub fn user_parts(parts: Vec<ContentPart>) -> Self {
        Message::User {
            content: MessageContent::Parts(parts),
        }
    }

    /// Create an assistant message with text content.
    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: Some(content.into()),
            tool_calls: None,
        }
    }

    /// Create an assistant message carrying tool calls, with optional text.
    pub fn assistant_tool_calls(content: Option<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message::Assistant {
            content: content.filter(|c| !c.is_empty()),
            tool_calls: Some(tool_calls),
        }
    }

    /// Create a tool result message.
    pub fn tool_result(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Message::Tool {
            content: content.into(),
            tool_call_id: tool_call_id.into(),
        }
    }

    /// Whether this message is a tool result (and so must never open a history window).
    pub fn is_tool_result(&self) -> bool {
        matches!(self, Message::Tool { .. })
    }

    /// Tool calls carried by an assistant message (empty for anything else).
    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant {
                tool_calls: Some(calls),
                ..
            } => calls,
            _ => &[],
        }
    }
}

// ─────────────────────────────────────────────
// Message Content (text or ordered parts)
// ─────────────────────────────────────────────

/// User message content: plain text, or ordered parts when an image is attached.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single part of a multipart user message.
///
/// Provider-neutral: the adapters turn `Image` into an inline base64 source
/// (Anthropic) or a data URI (OpenAI-style).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image")]
    Image { mime_type: String, data: String },
}

/// An image attached to an incoming user message.
#[derive(Clone, Debug, PartialEq)]
pub struct ImageAttachment {
    /// Base64-encoded image bytes (no data-URI prefix).
    pub base64: String,
    /// MIME type, e.g. `"image/jpeg"`.
    pub mime_type: String,
}

impl ImageAttachment {
    pub fn new(base64: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
            mime_type: mime_type.into(),
        }
    }

    /// Build the ordered user-message parts: image first, then text if any.
    pub fn into_parts(self, text: &str) -> Vec<ContentPart> {
        let mut parts = vec![ContentPart::Image {
            mime_type: self.mime_type,
            data: self.base64,
        }];
        if !text.is_empty() {
            parts.push(ContentPart::Text {
                text: text.to_string(),
            });
        }
        parts
    }
}

// ─────────────────────────────────────────────
// Tool Calls (wire form stored in assistant messages)
// ─────────────────────────────────────────────

/// A tool call from the assistant, as stored in history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    /// Unique ID for this tool call (used to match results).
    pub id: String,
    /// Always "function".
    #[serde(rename = "type")]
    pub call_type: String,
    pub function: FunctionCall,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        ToolCall {
            id: id.into(),
            call_type: "function".to_string(),
            function: FunctionCall {
                name: name.into(),
                arguments: arguments.into(),
            },
        }
    }
}

/// The function name and arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded arguments string.
    pub arguments: String,
}

// ─────────────────────────────────────────────
// Tool invocations and results
// ─────────────────────────────────────────────

/// A request, originated by the model, to run a named tool.
///
/// Native provider calls and calls mined from text produce the same value, so
/// the execution loop never knows which path a call came from.
#[derive(Clone, Debug, PartialEq)]
pub struct ToolInvocation {
    pub id: String,
    pub name: String,
    /// JSON-encoded parameter object, exactly as it goes on the wire.
    pub arguments: String,
}

impl ToolInvocation {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments: arguments.into(),
        }
    }

    /// Build an invocation from an already-decoded parameter mapping.
    pub fn from_params(id: impl Into<String>, name: impl Into<String>, params: &ToolParams) -> Self {
        let arguments = serde_json::to_string(params).unwrap_or_else(|_| "{}".into());
        Self::new(id, name, arguments)
    }

    /// Decode the arguments into a parameter mapping.
    ///
    /// An empty argument string decodes to an empty mapping.
    pub fn params(&self) -> Result<ToolParams, serde_json::Error> {
        if self.arguments.trim().is_empty() {
            return Ok(ToolParams::new());
        }
        serde_json::from_str(&self.arguments)
    }

    /// The history form of this invocation.
    pub fn to_tool_call(&self) -> ToolCall {
        ToolCall::new(&self.id, &self.name, &self.arguments)
    }
}

/// The serialized output of one tool invocation, fed back to the model.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolResult {
    pub tool_call_id: String,
    /// JSON text of the tool's result object.
    pub content: String,
    /// Whether the result object carried an `error` field.
    #[serde(default)]
    pub is_error: bool,
}

impl ToolResult {
    /// Serialize a tool's result object. An `error` field marks it as an error.
    pub fn from_output(tool_call_id: impl Into<String>, output: &serde_json::Value) -> Self {
        let is_error = output.get("error").is_some_and(|e| !e.is_null());
        Self {
            tool_call_id: tool_call_id.into(),
            content: output.to_string(),
            is_error,
        }
    }

    /// Convert to the history message that pairs with the originating call.
    pub fn into_message(self) -> Message {
        Message::tool_result(self.tool_call_id, self.content)
    }

    /// Recover a result from its history message.
    pub fn from_message(message: &Message) -> Option<Self> {
        match message {
            Message::Tool {
                content,
                tool_call_id,
            } => {
                let is_error = serde_json::from_str::<serde_json::Value>(content)
                    .ok()
                    .is_some_and(|v| v.get("error").is_some_and(|e| !e.is_null()));
                Some(Self {
                    tool_call_id: tool_call_id.clone(),
                    content: content.clone(),
                    is_error,
                })
            }
            _ => None,
        }
    }
}

/// Static description of a registered tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    /// JSON Schema of the parameters object.
    pub parameters: serde_json::Value,
}

impl ToolDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters,
        }
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_user_text_message_serialization() {
        let msg = Message::user("Hello, world!");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "Hello, world!");
    }

    #[test]
    fn test_user_parts_serialization() {
        let parts = ImageAttachment::new("aGVsbG8=", "image/png").into_parts("What is this?");
        let msg = Message::user_parts(parts);
        let json = serde_json::to_value(&msg).unwrap();

        let content = json["content"].as_array().unwrap();
        assert_eq!(content.len(), 2);
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["mime_type"], "image/png");
        assert_eq!(content[1]["type"], "text");
        assert_eq!(content[1]["text"], "What is this?");
    }

    #[test]
    fn test_image_without_text_has_single_part() {
        let parts = ImageAttachment::new("abc", "image/jpeg").into_parts("");
        assert_eq!(parts.len(), 1);
    }

    #[test]
    fn test_assistant_text_message_serialization() {
        let msg = Message::assistant("The answer is 42.");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "assistant");
        assert_eq!(json["content"], "The answer is 42.");
        assert!(json.get("tool_calls").is_none());
    }

    #[test]
    fn test_assistant_tool_calls_serialization() {
        let msg = Message::assistant_tool_calls(
            None,
            vec![ToolCall::new("call_123", "web_search", r#"{"query":"rust"}"#)],
        );
        let json = serde_json::to_value(&msg).unwrap();

        assert!(json.get("content").is_none());
        let calls = json["tool_calls"].as_array().unwrap();
        assert_eq!(calls[0]["id"], "call_123");
        assert_eq!(calls[0]["type"], "function");
        assert_eq!(calls[0]["function"]["name"], "web_search");
    }

    #[test]
    fn test_assistant_tool_calls_drops_empty_text() {
        let msg = Message::assistant_tool_calls(Some(String::new()), vec![]);
        assert!(matches!(msg, Message::Assistant { content: None, .. }));
    }

    #[test]
    fn test_tool_result_serialization() {
        let msg = Message::tool_result("call_123", r#"{"ok":true}"#);
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "tool");
        assert_eq!(json["tool_call_id"], "call_123");
        assert!(msg.is_tool_result());
    }

    #[test]
    fn test_invocation_params_decode() {
        let inv = ToolInvocation::new("1", "echo", r#"{"x":1}"#);
        let params = inv.params().unwrap();
        assert_eq!(params.get("x"), Some(&json!(1)));
    }

    #[test]
    fn test_invocation_empty_arguments() {
        let inv = ToolInvocation::new("1", "ping", "");
        assert!(inv.params().unwrap().is_empty());
    }

    #[test]
    fn test_invocation_malformed_arguments() {
        let inv = ToolInvocation::new("1", "echo", "{not json");
        assert!(inv.params().is_err());
    }

    #[test]
    fn test_invocation_from_params() {
        let mut params = ToolParams::new();
        params.insert("to".into(), json!("bob@example.com"));
        let inv = ToolInvocation::from_params("call_x", "send_email", &params);
        assert_eq!(inv.params().unwrap(), params);
        assert_eq!(inv.to_tool_call().function.name, "send_email");
    }

    #[test]
    fn test_tool_result_error_flag() {
        let ok = ToolResult::from_output("1", &json!({"sent": true}));
        assert!(!ok.is_error);
        let failed = ToolResult::from_output("2", &json!({"error": "mailbox full"}));
        assert!(failed.is_error);
        let null_error = ToolResult::from_output("3", &json!({"error": null}));
        assert!(!null_error.is_error);
    }

    #[test]
    fn test_tool_result_wire_round_trip() {
        for output in [json!({"files": ["a.txt"]}), json!({"error": "not found"})] {
            let result = ToolResult::from_output("call_9", &output);
            let wire = serde_json::to_string(&result.clone().into_message()).unwrap();
            let decoded: Message = serde_json::from_str(&wire).unwrap();
            assert_eq!(ToolResult::from_message(&decoded), Some(result));
        }
    }

    #[test]
    fn test_message_round_trip() {
        let messages = vec![
            Message::user("What is 2+2?"),
            Message::assistant_tool_calls(None, vec![ToolCall::new("c1", "calc", "{}")]),
            Message::tool_result("c1", "4"),
            Message::assistant("The answer is 4."),
        ];

        let json_str = serde_json::to_string(&messages).unwrap();
        let deserialized: Vec<Message> = serde_json::from_str(&json_str).unwrap();

        assert_eq!(messages, deserialized);
    }
}
