//! Tool trait: the interface in-process tools implement for [`ToolRegistry`].
//!
//! [`ToolRegistry`]: super::registry::ToolRegistry

use async_trait::async_trait;
use serde_json::Value;

use parley_core::types::{ToolDescriptor, ToolParams};

use super::host::ToolContext;

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every registered tool implements this trait.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name the model uses to call this tool (e.g. `"remember"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the model.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> Value;

    /// Execute the tool.
    ///
    /// Returns the result object the model reads. On failure return an `Err`;
    /// the registry converts it into an `{"error": ...}` result.
    async fn execute(&self, params: ToolParams, ctx: &ToolContext) -> anyhow::Result<Value>;

    fn descriptor(&self) -> ToolDescriptor {
        ToolDescriptor::new(self.name(), self.description(), self.parameters())
    }
}

// ─────────────────────────────────────────────
// Param helpers
// ─────────────────────────────────────────────

/// Extract a required `String` param, returning a user-friendly error.
pub fn require_string(params: &ToolParams, key: &str) -> anyhow::Result<String> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("Missing required parameter: {key}"))
}

/// Extract an optional `String` param.
pub fn optional_string(params: &ToolParams, key: &str) -> Option<String> {
    params.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_require_string() {
        let mut params = ToolParams::new();
        params.insert("note".into(), json!("buy milk"));
        assert_eq!(require_string(&params, "note").unwrap(), "buy milk");

        params.insert("note".into(), json!(42));
        assert!(require_string(&params, "note").is_err());
        assert!(require_string(&ToolParams::new(), "note").is_err());
    }

    #[test]
    fn test_optional_string() {
        let mut params = ToolParams::new();
        params.insert("tag".into(), json!("home"));
        assert_eq!(optional_string(&params, "tag"), Some("home".into()));
        assert_eq!(optional_string(&params, "other"), None);
    }

    #[test]
    fn test_default_descriptor() {
        struct Dummy;

        #[async_trait]
        impl Tool for Dummy {
            fn name(&self) -> &str {
                "dummy"
            }
            fn description(&self) -> &str {
                "A test tool"
            }
            fn parameters(&self) -> Value {
                json!({"type": "object", "properties": {}, "required": []})
            }
            async fn execute(&self, _params: ToolParams, _ctx: &ToolContext) -> anyhow::Result<Value> {
                Ok(json!({}))
            }
        }

        let descriptor = Dummy.descriptor();
        assert_eq!(descriptor.name, "dummy");
        assert_eq!(descriptor.description, "A test tool");
        assert_eq!(descriptor.parameters["type"], "object");
    }
}
