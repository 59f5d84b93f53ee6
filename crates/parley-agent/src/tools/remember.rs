//! `remember` tool: lets the model write to today's notes.
//!
//! Notes land in the same files [`MemoryPromptComposer`] reads, so anything
//! remembered shows up in the system prompt on the next turn.
//!
//! [`MemoryPromptComposer`]: crate::memory::MemoryPromptComposer

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use parley_core::types::ToolParams;

use super::base::{optional_string, require_string, Tool};
use super::host::ToolContext;
use crate::memory::MemoryStore;

pub struct RememberTool {
    memory: MemoryStore,
}

impl RememberTool {
    pub fn new(memory: MemoryStore) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for RememberTool {
    fn name(&self) -> &str {
        "remember"
    }

    fn description(&self) -> &str {
        "Save a short note to today's memory so it is available in later conversations."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "note": { "type": "string", "description": "The fact or reminder to store" },
                "topic": { "type": "string", "description": "Optional short label" }
            },
            "required": ["note"]
        })
    }

    async fn execute(&self, params: ToolParams, ctx: &ToolContext) -> anyhow::Result<Value> {
        let note = require_string(&params, "note")?;
        let line = match optional_string(&params, "topic") {
            Some(topic) => format!("- [{}] ({topic}) {note}", ctx.chat_id),
            None => format!("- [{}] {note}", ctx.chat_id),
        };
        self.memory.append_today(&line)?;
        debug!(chat_id = %ctx.chat_id, "note saved");
        Ok(json!({ "saved": true, "file": self.memory.today_file().display().to_string() }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_remember_appends_with_chat_id() {
        let dir = tempfile::tempdir().unwrap();
        let memory = MemoryStore::new(dir.path());
        let tool = RememberTool::new(memory.clone());

        let mut params = ToolParams::new();
        params.insert("note".into(), json!("likes tea"));
        params.insert("topic".into(), json!("prefs"));
        let result = tool.execute(params, &ToolContext::new("42")).await.unwrap();

        assert_eq!(result["saved"], true);
        assert!(memory.read_today().contains("- [42] (prefs) likes tea"));
    }

    #[tokio::test]
    async fn test_remember_requires_note() {
        let dir = tempfile::tempdir().unwrap();
        let tool = RememberTool::new(MemoryStore::new(dir.path()));
        let err = tool
            .execute(ToolParams::new(), &ToolContext::new("42"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("note"));
    }
}
