//! Tool Registry: the default in-process [`ToolHost`].
//!
//! Tools are registered once at startup and dispatched by name.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::{info, warn};

use parley_core::types::{ToolDescriptor, ToolParams};
use parley_providers::ProviderKind;

use super::base::Tool;
use super::host::{format_descriptors, ToolContext, ToolHost};

// ─────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────

/// Stores tools keyed by name.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        info!(tool = tool.name(), "registered tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Descriptors of all registered tools, sorted by name.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> =
            self.tools.values().map(|t| t.descriptor()).collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }
}

#[async_trait]
impl ToolHost for ToolRegistry {
    fn get_tool(&self, name: &str) -> Option<ToolDescriptor> {
        self.tools.get(name).map(|t| t.descriptor())
    }

    fn format_tools_for_ai(&self, provider: ProviderKind) -> Vec<Value> {
        format_descriptors(&self.descriptors(), provider)
    }

    async fn execute_tool(&self, name: &str, params: ToolParams, ctx: &ToolContext) -> Value {
        let Some(tool) = self.tools.get(name) else {
            warn!(tool = name, "tool not found");
            return json!({ "error": format!("Tool '{name}' not found") });
        };

        match tool.execute(params, ctx).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = name, chat_id = %ctx.chat_id, error = %e, "tool execution failed");
                json!({ "error": format!("Error executing {name}: {e}") })
            }
        }
    }
}
