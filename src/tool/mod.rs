pub mod base;
pub mod context;
pub mod edit_file;
pub mod exec;
pub mod list_dir;
pub mod read_file;
pub mod spawn;
pub mod subagent_status;
pub mod web_fetch;
pub mod web_search;
pub mod write_file;

use base::{Tool, ToolContext, ToolError};
use serde_json::json;
use std::collections::HashMap;
use std::sync::Arc;

/// Tool registry - maps tool names to handlers and their call schemas
///
/// Starts empty; callers register exactly the capabilities an agent may use.
/// Read-only once handed to a runner.
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool under its own id, replacing any previous one.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.insert(tool.id().to_string(), tool);
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.tools.get(name)
    }

    /// Tool definitions in the provider's schema, sorted by name
    pub fn list_tool_definitions(&self) -> Vec<serde_json::Value> {
        let mut tools: Vec<&Arc<dyn Tool>> = self.tools.values().collect();
        tools.sort_by(|a, b| a.id().cmp(b.id()));
        tools
            .into_iter()
            .map(|tool| {
                json!({
                    "name": tool.id(),
                    "description": tool.description(),
                    "input_schema": tool.input_schema(),
                })
            })
            .collect()
    }

    /// Sorted tool names
    pub fn list_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Execute `name` and return its observation text.
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<String, ToolError> {
        let tool = self
            .get(name)
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))?;
        let result = tool.execute(params, ctx).await?;
        Ok(result.output)
    }
}
