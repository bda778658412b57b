use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::{Arc, Mutex};

use crate::subagent::manager::SubagentManager;
use crate::subagent::types::Origin;
use crate::tool::base::{Tool, ToolContext, ToolError, ToolResult};

/// spawn - hands a task to a background subagent
///
/// Returns immediately with the subagent id. The result arrives later as a
/// `system` message routed to the origin set with [`SpawnTool::set_context`].
pub struct SpawnTool {
    manager: Arc<SubagentManager>,
    origin: Mutex<Origin>,
}

impl SpawnTool {
    pub fn new(manager: Arc<SubagentManager>) -> Self {
        Self {
            manager,
            origin: Mutex::new(Origin::new("cli", "direct")),
        }
    }

    /// Route announcements for subsequent spawns to this channel/chat.
    pub fn set_context(&self, channel: impl Into<String>, chat_id: impl Into<String>) {
        let mut origin = self.origin.lock().unwrap_or_else(|p| p.into_inner());
        *origin = Origin::new(channel, chat_id);
    }

    fn origin(&self) -> Origin {
        self.origin.lock().unwrap_or_else(|p| p.into_inner()).clone()
    }
}

#[derive(Debug, Deserialize)]
struct SpawnParams {
    task: String,
    #[serde(default)]
    label: Option<String>,
}

#[async_trait]
impl Tool for SpawnTool {
    fn id(&self) -> &str {
        "spawn"
    }

    fn description(&self) -> &str {
        "Spawn a subagent to handle a task in the background. Use this for complex or \
         time-consuming tasks that can run independently. The subagent will complete the \
         task and report back when done."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "task": {
                    "type": "string",
                    "description": "The task for the subagent to complete"
                },
                "label": {
                    "type": "string",
                    "description": "Optional short label for the task (for display)"
                }
            },
            "required": ["task"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: SpawnParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let origin = self.origin();
        tracing::info!(
            parent_session = %ctx.session_id,
            route = %origin.route(),
            "spawn requested"
        );

        let ack = self
            .manager
            .spawn(&params.task, params.label.as_deref(), &origin.channel, &origin.chat_id)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        Ok(ToolResult::new("spawn", ack).with_metadata("route", json!(origin.route())))
    }
}
