use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

use super::base::{Tool, ToolContext, ToolError, ToolResult};
use crate::activity::format_tool_status;
use crate::subagent::tracker::SubagentTracker;
use crate::subagent::types::SubagentStatus;

const TASK_PREVIEW_CHARS: usize = 100;

/// subagent_status - read-only view of the tracker for the supervising agent
pub struct SubagentStatusTool {
    tracker: Arc<SubagentTracker>,
}

impl SubagentStatusTool {
    pub fn new(tracker: Arc<SubagentTracker>) -> Self {
        Self { tracker }
    }

    fn list_running(&self) -> String {
        let running = self.tracker.get_running();
        if running.is_empty() {
            return "No subagents currently running.".to_string();
        }
        let lines: Vec<String> = running
            .iter()
            .map(|r| {
                format!(
                    "- [{}] {} | {} | {:.0}s elapsed",
                    r.id,
                    r.label,
                    r.display_status(),
                    r.elapsed().as_secs_f64()
                )
            })
            .collect();
        format!("{} running subagent(s):\n{}", running.len(), lines.join("\n"))
    }

    fn detail(&self, task_id: Option<&str>) -> String {
        let Some(task_id) = task_id.filter(|id| !id.is_empty()) else {
            return "Error: task_id is required for 'detail' action.".to_string();
        };
        let Some(r) = self.tracker.get(task_id) else {
            return format!("No subagent found with ID '{task_id}'.");
        };

        let mut task_preview: String = r.task.chars().take(TASK_PREVIEW_CHARS).collect();
        if r.task.chars().count() > TASK_PREVIEW_CHARS {
            task_preview.push_str("...");
        }
        let tools_used = if r.tools_used.is_empty() {
            "none".to_string()
        } else {
            r.tools_used.join(", ")
        };

        let mut lines = vec![
            format!("Subagent [{}]: {}", r.id, r.label),
            format!("  Status: {}", r.display_status()),
            format!("  Started: {}", r.spawned_at.format("%Y-%m-%d %H:%M:%S")),
            format!("  Task: {task_preview}"),
            format!("  Iteration: {}/{}", r.iteration, r.max_iterations),
            format!("  Elapsed: {:.1}s", r.elapsed().as_secs_f64()),
            format!("  Tools used: {tools_used}"),
        ];
        if let Some((name, args)) = r.current_tool() {
            lines.push(format!("  Currently: {}", format_tool_status(name, args)));
        }
        if let Some(summary) = r.result_summary() {
            lines.push(format!("  Result: {summary}"));
        }
        if let Some(error) = r.error_message() {
            lines.push(format!("  Error: {error}"));
        }
        lines.join("\n")
    }

    fn list_all(&self) -> String {
        let all = self.tracker.get_all();
        if all.is_empty() {
            return "No subagents tracked.".to_string();
        }
        let (running, finished): (Vec<_>, Vec<_>) = all.into_iter().partition(|r| r.is_running());

        let mut lines = Vec::new();
        if !running.is_empty() {
            lines.push(format!("Running ({}):", running.len()));
            for r in &running {
                lines.push(format!("  - [{}] {} | {}", r.id, r.label, r.display_status()));
            }
        }
        if !finished.is_empty() {
            lines.push(format!("Completed ({}):", finished.len()));
            for r in &finished {
                let icon = match r.status {
                    SubagentStatus::Completed { .. } => "ok",
                    _ => "ERR",
                };
                lines.push(format!(
                    "  - [{}] {} | {icon} | {:.0}s",
                    r.id,
                    r.label,
                    r.elapsed().as_secs_f64()
                ));
            }
        }
        lines.join("\n")
    }
}

#[derive(Debug, Deserialize)]
struct StatusParams {
    action: String,
    #[serde(default)]
    task_id: Option<String>,
}

#[async_trait::async_trait]
impl Tool for SubagentStatusTool {
    fn id(&self) -> &str {
        "subagent_status"
    }

    fn description(&self) -> &str {
        "Check the status of background subagents. Actions: 'list' shows running subagents, \
         'detail' shows full info for a specific subagent by ID, \
         'all' shows running plus recently completed."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "action": {
                    "type": "string",
                    "enum": ["list", "detail", "all"],
                    "description": "Action to perform: 'list' for running agents, 'detail' for one agent, 'all' for running + completed"
                },
                "task_id": {
                    "type": "string",
                    "description": "Subagent ID (required for 'detail' action)"
                }
            },
            "required": ["action"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: StatusParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        let output = match params.action.as_str() {
            "list" => self.list_running(),
            "detail" => self.detail(params.task_id.as_deref()),
            "all" => self.list_all(),
            other => format!("Unknown action: {other}"),
        };

        Ok(ToolResult::new(format!("subagent_status {}", params.action), output))
    }
}
