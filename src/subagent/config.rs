use chrono::Local;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::station::{SubagentSettings, ToolSettings};
use crate::tool::edit_file::EditFileTool;
use crate::tool::exec::ExecTool;
use crate::tool::list_dir::ListDirTool;
use crate::tool::read_file::ReadFileTool;
use crate::tool::web_fetch::WebFetchTool;
use crate::tool::web_search::WebSearchTool;
use crate::tool::write_file::WriteFileTool;
use crate::tool::ToolRegistry;

/// Tools a subagent may use. Never `spawn`, `message` or `subagent_status`.
pub const SUBAGENT_TOOLS: &[&str] = &[
    "read_file",
    "write_file",
    "edit_file",
    "list_dir",
    "exec",
    "web_search",
    "web_fetch",
];

/// Resolved per-runner settings
#[derive(Debug, Clone)]
pub struct SubagentProfile {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub max_iterations: u32,
    pub workspace: PathBuf,
    pub restrict_to_workspace: bool,
    pub tools: ToolSettings,
}

impl SubagentProfile {
    /// Apply the `[subagents]` overrides on top of the provider's default model.
    pub fn resolve(
        settings: &SubagentSettings,
        tools: &ToolSettings,
        default_model: String,
        workspace: PathBuf,
    ) -> Self {
        Self {
            model: settings.model.clone().unwrap_or(default_model),
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            max_iterations: settings.max_iterations.max(1),
            workspace: settings.workspace.clone().unwrap_or(workspace),
            restrict_to_workspace: settings.restrict_to_workspace,
            tools: tools.clone(),
        }
    }

    pub fn allowed_dir(&self) -> Option<PathBuf> {
        self.restrict_to_workspace.then(|| self.workspace.clone())
    }

    /// Fresh registry holding only the runner tool set
    pub fn build_tool_registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(ReadFileTool::new()));
        registry.register(Arc::new(WriteFileTool));
        registry.register(Arc::new(EditFileTool));
        registry.register(Arc::new(ListDirTool));
        registry.register(Arc::new(ExecTool::new(self.tools.exec_timeout_secs)));
        registry.register(Arc::new(WebSearchTool::new(self.tools.brave_api_key.clone())));
        registry.register(Arc::new(WebFetchTool::new(self.tools.web_fetch_max_chars)));
        registry
    }

    pub fn system_prompt(&self) -> String {
        build_system_prompt(&self.workspace)
    }
}

/// Fixed preamble for every runner
pub fn build_system_prompt(workspace: &Path) -> String {
    let now = Local::now();
    let workspace = workspace.display();
    format!(
        "# Subagent

## Current Time
{} ({})

You are a subagent spawned by the main agent to complete a specific task.

## Rules
1. Stay focused - complete only the assigned task, nothing else
2. Your final response will be reported back to the main agent
3. Do not initiate conversations or take on side tasks
4. Be concise but informative in your findings

## What You Can Do
- Read and write files in the workspace
- Execute shell commands
- Search the web and fetch web pages
- Complete the task thoroughly

## What You Cannot Do
- Send messages directly to users (no message tool available)
- Spawn other subagents
- Access the main agent's conversation history

## Workspace
Your workspace is at: {workspace}
Skills are available at: {workspace}/skills/ (read SKILL.md files as needed)

When you have completed the task, provide a clear summary of your findings or actions.",
        now.format("%Y-%m-%d %H:%M (%A)"),
        now.format("%:z"),
    )
}
