use std::sync::Arc;

use crate::llm::{ChatRequest, LlmProvider, Message, ToolResultContent};
use crate::subagent::config::SubagentProfile;
use crate::subagent::tracker::SubagentTracker;
use crate::subagent::types::Phase;
use crate::tool::base::ToolContext;

/// Result text when the iteration cap is hit without a final answer
pub const NO_FINAL_RESPONSE: &str = "Task completed but no final response was generated.";

/// Errors that end a runner in the `Errored` state
#[derive(Debug, thiserror::Error)]
pub enum SubagentError {
    #[error("LLM error: {0}")]
    Provider(String),

    #[error("Tool '{tool}' failed: {message}")]
    Capability { tool: String, message: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Drives one task through a bounded request/act cycle.
///
/// The runner owns its conversation and tool registry. The only state it
/// shares is its own tracker record, which it moves through
/// `Thinking`/`ToolRunning` as it goes.
pub struct SubagentRunner {
    id: String,
    task: String,
    provider: Arc<dyn LlmProvider>,
    tracker: Arc<SubagentTracker>,
    profile: SubagentProfile,
}

impl SubagentRunner {
    pub fn new(
        id: impl Into<String>,
        task: impl Into<String>,
        provider: Arc<dyn LlmProvider>,
        tracker: Arc<SubagentTracker>,
        profile: SubagentProfile,
    ) -> Self {
        Self {
            id: id.into(),
            task: task.into(),
            provider,
            tracker,
            profile,
        }
    }

    /// Run to a final answer. Exhausting the iteration cap is not an error.
    pub async fn run(&self) -> Result<String, SubagentError> {
        let tools = self.profile.build_tool_registry();
        let definitions = tools.list_tool_definitions();
        let system = self.profile.system_prompt();
        let mut ctx = ToolContext::new(
            self.id.clone(),
            String::new(),
            "subagent",
            self.profile.workspace.clone(),
        )
        .with_allowed_dir(self.profile.allowed_dir());

        let mut messages = vec![Message::user(self.task.clone())];

        tracing::info!(
            agent_id = %self.id,
            model = %self.profile.model,
            max_iterations = self.profile.max_iterations,
            "subagent loop starting"
        );

        for iteration in 1..=self.profile.max_iterations {
            self.tracker.update_phase(&self.id, Phase::Thinking, Some(iteration));
            tracing::debug!(agent_id = %self.id, iteration, "subagent thinking");

            let response = self
                .provider
                .chat(ChatRequest {
                    system: Some(system.clone()),
                    messages: messages.clone(),
                    tools: definitions.clone(),
                    model: self.profile.model.clone(),
                    temperature: self.profile.temperature,
                    max_tokens: self.profile.max_tokens,
                })
                .await
                .map_err(|e| SubagentError::Provider(format!("{e:#}")))?;

            if !response.has_tool_calls() {
                tracing::info!(agent_id = %self.id, iteration, "subagent produced final answer");
                return Ok(response
                    .content
                    .filter(|c| !c.trim().is_empty())
                    .unwrap_or_else(|| NO_FINAL_RESPONSE.to_string()));
            }

            messages.push(Message::assistant_with_tool_calls(
                response.content.as_deref(),
                &response.tool_calls,
            ));

            let mut results = Vec::with_capacity(response.tool_calls.len());
            for call in response.tool_calls {
                self.tracker.update_phase(
                    &self.id,
                    Phase::ToolRunning {
                        tool_name: call.name.clone(),
                        arguments: call.input.clone(),
                    },
                    Some(iteration),
                );
                tracing::debug!(
                    agent_id = %self.id,
                    tool_name = %call.name,
                    arguments = %call.input,
                    "subagent executing tool"
                );

                ctx.message_id = call.id.clone();
                match tools.execute(&call.name, call.input, &ctx).await {
                    Ok(output) => results.push(ToolResultContent::new(call.id, output, false)),
                    Err(e) if e.is_recoverable() => {
                        tracing::warn!(agent_id = %self.id, tool_name = %call.name, error = %e, "tool error reported to model");
                        results.push(ToolResultContent::new(call.id, format!("Error: {e}"), true));
                    }
                    Err(e) => {
                        return Err(SubagentError::Capability {
                            tool: call.name,
                            message: format!("{e:#}"),
                        });
                    }
                }
            }
            messages.push(Message::tool_results(results));
        }

        tracing::warn!(agent_id = %self.id, "subagent hit iteration cap");
        Ok(NO_FINAL_RESPONSE.to_string())
    }
}
