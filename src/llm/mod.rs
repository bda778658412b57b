pub mod anthropic;
pub mod types;

pub use types::{ChatRequest, LlmResponse, Message, ToolResultContent, ToolUse};

use anyhow::Result;

/// Request/response boundary to a language model.
///
/// Implementations only need to turn one [`ChatRequest`] into one collected
/// [`LlmResponse`]; callers own the conversation.
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    async fn chat(&self, request: ChatRequest) -> Result<LlmResponse>;

    /// Model used when the caller has no override
    fn default_model(&self) -> String;
}
