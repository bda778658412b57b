use crate::config::station::Station;
use crate::llm::types::{ChatRequest, LlmResponse, Message, StreamChunk, ToolUse};
use crate::llm::LlmProvider;
use anyhow::{Context, Result};
use eventsource_stream::Eventsource;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::pin::Pin;
use tokio_stream::Stream;

/// Anthropic Messages API client
#[derive(Clone)]
pub struct AnthropicClient {
    client: Client,
    station: Station,
}

impl AnthropicClient {
    pub fn new(station: Station) -> Self {
        Self {
            client: Client::new(),
            station,
        }
    }

    /// Create a streaming chat completion
    pub async fn stream_chat(
        &self,
        request: ChatRequest,
    ) -> Result<Pin<Box<dyn Stream<Item = StreamChunk> + Send>>> {
        let api_base = self
            .station
            .api_base
            .as_deref()
            .unwrap_or(self.station.provider.default_base_url());

        let url = format!("{}/v1/messages", api_base);

        tracing::debug!(
            api_base = %api_base,
            model = %request.model,
            message_count = request.messages.len(),
            tool_count = request.tools.len(),
            "anthropic stream_chat request"
        );

        let request_body = CreateMessageRequest {
            model: request.model,
            system: request.system,
            messages: request.messages,
            max_tokens: request.max_tokens,
            temperature: Some(request.temperature),
            stream: true,
            tools: (!request.tools.is_empty()).then_some(request.tools),
        };

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.station.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .context("Network error: Failed to send request to Anthropic API. Check your internet connection.")?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .map(|body| crate::logging::redact_secrets(&body))
                .unwrap_or_else(|_| "Unknown error".to_string());

            tracing::warn!(
                status = %status,
                error = %error_text,
                "anthropic api returned error"
            );

            // Provide more specific error messages based on status code
            let error_msg = match status.as_u16() {
                401 => format!("Unauthorized (401): Invalid or missing API key. Please check your API key in ~/.config/fleet/config.toml\n\nDetails: {}", error_text),
                429 => format!("Rate Limit Exceeded (429): You've made too many requests. Please wait a moment and try again.\n\nDetails: {}", error_text),
                400 => format!("Bad Request (400): The request was invalid. Please check your input.\n\nDetails: {}", error_text),
                500..=599 => format!("Server Error ({}): The Anthropic API is experiencing issues. Please try again later.\n\nDetails: {}", status, error_text),
                _ => format!("API request failed ({}): {}", status, error_text),
            };

            anyhow::bail!(error_msg);
        }

        Ok(Box::pin(sse_chunks(response.bytes_stream())))
    }
}

/// Decode an SSE byte stream into chunks.
fn sse_chunks<S, B, E>(bytes: S) -> impl Stream<Item = StreamChunk> + Send
where
    S: Stream<Item = std::result::Result<B, E>> + Send,
    B: AsRef<[u8]> + Send,
    E: std::fmt::Display + Send,
{
    bytes
        .eventsource()
        .scan(StreamState::default(), |state, event| {
            let out = match event {
                Err(e) => Some(StreamChunk::Error(e.to_string())),
                Ok(event) => state.apply(&event.event, &event.data),
            };
            futures::future::ready(Some(out))
        })
        .filter_map(futures::future::ready)
}

/// Drain a chunk stream into one response. A stream that ends without
/// `message_stop` was cut off and is an error, not an empty answer.
async fn collect_response<S>(mut stream: S) -> Result<LlmResponse>
where
    S: Stream<Item = StreamChunk> + Unpin,
{
    let mut text = String::new();
    let mut tool_calls = Vec::new();
    let mut finished = false;

    while let Some(chunk) = stream.next().await {
        match chunk {
            StreamChunk::Text(delta) => text.push_str(&delta),
            StreamChunk::ToolUse(tool_use) => tool_calls.push(tool_use),
            StreamChunk::Done => {
                finished = true;
                break;
            }
            StreamChunk::Error(err) => anyhow::bail!("Anthropic stream error: {err}"),
        }
    }

    if !finished {
        tracing::warn!(
            text_len = text.len(),
            tool_calls = tool_calls.len(),
            "anthropic stream ended before message_stop"
        );
        anyhow::bail!("Anthropic stream ended before message_stop (connection dropped)");
    }

    Ok(LlmResponse {
        content: (!text.is_empty()).then_some(text),
        tool_calls,
    })
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicClient {
    async fn chat(&self, request: ChatRequest) -> Result<LlmResponse> {
        let stream = self.stream_chat(request).await?;
        collect_response(stream).await
    }

    fn default_model(&self) -> String {
        self.station.model.clone()
    }
}

/// Request body for creating a message
#[derive(Debug, Serialize)]
struct CreateMessageRequest {
    model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    messages: Vec<Message>,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<serde_json::Value>>,
}

/// Content block start event (for tool_use)
#[derive(Debug, Deserialize)]
struct ContentBlockStart {
    content_block: ContentBlockData,
}

#[derive(Debug, Deserialize)]
struct ContentBlockData {
    #[serde(rename = "type")]
    block_type: String,
    id: Option<String>,
    name: Option<String>,
    #[serde(default = "default_tool_input")]
    input: serde_json::Value,
}

/// Content block delta event
#[derive(Debug, Deserialize)]
struct ContentBlockDelta {
    delta: Delta,
}

#[derive(Debug, Deserialize)]
struct Delta {
    #[serde(rename = "type")]
    delta_type: String,
    text: Option<String>,
    partial_json: Option<String>,
}

fn default_tool_input() -> serde_json::Value {
    serde_json::json!({})
}

/// Accumulates partial tool_use input across SSE events
#[derive(Default)]
struct StreamState {
    pending_tool: Option<PendingToolUse>,
}

impl StreamState {
    /// Feed one SSE event; returns the chunk it completes, if any.
    fn apply(&mut self, event: &str, data: &str) -> Option<StreamChunk> {
        match event {
            "content_block_start" => {
                let start = serde_json::from_str::<ContentBlockStart>(data).ok()?;
                if start.content_block.block_type != "tool_use" {
                    return None;
                }
                let (Some(id), Some(name)) = (start.content_block.id, start.content_block.name)
                else {
                    return None;
                };

                tracing::debug!(tool_id = %id, tool_name = %name, "anthropic tool_use start");
                self.pending_tool = Some(PendingToolUse {
                    id,
                    name,
                    input: start.content_block.input,
                    input_json: String::new(),
                });
                None
            }
            "content_block_delta" => {
                let delta = serde_json::from_str::<ContentBlockDelta>(data).ok()?.delta;
                match delta.delta_type.as_str() {
                    "text_delta" => delta.text.map(StreamChunk::Text),
                    "input_json_delta" => {
                        if let (Some(pending), Some(partial)) =
                            (self.pending_tool.as_mut(), delta.partial_json)
                        {
                            pending.input_json.push_str(&partial);
                        }
                        None
                    }
                    _ => None,
                }
            }
            "content_block_stop" => {
                let pending = self.pending_tool.take()?;
                let input = if pending.input_json.trim().is_empty() {
                    pending.input
                } else {
                    match serde_json::from_str::<serde_json::Value>(&pending.input_json) {
                        Ok(v) => v,
                        Err(e) => {
                            return Some(StreamChunk::Error(format!(
                                "Failed to parse tool input JSON for '{}': {e}",
                                pending.name
                            )))
                        }
                    }
                };
                Some(StreamChunk::ToolUse(ToolUse {
                    id: pending.id,
                    name: pending.name,
                    input,
                }))
            }
            "message_stop" => match self.pending_tool.take() {
                Some(pending) => Some(StreamChunk::Error(format!(
                    "message stopped inside unfinished tool_use block for '{}'",
                    pending.name
                ))),
                None => Some(StreamChunk::Done),
            },
            "error" => Some(StreamChunk::Error(data.to_string())),
            _ => None,
        }
    }
}

struct PendingToolUse {
    id: String,
    name: String,
    input: serde_json::Value,
    input_json: String,
}
