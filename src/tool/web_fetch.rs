use super::base::{Tool, ToolContext, ToolError, ToolResult};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

const FETCH_TIMEOUT: Duration = Duration::from_secs(30);
const WRAP_WIDTH: usize = 100;

/// web_fetch - downloads a URL and converts HTML to readable text
pub struct WebFetchTool {
    client: reqwest::Client,
    max_chars: usize,
}

impl WebFetchTool {
    pub fn new(max_chars: usize) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(FETCH_TIMEOUT)
                .user_agent(concat!("fleet/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            max_chars,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WebFetchParams {
    url: String,
    #[serde(default)]
    max_chars: Option<usize>,
}

/// Only http(s) URLs with a host are fetched.
fn validate_url(raw: &str) -> Result<reqwest::Url, ToolError> {
    let url = reqwest::Url::parse(raw)
        .map_err(|e| ToolError::InvalidParams(format!("invalid URL '{raw}': {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ToolError::InvalidParams(format!(
            "only http/https URLs are allowed, got '{}'",
            url.scheme()
        )));
    }
    if url.host_str().is_none() {
        return Err(ToolError::InvalidParams(format!("URL '{raw}' has no host")));
    }
    Ok(url)
}

fn truncate_chars(text: &str, max: usize) -> (String, bool) {
    if text.chars().count() <= max {
        (text.to_string(), false)
    } else {
        (text.chars().take(max).collect(), true)
    }
}

#[async_trait::async_trait]
impl Tool for WebFetchTool {
    fn id(&self) -> &str {
        "web_fetch"
    }

    fn description(&self) -> &str {
        "Fetch a URL and extract readable content (HTML converted to text)."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "URL to fetch"
                },
                "max_chars": {
                    "type": "integer",
                    "minimum": 100
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: WebFetchParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;
        let url = validate_url(&params.url)?;
        let max_chars = params.max_chars.unwrap_or(self.max_chars);

        tracing::debug!(url = %url, "web_fetch start");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| ToolError::Other(e.into()))?;

        let status = response.status();
        let final_url = response.url().to_string();
        let is_html = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("text/html"));

        let body = response
            .text()
            .await
            .map_err(|e| ToolError::Other(e.into()))?;

        if !status.is_success() {
            return Err(ToolError::Unavailable(format!("HTTP {status} fetching {final_url}")));
        }

        let looks_like_html = is_html || body.trim_start().to_ascii_lowercase().starts_with("<!doctype")
            || body.trim_start().starts_with("<html");
        let text = if looks_like_html {
            html2text::from_read(body.as_bytes(), WRAP_WIDTH)
        } else {
            body
        };

        let (text, truncated) = truncate_chars(&text, max_chars);

        tracing::debug!(url = %final_url, chars = text.len(), truncated, "web_fetch complete");

        let mut output = format!("URL: {final_url}\n\n{text}");
        if truncated {
            output.push_str(&format!("\n\n(truncated to {max_chars} chars)"));
        }

        Ok(ToolResult::new(format!("Fetched {final_url}"), output)
            .with_metadata("status", json!(status.as_u16()))
            .with_metadata("truncated", json!(truncated)))
    }
}
