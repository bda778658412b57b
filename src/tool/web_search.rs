use crate::search::providers::BraveSearchProvider;
use crate::search::SearchProvider;
use crate::tool::base::{Tool, ToolContext, ToolError, ToolResult};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;

const MAX_COUNT: usize = 10;

/// web_search - queries the configured search provider
pub struct WebSearchTool {
    provider: Arc<dyn SearchProvider>,
}

impl WebSearchTool {
    /// Brave-backed search using the configured key (or BRAVE_API_KEY)
    pub fn new(api_key: Option<String>) -> Self {
        Self::with_provider(Arc::new(BraveSearchProvider::new(api_key)))
    }

    pub fn with_provider(provider: Arc<dyn SearchProvider>) -> Self {
        Self { provider }
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchParams {
    query: String,
    #[serde(default)]
    count: Option<usize>,
}

#[async_trait]
impl Tool for WebSearchTool {
    fn id(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web. Returns titles, URLs, and snippets."
    }

    fn input_schema(&self) -> serde_json::Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "Search query"
                },
                "count": {
                    "type": "integer",
                    "description": "Results (1-10)",
                    "minimum": 1,
                    "maximum": 10
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        _ctx: &ToolContext,
    ) -> Result<ToolResult, ToolError> {
        let params: WebSearchParams = serde_json::from_value(params)
            .map_err(|e| ToolError::InvalidParams(e.to_string()))?;

        if params.query.trim().is_empty() {
            return Err(ToolError::InvalidParams("query cannot be empty".into()));
        }
        let count = params.count.unwrap_or(5).clamp(1, MAX_COUNT);

        let items = self.provider.search(&params.query, count).await?;

        let output = if items.is_empty() {
            format!("No results for: {}", params.query)
        } else {
            let mut out = format!("Results for: {}\n", params.query);
            for (idx, item) in items.iter().enumerate() {
                out.push_str(&format!("\n{}. {}\n   {}", idx + 1, item.title, item.url));
                if !item.snippet.is_empty() {
                    out.push_str(&format!("\n   {}", item.snippet));
                }
            }
            out
        };

        Ok(ToolResult::new(format!("Web search: {}", params.query), output)
            .with_metadata("num_results", json!(items.len())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchError, SearchResult};
    use std::path::PathBuf;

    struct FixedProvider(Vec<SearchResult>);

    #[async_trait]
    impl SearchProvider for FixedProvider {
        async fn search(&self, _query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError> {
            Ok(self.0.iter().take(count).cloned().collect())
        }
    }

    struct NoKeyProvider;

    #[async_trait]
    impl SearchProvider for NoKeyProvider {
        async fn search(&self, _query: &str, _count: usize) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::InvalidApiKey)
        }
    }

    fn ctx() -> ToolContext {
        ToolContext::new("test", "test", "test", PathBuf::from("/tmp"))
    }

    #[tokio::test]
    async fn test_formats_results() {
        let tool = WebSearchTool::with_provider(Arc::new(FixedProvider(vec![SearchResult {
            title: "The Rust Book".into(),
            url: "https://doc.rust-lang.org/book/".into(),
            snippet: "Learn Rust".into(),
        }])));

        let result = tool.execute(json!({"query": "rust book"}), &ctx()).await.unwrap();
        assert!(result.output.starts_with("Results for: rust book"));
        assert!(result.output.contains("1. The Rust Book\n   https://doc.rust-lang.org/book/\n   Learn Rust"));
    }

    #[tokio::test]
    async fn test_validates_empty_query() {
        let tool = WebSearchTool::with_provider(Arc::new(FixedProvider(vec![])));
        let err = tool.execute(json!({"query": "   "}), &ctx()).await.unwrap_err();
        assert!(err.to_string().contains("cannot be empty"));
    }

    #[tokio::test]
    async fn test_missing_key_is_recoverable() {
        let tool = WebSearchTool::with_provider(Arc::new(NoKeyProvider));
        let err = tool.execute(json!({"query": "rust"}), &ctx()).await.unwrap_err();
        assert!(err.is_recoverable());
    }
}
