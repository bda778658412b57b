pub mod providers;

use crate::tool::base::ToolError;

/// Backend for the web_search tool
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("API error: {0}")]
    ApiError(String),

    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    #[error("Search API key not configured or invalid")]
    InvalidApiKey,
}

impl From<SearchError> for ToolError {
    /// Missing keys and API refusals are reported back to the subagent;
    /// transport failures end the run.
    fn from(err: SearchError) -> Self {
        match err {
            SearchError::InvalidApiKey => ToolError::Unavailable(
                "web search needs a Brave API key (tools.brave_api_key or BRAVE_API_KEY)".into(),
            ),
            SearchError::RateLimitExceeded => {
                ToolError::Unavailable("search API rate limit exceeded".into())
            }
            SearchError::ApiError(msg) => ToolError::Unavailable(msg),
            SearchError::NetworkError(e) => ToolError::Other(e.into()),
        }
    }
}
