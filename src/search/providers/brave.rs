use crate::search::{SearchError, SearchProvider, SearchResult};
use std::time::Duration;

const BRAVE_ENDPOINT: &str = "https://api.search.brave.com/res/v1/web/search";

/// Brave Search API provider
///
/// The key comes from `tools.brave_api_key` in the config, falling back to
/// the BRAVE_API_KEY environment variable.
pub struct BraveSearchProvider {
    client: reqwest::Client,
    api_key: String,
}

impl BraveSearchProvider {
    pub fn new(api_key: Option<String>) -> Self {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("BRAVE_API_KEY").ok())
            .unwrap_or_default();
        if api_key.is_empty() {
            tracing::debug!("no brave api key, web_search will report unavailable");
        }

        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(10))
                .build()
                .unwrap_or_default(),
            api_key,
        }
    }

    fn parse_results(json: &serde_json::Value, count: usize) -> Vec<SearchResult> {
        json["web"]["results"]
            .as_array()
            .map(|results| {
                results
                    .iter()
                    .take(count)
                    .map(|r| SearchResult {
                        title: r["title"].as_str().unwrap_or_default().to_string(),
                        url: r["url"].as_str().unwrap_or_default().to_string(),
                        snippet: r["description"].as_str().unwrap_or_default().to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[async_trait::async_trait]
impl SearchProvider for BraveSearchProvider {
    async fn search(&self, query: &str, count: usize) -> Result<Vec<SearchResult>, SearchError> {
        if self.api_key.is_empty() {
            return Err(SearchError::InvalidApiKey);
        }

        tracing::debug!(query = %query, count, "performing brave search");

        let response = self
            .client
            .get(BRAVE_ENDPOINT)
            .header("X-Subscription-Token", &self.api_key)
            .header("Accept", "application/json")
            .query(&[("q", query), ("count", &count.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, error = %error_text, "brave search api error");

            return match status.as_u16() {
                401 | 403 => Err(SearchError::InvalidApiKey),
                429 => Err(SearchError::RateLimitExceeded),
                _ => Err(SearchError::ApiError(format!("HTTP {status}: {error_text}"))),
            };
        }

        let json: serde_json::Value = response.json().await?;
        let items = Self::parse_results(&json, count);
        tracing::debug!(query = %query, result_count = items.len(), "brave search completed");
        Ok(items)
    }
}
