//! Web search provider client

use crate::config::SearchConfig;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use vendorscope_core::{Error, Result, SearchQuery, SearchResult, SearchVertical};

/// Executes one query and returns a page of results
#[async_trait]
pub trait SearchClient: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>>;
}

/// Serper (Google) search API
pub struct SerperClient {
    client: Client,
    api_key: String,
    config: SearchConfig,
}

#[derive(Debug, Serialize)]
struct SerperRequest<'a> {
    q: &'a str,
    num: u32,
    gl: &'a str,
    hl: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    tbs: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct SerperResponse {
    #[serde(default)]
    organic: Vec<SerperItem>,
    #[serde(default)]
    news: Vec<SerperItem>,
}

#[derive(Debug, Deserialize)]
struct SerperItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
    #[serde(default)]
    link: String,
}

impl From<SerperItem> for SearchResult {
    fn from(item: SerperItem) -> Self {
        SearchResult::new(item.title, item.snippet, item.link)
    }
}

impl SerperClient {
    pub fn new(api_key: impl Into<String>, config: SearchConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::config(format!("Failed to build search client: {}", e)))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            config,
        })
    }

    fn url(&self, vertical: SearchVertical) -> String {
        let path = match vertical {
            SearchVertical::Web => "search",
            SearchVertical::News => "news",
        };
        format!("{}/{}", self.config.endpoint.trim_end_matches('/'), path)
    }

    fn body<'a>(&'a self, query: &'a SearchQuery) -> SerperRequest<'a> {
        SerperRequest {
            q: &query.text,
            num: self.config.results_per_query,
            gl: &self.config.country,
            hl: &self.config.language,
            tbs: (query.lookback_years > 0).then(|| format!("qdr:y{}", query.lookback_years)),
        }
    }
}

/// Rejected credentials and exhausted quota fail every later query too, so
/// they abort the run; anything else only skips the query.
fn status_error(source: &str, status: StatusCode) -> Error {
    match status {
        StatusCode::UNAUTHORIZED
        | StatusCode::PAYMENT_REQUIRED
        | StatusCode::FORBIDDEN
        | StatusCode::TOO_MANY_REQUESTS => Error::config(format!(
            "{}: search provider rejected the API key or quota is exhausted ({})",
            source, status
        )),
        _ => Error::search(format!("{}: provider returned {}", source, status)),
    }
}

#[async_trait]
impl SearchClient for SerperClient {
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResult>> {
        let response = self
            .client
            .post(self.url(query.vertical))
            .header("X-API-KEY", &self.api_key)
            .json(&self.body(query))
            .send()
            .await
            .map_err(|e| Error::search(format!("{}: {}", query.source_name(), e)))?;

        if !response.status().is_success() {
            return Err(status_error(&query.source_name(), response.status()));
        }

        let data: SerperResponse = response
            .json()
            .await
            .map_err(|e| Error::search(format!("{}: malformed response: {}", query.source_name(), e)))?;

        let items = match query.vertical {
            SearchVertical::Web => data.organic,
            SearchVertical::News => data.news,
        };
        debug!(source = %query.source_name(), results = items.len(), "Search returned");

        Ok(items.into_iter().map(SearchResult::from).collect())
    }
}
