//! API.Bible client.
//!
//! Used for free-text verse search and for the book list consulted during
//! setup.
//!
//! ### Specification
//!
//! - **Endpoint**: `{base}/bibles/{bible_id}/search` and `{base}/bibles/{bible_id}/books`
//! - **Authentication**: `api-key` header. Requests without a configured key
//!   fail with [`ApiError::MissingApiKey`] before any network call.
//! - **Timeout**: search gets its own, longer timeout (15s default).

pub mod request;
pub mod response;

pub use request::{SearchRequest, SearchSort};
pub use response::{SearchResponse, SearchVerse};

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;

use crate::error::ApiError;
use crate::source::SearchSource;

/// API.Bible client configuration.
#[derive(Debug, Clone)]
pub struct ApiBibleConfig {
    /// API key; `None` disables search.
    pub api_key: Option<String>,
    pub base_url: String,
    /// Translation identifier.
    pub bible_id: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for ApiBibleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.scripture.api.bible/v1".to_string(),
            bible_id: "de4e12af7f28f599-02".to_string(),
            timeout: Duration::from_secs(15),
            user_agent: "redletter/0.1".to_string(),
        }
    }
}

impl From<&redletter_core::AppConfig> for ApiBibleConfig {
    fn from(config: &redletter_core::AppConfig) -> Self {
        Self {
            api_key: config.require_api_bible_key().ok().map(str::to_owned),
            base_url: config.api_bible_base_url.clone(),
            bible_id: config.bible_id.clone(),
            timeout: config.search_timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

/// API.Bible HTTP client.
#[derive(Debug, Clone)]
pub struct ApiBibleClient {
    http: reqwest::Client,
    config: ApiBibleConfig,
}

impl ApiBibleClient {
    pub fn new(config: ApiBibleConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    pub fn has_api_key(&self) -> bool {
        self.config.api_key.is_some()
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/bibles/{}/{}", self.config.base_url.trim_end_matches('/'), self.config.bible_id, path)
    }

    async fn get_json<T, Q>(&self, url: &str, query: Option<&Q>) -> Result<T, ApiError>
    where
        T: DeserializeOwned,
        Q: serde::Serialize + ?Sized,
    {
        let api_key = self.config.api_key.as_deref().ok_or(ApiError::MissingApiKey)?;

        let mut builder = self
            .http
            .get(url)
            .header("api-key", api_key)
            .header(header::ACCEPT, "application/json");
        if let Some(query) = query {
            builder = builder.query(query);
        }

        let response = builder.send().await?;
        let status = response.status();
        tracing::debug!(%url, %status, "API.Bible response");

        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Book code to display name, for the configured translation.
    pub async fn books(&self) -> Result<HashMap<String, String>, ApiError> {
        let url = self.endpoint("books");
        let raw: response::ApiBooksEnvelope = self.get_json::<_, ()>(&url, None).await?;
        Ok(raw.into())
    }
}

#[async_trait]
impl SearchSource for ApiBibleClient {
    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ApiError> {
        req.validate()?;

        let start = Instant::now();
        let url = self.endpoint("search");
        tracing::debug!(query = %req.query, "searching API.Bible");

        let raw: response::ApiSearchEnvelope = self.get_json(&url, Some(req)).await?;
        let response = SearchResponse::from_api(raw, &req.query);

        tracing::debug!(elapsed = ?start.elapsed(), results = response.verses.len(), "search completed");
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_from_app_config() {
        let mut app = redletter_core::AppConfig::default();
        let config = ApiBibleConfig::from(&app);
        assert!(config.api_key.is_none());
        assert_eq!(config.timeout, Duration::from_secs(15));

        app.api_bible_key = Some("  ".into());
        assert!(ApiBibleConfig::from(&app).api_key.is_none());

        app.api_bible_key = Some("secret".into());
        assert_eq!(ApiBibleConfig::from(&app).api_key.as_deref(), Some("secret"));

        app.api_bible_key = Some(" secret\n".into());
        assert_eq!(ApiBibleConfig::from(&app).api_key.as_deref(), Some("secret"));
    }

    #[test]
    fn test_endpoint() {
        let config = ApiBibleConfig { base_url: "https://example.test/v1/".into(), ..Default::default() };
        let client = ApiBibleClient::new(config).unwrap();
        assert_eq!(client.endpoint("search"), "https://example.test/v1/bibles/de4e12af7f28f599-02/search");
    }

    #[tokio::test]
    async fn test_search_without_key() {
        let client = ApiBibleClient::new(ApiBibleConfig::default()).unwrap();
        assert!(!client.has_api_key());
        let result = client.search(&SearchRequest::new("grace")).await;
        assert!(matches!(result, Err(ApiError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_books_without_key() {
        let client = ApiBibleClient::new(ApiBibleConfig::default()).unwrap();
        assert!(matches!(client.books().await, Err(ApiError::MissingApiKey)));
    }

    #[tokio::test]
    async fn test_search_rejects_blank_query() {
        let config = ApiBibleConfig { api_key: Some("k".into()), ..Default::default() };
        let client = ApiBibleClient::new(config).unwrap();
        let result = client.search(&SearchRequest::new("")).await;
        assert!(matches!(result, Err(ApiError::InvalidRequest(_))));
    }
}
