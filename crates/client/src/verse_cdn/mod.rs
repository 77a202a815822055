//! Static verse CDN client.
//!
//! Single verses are served as JSON files under
//! `{base}/{version}/books/{slug}/chapters/{chapter}/verses/{verse}.json`,
//! with the text in a `text` field. No key is required.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header;
use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::source::{FetchedVerse, VerseSource};

/// Verse CDN client configuration.
#[derive(Debug, Clone)]
pub struct VerseCdnConfig {
    pub base_url: String,
    /// Translation directory, e.g. `en-kjv`.
    pub version: String,
    pub timeout: Duration,
    pub user_agent: String,
}

impl Default for VerseCdnConfig {
    fn default() -> Self {
        Self {
            base_url: "https://cdn.jsdelivr.net/gh/wldeh/bible-api/bibles".to_string(),
            version: "en-kjv".to_string(),
            timeout: Duration::from_secs(10),
            user_agent: "redletter/0.1".to_string(),
        }
    }
}

impl From<&redletter_core::AppConfig> for VerseCdnConfig {
    fn from(config: &redletter_core::AppConfig) -> Self {
        Self {
            base_url: config.verse_base_url.clone(),
            version: config.bible_version.clone(),
            timeout: config.timeout(),
            user_agent: config.user_agent.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CdnVerse {
    #[serde(default)]
    text: String,
}

/// HTTP client for the verse CDN.
#[derive(Debug, Clone)]
pub struct VerseCdnClient {
    http: reqwest::Client,
    config: VerseCdnConfig,
}

impl VerseCdnClient {
    pub fn new(config: VerseCdnConfig) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| ApiError::Network(Arc::new(e)))?;

        Ok(Self { http, config })
    }

    /// URL of one verse file.
    pub fn verse_url(&self, slug: &str, chapter: u32, verse: u32) -> Result<Url, ApiError> {
        let chapter = chapter.to_string();
        let file = format!("{verse}.json");
        let mut url = Url::parse(&self.config.base_url).map_err(|e| ApiError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(self.config.base_url.clone()))?
            .pop_if_empty()
            .extend([
                self.config.version.as_str(),
                "books",
                slug,
                "chapters",
                chapter.as_str(),
                "verses",
                file.as_str(),
            ]);
        Ok(url)
    }
}

fn parse_verse(bytes: &[u8]) -> Result<FetchedVerse, ApiError> {
    let raw: CdnVerse = serde_json::from_slice(bytes).map_err(|e| ApiError::Parse(e.to_string()))?;
    let text = raw.text.trim();
    if text.is_empty() {
        return Err(ApiError::EmptyVerse);
    }
    Ok(FetchedVerse { text: text.to_string() })
}

#[async_trait]
impl VerseSource for VerseCdnClient {
    async fn fetch_verse(&self, slug: &str, chapter: u32, verse: u32) -> Result<FetchedVerse, ApiError> {
        let url = self.verse_url(slug, chapter, verse)?;
        tracing::debug!(%url, "fetching verse");

        let response = self
            .http
            .get(url)
            .header(header::ACCEPT, "application/json")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(ApiError::from_status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        parse_verse(&bytes)
    }
}
