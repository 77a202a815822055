//! verse_search tool implementation.
//!
//! Free-text verse search through API.Bible, served from the search cache
//! while a previous result is fresh.

use redletter_client::{SearchRequest, SearchSort, SearchVerse, api_bible::request::MAX_LIMIT};
use redletter_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Input parameters for verse_search tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct VerseSearchParams {
    /// Search query. An empty query returns no results.
    pub query: String,

    /// 1-based page number (default 1).
    #[serde(default)]
    pub page: Option<u32>,

    /// Results per page (1-100, default 20).
    #[serde(default)]
    pub limit: Option<u32>,

    /// Ordering: canonical (default), relevance, reverse-canonical.
    #[serde(default)]
    pub sort: Option<String>,
}

/// A verse hit.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchHit {
    pub id: String,
    pub reference: String,
    /// Plain text with markup and leading verse number removed.
    pub text: String,
    pub book_id: String,
    pub chapter_id: String,
}

impl From<SearchVerse> for SearchHit {
    fn from(v: SearchVerse) -> Self {
        Self { id: v.id, reference: v.reference, text: v.text, book_id: v.book_id, chapter_id: v.chapter_id }
    }
}

/// Output structure for verse_search tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerseSearchOutput {
    pub verses: Vec<SearchHit>,
    /// Total matches reported by the remote.
    pub total: u64,
    pub query: String,
    pub page: u32,
    pub has_next: bool,
    pub has_previous: bool,
    /// Whether the result came from the search cache.
    pub cache_hit: bool,
}

/// Implementation of the verse_search tool.
pub async fn search_impl(state: &AppState, params: VerseSearchParams) -> Result<CallToolResult, McpError> {
    let output = search(state, params).await?;
    Ok(json_result(&output))
}

pub(crate) async fn search(state: &AppState, params: VerseSearchParams) -> Result<VerseSearchOutput, McpError> {
    let limit = params.limit.unwrap_or(20);
    if !(1..=MAX_LIMIT).contains(&limit) {
        return Err(Error::InvalidInput(format!("limit must be between 1 and {MAX_LIMIT}")).into());
    }

    let sort = match params.sort.as_deref() {
        None => SearchSort::default(),
        Some(raw) => raw.parse::<SearchSort>().map_err(Error::from)?,
    };

    let page = params.page.unwrap_or(1).max(1);
    let offset = (page - 1).saturating_mul(limit);
    let req = SearchRequest { query: params.query, limit, offset, sort };

    let outcome = state.search.search(&req).await;
    let results = outcome.results;

    Ok(VerseSearchOutput {
        has_next: u64::from(offset) + u64::from(limit) < results.total,
        has_previous: offset > 0,
        total: results.total,
        query: results.query,
        verses: results.verses.into_iter().map(SearchHit::from).collect(),
        page,
        cache_hit: outcome.cache_hit,
    })
}
