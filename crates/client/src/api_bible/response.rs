//! API.Bible response types and normalization.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Raw envelope of the search endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiSearchEnvelope {
    pub data: ApiSearchData,
}

/// Search payload. Reference-style queries may return passages instead of
/// verses, in which case `verses` is absent.
#[derive(Debug, Deserialize)]
pub struct ApiSearchData {
    #[serde(default)]
    pub verses: Vec<ApiVerse>,
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub query: Option<String>,
}

/// Individual verse hit from API.Bible.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiVerse {
    pub id: String,
    #[serde(default)]
    pub reference: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub book_id: String,
    #[serde(default)]
    pub chapter_id: String,
}

/// Raw envelope of the books endpoint.
#[derive(Debug, Deserialize)]
pub struct ApiBooksEnvelope {
    pub data: Vec<ApiBook>,
}

#[derive(Debug, Deserialize)]
pub struct ApiBook {
    pub id: String,
    pub name: String,
}

/// Normalized search result set. This is also the shape persisted in the
/// search cache.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub verses: Vec<SearchVerse>,
    pub total: u64,
    pub query: String,
}

/// Normalized verse hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchVerse {
    pub id: String,
    pub reference: String,
    pub text: String,
    pub book_id: String,
    pub chapter_id: String,
}

impl SearchResponse {
    /// Empty result echoing the query.
    pub fn empty(query: impl Into<String>) -> Self {
        Self { verses: Vec::new(), total: 0, query: query.into() }
    }

    /// Normalize a raw envelope; `query` is used when the remote omits it.
    pub fn from_api(raw: ApiSearchEnvelope, query: &str) -> Self {
        let verses = raw
            .data
            .verses
            .into_iter()
            .map(|v| SearchVerse {
                id: v.id,
                reference: v.reference,
                text: v.text,
                book_id: v.book_id,
                chapter_id: v.chapter_id,
            })
            .collect();

        Self { verses, total: raw.data.total, query: raw.data.query.unwrap_or_else(|| query.to_string()) }
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }
}

impl From<ApiBooksEnvelope> for HashMap<String, String> {
    fn from(raw: ApiBooksEnvelope) -> Self {
        raw.data.into_iter().map(|b| (b.id, b.name)).collect()
    }
}
