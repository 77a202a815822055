//! Read-through verse search with a freshness window.

use std::sync::Arc;

use chrono::Duration;
use redletter_core::{CacheDb, CachedVerse, VerseId, books};
use serde::Serialize;

use super::clean::clean_verse_text;
use crate::api_bible::{SearchRequest, SearchResponse, SearchVerse};
use crate::source::SearchSource;

/// Search results plus where they came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchOutcome {
    pub results: SearchResponse,
    pub cache_hit: bool,
}

impl SearchOutcome {
    fn miss(results: SearchResponse) -> Self {
        Self { results, cache_hit: false }
    }
}

/// Serves searches from the search cache while fresh, otherwise from the
/// remote search source.
#[derive(Clone)]
pub struct SearchResolver {
    db: CacheDb,
    source: Arc<dyn SearchSource>,
    freshness: Duration,
}

impl SearchResolver {
    pub fn new(db: CacheDb, source: Arc<dyn SearchSource>, freshness: Duration) -> Self {
        Self { db, source, freshness }
    }

    /// Run a search. Failures never surface: they yield an empty result
    /// echoing the query, which is not cached.
    pub async fn search(&self, req: &SearchRequest) -> SearchOutcome {
        if req.is_blank() {
            return SearchOutcome::miss(SearchResponse::empty(&req.query));
        }

        let cache_key = req.cache_key();
        if let Some(results) = self.fresh_cached(&cache_key).await {
            tracing::debug!(%cache_key, "search cache hit");
            return SearchOutcome { results, cache_hit: true };
        }

        let mut results = match self.source.search(req).await {
            Ok(results) => results,
            Err(e) => {
                tracing::warn!(query = %req.query, error = %e, "search failed");
                return SearchOutcome::miss(SearchResponse::empty(&req.query));
            }
        };

        for verse in &mut results.verses {
            verse.text = clean_verse_text(&verse.text);
        }
        for verse in &results.verses {
            self.cache_verse(verse).await;
        }

        match serde_json::to_string(&results) {
            Ok(json) => {
                if let Err(e) = self.db.put_search(&cache_key, &req.query, &json).await {
                    tracing::warn!(%cache_key, error = %e, "failed to cache search");
                }
            }
            Err(e) => tracing::warn!(%cache_key, error = %e, "failed to encode search results"),
        }

        SearchOutcome::miss(results)
    }

    async fn fresh_cached(&self, cache_key: &str) -> Option<SearchResponse> {
        let entry = match self.db.get_search(cache_key).await {
            Ok(Some(entry)) => entry,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(cache_key, error = %e, "search cache read failed");
                return None;
            }
        };

        if !entry.is_fresh(self.freshness) {
            tracing::debug!(cache_key, created_at = %entry.created_at, "cached search is stale");
            return None;
        }

        match serde_json::from_str(&entry.results_json) {
            Ok(results) => Some(results),
            Err(e) => {
                tracing::warn!(cache_key, error = %e, "corrupt cached search");
                None
            }
        }
    }

    /// Store one search hit in the verse cache. Hits from books outside the
    /// static table, or with unparseable identifiers, are skipped.
    async fn cache_verse(&self, verse: &SearchVerse) {
        if verse.text.is_empty() || books::lookup(&verse.book_id).is_none() {
            tracing::debug!(verse_id = %verse.id, book_id = %verse.book_id, "not caching search hit");
            return;
        }

        let id = match VerseId::parse(&verse.id) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "skipping search hit");
                return;
            }
        };

        let row = CachedVerse::new(&verse.id, &verse.book_id, id.chapter, id.verse, &verse.text, &verse.reference);
        if let Err(e) = self.db.upsert_verse(&row).await {
            tracing::warn!(verse_id = %verse.id, error = %e, "failed to cache search hit");
        }
    }
}
