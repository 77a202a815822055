//! quote_list tool implementation.
//!
//! Pages through curated quotes with their cached verses. Listing may also
//! start a small background warm pass.

use redletter_core::QuoteFilter;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{VerseView, json_result};
use crate::state::AppState;

/// Input parameters for quote_list tool.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct QuoteListParams {
    /// Exact book name to filter by, e.g. "John".
    #[serde(default)]
    pub book: Option<String>,

    /// Case-insensitive text matched against cached verse text, book name and reference.
    #[serde(default)]
    pub q: Option<String>,

    /// 1-based page number (default 1). Out-of-range pages are clamped.
    #[serde(default)]
    pub page: Option<usize>,
}

/// One quote in a listing.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuoteSummary {
    pub id: i64,
    pub book: String,
    pub book_code: String,
    /// Human-readable reference, e.g. "5:3-12".
    pub reference: String,
    /// Verses cached so far, in reading order. May be empty.
    pub verses: Vec<VerseView>,
}

/// Output structure for quote_list tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuoteListOutput {
    pub quotes: Vec<QuoteSummary>,
    /// Quotes matching the filter across all pages.
    pub total: u64,
    pub page: usize,
    pub num_pages: usize,
    pub has_next: bool,
    pub has_previous: bool,
    /// Book names available for filtering, in canonical order.
    pub books: Vec<String>,
    /// Whether this request started a background warm pass.
    pub warm_scheduled: bool,
}

/// Implementation of the quote_list tool.
pub async fn list_impl(state: &AppState, params: QuoteListParams) -> Result<CallToolResult, McpError> {
    let output = list(state, params).await?;
    Ok(json_result(&output))
}

pub(crate) async fn list(state: &AppState, params: QuoteListParams) -> Result<QuoteListOutput, McpError> {
    let filter = QuoteFilter {
        book_name: params.book,
        text: params.q,
        page: params.page.unwrap_or(1),
        page_size: state.config.page_size,
    };

    let page = state.db.list_quotes(&filter).await?;

    let mut quotes = Vec::with_capacity(page.quotes.len());
    for quote in &page.quotes {
        let verses = state.db.quote_verses(quote.id).await?;
        quotes.push(QuoteSummary {
            id: quote.id,
            book: quote.book_name.clone(),
            book_code: quote.book_code.clone(),
            reference: quote.reference.clone(),
            verses: verses.into_iter().map(VerseView::from).collect(),
        });
    }

    let books = state.db.list_books().await?.into_iter().map(|b| b.name).collect();
    let warm_scheduled = state.scheduler.maybe_spawn(&state.warmer).is_some();

    Ok(QuoteListOutput {
        quotes,
        total: page.total,
        page: page.page,
        num_pages: page.num_pages,
        has_next: page.has_next(),
        has_previous: page.has_previous(),
        books,
        warm_scheduled,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::WarmScheduler;
    use crate::tools::testing::{FakeVerses, fixture, fixture_with_scheduler};
    use redletter_core::CachedVerse;
    use std::time::Duration;

    #[tokio::test]
    async fn test_first_page() {
        let fx = fixture(FakeVerses::default()).await;
        let output = list(&fx.state, QuoteListParams::default()).await.unwrap();

        assert_eq!(output.page, 1);
        assert_eq!(output.quotes.len(), 20);
        assert!(output.total > 20);
        assert!(output.has_next);
        assert!(!output.has_previous);
        assert_eq!(output.books.first().map(String::as_str), Some("Matthew"));
        assert!(output.quotes.iter().all(|q| q.book == "Matthew"));
        assert!(!output.warm_scheduled);
    }

    #[tokio::test]
    async fn test_book_filter_and_page_clamp() {
        let fx = fixture(FakeVerses::default()).await;
        let params = QuoteListParams { book: Some("Revelation".into()), page: Some(99), ..Default::default() };
        let output = list(&fx.state, params).await.unwrap();

        assert_eq!(output.page, 1);
        assert_eq!(output.num_pages, 1);
        assert!(!output.quotes.is_empty());
        assert!(output.quotes.iter().all(|q| q.book_code == "REV"));
    }

    #[tokio::test]
    async fn test_text_filter_matches_cached_verse_text() {
        let fx = fixture(FakeVerses::default()).await;
        let db = &fx.state.db;
        let quote = db
            .all_quotes(None)
            .await
            .unwrap()
            .into_iter()
            .find(|q| q.book_code == "JHN" && q.reference == "14:6")
            .unwrap();
        db.upsert_verse(&CachedVerse::new(
            "JHN.14.6",
            "JHN",
            14,
            6,
            "I am the way, the truth, and the life",
            "John 14:6",
        ))
        .await
        .unwrap();
        db.attach_verse(quote.id, "JHN.14.6").await.unwrap();

        let params = QuoteListParams { q: Some("THE TRUTH".into()), ..Default::default() };
        let output = list(&fx.state, params).await.unwrap();
        assert_eq!(output.total, 1);
        assert_eq!(output.quotes[0].id, quote.id);
        assert_eq!(output.quotes[0].verses[0].reference, "John 14:6");
    }

    #[tokio::test]
    async fn test_listing_schedules_background_warm() {
        let verses = FakeVerses::default().with("matthew", 10, 16, "be ye therefore wise as serpents");
        let scheduler = WarmScheduler::with_roll(0.2, Duration::from_secs(300), 1, || 0.0);
        let fx = fixture_with_scheduler(verses, scheduler).await;

        let first = list(&fx.state, QuoteListParams::default()).await.unwrap();
        assert!(first.warm_scheduled);

        let second = list(&fx.state, QuoteListParams::default()).await.unwrap();
        assert!(!second.warm_scheduled, "cooldown should suppress a second pass");
    }
}
