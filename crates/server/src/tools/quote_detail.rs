//! quote_detail tool implementation.
//!
//! Shows one quote with its verse text, warming the quote first if none of
//! its verses are cached yet.

use redletter_core::Error;
use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::{VerseView, json_result};
use crate::state::AppState;

/// Verses resolved directly when warming leaves a quote empty.
const FALLBACK_VERSES: usize = 5;

/// Input parameters for quote_detail tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuoteDetailParams {
    /// Quote id from quote_list.
    pub id: i64,
}

/// Output structure for quote_detail tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct QuoteDetailOutput {
    pub id: i64,
    pub book: String,
    pub book_code: String,
    pub reference: String,
    /// Every verse identifier the quote covers.
    pub verse_ids: Vec<String>,
    /// Verses available for display, ordered by chapter and verse.
    pub verses: Vec<VerseView>,
}

/// Implementation of the quote_detail tool.
pub async fn detail_impl(state: &AppState, params: QuoteDetailParams) -> Result<CallToolResult, McpError> {
    let output = detail(state, params).await?;
    Ok(json_result(&output))
}

pub(crate) async fn detail(state: &AppState, params: QuoteDetailParams) -> Result<QuoteDetailOutput, McpError> {
    let quote = state
        .db
        .get_quote(params.id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("quote {}", params.id)))?;

    let mut cached = state.db.quote_verses(quote.id).await?;
    if cached.is_empty() {
        let fetched = state.warmer.warm_quote(&quote).await;
        tracing::debug!(quote_id = quote.id, fetched, "warmed quote for detail view");
        cached = state.db.quote_verses(quote.id).await?;
    }

    let mut verses: Vec<VerseView> = cached.into_iter().map(VerseView::from).collect();

    if verses.is_empty() {
        for verse_id in quote.verse_ids.iter().take(FALLBACK_VERSES) {
            if let Some(verse) = state.verses.resolve(verse_id).await {
                verses.push(verse.into());
            }
        }
        verses.sort_by_key(|v| (v.chapter, v.verse_number));
    }

    Ok(QuoteDetailOutput {
        id: quote.id,
        book: quote.book_name,
        book_code: quote.book_code,
        reference: quote.reference,
        verse_ids: quote.verse_ids,
        verses,
    })
}
