//! MCP tool implementations.
//!
//! This module contains all tools exposed by the redletter server.
#![allow(unused_imports)]

pub mod quote_detail;
pub mod quote_list;
pub mod verse_get;
pub mod verse_search;
pub mod warm_quotes;

#[cfg(test)]
pub(crate) mod testing;

pub use quote_detail::{QuoteDetailOutput, QuoteDetailParams};
pub use quote_list::{QuoteListOutput, QuoteListParams};
pub use verse_get::{VerseGetOutput, VerseGetParams};
pub use verse_search::{VerseSearchOutput, VerseSearchParams};
pub use warm_quotes::{WarmQuotesOutput, WarmQuotesParams};

use redletter_client::ResolvedVerse;
use redletter_core::CachedVerse;
use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A verse as shown alongside a quote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct VerseView {
    /// Verse identifier, e.g. `MAT.5.3`.
    pub id: String,
    /// Display reference, e.g. `Matthew 5:3`.
    pub reference: String,
    pub text: String,
    pub chapter: u32,
    pub verse_number: u32,
    /// Whether the text came from the local cache.
    pub cached: bool,
}

impl From<CachedVerse> for VerseView {
    fn from(v: CachedVerse) -> Self {
        Self {
            id: v.verse_id,
            reference: v.reference,
            text: v.text,
            chapter: v.chapter,
            verse_number: v.verse_number,
            cached: true,
        }
    }
}

impl From<ResolvedVerse> for VerseView {
    fn from(v: ResolvedVerse) -> Self {
        Self {
            id: v.verse_id,
            reference: v.reference,
            text: v.text,
            chapter: v.chapter,
            verse_number: v.verse,
            cached: v.cached,
        }
    }
}

/// Wrap a serializable output as a successful tool result.
pub(crate) fn json_result<T: Serialize>(output: &T) -> CallToolResult {
    CallToolResult::success(vec![Content::text(serde_json::to_string_pretty(output).unwrap_or_default())])
}
