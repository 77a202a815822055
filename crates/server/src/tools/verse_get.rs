//! verse_get tool implementation.
//!
//! Resolves a single verse identifier, serving from the cache when possible.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::json_result;
use crate::state::AppState;

/// Input parameters for verse_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerseGetParams {
    /// Verse identifier in BOOK.CHAPTER.VERSE form, e.g. "MAT.5.3".
    pub verse_id: String,
}

/// Output structure for verse_get tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct VerseGetOutput {
    pub verse_id: String,
    /// Display reference, e.g. "Matthew 5:3".
    pub reference: String,
    pub text: String,
    pub chapter: u32,
    pub verse: u32,
    /// True when served from the local cache.
    pub cached: bool,
}

/// Implementation of the verse_get tool.
pub async fn get_impl(state: &AppState, params: VerseGetParams) -> Result<CallToolResult, McpError> {
    let verse_id = params.verse_id.trim();
    let verse = state.verses.try_resolve(verse_id).await.inspect_err(|e| {
        tracing::warn!(verse_id, error = %e, "verse_get failed");
    })?;

    let output = VerseGetOutput {
        verse_id: verse.verse_id,
        reference: verse.reference,
        text: verse.text,
        chapter: verse.chapter,
        verse: verse.verse,
        cached: verse.cached,
    };
    Ok(json_result(&output))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing::{FakeVerses, fixture};

    fn output_of(result: CallToolResult) -> VerseGetOutput {
        let text = result.content[0].as_text().unwrap().text.clone();
        serde_json::from_str(&text).unwrap()
    }

    #[tokio::test]
    async fn test_get_fetches_then_caches() {
        let verses =
            FakeVerses::default().with("luke", 23, 34, "Father, forgive them; for they know not what they do.");
        let fx = fixture(verses).await;

        let first = output_of(get_impl(&fx.state, VerseGetParams { verse_id: "LUK.23.34".into() }).await.unwrap());
        assert_eq!(first.reference, "Luke 23:34");
        assert!(!first.cached);

        let second = output_of(get_impl(&fx.state, VerseGetParams { verse_id: " LUK.23.34 ".into() }).await.unwrap());
        assert!(second.cached);
        assert_eq!(second.text, first.text);
        assert_eq!(fx.verses.calls(), 1);
    }

    #[tokio::test]
    async fn test_get_error_codes() {
        let fx = fixture(FakeVerses::default()).await;

        let malformed = get_impl(&fx.state, VerseGetParams { verse_id: "MAT.5".into() }).await.unwrap_err();
        assert_eq!(malformed.code.0, -32602);

        let unsupported = get_impl(&fx.state, VerseGetParams { verse_id: "GEN.1.1".into() }).await.unwrap_err();
        assert_eq!(unsupported.code.0, -32003);

        let missing = get_impl(&fx.state, VerseGetParams { verse_id: "MAT.99.1".into() }).await.unwrap_err();
        assert_eq!(missing.code.0, -32008);
    }
}
