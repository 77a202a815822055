//! Remote collaborator traits.
//!
//! The resolvers only see these traits, so tests can substitute in-memory
//! fakes for the HTTP clients.

use async_trait::async_trait;

use crate::api_bible::{SearchRequest, SearchResponse};
use crate::error::ApiError;

/// Text of one verse as returned by the remote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedVerse {
    pub text: String,
}

/// Fetches a single verse by book slug, chapter and verse number.
#[async_trait]
pub trait VerseSource: Send + Sync {
    async fn fetch_verse(&self, slug: &str, chapter: u32, verse: u32) -> Result<FetchedVerse, ApiError>;
}

/// Runs a free-text verse search.
#[async_trait]
pub trait SearchSource: Send + Sync {
    async fn search(&self, req: &SearchRequest) -> Result<SearchResponse, ApiError>;
}
