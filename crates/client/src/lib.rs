//! Client code for redletter.
//!
//! This crate provides the HTTP clients for the verse CDN and API.Bible,
//! and the cache-backed verse resolver, search resolver and quote warmer
//! shared by the server and CLI.

pub mod api_bible;
pub mod error;
pub mod resolve;
pub mod source;
pub mod verse_cdn;

pub use api_bible::{ApiBibleClient, ApiBibleConfig, SearchRequest, SearchResponse, SearchSort, SearchVerse};
pub use error::ApiError;
pub use resolve::{
    QuoteWarmer, ResolvedVerse, SearchOutcome, SearchResolver, VerseResolver, WarmGuard, WarmSummary,
    clean_verse_text,
};
pub use source::{FetchedVerse, SearchSource, VerseSource};
pub use verse_cdn::{VerseCdnClient, VerseCdnConfig};
