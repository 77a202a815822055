//! SQLite-backed storage for books, quotes, cached verses and search results.
//!
//! This module provides a persistent cache using SQLite with async access
//! via tokio-rusqlite. It supports:
//!
//! - Idempotent upserts keyed by verse identifier and search cache key
//! - Automatic schema migrations
//! - WAL mode for concurrent access
//! - Quote/verse association and paged quote listing

pub mod books;
pub mod connection;
pub mod migrations;
pub mod quotes;
pub mod search;
pub mod verses;

pub use crate::Error;

pub use books::Book;
pub use connection::CacheDb;
pub use quotes::{NewQuote, Quote, QuoteFilter, QuotePage};
pub use search::SearchCacheEntry;
pub use verses::CachedVerse;
