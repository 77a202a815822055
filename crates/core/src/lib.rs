//! Core types and shared functionality for redletter.
//!
//! This crate provides:
//! - SQLite storage for books, quotes, cached verses and search results
//! - Static book tables and verse identifier parsing
//! - Seed data for the curated quote list
//! - Unified error types
//! - Configuration structures

pub mod books;
pub mod cache;
pub mod config;
pub mod error;
pub mod reference;
pub mod seed;

pub use cache::{Book, CacheDb, CachedVerse, NewQuote, Quote, QuoteFilter, QuotePage, SearchCacheEntry};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
pub use reference::VerseId;
