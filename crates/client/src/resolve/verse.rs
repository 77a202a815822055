//! Read-through resolution of single verses.

use std::sync::Arc;

use redletter_core::{CacheDb, CachedVerse, Error, VerseId};
use serde::{Deserialize, Serialize};

use crate::source::VerseSource;

/// A verse ready for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedVerse {
    pub verse_id: String,
    /// Display reference, e.g. `Matthew 5:3`.
    pub reference: String,
    pub text: String,
    pub chapter: u32,
    pub verse: u32,
    /// True when served from the local cache.
    pub cached: bool,
}

impl From<CachedVerse> for ResolvedVerse {
    fn from(v: CachedVerse) -> Self {
        Self {
            verse_id: v.verse_id,
            reference: v.reference,
            text: v.text,
            chapter: v.chapter,
            verse: v.verse_number,
            cached: true,
        }
    }
}

/// Resolves verse identifiers against the local cache, falling back to the
/// remote verse source and persisting what it fetches.
#[derive(Clone)]
pub struct VerseResolver {
    db: CacheDb,
    source: Arc<dyn VerseSource>,
}

impl VerseResolver {
    pub fn new(db: CacheDb, source: Arc<dyn VerseSource>) -> Self {
        Self { db, source }
    }

    pub fn db(&self) -> &CacheDb {
        &self.db
    }

    /// Resolve an identifier, reporting every failure as `None`.
    pub async fn resolve(&self, verse_id: &str) -> Option<ResolvedVerse> {
        match self.try_resolve(verse_id).await {
            Ok(verse) => Some(verse),
            Err(e) => {
                tracing::warn!(verse_id, error = %e, "verse unavailable");
                None
            }
        }
    }

    /// Resolve an identifier, keeping the reason for a failure.
    ///
    /// # Errors
    ///
    /// `MalformedVerseId` and `UnsupportedBook` for bad identifiers; remote
    /// failures map through [`crate::ApiError`]. Cache read and write
    /// failures are logged, never returned.
    pub async fn try_resolve(&self, verse_id: &str) -> Result<ResolvedVerse, Error> {
        let id = VerseId::parse(verse_id)?;

        if let Some(cached) = self.lookup_cached(verse_id).await {
            tracing::debug!(verse_id, "verse cache hit");
            return Ok(cached.into());
        }

        self.fetch_remote(verse_id, &id).await
    }

    /// Cached row for `verse_id`. A failed read counts as a miss.
    pub async fn lookup_cached(&self, verse_id: &str) -> Option<CachedVerse> {
        match self.db.get_verse(verse_id).await {
            Ok(found) => found,
            Err(e) => {
                tracing::warn!(verse_id, error = %e, "verse cache read failed");
                None
            }
        }
    }

    /// Fetch from the remote source and persist the result, skipping the
    /// cache lookup.
    pub async fn fetch_remote(&self, verse_id: &str, id: &VerseId) -> Result<ResolvedVerse, Error> {
        let book = id.book()?;
        let fetched = self.source.fetch_verse(book.slug, id.chapter, id.verse).await?;
        let reference = id.display_reference()?;

        let row = CachedVerse::new(verse_id, &id.book_code, id.chapter, id.verse, &fetched.text, &reference);
        if let Err(e) = self.db.upsert_verse(&row).await {
            tracing::warn!(verse_id, error = %e, "failed to cache verse");
        }

        Ok(ResolvedVerse {
            verse_id: verse_id.to_string(),
            reference,
            text: fetched.text,
            chapter: id.chapter,
            verse: id.verse,
            cached: false,
        })
    }
}
