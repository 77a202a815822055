//! Quote rows and their association with cached verses.
//!
//! A quote's verse-identifier list is written once at creation and is the
//! source of truth for which verses it should show; the `quote_verses`
//! join table records which of those have actually been cached.

use super::connection::{CacheDb, read_timestamp, timestamp};
use super::verses::{CachedVerse, VERSE_COLUMNS, verse_from_row};
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension, params_from_iter};

/// A curated quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub id: i64,
    pub book_code: String,
    /// Display name of the book, joined from `books`.
    pub book_name: String,
    /// Human-readable reference, e.g. `5:3-12`.
    pub reference: String,
    /// Verse identifiers in reading order.
    pub verse_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
}

/// Input for [`CacheDb::ensure_quote`].
#[derive(Debug, Clone)]
pub struct NewQuote {
    pub book_code: String,
    pub reference: String,
    pub verse_ids: Vec<String>,
}

/// Listing filter; every field is optional.
#[derive(Debug, Clone, Default)]
pub struct QuoteFilter {
    /// Exact book display name.
    pub book_name: Option<String>,
    /// Case-insensitive substring matched against cached verse text, book
    /// name and reference.
    pub text: Option<String>,
    /// 1-based page number. Out-of-range pages are clamped.
    pub page: usize,
    pub page_size: usize,
}

/// One page of quotes.
#[derive(Debug, Clone, Serialize)]
pub struct QuotePage {
    pub quotes: Vec<Quote>,
    pub total: u64,
    pub page: usize,
    pub num_pages: usize,
}

impl QuotePage {
    pub fn has_next(&self) -> bool {
        self.page < self.num_pages
    }

    pub fn has_previous(&self) -> bool {
        self.page > 1
    }
}

const QUOTE_COLUMNS: &str = "q.id, q.book_code, b.name, q.reference, q.verse_ids_json, q.created_at";
const QUOTE_FROM: &str = "FROM quotes q JOIN books b ON b.code = q.book_code";
const QUOTE_ORDER: &str = "ORDER BY b.canonical_order, q.reference";

fn quote_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Quote> {
    let verse_ids_json: String = row.get(4)?;
    let verse_ids = serde_json::from_str(&verse_ids_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(4, rusqlite::types::Type::Text, Box::new(e)))?;

    Ok(Quote {
        id: row.get(0)?,
        book_code: row.get(1)?,
        book_name: row.get(2)?,
        reference: row.get(3)?,
        verse_ids,
        created_at: read_timestamp(row, 5)?,
    })
}

/// Escape LIKE wildcards so user input only matches literally.
fn like_pattern(needle: &str) -> String {
    let escaped = needle.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_");
    format!("%{escaped}%")
}

impl CacheDb {
    /// Create a quote unless `(book_code, reference)` already exists.
    ///
    /// Returns the quote id and whether it was newly created. The verse list
    /// of an existing quote is never overwritten.
    pub async fn ensure_quote(&self, quote: &NewQuote) -> Result<(i64, bool), Error> {
        let quote = quote.clone();
        let verse_ids_json = serde_json::to_string(&quote.verse_ids)?;
        let now = timestamp(Utc::now());
        self.conn
            .call(move |conn| -> Result<(i64, bool), Error> {
                let inserted = conn.execute(
                    "INSERT INTO quotes (book_code, reference, verse_ids_json, created_at)
                     VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(book_code, reference) DO NOTHING",
                    params![quote.book_code, quote.reference, verse_ids_json, now],
                )?;
                let id = conn.query_row(
                    "SELECT id FROM quotes WHERE book_code = ?1 AND reference = ?2",
                    params![quote.book_code, quote.reference],
                    |row| row.get(0),
                )?;
                Ok((id, inserted > 0))
            })
            .await
            .map_err(Error::from)
    }

    pub async fn get_quote(&self, id: i64) -> Result<Option<Quote>, Error> {
        self.conn
            .call(move |conn| -> Result<Option<Quote>, Error> {
                conn.query_row(
                    &format!("SELECT {QUOTE_COLUMNS} {QUOTE_FROM} WHERE q.id = ?1"),
                    params![id],
                    quote_from_row,
                )
                .optional()
                .map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Every quote in canonical order, optionally capped at `limit`.
    pub async fn all_quotes(&self, limit: Option<usize>) -> Result<Vec<Quote>, Error> {
        let limit = limit.map_or(-1, |l| l as i64);
        self.conn
            .call(move |conn| -> Result<Vec<Quote>, Error> {
                let mut stmt = conn.prepare(&format!("SELECT {QUOTE_COLUMNS} {QUOTE_FROM} {QUOTE_ORDER} LIMIT ?1"))?;
                let rows = stmt.query_map(params![limit], quote_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Quotes with no attached cached verses, up to `limit`.
    pub async fn uncached_quotes(&self, limit: usize) -> Result<Vec<Quote>, Error> {
        let limit = limit as i64;
        self.conn
            .call(move |conn| -> Result<Vec<Quote>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {QUOTE_COLUMNS} {QUOTE_FROM}
                     WHERE NOT EXISTS (SELECT 1 FROM quote_verses qv WHERE qv.quote_id = q.id)
                     {QUOTE_ORDER} LIMIT ?1"
                ))?;
                let rows = stmt.query_map(params![limit], quote_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Page through quotes matching `filter`.
    pub async fn list_quotes(&self, filter: &QuoteFilter) -> Result<QuotePage, Error> {
        let filter = filter.clone();
        self.conn
            .call(move |conn| -> Result<QuotePage, Error> {
                let mut clauses = Vec::new();
                let mut args: Vec<String> = Vec::new();

                if let Some(book_name) = filter.book_name.filter(|b| !b.is_empty()) {
                    args.push(book_name);
                    clauses.push(format!("b.name = ?{}", args.len()));
                }

                if let Some(text) = filter.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
                    args.push(like_pattern(text));
                    let n = args.len();
                    clauses.push(format!(
                        "(EXISTS (SELECT 1 FROM quote_verses qv JOIN cached_verses cv ON cv.verse_id = qv.verse_id
                                  WHERE qv.quote_id = q.id AND cv.text LIKE ?{n} ESCAPE '\\')
                          OR b.name LIKE ?{n} ESCAPE '\\'
                          OR q.reference LIKE ?{n} ESCAPE '\\')"
                    ));
                }

                let where_sql =
                    if clauses.is_empty() { String::new() } else { format!("WHERE {}", clauses.join(" AND ")) };

                let total: i64 = conn.query_row(
                    &format!("SELECT COUNT(*) {QUOTE_FROM} {where_sql}"),
                    params_from_iter(args.iter()),
                    |row| row.get(0),
                )?;

                let page_size = filter.page_size.max(1);
                let num_pages = (total as usize).div_ceil(page_size).max(1);
                let page = filter.page.clamp(1, num_pages);
                let offset = (page - 1) * page_size;

                let mut stmt = conn.prepare(&format!(
                    "SELECT {QUOTE_COLUMNS} {QUOTE_FROM} {where_sql} {QUOTE_ORDER} LIMIT {page_size} OFFSET {offset}"
                ))?;
                let quotes = stmt
                    .query_map(params_from_iter(args.iter()), quote_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;

                Ok(QuotePage { quotes, total: total as u64, page, num_pages })
            })
            .await
            .map_err(Error::from)
    }

    pub async fn count_quotes(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM quotes", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }

    /// Associate a cached verse with a quote. Returns false if it already was.
    pub async fn attach_verse(&self, quote_id: i64, verse_id: &str) -> Result<bool, Error> {
        let verse_id = verse_id.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT OR IGNORE INTO quote_verses (quote_id, verse_id) VALUES (?1, ?2)",
                    params![quote_id, verse_id],
                )?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Cached verses attached to a quote, ordered by verse number.
    pub async fn quote_verses(&self, quote_id: i64) -> Result<Vec<CachedVerse>, Error> {
        self.conn
            .call(move |conn| -> Result<Vec<CachedVerse>, Error> {
                let mut stmt = conn.prepare(&format!(
                    "SELECT {VERSE_COLUMNS} FROM cached_verses cv
                     JOIN quote_verses qv ON qv.verse_id = cv.verse_id
                     WHERE qv.quote_id = ?1
                     ORDER BY cv.chapter, cv.verse_number"
                ))?;
                let rows = stmt.query_map(params![quote_id], verse_from_row)?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Book;
    use crate::cache::verses::tests::db_with_matthew;

    fn new_quote(reference: &str, verse_ids: &[&str]) -> NewQuote {
        NewQuote {
            book_code: "MAT".into(),
            reference: reference.into(),
            verse_ids: verse_ids.iter().map(|v| v.to_string()).collect(),
        }
    }

    #[tokio::test]
    async fn test_ensure_quote_round_trip() {
        let db = db_with_matthew().await;
        let (id, created) = db
            .ensure_quote(&new_quote("5:3-4", &["MAT.5.3", "MAT.5.4"]))
            .await
            .unwrap();
        assert!(created);

        let quote = db.get_quote(id).await.unwrap().unwrap();
        assert_eq!(quote.book_name, "Matthew");
        assert_eq!(quote.reference, "5:3-4");
        assert_eq!(quote.verse_ids, vec!["MAT.5.3", "MAT.5.4"]);
    }

    #[tokio::test]
    async fn test_ensure_quote_does_not_overwrite() {
        let db = db_with_matthew().await;
        let (first, _) = db.ensure_quote(&new_quote("5:3", &["MAT.5.3"])).await.unwrap();
        let (second, created) = db.ensure_quote(&new_quote("5:3", &["MAT.9.9"])).await.unwrap();
        assert_eq!(first, second);
        assert!(!created);
        assert_eq!(db.get_quote(first).await.unwrap().unwrap().verse_ids, vec!["MAT.5.3"]);
        assert_eq!(db.count_quotes().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_attach_and_list_quote_verses() {
        let db = db_with_matthew().await;
        let (id, _) = db.ensure_quote(&new_quote("5:3-4", &["MAT.5.3", "MAT.5.4"])).await.unwrap();
        db.upsert_verse(&CachedVerse::new("MAT.5.4", "MAT", 5, 4, "Blessed are they that mourn", "Matthew 5:4"))
            .await
            .unwrap();
        db.upsert_verse(&CachedVerse::new("MAT.5.3", "MAT", 5, 3, "Blessed are the poor", "Matthew 5:3"))
            .await
            .unwrap();

        assert!(db.attach_verse(id, "MAT.5.4").await.unwrap());
        assert!(db.attach_verse(id, "MAT.5.3").await.unwrap());
        assert!(!db.attach_verse(id, "MAT.5.3").await.unwrap());

        let verses = db.quote_verses(id).await.unwrap();
        let ids: Vec<&str> = verses.iter().map(|v| v.verse_id.as_str()).collect();
        assert_eq!(ids, vec!["MAT.5.3", "MAT.5.4"]);
    }

    #[tokio::test]
    async fn test_attach_uncached_verse_fails() {
        let db = db_with_matthew().await;
        let (id, _) = db.ensure_quote(&new_quote("5:3", &["MAT.5.3"])).await.unwrap();
        assert!(db.attach_verse(id, "MAT.5.3").await.is_err());
    }

    #[tokio::test]
    async fn test_uncached_quotes() {
        let db = db_with_matthew().await;
        let (cached, _) = db.ensure_quote(&new_quote("5:3", &["MAT.5.3"])).await.unwrap();
        let (uncached, _) = db.ensure_quote(&new_quote("6:9-13", &["MAT.6.9"])).await.unwrap();
        db.upsert_verse(&CachedVerse::new("MAT.5.3", "MAT", 5, 3, "Blessed", "Matthew 5:3"))
            .await
            .unwrap();
        db.attach_verse(cached, "MAT.5.3").await.unwrap();

        let ids: Vec<i64> = db.uncached_quotes(10).await.unwrap().into_iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![uncached]);
        assert!(db.uncached_quotes(0).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_quotes_filters_and_pages() {
        let db = db_with_matthew().await;
        db.ensure_book(&Book { code: "JHN".into(), name: "John".into(), canonical_order: 4 })
            .await
            .unwrap();
        let (sermon, _) = db.ensure_quote(&new_quote("5:3", &["MAT.5.3"])).await.unwrap();
        db.ensure_quote(&new_quote("6:9", &["MAT.6.9"])).await.unwrap();
        db.ensure_quote(&NewQuote { book_code: "JHN".into(), reference: "3:16".into(), verse_ids: vec![] })
            .await
            .unwrap();
        db.upsert_verse(&CachedVerse::new("MAT.5.3", "MAT", 5, 3, "Blessed are the poor in spirit", "Matthew 5:3"))
            .await
            .unwrap();
        db.attach_verse(sermon, "MAT.5.3").await.unwrap();

        let all = db.list_quotes(&QuoteFilter { page: 1, page_size: 2, ..Default::default() }).await.unwrap();
        assert_eq!(all.total, 3);
        assert_eq!(all.num_pages, 2);
        assert_eq!(all.quotes.len(), 2);
        assert!(all.has_next());
        assert!(!all.has_previous());

        let clamped = db.list_quotes(&QuoteFilter { page: 99, page_size: 2, ..Default::default() }).await.unwrap();
        assert_eq!(clamped.page, 2);
        assert_eq!(clamped.quotes.len(), 1);
        assert_eq!(clamped.quotes[0].book_code, "JHN");

        let john = db
            .list_quotes(&QuoteFilter { book_name: Some("John".into()), page: 1, page_size: 20, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(john.total, 1);

        let by_text = db
            .list_quotes(&QuoteFilter { text: Some("POOR in".into()), page: 1, page_size: 20, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_text.total, 1);
        assert_eq!(by_text.quotes[0].id, sermon);

        let by_reference = db
            .list_quotes(&QuoteFilter { text: Some("6:9".into()), page: 1, page_size: 20, ..Default::default() })
            .await
            .unwrap();
        assert_eq!(by_reference.total, 1);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off"), "%50\\%\\_off%");
    }
}
