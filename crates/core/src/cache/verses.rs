//! Cached verse rows.
//!
//! A verse is written once, on its first successful fetch, and never
//! expires. The identifier is the primary key, so repeated or racing
//! upserts collapse onto one row.

use super::connection::{CacheDb, read_timestamp, timestamp};
use crate::Error;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, OptionalExtension};

/// A locally persisted copy of one verse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CachedVerse {
    /// External identifier, e.g. `MAT.5.3`.
    pub verse_id: String,
    pub book_code: String,
    pub chapter: u32,
    pub verse_number: u32,
    pub text: String,
    /// Display reference, e.g. `Matthew 5:3`.
    pub reference: String,
    pub created_at: DateTime<Utc>,
}

impl CachedVerse {
    pub fn new(
        verse_id: impl Into<String>, book_code: impl Into<String>, chapter: u32, verse_number: u32,
        text: impl Into<String>, reference: impl Into<String>,
    ) -> Self {
        Self {
            verse_id: verse_id.into(),
            book_code: book_code.into(),
            chapter,
            verse_number,
            text: text.into(),
            reference: reference.into(),
            created_at: Utc::now(),
        }
    }
}

pub(crate) const VERSE_COLUMNS: &str =
    "cv.verse_id, cv.book_code, cv.chapter, cv.verse_number, cv.text, cv.reference, cv.created_at";

pub(crate) fn verse_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CachedVerse> {
    Ok(CachedVerse {
        verse_id: row.get(0)?,
        book_code: row.get(1)?,
        chapter: row.get(2)?,
        verse_number: row.get(3)?,
        text: row.get(4)?,
        reference: row.get(5)?,
        created_at: read_timestamp(row, 6)?,
    })
}

impl CacheDb {
    /// Look up a cached verse by identifier.
    pub async fn get_verse(&self, verse_id: &str) -> Result<Option<CachedVerse>, Error> {
        let verse_id = verse_id.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CachedVerse>, Error> {
                conn.query_row(
                    &format!("SELECT {VERSE_COLUMNS} FROM cached_verses cv WHERE cv.verse_id = ?1"),
                    params![verse_id],
                    verse_from_row,
                )
                .optional()
                .map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// Insert or update a cached verse keyed by its identifier.
    ///
    /// The identifier and creation time of an existing row never change;
    /// only the content columns are refreshed. Returns true if a new row was
    /// created.
    pub async fn upsert_verse(&self, verse: &CachedVerse) -> Result<bool, Error> {
        let verse = verse.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let tx = conn.transaction()?;
                let inserted = tx.execute(
                    "INSERT INTO cached_verses
                        (verse_id, book_code, chapter, verse_number, text, reference, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                     ON CONFLICT(verse_id) DO NOTHING",
                    params![
                        verse.verse_id,
                        verse.book_code,
                        verse.chapter,
                        verse.verse_number,
                        verse.text,
                        verse.reference,
                        timestamp(verse.created_at),
                    ],
                )?;

                if inserted == 0 {
                    tx.execute(
                        "UPDATE cached_verses
                         SET book_code = ?2, chapter = ?3, verse_number = ?4, text = ?5, reference = ?6
                         WHERE verse_id = ?1",
                        params![
                            verse.verse_id,
                            verse.book_code,
                            verse.chapter,
                            verse.verse_number,
                            verse.text,
                            verse.reference,
                        ],
                    )?;
                }

                tx.commit()?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn count_verses(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let count: i64 = conn.query_row("SELECT COUNT(*) FROM cached_verses", [], |row| row.get(0))?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::cache::Book;

    pub(crate) async fn db_with_matthew() -> CacheDb {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.ensure_book(&Book { code: "MAT".into(), name: "Matthew".into(), canonical_order: 1 })
            .await
            .unwrap();
        db
    }

    fn blessed() -> CachedVerse {
        CachedVerse::new("MAT.5.3", "MAT", 5, 3, "Blessed are the poor in spirit", "Matthew 5:3")
    }

    #[tokio::test]
    async fn test_upsert_and_get_verse() {
        let db = db_with_matthew().await;
        assert!(db.upsert_verse(&blessed()).await.unwrap());

        let stored = db.get_verse("MAT.5.3").await.unwrap().unwrap();
        assert_eq!(stored.text, "Blessed are the poor in spirit");
        assert_eq!(stored.reference, "Matthew 5:3");
        assert_eq!(stored.chapter, 5);
        assert_eq!(stored.verse_number, 3);
    }

    #[tokio::test]
    async fn test_get_missing_verse() {
        let db = db_with_matthew().await;
        assert!(db.get_verse("MAT.5.4").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_double_upsert_keeps_one_row() {
        let db = db_with_matthew().await;
        let first = blessed();
        assert!(db.upsert_verse(&first).await.unwrap());
        assert!(!db.upsert_verse(&blessed()).await.unwrap());
        assert_eq!(db.count_verses().await.unwrap(), 1);

        let stored = db.get_verse("MAT.5.3").await.unwrap().unwrap();
        assert_eq!(stored.created_at.timestamp_micros(), first.created_at.timestamp_micros());
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_one_row() {
        let db = db_with_matthew().await;
        let (first, second) = (blessed(), blessed());
        let (a, b) = tokio::join!(db.upsert_verse(&first), db.upsert_verse(&second));
        assert!(a.unwrap() ^ b.unwrap());
        assert_eq!(db.count_verses().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_upsert_unknown_book_fails() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.upsert_verse(&blessed()).await;
        assert!(matches!(result, Err(Error::Database(_))));
        assert_eq!(db.count_verses().await.unwrap(), 0);
    }
}
