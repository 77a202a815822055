//! Book rows.

use super::connection::CacheDb;
use crate::Error;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::OptionalExtension;

/// A canonical scripture book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
pub struct Book {
    pub code: String,
    pub name: String,
    pub canonical_order: i64,
}

impl CacheDb {
    /// Insert a book unless one with the same code already exists.
    ///
    /// Existing rows are left untouched. Returns true if a row was created.
    pub async fn ensure_book(&self, book: &Book) -> Result<bool, Error> {
        let book = book.clone();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let inserted = conn.execute(
                    "INSERT INTO books (code, name, canonical_order) VALUES (?1, ?2, ?3)
                     ON CONFLICT(code) DO NOTHING",
                    params![book.code, book.name, book.canonical_order],
                )?;
                Ok(inserted > 0)
            })
            .await
            .map_err(Error::from)
    }

    pub async fn get_book(&self, code: &str) -> Result<Option<Book>, Error> {
        let code = code.to_string();
        self.conn
            .call(move |conn| -> Result<Option<Book>, Error> {
                conn.query_row(
                    "SELECT code, name, canonical_order FROM books WHERE code = ?1",
                    params![code],
                    |row| Ok(Book { code: row.get(0)?, name: row.get(1)?, canonical_order: row.get(2)? }),
                )
                .optional()
                .map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }

    /// All books in canonical order.
    pub async fn list_books(&self) -> Result<Vec<Book>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<Book>, Error> {
                let mut stmt = conn.prepare("SELECT code, name, canonical_order FROM books ORDER BY canonical_order")?;
                let rows = stmt.query_map([], |row| {
                    Ok(Book { code: row.get(0)?, name: row.get(1)?, canonical_order: row.get(2)? })
                })?;
                rows.collect::<Result<Vec<_>, _>>().map_err(Error::from)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(code: &str, name: &str, order: i64) -> Book {
        Book { code: code.into(), name: name.into(), canonical_order: order }
    }

    #[tokio::test]
    async fn test_ensure_book_is_get_or_create() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.ensure_book(&book("MAT", "Matthew", 1)).await.unwrap());
        assert!(!db.ensure_book(&book("MAT", "Gospel of Matthew", 1)).await.unwrap());

        let stored = db.get_book("MAT").await.unwrap().unwrap();
        assert_eq!(stored.name, "Matthew");
    }

    #[tokio::test]
    async fn test_get_missing_book() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert!(db.get_book("GEN").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_books_sorted() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.ensure_book(&book("JHN", "John", 4)).await.unwrap();
        db.ensure_book(&book("MAT", "Matthew", 1)).await.unwrap();
        db.ensure_book(&book("MRK", "Mark", 2)).await.unwrap();

        let codes: Vec<String> = db.list_books().await.unwrap().into_iter().map(|b| b.code).collect();
        assert_eq!(codes, vec!["MAT", "MRK", "JHN"]);
    }
}
