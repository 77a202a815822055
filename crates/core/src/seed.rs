//! Reference data: the supported books and the curated quote list.
//!
//! Seeding is get-or-create throughout. Rows that already exist are never
//! refreshed, so re-running setup is safe and cheap.

use std::collections::HashMap;

use crate::books::BOOKS;
use crate::cache::{Book, CacheDb, NewQuote};
use crate::reference::verse_ids_for;
use crate::Error;

/// Curated red-letter passages, keyed by book code.
pub const QUOTES: &[(&str, &[&str])] = &[
    (
        "MAT",
        &[
            "4:4", "4:7", "4:10", "4:17", "4:19", "5:3-12", "5:13-16", "5:17-20", "5:21-26", "5:27-32", "5:33-37",
            "5:38-42", "5:43-48", "6:1-4", "6:5-15", "6:16-18", "6:19-24", "6:25-34", "7:1-5", "7:6", "7:7-12",
            "7:13-14", "7:15-20", "7:21-23", "7:24-27", "9:12-13", "10:16", "10:28-31", "10:34-39", "11:28-30",
            "12:30", "12:34-37", "13:3-9", "16:24-26", "18:3-4", "18:20", "18:21-22", "19:14", "19:26",
            "22:37-40", "24:35", "25:40", "26:26-28", "26:41", "28:18-20",
        ],
    ),
    (
        "MRK",
        &[
            "1:15", "1:17", "2:17", "2:27", "4:24-25", "8:34-36", "9:23", "9:35", "10:14-15", "10:27", "11:24-25",
            "12:29-31", "16:15",
        ],
    ),
    (
        "LUK",
        &[
            "4:18-19", "6:20-23", "6:27-31", "6:36-38", "6:45", "9:23", "9:62", "10:27", "11:9-10", "12:15",
            "12:22-31", "12:34", "15:4-7", "15:11-32", "16:10", "17:20-21", "18:16-17", "19:10", "23:34", "23:43",
            "23:46",
        ],
    ),
    (
        "JHN",
        &[
            "3:3", "3:16-17", "4:13-14", "4:24", "5:24", "6:35", "6:51", "7:37-38", "8:7", "8:12", "8:31-32",
            "10:10-11", "10:27-30", "11:25-26", "13:34-35", "14:1-3", "14:6", "14:15", "14:27", "15:1-5",
            "15:12-13", "16:33", "17:3", "20:21", "20:29",
        ],
    ),
    ("ACT", &["1:7-8", "9:4-6", "20:35"]),
    ("1CO", &["11:24-25"]),
    ("2CO", &["12:9"]),
    (
        "REV",
        &["1:8", "1:17-18", "2:10", "3:20", "21:5-7", "22:12-13", "22:16", "22:20"],
    ),
];

/// Counts from one seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub books_created: usize,
    pub quotes_created: usize,
    /// References that could not be expanded into verse identifiers.
    pub skipped: Vec<String>,
}

/// Create any missing books and quotes.
///
/// `remote_names` maps book codes to display names from the remote book
/// list; codes absent from it fall back to the static slug-derived name.
///
/// # Errors
///
/// Returns database errors. A malformed curated reference is skipped and
/// reported rather than failing the run.
pub async fn seed(db: &CacheDb, remote_names: &HashMap<String, String>) -> Result<SeedReport, Error> {
    let mut report = SeedReport::default();

    for info in BOOKS {
        let name = remote_names
            .get(info.code)
            .cloned()
            .unwrap_or_else(|| info.display_name());
        let book = Book { code: info.code.to_string(), name, canonical_order: info.canonical_order };
        if db.ensure_book(&book).await? {
            tracing::info!(code = info.code, name = %book.name, "created book");
            report.books_created += 1;
        }
    }

    for (book_code, references) in QUOTES {
        for reference in *references {
            let verse_ids = match verse_ids_for(book_code, reference) {
                Ok(ids) => ids,
                Err(e) => {
                    tracing::warn!(book_code, reference, error = %e, "skipping quote");
                    report.skipped.push(format!("{book_code} {reference}"));
                    continue;
                }
            };

            let quote = NewQuote { book_code: book_code.to_string(), reference: reference.to_string(), verse_ids };
            let (_, created) = db.ensure_quote(&quote).await?;
            if created {
                tracing::debug!(book_code, reference, "created quote");
                report.quotes_created += 1;
            }
        }
    }

    Ok(report)
}
