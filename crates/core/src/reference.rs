//! Verse identifiers and quote references.
//!
//! A verse identifier is `BOOK.CHAPTER.VERSE` (e.g. `MAT.5.3`). Extra
//! trailing segments are tolerated and ignored. A quote reference is the
//! human-readable `CHAPTER:VERSES` form used by curated quotes, where
//! `VERSES` is a comma-separated list of single verses and inclusive ranges
//! (e.g. `5:3-12, 14`).

use std::fmt;
use std::str::FromStr;

use crate::Error;
use crate::books::{self, BookInfo};

/// A parsed verse identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct VerseId {
    pub book_code: String,
    pub chapter: u32,
    pub verse: u32,
}

impl VerseId {
    pub fn new(book_code: impl Into<String>, chapter: u32, verse: u32) -> Self {
        Self { book_code: book_code.into(), chapter, verse }
    }

    /// Parse an identifier string.
    ///
    /// # Errors
    ///
    /// Returns `Error::MalformedVerseId` when there are fewer than three
    /// segments, the book segment is empty, or chapter/verse are not numbers.
    pub fn parse(raw: &str) -> Result<Self, Error> {
        let mut parts = raw.split('.');
        let (Some(book), Some(chapter), Some(verse)) = (parts.next(), parts.next(), parts.next()) else {
            return Err(Error::MalformedVerseId(raw.to_string()));
        };

        if book.is_empty() {
            return Err(Error::MalformedVerseId(raw.to_string()));
        }

        let chapter = chapter
            .parse()
            .map_err(|_| Error::MalformedVerseId(raw.to_string()))?;
        let verse = verse.parse().map_err(|_| Error::MalformedVerseId(raw.to_string()))?;

        Ok(Self { book_code: book.to_string(), chapter, verse })
    }

    /// Static table entry for this identifier's book.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedBook` if the code is not in [`books::BOOKS`].
    pub fn book(&self) -> Result<&'static BookInfo, Error> {
        books::lookup(&self.book_code).ok_or_else(|| Error::UnsupportedBook(self.book_code.clone()))
    }

    /// Display reference such as `Matthew 5:3`.
    ///
    /// # Errors
    ///
    /// Returns `Error::UnsupportedBook` for unknown book codes.
    pub fn display_reference(&self) -> Result<String, Error> {
        Ok(format!("{} {}:{}", self.book()?.display_name(), self.chapter, self.verse))
    }
}

impl fmt::Display for VerseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.book_code, self.chapter, self.verse)
    }
}

impl FromStr for VerseId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Split a quote reference into its chapter and the expanded verse list.
///
/// # Errors
///
/// Returns `Error::InvalidReference` if the colon is missing, a number does
/// not parse, or a range runs backwards.
pub fn parse_quote_reference(reference: &str) -> Result<(u32, Vec<u32>), Error> {
    let invalid = || Error::InvalidReference(reference.to_string());

    let (chapter, verse_list) = reference.split_once(':').ok_or_else(invalid)?;
    let chapter: u32 = chapter.trim().parse().map_err(|_| invalid())?;

    let mut verses = Vec::new();
    for part in verse_list.split(',') {
        let part = part.trim();
        match part.split_once('-') {
            Some((start, end)) => {
                let start: u32 = start.trim().parse().map_err(|_| invalid())?;
                let end: u32 = end.trim().parse().map_err(|_| invalid())?;
                if end < start {
                    return Err(invalid());
                }
                verses.extend(start..=end);
            }
            None => verses.push(part.parse().map_err(|_| invalid())?),
        }
    }

    Ok((chapter, verses))
}

/// Expand a quote reference into verse identifiers for `book_code`.
///
/// # Errors
///
/// Propagates [`parse_quote_reference`] failures.
pub fn verse_ids_for(book_code: &str, reference: &str) -> Result<Vec<String>, Error> {
    let (chapter, verses) = parse_quote_reference(reference)?;
    Ok(verses
        .into_iter()
        .map(|verse| VerseId::new(book_code, chapter, verse).to_string())
        .collect())
}
