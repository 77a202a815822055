//! Static book tables.
//!
//! Book codes follow API.Bible's convention (`MAT`, `1CO`, ...). The verse
//! CDN addresses books by a lowercase slug instead, and display names are
//! derived from that slug.

/// One supported book.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookInfo {
    /// API.Bible book id, also the first segment of a verse identifier.
    pub code: &'static str,
    /// Book directory name on the verse CDN.
    pub slug: &'static str,
    /// Sort key for listings.
    pub canonical_order: i64,
}

/// Every book the application knows how to fetch, in canonical order.
pub const BOOKS: &[BookInfo] = &[
    BookInfo { code: "MAT", slug: "matthew", canonical_order: 1 },
    BookInfo { code: "MRK", slug: "mark", canonical_order: 2 },
    BookInfo { code: "LUK", slug: "luke", canonical_order: 3 },
    BookInfo { code: "JHN", slug: "john", canonical_order: 4 },
    BookInfo { code: "ACT", slug: "acts", canonical_order: 5 },
    BookInfo { code: "1CO", slug: "1-corinthians", canonical_order: 6 },
    BookInfo { code: "2CO", slug: "2-corinthians", canonical_order: 7 },
    BookInfo { code: "REV", slug: "revelation", canonical_order: 8 },
];

/// Look up a book by its code. Codes are case-sensitive.
pub fn lookup(code: &str) -> Option<&'static BookInfo> {
    BOOKS.iter().find(|book| book.code == code)
}

impl BookInfo {
    /// Human-readable name, e.g. `1 Corinthians`.
    pub fn display_name(&self) -> String {
        display_name_for_slug(self.slug)
    }
}

/// Turn a CDN slug into a display name: hyphens become spaces and every
/// word is title-cased.
pub fn display_name_for_slug(slug: &str) -> String {
    slug.split('-')
        .filter(|word| !word.is_empty())
        .map(title_case)
        .collect::<Vec<_>>()
        .join(" ")
}

fn title_case(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}
