//! Plain-text cleanup for search hits, which API.Bible returns as markup.

use std::sync::LazyLock;

use regex::Regex;

static TAG: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"<[^>]+>") {
    Ok(regex) => regex,
    Err(err) => panic!("tag regex is invalid: {err}"),
});

static LEADING_VERSE_NUMBER: LazyLock<Regex> = LazyLock::new(|| match Regex::new(r"^\d+\s*") {
    Ok(regex) => regex,
    Err(err) => panic!("verse number regex is invalid: {err}"),
});

/// Strip tags, drop a leading verse number, and collapse whitespace.
pub fn clean_verse_text(raw: &str) -> String {
    if raw.is_empty() {
        return String::new();
    }

    let without_tags = TAG.replace_all(raw, "");
    let without_number = LEADING_VERSE_NUMBER.replace(without_tags.trim(), "");
    without_number.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_tags_and_verse_number() {
        assert_eq!(clean_verse_text("3 <b>Blessed</b> are the poor"), "Blessed are the poor");
    }

    #[test]
    fn test_number_inside_markup() {
        let raw = r#"<span data-number="16" class="v">16</span>For God so loved the world"#;
        assert_eq!(clean_verse_text(raw), "For God so loved the world");
    }

    #[test]
    fn test_collapses_whitespace() {
        assert_eq!(clean_verse_text("  Come unto me,\n\n all ye\tthat labour "), "Come unto me, all ye that labour");
    }

    #[test]
    fn test_only_leading_number_removed() {
        assert_eq!(clean_verse_text("12 Rejoice 12 times"), "Rejoice 12 times");
    }

    #[test]
    fn test_empty() {
        assert_eq!(clean_verse_text(""), "");
        assert_eq!(clean_verse_text("<p></p>"), "");
    }
}
