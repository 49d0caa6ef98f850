//! Tag normalization and gallery layout helpers

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Normalize a single tag: trimmed, lowercase
pub fn normalize_tag(tag: &str) -> String {
    tag.trim().to_lowercase()
}

/// Normalize a tag list: trim, lowercase, drop empties, dedupe while
/// preserving first-occurrence order
pub fn normalize_tags<I, S>(tags: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen = HashSet::new();
    let mut normalized = Vec::new();
    for tag in tags {
        let tag = normalize_tag(tag.as_ref());
        if !tag.is_empty() && seen.insert(tag.clone()) {
            normalized.push(tag);
        }
    }
    normalized
}

/// Whitespace-separated word count
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Card size class for the gallery layout, driven by how much context text
/// is attached to an item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CardSize {
    Small,
    Medium,
    Large,
    #[serde(rename = "xlarge")]
    ExtraLarge,
}

impl CardSize {
    /// Thresholds: more than 100 words is extra large, more than 50 large,
    /// more than 20 medium, otherwise small.
    pub fn from_word_count(words: usize) -> Self {
        if words > 100 {
            CardSize::ExtraLarge
        } else if words > 50 {
            CardSize::Large
        } else if words > 20 {
            CardSize::Medium
        } else {
            CardSize::Small
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_tags_dedupes_case_insensitively() {
        let tags = normalize_tags(vec!["Paris", "  paris ", "Beach", "", "PARIS"]);
        assert_eq!(tags, vec!["paris", "beach"]);
    }

    #[test]
    fn test_normalize_tags_preserves_order() {
        let tags = normalize_tags(vec!["zoo", "alpha", "zoo"]);
        assert_eq!(tags, vec!["zoo", "alpha"]);
    }

    #[test]
    fn test_card_size_thresholds() {
        assert_eq!(CardSize::from_word_count(0), CardSize::Small);
        assert_eq!(CardSize::from_word_count(20), CardSize::Small);
        assert_eq!(CardSize::from_word_count(21), CardSize::Medium);
        assert_eq!(CardSize::from_word_count(50), CardSize::Medium);
        assert_eq!(CardSize::from_word_count(51), CardSize::Large);
        assert_eq!(CardSize::from_word_count(100), CardSize::Large);
        assert_eq!(CardSize::from_word_count(101), CardSize::ExtraLarge);
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        assert_eq!(word_count("  a  b\n c\t"), 3);
        assert_eq!(word_count(""), 0);
    }
}
