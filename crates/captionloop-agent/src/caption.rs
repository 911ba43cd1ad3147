/// Terms a caption must never contain (matched case-insensitively as substrings)
pub const BLOCKED_TERMS: [&str; 3] = ["kill", "violence", "hate"];

/// Default word ceiling for a caption
pub const DEFAULT_MAX_WORDS: usize = 15;

/// What a caption is being written for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptionBrief {
    pub product: String,
    pub audience: String,
}

impl CaptionBrief {
    pub fn new(product: impl Into<String>, audience: impl Into<String>) -> Self {
        Self {
            product: product.into(),
            audience: audience.into(),
        }
    }

    /// Case-insensitive check that the caption names the product
    pub fn mentions_product(&self, caption: &str) -> bool {
        caption
            .to_lowercase()
            .contains(&self.product.to_lowercase())
    }
}

/// True if the text contains a pictographic character.
///
/// Covers Miscellaneous Symbols and Dingbats (U+2600..=U+27BF) plus the
/// pictograph blocks U+1F300..=U+1FAFF.
pub fn contains_emoji(text: &str) -> bool {
    text.chars()
        .any(|c| matches!(c, '\u{2600}'..='\u{27BF}' | '\u{1F300}'..='\u{1FAFF}'))
}

/// Number of whitespace-separated words
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Length in characters (not bytes)
pub fn char_length(text: &str) -> usize {
    text.chars().count()
}

/// Collapse whitespace runs to a single space and trim both ends
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// First blocked term found in the text, if any
pub fn find_blocked_term(text: &str) -> Option<&'static str> {
    let lowered = text.to_lowercase();
    BLOCKED_TERMS
        .iter()
        .copied()
        .find(|term| lowered.contains(term))
}
