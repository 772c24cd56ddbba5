/// How aggressively text is cleaned before it is split into words.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NormalizationMode {
    /// Lowercase and trim only. Punctuation stays attached to words.
    #[default]
    Basic,
    /// Drop every character that is not a word character or whitespace
    /// before lowercasing. Used when scoring dataset transcripts.
    StripPunctuation,
}

/// Lowercases, trims and tokenizes `text` on runs of whitespace.
///
/// Never fails: empty, whitespace-only and punctuation-only input all yield
/// an empty sequence, and no returned word is ever empty.
pub fn normalize(text: &str, mode: NormalizationMode) -> Vec<String> {
    let cleaned = match mode {
        NormalizationMode::Basic => text.to_lowercase(),
        NormalizationMode::StripPunctuation => text
            .chars()
            .filter(|c| is_word_char(*c) || c.is_whitespace())
            .collect::<String>()
            .to_lowercase(),
    };

    cleaned
        .trim()
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}
