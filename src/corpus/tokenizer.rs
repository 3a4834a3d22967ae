//! Tokenization shared by the lexical index and queries

/// Split on whitespace, lowercase, and trim surrounding ASCII punctuation
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|raw| raw.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}
