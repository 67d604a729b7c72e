use std::collections::HashSet;

/// Canonical comparable form of extracted page text.
///
/// Lowercases, collapses every whitespace run (newlines and tabs included)
/// into a single space and trims both ends.
pub fn normalize_text(text: &str) -> String {
    text.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Extracts the meaningful words of a text.
///
/// A token survives if it is longer than three characters and its lowercase
/// form is not a stop word. Only the first `max_tokens` survivors are kept,
/// in their original order.
pub fn extract_meaningful_words<'a>(
    text: &'a str,
    stop_words: &HashSet<String>,
    max_tokens: usize,
) -> Vec<&'a str> {
    text.split_whitespace()
        .filter(|word| word.chars().count() > 3 && !stop_words.contains(&word.to_lowercase()))
        .take(max_tokens)
        .collect()
}

/// Removes repeated words, keeping the first appearance of each.
pub fn unique_words<'a>(words: &[&'a str]) -> Vec<&'a str> {
    let mut seen = HashSet::with_capacity(words.len());
    words
        .iter()
        .copied()
        .filter(|word| seen.insert(*word))
        .collect()
}

/// Words of `words` that are absent from `other`, in order.
pub fn missing_from<'a>(words: &[&'a str], other: &HashSet<&str>) -> Vec<&'a str> {
    words
        .iter()
        .copied()
        .filter(|word| !other.contains(word))
        .collect()
}
