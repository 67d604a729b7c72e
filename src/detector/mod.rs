pub mod similarity;
pub mod text;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Stop words ignored when extracting meaningful words
pub const DEFAULT_STOP_WORDS: [&str; 53] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "being", "have", "has", "had", "do", "does", "did", "will",
    "would", "should", "could", "may", "might", "must", "can", "this", "that", "these", "those",
    "i", "you", "he", "she", "it", "we", "they", "what", "which", "who", "when", "where", "why",
    "how",
];

/// Maximum number of meaningful words compared per text
pub const DEFAULT_MAX_TOKENS: usize = 100;

/// Maximum number of change descriptions reported
pub const DEFAULT_MAX_CHANGES: usize = 5;

/// Change magnitude above which a change is significant on its own
pub const SIGNIFICANCE_THRESHOLD: f64 = 15.0;

/// Relative length swing above which a length entry is reported
pub const LENGTH_DELTA_THRESHOLD: f64 = 0.10;

/// Number of terms listed in an added/removed description
const LISTED_TERMS: usize = 5;

/// Tuning knobs of the change detector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectorOptions {
    /// Words never treated as meaningful, matched case-insensitively
    #[serde(default = "default_stop_words")]
    pub stop_words: HashSet<String>,

    /// Only the first `max_tokens` meaningful words of each text are compared
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,

    /// Upper bound on the number of change descriptions
    #[serde(default = "default_max_changes")]
    pub max_changes: usize,
}

/// Default stop-word set
pub fn default_stop_words() -> HashSet<String> {
    DEFAULT_STOP_WORDS.iter().map(|w| w.to_string()).collect()
}

fn default_max_tokens() -> usize {
    DEFAULT_MAX_TOKENS
}

fn default_max_changes() -> usize {
    DEFAULT_MAX_CHANGES
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            stop_words: default_stop_words(),
            max_tokens: DEFAULT_MAX_TOKENS,
            max_changes: DEFAULT_MAX_CHANGES,
        }
    }
}

/// Outcome of comparing two page texts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiffResult {
    /// Whether the change is worth an alert
    pub has_changes: bool,
    /// Human readable descriptions, most important first
    pub changes: Vec<String>,
    /// `100 - similarity`, rounded to one decimal
    pub change_percentage: f64,
}

impl DiffResult {
    /// Result for two texts that normalize to the same string
    pub fn unchanged() -> Self {
        Self {
            has_changes: false,
            changes: Vec::new(),
            change_percentage: 0.0,
        }
    }
}

/// Significance rule: a large magnitude OR at least one describable change.
///
/// Either condition alone is enough.
pub fn is_significant(change_percentage: f64, change_count: usize) -> bool {
    change_percentage > SIGNIFICANCE_THRESHOLD || change_count > 0
}

/// Compares snapshots of page text and explains what changed.
///
/// Stateless: one detector can be shared across threads and reused for any
/// number of comparisons.
#[derive(Debug, Clone, Default)]
pub struct ChangeDetector {
    options: DetectorOptions,
}

impl ChangeDetector {
    /// Create a detector with the default tuning
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a detector with custom tuning
    pub fn with_options(mut options: DetectorOptions) -> Self {
        // Tokens are lowercased before lookup
        options.stop_words = options
            .stop_words
            .into_iter()
            .map(|word| word.to_lowercase())
            .collect();
        Self { options }
    }

    pub fn options(&self) -> &DetectorOptions {
        &self.options
    }

    /// Meaningful words of a text under this detector's tuning
    pub fn meaningful_words<'a>(&self, text: &'a str) -> Vec<&'a str> {
        text::extract_meaningful_words(text, &self.options.stop_words, self.options.max_tokens)
    }

    /// Lexical similarity of two texts, 0 to 100
    pub fn similarity(&self, old_text: &str, new_text: &str) -> f64 {
        let old_words: HashSet<&str> = self.meaningful_words(old_text).into_iter().collect();
        let new_words: HashSet<&str> = self.meaningful_words(new_text).into_iter().collect();
        similarity::jaccard_percentage(&old_words, &new_words)
    }

    /// Decide whether `new_text` differs meaningfully from `old_text`
    pub fn detect(&self, old_text: &str, new_text: &str) -> DiffResult {
        let normalized_old = text::normalize_text(old_text);
        let normalized_new = text::normalize_text(new_text);

        if normalized_old == normalized_new {
            return DiffResult::unchanged();
        }

        let old_words = text::unique_words(&self.meaningful_words(&normalized_old));
        let new_words = text::unique_words(&self.meaningful_words(&normalized_new));
        let old_set: HashSet<&str> = old_words.iter().copied().collect();
        let new_set: HashSet<&str> = new_words.iter().copied().collect();

        let similarity = similarity::jaccard_percentage(&old_set, &new_set);
        let change_percentage = 100.0 - similarity;

        let mut changes = Vec::new();

        let added = text::missing_from(&new_words, &old_set);
        if !added.is_empty() {
            changes.push(format!(
                "Added {} new terms: {}",
                added.len(),
                added[..added.len().min(LISTED_TERMS)].join(", ")
            ));
        }

        let removed = text::missing_from(&old_words, &new_set);
        if !removed.is_empty() {
            changes.push(format!(
                "Removed {} terms: {}",
                removed.len(),
                removed[..removed.len().min(LISTED_TERMS)].join(", ")
            ));
        }

        if let Some(entry) = describe_length_delta(&normalized_old, &normalized_new) {
            changes.push(entry);
        }

        let has_changes = is_significant(change_percentage, changes.len());
        changes.truncate(self.options.max_changes);

        ::log::trace!(
            "Detected {:.1}% change with {} descriptions",
            change_percentage,
            changes.len()
        );

        DiffResult {
            has_changes,
            changes,
            change_percentage: similarity::round_one_decimal(change_percentage),
        }
    }
}

/// Describes a relative length swing larger than the threshold
fn describe_length_delta(old_text: &str, new_text: &str) -> Option<String> {
    let old_len = old_text.chars().count();
    let new_len = new_text.chars().count();
    let longest = old_len.max(new_len);
    if longest == 0 {
        return None;
    }

    let delta = old_len.abs_diff(new_len) as f64 / longest as f64;
    if delta <= LENGTH_DELTA_THRESHOLD {
        return None;
    }

    let percent = (delta * 100.0).round() as u64;
    if new_len > old_len {
        Some(format!("Content expanded by {}%", percent))
    } else {
        Some(format!("Content reduced by {}%", percent))
    }
}

/// Compare two texts with the default tuning
pub fn detect_text_changes(old_text: &str, new_text: &str) -> DiffResult {
    ChangeDetector::new().detect(old_text, new_text)
}
