use std::collections::HashSet;

/// Jaccard similarity of two word sets as a percentage between 0 and 100.
///
/// Two empty sets have nothing to compare and count as identical (100).
/// When only one side is empty the texts count as completely different (0).
pub fn jaccard_percentage(a: &HashSet<&str>, b: &HashSet<&str>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;

    (intersection as f64 / union as f64) * 100.0
}

/// Rounds to one decimal place, halves away from zero.
pub fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
