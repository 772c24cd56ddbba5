/// Normalized edit-distance similarity between two words, in `[0, 1]`.
///
/// Distance and lengths are measured in Unicode scalar values, so `"é"`
/// counts as one character. Two empty words are a perfect match.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    let distance = strsim::levenshtein(a, b);
    1.0 - distance as f64 / longest as f64
}
