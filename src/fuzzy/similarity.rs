// File: src/fuzzy/similarity.rs
use std::collections::BTreeMap;

/// Plain Levenshtein distance over characters.
pub fn edit_distance(a: &str, b: &str) -> usize {
    strsim::levenshtein(a, b)
}

/// Cosine of the character term-frequency vectors of `a` and `b`.
/// Returns 0.0 when either string is empty.
///
/// Counts live in ordered maps so the floating point sums are accumulated in
/// the same order on every call.
pub fn cosine_similarity(a: &str, b: &str) -> f64 {
    let tf_a = term_frequencies(a);
    let tf_b = term_frequencies(b);
    if tf_a.is_empty() || tf_b.is_empty() {
        return 0.0;
    }

    let dot: f64 = tf_a
        .iter()
        .filter_map(|(ch, &n)| tf_b.get(ch).map(|&m| (n * m) as f64))
        .sum();
    let norm = |tf: &BTreeMap<char, u32>| tf.values().map(|&n| (n * n) as f64).sum::<f64>().sqrt();

    dot / (norm(&tf_a) * norm(&tf_b))
}

fn term_frequencies(s: &str) -> BTreeMap<char, u32> {
    let mut tf = BTreeMap::new();
    for ch in s.chars() {
        *tf.entry(ch).or_insert(0) += 1;
    }
    tf
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identical_strings_are_fully_similar() {
        assert!((cosine_similarity("bien hoa", "bien hoa") - 1.0).abs() < 1e-12);
        assert_eq!(edit_distance("bien hoa", "bien hoa"), 0);
    }

    #[test]
    fn disjoint_alphabets_have_zero_similarity() {
        assert_eq!(cosine_similarity("abc", "xyz"), 0.0);
        assert_eq!(cosine_similarity("", "xyz"), 0.0);
    }

    #[test]
    fn one_typo_stays_similar() {
        assert_eq!(edit_distance("trang dai", "trang dsi"), 1);
        assert!(cosine_similarity("trang dai", "trang dsi") > 0.8);
    }

    #[test]
    fn distance_counts_characters_not_bytes() {
        assert_eq!(edit_distance("đông", "dông"), 1);
    }
}
