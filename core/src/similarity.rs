//! String and set similarity primitives shared by the stability tracker
//! and the planner's locking validation.
//!
//! Intentionally weak heuristics: they exist to catch blatant structural
//! drift between rounds, not to validate semantic equivalence. A
//! production-grade replacement would be a secondary model call — this
//! module is the plug-in point for that.

use std::collections::{HashMap, HashSet};

/// Jaccard similarity of two string sets: `|A ∩ B| / |A ∪ B|`.
///
/// Both empty is defined as fully similar (`1.0`); exactly one empty is
/// defined as fully dissimilar (`0.0`).
pub fn jaccard_similarity(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Dice-like bigram string similarity.
///
/// Lowercases both strings first. Identical strings are fully similar;
/// either string shorter than 2 characters (no bigrams to compare) is
/// fully dissimilar. Otherwise:
///
/// `2 · Σ min(countA(b), countB(b)) / (|A| + |B| − 2)`
///
/// over character bigrams `b`, where `|A|`/`|B|` are character counts —
/// so `|A| - 1` and `|B| - 1` are the bigram counts of each string. This
/// is a multiset Dice coefficient, not a set-based one: repeated bigrams
/// count multiple times on both sides.
pub fn bigram_similarity(a: &str, b: &str) -> f64 {
    let a = a.to_lowercase();
    let b = b.to_lowercase();

    if a == b {
        return 1.0;
    }

    let a_chars: Vec<char> = a.chars().collect();
    let b_chars: Vec<char> = b.chars().collect();

    if a_chars.len() < 2 || b_chars.len() < 2 {
        return 0.0;
    }

    let a_bigrams = bigram_counts(&a_chars);
    let b_bigrams = bigram_counts(&b_chars);

    let overlap: usize = a_bigrams
        .iter()
        .map(|(bigram, count)| (*count).min(*b_bigrams.get(bigram).unwrap_or(&0)))
        .sum();

    let denom = (a_chars.len() - 1) + (b_chars.len() - 1);
    if denom == 0 {
        return 0.0;
    }
    (2 * overlap) as f64 / denom as f64
}

/// Threshold above which two strings are considered a "fuzzy equal" match
/// for decision reuse and locking heuristics.
pub const FUZZY_EQUAL_THRESHOLD: f64 = 0.7;

/// Whether `a` and `b` are fuzzy-equal per [`FUZZY_EQUAL_THRESHOLD`].
pub fn fuzzy_equal(a: &str, b: &str) -> bool {
    bigram_similarity(a, b) > FUZZY_EQUAL_THRESHOLD
}

fn bigram_counts(chars: &[char]) -> HashMap<(char, char), usize> {
    let mut counts = HashMap::new();
    for pair in chars.windows(2) {
        *counts.entry((pair[0], pair[1])).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(items: &[&str]) -> HashSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn jaccard_both_empty() {
        assert_eq!(jaccard_similarity(&set(&[]), &set(&[])), 1.0);
    }

    #[test]
    fn jaccard_one_empty() {
        assert_eq!(jaccard_similarity(&set(&["a"]), &set(&[])), 0.0);
        assert_eq!(jaccard_similarity(&set(&[]), &set(&["a"])), 0.0);
    }

    #[test]
    fn jaccard_partial_overlap() {
        let a = set(&["a", "b", "c"]);
        let b = set(&["b", "c", "d"]);
        assert!((jaccard_similarity(&a, &b) - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn jaccard_identical_sets() {
        let a = set(&["a", "b"]);
        assert_eq!(jaccard_similarity(&a, &a.clone()), 1.0);
    }

    #[test]
    fn bigram_equal_strings() {
        assert_eq!(bigram_similarity("ship it", "Ship It"), 1.0);
    }

    #[test]
    fn bigram_short_strings_are_dissimilar() {
        assert_eq!(bigram_similarity("a", "ab"), 0.0);
        assert_eq!(bigram_similarity("", "ab"), 0.0);
    }

    #[test]
    fn bigram_similar_phrases() {
        let sim = bigram_similarity("ship the feature", "ship feature");
        assert!(sim > 0.7, "expected high similarity, got {sim}");
    }

    #[test]
    fn bigram_dissimilar_phrases() {
        let sim = bigram_similarity("ship the feature", "completely unrelated text");
        assert!(sim < 0.3, "expected low similarity, got {sim}");
    }

    #[test]
    fn fuzzy_equal_threshold() {
        assert!(fuzzy_equal("add error handling", "add error handling now"));
        assert!(!fuzzy_equal("add error handling", "refactor database layer"));
    }

    #[test]
    fn bigram_multiset_counts_repeats() {
        // "aaaa" vs "aaaa": 3 bigrams each, all "aa" -> min(3,3)=3, denom=3+3=6
        let sim = bigram_similarity("aaaa", "aaaa");
        assert_eq!(sim, 1.0); // equal strings short-circuit to 1.0

        // "aaab" vs "aaac": bigrams aa,aa,ab vs aa,aa,ac -> overlap 2, denom 6
        let sim = bigram_similarity("aaab", "aaac");
        assert!((sim - (4.0 / 6.0)).abs() < 1e-9);
    }
}
