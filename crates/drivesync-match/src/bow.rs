//! Tokenization, term-frequency vectors, and cosine best-match selection.

use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use regex::Regex;

static WORD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Anything with a display name the matcher can score against.
///
/// Implemented by catalog products and inventory locations so both sides
/// share one matcher.
pub trait Named {
    fn name(&self) -> &str;
}

/// A scored best-match candidate. Ephemeral; never persisted.
#[derive(Debug)]
pub struct Match<'a, T> {
    pub entity: &'a T,
    /// Cosine similarity scaled to `[0, 100]`.
    pub similarity_pct: f64,
}

/// Splits text into lowercase word/number tokens.
///
/// Tokens are contiguous Unicode word-character runs; punctuation and
/// symbols separate tokens (`"demi-écrémé"` → `["demi", "écrémé"]`).
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    WORD_RE
        .find_iter(&text.to_lowercase())
        .map(|m| m.as_str().to_owned())
        .collect()
}

/// Builds the term-frequency vector of `text` aligned to `vocabulary`'s
/// ordering. Tokens outside the vocabulary are ignored.
#[must_use]
pub fn vectorize(text: &str, vocabulary: &[String]) -> Vec<u32> {
    let mut counts: HashMap<String, u32> = HashMap::new();
    for token in tokenize(text) {
        *counts.entry(token).or_insert(0) += 1;
    }
    vocabulary
        .iter()
        .map(|word| counts.get(word).copied().unwrap_or(0))
        .collect()
}

/// Standard cosine similarity in `[0, 1]` for term-frequency vectors.
///
/// Returns exactly `0.0` when either vector has zero magnitude, so a query
/// sharing no vocabulary with the candidates scores zero instead of
/// dividing by zero.
#[must_use]
pub fn cosine_similarity(a: &[u32], b: &[u32]) -> f64 {
    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(&x, &y)| f64::from(x) * f64::from(y))
        .sum();
    let mag_a: f64 = a.iter().map(|&x| f64::from(x) * f64::from(x)).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|&y| f64::from(y) * f64::from(y)).sum::<f64>().sqrt();

    if mag_a == 0.0 || mag_b == 0.0 {
        return 0.0;
    }
    dot / (mag_a * mag_b)
}

/// Scores `query` against every candidate's name and returns the best one.
///
/// The vocabulary is the union of the candidates' name tokens in first-seen
/// order; the query contributes nothing to it, so vocabulary construction
/// is deterministic per candidate set. Selection is a strict maximum: ties
/// keep the earliest candidate in input order. Returns `None` only for an
/// empty candidate slice; a candidate sharing no tokens with the query is
/// still returned, at `similarity_pct` 0.
#[must_use]
pub fn best_match<'a, T: Named>(query: &str, candidates: &'a [T]) -> Option<Match<'a, T>> {
    if candidates.is_empty() {
        return None;
    }

    let mut vocabulary: Vec<String> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for candidate in candidates {
        for token in tokenize(candidate.name()) {
            if seen.insert(token.clone()) {
                vocabulary.push(token);
            }
        }
    }

    let query_vector = vectorize(query, &vocabulary);

    let mut best: Option<(&T, f64)> = None;
    for candidate in candidates {
        let candidate_vector = vectorize(candidate.name(), &vocabulary);
        let similarity = cosine_similarity(&query_vector, &candidate_vector);
        match best {
            Some((_, current)) if similarity <= current => {}
            _ => best = Some((candidate, similarity)),
        }
    }

    best.map(|(entity, similarity)| Match {
        entity,
        similarity_pct: similarity * 100.0,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Product(&'static str);

    impl Named for Product {
        fn name(&self) -> &str {
            self.0
        }
    }

    #[test]
    fn tokenize_lowercases_and_splits_on_punctuation() {
        assert_eq!(
            tokenize("Lait demi-écrémé 1L"),
            vec!["lait", "demi", "écrémé", "1l"]
        );
    }

    #[test]
    fn tokenize_empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("--- !! ..").is_empty());
    }

    #[test]
    fn vectorize_counts_term_frequency() {
        let vocabulary = vec!["lait".to_owned(), "bio".to_owned(), "1l".to_owned()];
        assert_eq!(vectorize("Lait lait 1L", &vocabulary), vec![2, 0, 1]);
    }

    #[test]
    fn cosine_self_similarity_is_one() {
        let v = vec![1, 2, 3];
        let sim = cosine_similarity(&v, &v);
        assert!((sim - 1.0).abs() < 1e-12, "expected 1.0, got {sim}");
    }

    #[test]
    fn cosine_is_symmetric() {
        let a = vec![1, 0, 2];
        let b = vec![0, 3, 1];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn cosine_zero_vector_is_zero_not_nan() {
        let zero = vec![0, 0, 0];
        let v = vec![1, 2, 3];
        assert_eq!(cosine_similarity(&zero, &v), 0.0);
        assert_eq!(cosine_similarity(&v, &zero), 0.0);
        assert_eq!(cosine_similarity(&zero, &zero), 0.0);
    }

    #[test]
    fn best_match_empty_candidates_is_none() {
        let candidates: Vec<Product> = vec![];
        assert!(best_match("lait", &candidates).is_none());
    }

    #[test]
    fn best_match_identical_name_scores_100() {
        let candidates = vec![Product("Lait demi-écrémé 1L"), Product("Beurre doux 250g")];
        let m = best_match("Lait demi-écrémé 1L", &candidates).unwrap();
        assert_eq!(m.entity.name(), "Lait demi-écrémé 1L");
        assert!((m.similarity_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn best_match_survives_hyphen_and_case_differences() {
        let candidates = vec![Product("Lait demi-écrémé 1L"), Product("Beurre doux 250g")];
        let m = best_match("lait demi écrémé 1l", &candidates).unwrap();
        assert_eq!(m.entity.name(), "Lait demi-écrémé 1L");
        assert!(m.similarity_pct >= 90.0, "got {}", m.similarity_pct);
    }

    #[test]
    fn best_match_tie_keeps_first_candidate() {
        let candidates = vec![Product("Eau gazeuse"), Product("Eau gazeuse")];
        let m = best_match("Eau gazeuse", &candidates).unwrap();
        assert!(std::ptr::eq(m.entity, &candidates[0]));
    }

    #[test]
    fn best_match_disjoint_query_returns_zero_score() {
        let candidates = vec![Product("Beurre doux 250g")];
        let m = best_match("xyzzy", &candidates).unwrap();
        assert_eq!(m.similarity_pct, 0.0);
    }

    #[test]
    fn vocabulary_comes_from_candidates_not_query() {
        // A query token absent from every candidate must not affect scores.
        let candidates = vec![Product("Pomme golden")];
        let with_noise = best_match("Pomme golden supplément", &candidates).unwrap();
        let without = best_match("Pomme golden", &candidates).unwrap();
        assert_eq!(with_noise.similarity_pct, without.similarity_pct);
    }
}
