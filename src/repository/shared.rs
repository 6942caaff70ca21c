// ABOUTME: Helpers shared across repository backends — tokenization and cosine similarity
// ABOUTME: The only code backends are allowed to share

use std::collections::BTreeSet;
use std::sync::LazyLock;

static STOPWORDS: LazyLock<BTreeSet<&'static str>> = LazyLock::new(|| {
    [
        "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "with", "is", "are", "this",
        "that", "by", "at", "as", "be", "it", "its", "from", "into",
    ]
    .into_iter()
    .collect()
});

/// Split on non-word characters, lowercase, drop tokens `<= 2` chars and
/// stopwords.
#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .map(str::to_lowercase)
        .filter(|t| t.len() > registry_core::constants::search::MIN_TOKEN_LEN - 1)
        .filter(|t| !STOPWORDS.contains(t.as_str()))
        .collect()
}

/// Cosine similarity between two equal-length dense vectors, in `[-1, 1]`.
/// Returns `0.0` for mismatched or zero-norm vectors rather than panicking.
#[must_use]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b).map(|(x, y)| f64::from(*x) * f64::from(*y)).sum();
    let norm_a: f64 = a.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| f64::from(*x).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Normalize a cosine similarity in `[-1, 1]` to `[0, 1]`.
#[must_use]
pub fn normalize_cosine(similarity: f64) -> f64 {
    (similarity + 1.0) / 2.0
}

/// `true` when `message` names the well-known "vector search unsupported"
/// failure (error code 31082, or a message mentioning `vectorSearch`/`mongot`)
/// that the hybrid engine must fall back to client-side ranking on. Any other
/// native-search error is an infrastructure failure and must propagate.
#[must_use]
pub fn is_unsupported_vector_search_error(message: &str) -> bool {
    message.contains(&registry_core::constants::search::VECTOR_SEARCH_UNSUPPORTED_CODE.to_string())
        || message.contains("vectorSearch")
        || message.contains("mongot")
}

/// Lexical `text_boost` score for a document's searchable fields against
/// already-tokenized query terms.
#[must_use]
pub fn text_boost(
    tokens: &[String],
    path: &str,
    name: &str,
    description: &str,
    tags: &[String],
    tool_matches: usize,
) -> f64 {
    use registry_core::constants::search::{
        TEXT_BOOST_DESCRIPTION_MATCH, TEXT_BOOST_NAME_MATCH, TEXT_BOOST_PATH_MATCH,
        TEXT_BOOST_TAG_MATCH, TEXT_BOOST_TOOL_MATCH,
    };

    let path_lower = path.to_lowercase();
    let name_lower = name.to_lowercase();
    let description_lower = description.to_lowercase();

    let mut score = 0.0;
    if tokens.iter().any(|t| path_lower.contains(t.as_str())) {
        score += TEXT_BOOST_PATH_MATCH;
    }
    if tokens.iter().any(|t| name_lower.contains(t.as_str())) {
        score += TEXT_BOOST_NAME_MATCH;
    }
    if tokens.iter().any(|t| description_lower.contains(t.as_str())) {
        score += TEXT_BOOST_DESCRIPTION_MATCH;
    }
    if tags
        .iter()
        .any(|tag| tokens.iter().any(|t| tag.to_lowercase().contains(t.as_str())))
    {
        score += TEXT_BOOST_TAG_MATCH;
    }
    score += TEXT_BOOST_TOOL_MATCH * f64::from(u32::try_from(tool_matches).unwrap_or(u32::MAX));
    score
}

/// Combine a normalized vector score with a lexical boost into the final
/// `relevance_score`, clamped to `[0, 1]`.
#[must_use]
pub fn relevance_score(vector_score_normalized: f64, boost: f64) -> f64 {
    (vector_score_normalized + registry_core::constants::search::TEXT_BOOST_WEIGHT * boost).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_drops_short_and_stopwords() {
        let tokens = tokenize("The current time in UTC");
        assert_eq!(tokens, vec!["current", "time", "utc"]);
    }

    #[test]
    fn cosine_similarity_identical_vectors_is_one() {
        let v = vec![1.0_f32, 2.0, 3.0];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn cosine_similarity_orthogonal_is_zero() {
        assert!((cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]) - 0.0).abs() < 1e-9);
    }

    #[test]
    fn relevance_score_clamps_to_one() {
        assert_eq!(relevance_score(1.0, 100.0), 1.0);
    }
}
