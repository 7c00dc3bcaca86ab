//! Embedding-based candidate reranking.
//!
//! Scores candidate listings against a query vector with cosine
//! similarity and keeps the best `top_k`. Unindexed candidates (no
//! stored vector) never appear in the output. Ordering is a stable
//! descending sort, so equal scores keep their input order.

use serde::Serialize;

use crate::core::Listing;

/// A scored candidate from a rerank pass.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    /// The underlying listing.
    pub listing: Listing,
    /// Cosine similarity against the query vector.
    pub score: f32,
}

/// Computes cosine similarity between two vectors.
///
/// Returns `0.0` for mismatched lengths and for zero-magnitude inputs,
/// so malformed or empty vectors rank last instead of failing the
/// request. Accumulates in `f64` to keep long vectors stable.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let mut dot = 0.0_f64;
    let mut norm_a = 0.0_f64;
    let mut norm_b = 0.0_f64;
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (f64::from(*x), f64::from(*y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom == 0.0 {
        return 0.0;
    }
    (dot / denom) as f32
}

/// Reranks candidates against a query vector, keeping the top `top_k`.
///
/// Candidates without a stored embedding are dropped. The result is
/// sorted by score descending; ties keep candidate order.
#[must_use]
pub fn rerank(query: &[f32], candidates: &[Listing], top_k: usize) -> Vec<Candidate> {
    let mut scored: Vec<Candidate> = candidates
        .iter()
        .filter_map(|listing| {
            listing.embedding.as_ref().map(|embedding| Candidate {
                score: cosine_similarity(query, embedding),
                listing: listing.clone(),
            })
        })
        .collect();

    scored.sort_by(|a, b| b.score.total_cmp(&a.score));
    scored.truncate(top_k);
    scored
}
