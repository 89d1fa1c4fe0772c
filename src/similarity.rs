// Cosine similarity scoring for header embeddings.
//
// Pure numeric functions, no I/O. A query embedding is scored against a
// batch of candidate embeddings independently; filtering and ordering are
// the feed assembler's job, so `rank` preserves candidate order.

use crate::store::models::Post;

/// Cosine similarity between two embedding vectors, in [-1, 1].
///
/// A zero vector (or a dimension mismatch, which only happens if cache
/// entries from two different encoders get mixed) scores 0.0 rather than
/// dividing by zero.
pub fn cosine(a: &[f64], b: &[f64]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let mag_a: f64 = a.iter().map(|x| x * x).sum::<f64>().sqrt();
    let mag_b: f64 = b.iter().map(|x| x * x).sum::<f64>().sqrt();

    let denom = mag_a * mag_b;
    if denom < f64::EPSILON {
        0.0
    } else {
        dot / denom
    }
}

/// Score every candidate against the query, preserving candidate order.
pub fn rank(query: &[f64], candidates: Vec<(Post, Vec<f64>)>) -> Vec<(Post, f64)> {
    candidates
        .into_iter()
        .map(|(post, embedding)| {
            let score = cosine(query, &embedding);
            (post, score)
        })
        .collect()
}
