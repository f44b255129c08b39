use ndarray::{Array2, ArrayView1, Axis};
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredDocument {
    pub index: usize,
    pub similarity: f64,
}

pub struct SearchEngine;

impl SearchEngine {
    /// Cosine similarity; zero when either vector has zero norm.
    pub fn cosine_similarity(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
        let norm_a = a.dot(&a).sqrt();
        let norm_b = b.dot(&b).sqrt();
        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }
        a.dot(&b) / (norm_a * norm_b)
    }

    /// Score every row of `documents` against `query` and keep the best
    /// `top_k`, highest similarity first. Equal scores keep index order.
    pub fn rank(
        query: ArrayView1<'_, f64>,
        documents: &Array2<f64>,
        top_k: usize,
    ) -> Vec<ScoredDocument> {
        let mut scored: Vec<ScoredDocument> = documents
            .axis_iter(Axis(0))
            .enumerate()
            .map(|(index, row)| ScoredDocument {
                index,
                similarity: Self::cosine_similarity(query, row),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.similarity
                .partial_cmp(&a.similarity)
                .unwrap_or(Ordering::Equal)
                .then(a.index.cmp(&b.index))
        });
        scored.truncate(top_k);
        scored
    }
}
