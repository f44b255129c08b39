use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

use crate::stopwords;

fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is valid"))
}

/// Lowercased tokens of two or more word characters, stop words removed.
pub fn tokenize<'a>(
    text: &'a str,
    stop_words: &'a HashSet<String>,
) -> impl Iterator<Item = String> + 'a {
    let lowered = text.to_lowercase();
    token_pattern()
        .find_iter(&lowered)
        .map(|m| m.as_str().to_string())
        .collect::<Vec<_>>()
        .into_iter()
        .filter(move |token| !stop_words.contains(token))
}

/// Sparse row: strictly increasing column indices with their weights.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    pub indices: Vec<usize>,
    pub values: Vec<f64>,
}

impl SparseVector {
    pub fn from_counts(mut entries: Vec<(usize, f64)>) -> Self {
        entries.sort_unstable_by_key(|(col, _)| *col);
        let (indices, values) = entries.into_iter().unzip();
        Self { indices, values }
    }

    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| *v == 0.0)
    }

    pub fn norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        let values = self.values.iter().copied();
        self.indices.iter().copied().zip(values)
    }

    fn normalize(&mut self) {
        let norm = self.norm();
        if norm > 0.0 {
            self.values.iter_mut().for_each(|v| *v /= norm);
        }
    }
}

/// Term-frequency x inverse-document-frequency weighting with a capped,
/// alphabetically ordered vocabulary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    #[serde(skip, default = "stopwords::english")]
    stop_words: HashSet<String>,
}

impl TfidfVectorizer {
    /// Learn vocabulary and idf from `documents` and return their weighted,
    /// L2-normalised rows.
    pub fn fit_transform(
        documents: &[&str],
        max_features: Option<usize>,
    ) -> (Self, Vec<SparseVector>) {
        let stop_words = stopwords::english();

        let counts: Vec<HashMap<String, u32>> = documents
            .par_iter()
            .map(|doc| {
                let mut counts = HashMap::new();
                for token in tokenize(doc, &stop_words) {
                    *counts.entry(token).or_insert(0u32) += 1;
                }
                counts
            })
            .collect();

        let mut term_freq: HashMap<&str, u64> = HashMap::new();
        let mut doc_freq: HashMap<&str, u64> = HashMap::new();
        for doc in &counts {
            for (term, &count) in doc {
                *term_freq.entry(term.as_str()).or_insert(0) += u64::from(count);
                *doc_freq.entry(term.as_str()).or_insert(0) += 1;
            }
        }

        let mut terms: Vec<&str> = term_freq.keys().copied().collect();
        if let Some(limit) = max_features {
            if terms.len() > limit {
                terms.sort_unstable_by(|a, b| term_freq[b].cmp(&term_freq[a]).then(a.cmp(b)));
                terms.truncate(limit);
            }
        }
        terms.sort_unstable();

        let n_docs = documents.len() as f64;
        let idf: Vec<f64> = terms
            .iter()
            .map(|term| ((1.0 + n_docs) / (1.0 + doc_freq[term] as f64)).ln() + 1.0)
            .collect();
        let vocabulary: HashMap<String, usize> = terms
            .iter()
            .enumerate()
            .map(|(col, term)| (term.to_string(), col))
            .collect();

        let vectorizer = Self {
            vocabulary,
            idf,
            stop_words,
        };
        let rows: Vec<SparseVector> = counts.par_iter().map(|doc| vectorizer.weigh(doc)).collect();
        (vectorizer, rows)
    }

    pub fn transform(&self, text: &str) -> SparseVector {
        let mut counts: HashMap<String, u32> = HashMap::new();
        for token in tokenize(text, &self.stop_words) {
            if self.vocabulary.contains_key(&token) {
                *counts.entry(token).or_insert(0) += 1;
            }
        }
        self.weigh(&counts)
    }

    pub fn n_features(&self) -> usize {
        self.idf.len()
    }

    pub fn column(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    pub fn idf(&self, term: &str) -> Option<f64> {
        self.column(term).map(|col| self.idf[col])
    }

    fn weigh(&self, counts: &HashMap<String, u32>) -> SparseVector {
        let entries = counts
            .iter()
            .filter_map(|(term, &count)| {
                self.vocabulary
                    .get(term)
                    .map(|&col| (col, f64::from(count) * self.idf[col]))
            })
            .collect();
        let mut row = SparseVector::from_counts(entries);
        row.normalize();
        row
    }
}
