use anyhow::bail;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use shared::telemetry::Telemetry;
use shared::types::Result;

use crate::search::{ScoredDocument, SearchEngine};
use crate::svd::{SparseMatrix, TruncatedSvd};
use crate::tfidf::TfidfVectorizer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LsaParams {
    pub max_features: Option<usize>,
    pub n_components: usize,
    pub seed: u64,
}

impl Default for LsaParams {
    fn default() -> Self {
        Self {
            max_features: Some(10_000),
            n_components: 100,
            seed: 42,
        }
    }
}

impl LsaParams {
    /// Stable text form, part of the stored model's cache key.
    pub fn cache_key(&self) -> String {
        format!(
            "max_features={};n_components={};seed={}",
            self.max_features
                .map(|n| n.to_string())
                .unwrap_or_else(|| "all".to_string()),
            self.n_components,
            self.seed
        )
    }
}

/// TF-IDF followed by truncated SVD, plus every corpus document projected
/// into the reduced space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LsaModel {
    pub(crate) vectorizer: TfidfVectorizer,
    pub(crate) svd: TruncatedSvd,
    pub(crate) doc_vectors: Array2<f64>,
}

impl LsaModel {
    pub fn fit(documents: &[&str], params: &LsaParams) -> Result<Self> {
        if documents.is_empty() {
            bail!("cannot fit a model on an empty corpus");
        }
        let telemetry = Telemetry::new();

        let (vectorizer, rows) = TfidfVectorizer::fit_transform(documents, params.max_features);
        if vectorizer.n_features() == 0 {
            bail!("corpus has no indexable terms");
        }
        tracing::info!(
            documents = documents.len(),
            terms = vectorizer.n_features(),
            elapsed_ms = telemetry.elapsed_ms(),
            "tf-idf matrix built"
        );

        let matrix = SparseMatrix::new(&rows, vectorizer.n_features());
        let svd = TruncatedSvd::fit(&matrix, params.n_components, params.seed)?;
        let doc_vectors = svd.transform(&matrix);
        tracing::info!(
            components = svd.n_components(),
            elapsed_ms = telemetry.elapsed_ms(),
            "truncated svd fitted"
        );

        Ok(Self {
            vectorizer,
            svd,
            doc_vectors,
        })
    }

    /// Project arbitrary text into the reduced space.
    pub fn embed(&self, text: &str) -> Array1<f64> {
        self.svd.transform_row(&self.vectorizer.transform(text))
    }

    pub fn search(&self, query: &str, top_k: usize) -> Vec<ScoredDocument> {
        let query_vector = self.embed(query);
        SearchEngine::rank(query_vector.view(), &self.doc_vectors, top_k)
    }

    pub fn n_documents(&self) -> usize {
        self.doc_vectors.nrows()
    }

    pub fn n_components(&self) -> usize {
        self.svd.n_components()
    }

    pub fn n_features(&self) -> usize {
        self.vectorizer.n_features()
    }
}
