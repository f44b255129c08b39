use crate::error::PayloadError;
use serde::{Deserialize, Serialize};

/// Body of `POST /search`, sent as `application/x-www-form-urlencoded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

impl SearchQuery {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

/// Ranked search results as three parallel arrays.
///
/// The arrays always have the same length: construction and deserialisation
/// both go through [`SearchResponse::new`], which rejects anything else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawSearchResponse")]
pub struct SearchResponse {
    documents: Vec<String>,
    indices: Vec<usize>,
    similarities: Vec<f64>,
}

#[derive(Deserialize)]
struct RawSearchResponse {
    documents: Vec<String>,
    indices: Vec<usize>,
    similarities: Vec<f64>,
}

impl TryFrom<RawSearchResponse> for SearchResponse {
    type Error = PayloadError;

    fn try_from(raw: RawSearchResponse) -> Result<Self, Self::Error> {
        Self::new(raw.documents, raw.indices, raw.similarities)
    }
}

/// One row of a [`SearchResponse`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchHit<'a> {
    pub index: usize,
    pub document: &'a str,
    pub similarity: f64,
}

impl SearchResponse {
    pub fn new(
        documents: Vec<String>,
        indices: Vec<usize>,
        similarities: Vec<f64>,
    ) -> Result<Self, PayloadError> {
        if documents.len() != indices.len() || documents.len() != similarities.len() {
            return Err(PayloadError::LengthMismatch {
                documents: documents.len(),
                indices: indices.len(),
                similarities: similarities.len(),
            });
        }
        if let Some(position) = similarities.iter().position(|s| !s.is_finite()) {
            return Err(PayloadError::NonFiniteSimilarity { position });
        }
        Ok(Self {
            documents,
            indices,
            similarities,
        })
    }

    pub fn empty() -> Self {
        Self {
            documents: Vec::new(),
            indices: Vec::new(),
            similarities: Vec::new(),
        }
    }

    /// Build from `(index, document, similarity)` rows in rank order.
    pub fn from_ranked<I>(rows: I) -> Result<Self, PayloadError>
    where
        I: IntoIterator<Item = (usize, String, f64)>,
    {
        let mut documents = Vec::new();
        let mut indices = Vec::new();
        let mut similarities = Vec::new();
        for (index, document, similarity) in rows {
            indices.push(index);
            documents.push(document);
            similarities.push(similarity);
        }
        Self::new(documents, indices, similarities)
    }

    pub fn documents(&self) -> &[String] {
        &self.documents
    }

    pub fn indices(&self) -> &[usize] {
        &self.indices
    }

    pub fn similarities(&self) -> &[f64] {
        &self.similarities
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn hits(&self) -> impl Iterator<Item = SearchHit<'_>> {
        self.documents
            .iter()
            .zip(&self.indices)
            .zip(&self.similarities)
            .map(|((document, &index), &similarity)| SearchHit {
                index,
                document,
                similarity,
            })
    }
}
