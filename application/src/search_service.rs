use anyhow::{anyhow, Context};
use domain::models::SearchResponse;
use infrastructure::{
    config::Config,
    corpus::{Corpus, CorpusScanner},
    index_storage::IndexStorage,
    lsa::{LsaModel, LsaParams},
};
use shared::telemetry::Telemetry;
use shared::types::Result;
use std::path::PathBuf;

/// Where the model in use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexSource {
    Stored,
    Fitted,
}

pub struct SearchService {
    corpus: Corpus,
    db_path: PathBuf,
    params: LsaParams,
    top_k: usize,
    model: Option<LsaModel>,
}

impl SearchService {
    /// Read the corpus. The index is not available until
    /// [`SearchService::build_index`] has run.
    pub fn new(config: &Config) -> Result<Self> {
        let corpus = CorpusScanner::new(&config.corpus_dir).load()?;
        tracing::info!(
            documents = corpus.len(),
            fingerprint = corpus.fingerprint(),
            "corpus loaded"
        );
        Ok(Self::with_corpus(
            corpus,
            config.db_path.clone(),
            config.lsa_params(),
            config.top_k,
        ))
    }

    pub fn with_corpus(
        corpus: Corpus,
        db_path: impl Into<PathBuf>,
        params: LsaParams,
        top_k: usize,
    ) -> Self {
        Self {
            corpus,
            db_path: db_path.into(),
            params,
            top_k,
            model: None,
        }
    }

    /// Load the stored model for this corpus, or fit and store a new one.
    /// `retrain` skips the lookup.
    pub fn build_index(&mut self, retrain: bool) -> Result<IndexSource> {
        let telemetry = Telemetry::new();
        let storage = IndexStorage::new(&self.db_path)?;
        let key = self.cache_key();

        if !retrain {
            match storage.load(&key) {
                Ok(Some(model)) if model.n_documents() == self.corpus.len() => {
                    tracing::info!(elapsed_ms = telemetry.elapsed_ms(), "loaded stored index");
                    self.model = Some(model);
                    return Ok(IndexSource::Stored);
                }
                Ok(_) => tracing::info!("no stored index for this corpus"),
                Err(e) => tracing::warn!(error = %e, "stored index unreadable, refitting"),
            }
        }

        tracing::info!(documents = self.corpus.len(), "fitting lsa model");
        let model = LsaModel::fit(&self.corpus.texts(), &self.params)?;
        storage
            .save(&key, &model)
            .context("failed to store fitted index")?;
        tracing::info!(
            elapsed_ms = telemetry.elapsed_ms(),
            "index fitted and stored"
        );
        self.model = Some(model);
        Ok(IndexSource::Fitted)
    }

    /// Top documents for `query` as parallel arrays in rank order.
    pub fn search(&self, query: &str) -> Result<SearchResponse> {
        let telemetry = Telemetry::new();
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| anyhow!("search index has not been built"))?;

        let hits = model.search(query, self.top_k);
        let mut rows = Vec::with_capacity(hits.len());
        for hit in hits {
            let document = self
                .corpus
                .get(hit.index)
                .with_context(|| format!("index refers to missing document {}", hit.index))?;
            rows.push((hit.index, document.text.clone(), hit.similarity));
        }
        let response = SearchResponse::from_ranked(rows)?;

        tracing::debug!(
            query,
            results = response.len(),
            elapsed_ms = telemetry.elapsed_ms(),
            "search answered"
        );
        Ok(response)
    }

    pub fn is_ready(&self) -> bool {
        self.model.is_some()
    }

    pub fn corpus(&self) -> &Corpus {
        &self.corpus
    }

    fn cache_key(&self) -> String {
        format!("{}|{}", self.corpus.fingerprint(), self.params.cache_key())
    }
}
