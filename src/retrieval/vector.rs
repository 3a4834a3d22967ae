//! Dense retrieval over a persisted embedding index

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use super::validate_request;
use super::Retriever;
use crate::corpus::Corpus;
use crate::embeddings::cosine_similarity;
use crate::embeddings::Embedder;
use crate::errors::RagBenchError;
use crate::models::Document;
use crate::models::RankedList;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub document: Document,
    pub embedding: Vec<f32>,
}

/// Embeddings for every chunk of one corpus snapshot.
///
/// Built once by `ragbench index` and loaded read-only afterwards; queries
/// share it through an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorIndex {
    model: String,
    dimension: usize,
    corpus_fingerprint: String,
    built_at: DateTime<Utc>,
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    /// Embed every chunk of `corpus` in batches of `batch_size`
    pub async fn build(corpus: &Corpus, embedder: &dyn Embedder, batch_size: usize) -> Result<Self> {
        if batch_size == 0 {
            return Err(RagBenchError::InvalidParameter(
                "embedding batch size must be at least 1".to_string(),
            ));
        }

        let mut entries = Vec::with_capacity(corpus.len());
        let total_batches = corpus.len().div_ceil(batch_size);

        for (batch_idx, batch) in corpus.documents().chunks(batch_size).enumerate() {
            let texts: Vec<&str> = batch.iter().map(Document::content).collect();
            let embeddings = embedder.embed_batch(&texts).await?;
            if embeddings.len() != batch.len() {
                return Err(RagBenchError::EmbeddingError(format!(
                    "expected {} embeddings, got {}",
                    batch.len(),
                    embeddings.len()
                )));
            }
            entries.extend(batch.iter().cloned().zip(embeddings).map(|(document, embedding)| {
                IndexEntry {
                    document,
                    embedding,
                }
            }));
            debug!("Embedded batch {}/{}", batch_idx + 1, total_batches);
        }

        let dimension = entries.first().map_or(0, |entry| entry.embedding.len());
        if let Some(bad) = entries.iter().find(|entry| entry.embedding.len() != dimension) {
            return Err(RagBenchError::EmbeddingError(format!(
                "inconsistent embedding dimensions: {} and {}",
                dimension,
                bad.embedding.len()
            )));
        }

        info!(
            "Built vector index: {} chunks, {} dimensions, model {}",
            entries.len(),
            dimension,
            embedder.model()
        );

        Ok(Self {
            model: embedder.model().to_string(),
            dimension,
            corpus_fingerprint: corpus.fingerprint().to_string(),
            built_at: Utc::now(),
            entries,
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string(self)?)?;
        info!("Saved vector index to {}", path.display());
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(RagBenchError::AdapterUnavailable(format!(
                "vector index {} not found; run `ragbench index` first",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path)?;
        let index: Self = serde_json::from_str(&content)?;
        if index.corpus_fingerprint.len() != 64
            || !index.corpus_fingerprint.bytes().all(|b| b.is_ascii_hexdigit())
        {
            return Err(RagBenchError::AdapterUnavailable(format!(
                "vector index {} has a malformed corpus fingerprint; re-run `ragbench index --force`",
                path.display()
            )));
        }
        debug!(
            "Loaded vector index: {} entries built at {}",
            index.len(),
            index.built_at
        );
        Ok(index)
    }

    /// Fail when the index was built from a different corpus snapshot or
    /// with a different embedding model
    pub fn ensure_matches(&self, corpus: &Corpus, model: &str) -> Result<()> {
        if self.corpus_fingerprint != corpus.fingerprint() {
            return Err(RagBenchError::AdapterUnavailable(format!(
                "vector index is stale (built for corpus {}, current corpus {}); re-run `ragbench index`",
                short(&self.corpus_fingerprint),
                corpus.short_fingerprint()
            )));
        }
        self.ensure_model(model)
    }

    /// Fail when query embeddings from `model` would not share the index's vector space
    pub fn ensure_model(&self, model: &str) -> Result<()> {
        if self.model == model {
            Ok(())
        } else {
            Err(RagBenchError::AdapterUnavailable(format!(
                "vector index was built with embedding model {}, queries use {}; re-run `ragbench index`",
                self.model, model
            )))
        }
    }

    /// Top `k` entries by cosine similarity; ties keep index order
    pub fn search_by_vector(&self, query: &[f32], k: usize) -> Result<Vec<(&Document, f32)>> {
        if self.entries.is_empty() {
            return Err(RagBenchError::AdapterUnavailable(
                "vector index is empty".to_string(),
            ));
        }
        if query.len() != self.dimension {
            return Err(RagBenchError::AdapterUnavailable(format!(
                "query embedding has {} dimensions, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<(&Document, f32)> = self
            .entries
            .iter()
            .map(|entry| (&entry.document, cosine_similarity(query, &entry.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        Ok(scored)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn corpus_fingerprint(&self) -> &str {
        &self.corpus_fingerprint
    }

    pub fn built_at(&self) -> DateTime<Utc> {
        self.built_at
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn short(fingerprint: &str) -> &str {
    fingerprint
        .char_indices()
        .nth(12)
        .map_or(fingerprint, |(end, _)| &fingerprint[..end])
}

/// Turn similarity hits into a ranked list
pub(crate) fn hits_to_list(source: &str, hits: Vec<(&Document, f32)>) -> Result<RankedList> {
    RankedList::new(source, hits.into_iter().map(|(doc, _)| doc.clone()).collect())
}

/// Embeds the query and searches the shared index
pub struct VectorAdapter {
    index: Arc<VectorIndex>,
    embedder: Arc<dyn Embedder>,
}

impl VectorAdapter {
    pub const NAME: &'static str = "vector";

    pub fn new(index: Arc<VectorIndex>, embedder: Arc<dyn Embedder>) -> Self {
        Self { index, embedder }
    }
}

#[async_trait]
impl Retriever for VectorAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList> {
        validate_request(query, k)?;
        if self.index.is_empty() {
            return Err(RagBenchError::AdapterUnavailable(
                "vector index is empty".to_string(),
            ));
        }

        self.index.ensure_model(self.embedder.model())?;

        let embedding = self.embedder.embed(query).await?;
        let hits = self.index.search_by_vector(&embedding, k)?;
        debug!("Vector search returned {} hits", hits.len());
        hits_to_list(Self::NAME, hits)
    }
}
