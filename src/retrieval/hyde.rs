//! Hypothetical document embeddings (HyDE)
//!
//! The question is answered "blind" by the generator and the resulting
//! passage, rather than the question, is embedded and searched. Answers tend
//! to sit closer to relevant chunks in embedding space than questions do.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::validate_request;
use super::vector::hits_to_list;
use super::Retriever;
use super::VectorIndex;
use crate::embeddings::Embedder;
use crate::errors::RagBenchError;
use crate::llm::prompts::build_hyde_prompt;
use crate::llm::GenerationParams;
use crate::llm::TextGenerator;
use crate::models::RankedList;
use crate::Result;

pub struct HydeRetriever {
    generator: Arc<dyn TextGenerator>,
    embedder: Arc<dyn Embedder>,
    index: Arc<VectorIndex>,
    params: GenerationParams,
}

impl HydeRetriever {
    pub const NAME: &'static str = "hyde";

    pub fn new(
        generator: Arc<dyn TextGenerator>,
        embedder: Arc<dyn Embedder>,
        index: Arc<VectorIndex>,
        params: GenerationParams,
    ) -> Self {
        Self {
            generator,
            embedder,
            index,
            params,
        }
    }

    /// The passage that will stand in for `question` during search
    pub async fn hypothetical_document(&self, question: &str) -> Result<String> {
        let passage = self
            .generator
            .generate(&build_hyde_prompt(question), &self.params)
            .await?;
        if passage.trim().is_empty() {
            return Err(RagBenchError::LlmError(
                "generator returned an empty hypothetical document".to_string(),
            ));
        }
        Ok(passage)
    }
}

#[async_trait]
impl Retriever for HydeRetriever {
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

        let passage = self.hypothetical_document(query).await?;
        debug!("HyDE passage: {} chars", passage.chars().count());

        let embedding = self.embedder.embed(&passage).await?;
        let hits = self.index.search_by_vector(&embedding, k)?;
        hits_to_list(Self::NAME, hits)
    }
}
