//! Complete RAG pipeline: Retrieve -> Assemble -> Generate

use std::sync::Arc;

use tracing::debug;
use tracing::info;

use crate::errors::Result;
use crate::llm::prompts::build_rag_prompt;
use crate::llm::GenerationParams;
use crate::llm::TextGenerator;
use crate::models::Document;
use crate::rag::ContextAssembler;
use crate::retrieval::Retriever;

/// Complete RAG service
pub struct RagService {
    retriever: Arc<dyn Retriever>,
    generator: Arc<dyn TextGenerator>,
    context_assembler: ContextAssembler,
    params: GenerationParams,
}

impl RagService {
    #[must_use]
    pub fn new(
        retriever: Arc<dyn Retriever>,
        generator: Arc<dyn TextGenerator>,
        context_assembler: ContextAssembler,
        params: GenerationParams,
    ) -> Self {
        Self {
            retriever,
            generator,
            context_assembler,
            params,
        }
    }

    /// Answer `question` from the top `k` retrieved chunks
    ///
    /// # Errors
    /// - `InvalidQuery` / `InvalidParameter` for an empty question or `k == 0`
    /// - Retrieval errors from the configured retriever
    /// - LLM generation errors (API failures, invalid responses)
    pub async fn answer(&self, question: &str, k: usize) -> Result<RagResponse> {
        info!("Processing RAG query: {}", question);

        debug!("Step 1: Retrieving documents with {}", self.retriever.name());
        let sources = self.retrieve(question, k).await?;
        debug!("Retrieved {} documents", sources.len());

        debug!("Step 2: Assembling context");
        let (context, used) = self.context_assembler.assemble_counted(&sources);
        if used < sources.len() {
            debug!(
                "Context budget of {} chars fits {} of {} documents",
                self.context_assembler.max_context_length(),
                used,
                sources.len()
            );
        }

        debug!("Step 3: Generating answer");
        let prompt = build_rag_prompt(question, &context);
        let answer = self.generator.generate(&prompt, &self.params).await?;

        info!("RAG query completed successfully");

        Ok(RagResponse {
            question: question.to_string(),
            answer,
            sources,
            context,
        })
    }

    /// Retrieval only, without generation
    pub async fn retrieve(&self, question: &str, k: usize) -> Result<Vec<Document>> {
        Ok(self.retriever.retrieve(question, k).await?.into_documents())
    }

    #[must_use]
    pub fn retriever(&self) -> &dyn Retriever {
        self.retriever.as_ref()
    }

    #[must_use]
    pub const fn context_assembler(&self) -> &ContextAssembler {
        &self.context_assembler
    }
}

/// RAG response
#[derive(Debug, Clone)]
pub struct RagResponse {
    pub question: String,
    pub answer: String,
    /// Every retrieved document, best first
    pub sources: Vec<Document>,
    pub context: String,
}

impl RagResponse {
    /// Get a formatted string representation
    #[must_use]
    pub fn format(&self) -> String {
        let mut output = String::new();
        output.push_str(&format!("Question: {}\n\n", self.question));
        output.push_str(&format!("Answer:\n{}\n\n", self.answer));
        output.push_str(&format!("Sources ({} chunks):\n", self.sources.len()));

        for (idx, source) in self.sources.iter().enumerate().take(5) {
            let meta = source.metadata();
            let location = match (&meta.source, meta.page) {
                (Some(path), Some(page)) => format!("{path}, page {}", page + 1),
                (Some(path), None) => path.clone(),
                _ => "unknown source".to_string(),
            };
            output.push_str(&format!("  {}. {}\n", idx + 1, location));
        }

        output
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::errors::RagBenchError;
    use crate::models::DocumentMetadata;
    use crate::models::RankedList;

    struct TwoDocs;

    #[async_trait]
    impl Retriever for TwoDocs {
        fn name(&self) -> &str {
            "two"
        }

        async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList> {
            crate::retrieval::validate_request(query, k)?;
            let docs = vec![
                Document::new("RRF sums reciprocal ranks.", DocumentMetadata::with_source("rrf.md")),
                Document::from_content("BM25 scores terms."),
            ];
            RankedList::new("two", docs.into_iter().take(k).collect())
        }
    }

    #[derive(Default)]
    struct Echo {
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl TextGenerator for Echo {
        async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            Ok("It sums reciprocal ranks.".to_string())
        }
    }

    #[tokio::test]
    async fn test_answer_uses_retrieved_context() {
        let generator = Arc::new(Echo::default());
        let rag = RagService::new(
            Arc::new(TwoDocs),
            generator.clone(),
            ContextAssembler::default(),
            GenerationParams::default(),
        );

        let response = rag.answer("What does RRF do?", 2).await.unwrap();
        assert_eq!(response.answer, "It sums reciprocal ranks.");
        assert_eq!(response.sources.len(), 2);
        assert!(response.context.contains("[Document 1] (rrf.md)"));

        let prompts = generator.prompts.lock().unwrap();
        assert!(prompts[0].contains("RRF sums reciprocal ranks."));
        assert!(prompts[0].contains("What does RRF do?"));

        let formatted = response.format();
        assert!(formatted.contains("Sources (2 chunks)"));
        assert!(formatted.contains("1. rrf.md"));
    }

    #[tokio::test]
    async fn test_invalid_question_skips_generation() {
        let generator = Arc::new(Echo::default());
        let rag = RagService::new(
            Arc::new(TwoDocs),
            generator.clone(),
            ContextAssembler::default(),
            GenerationParams::default(),
        );

        assert!(matches!(
            rag.answer("  ", 2).await,
            Err(RagBenchError::InvalidQuery(_))
        ));
        assert!(generator.prompts.lock().unwrap().is_empty());
    }
}
