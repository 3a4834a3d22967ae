//! Retrieval adapters
//!
//! Every strategy implements [`Retriever`]: given a query and a depth `k` it
//! returns at most `k` unique documents, best first. Composite strategies
//! (hybrid, HyDE, query expansion) are retrievers themselves and can be
//! handed to the RAG pipeline interchangeably.

pub mod expansion;
pub mod hybrid;
pub mod hyde;
pub mod lexical;
pub mod vector;

use std::sync::Arc;

use async_trait::async_trait;

pub use expansion::ExpansionRetriever;
pub use hybrid::HybridRetriever;
pub use hyde::HydeRetriever;
pub use lexical::Bm25Index;
pub use lexical::Bm25Params;
pub use lexical::LexicalAdapter;
pub use vector::IndexEntry;
pub use vector::VectorAdapter;
pub use vector::VectorIndex;

use crate::config::RetrievalConfig;
use crate::embeddings::Embedder;
use crate::errors::RagBenchError;
use crate::llm::GenerationParams;
use crate::llm::TextGenerator;
use crate::models::RankedList;
use crate::Result;

/// A retrieval strategy
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Label recorded as the [`RankedList`] source
    fn name(&self) -> &str;

    /// Return up to `k` documents for `query`, most relevant first
    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList>;
}

/// Input checks shared by every adapter
pub fn validate_request(query: &str, k: usize) -> Result<()> {
    if query.trim().is_empty() {
        return Err(RagBenchError::InvalidQuery(
            "query is empty".to_string(),
        ));
    }
    if k == 0 {
        return Err(RagBenchError::InvalidParameter(
            "k must be at least 1".to_string(),
        ));
    }
    Ok(())
}

/// Retrieval strategy selectable from the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum RetrievalMethod {
    /// BM25 keyword ranking
    Lexical,
    /// Embedding cosine similarity
    Vector,
    /// BM25 and vector fused with RRF
    Hybrid,
    /// Hypothetical document embedding
    Hyde,
    /// LLM query rephrasings fused with RRF
    Expansion,
}

impl std::fmt::Display for RetrievalMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::Lexical => "lexical",
            Self::Vector => "vector",
            Self::Hybrid => "hybrid",
            Self::Hyde => "hyde",
            Self::Expansion => "expansion",
        };
        f.write_str(name)
    }
}

/// Shared, read-only state the adapters are built from
#[derive(Clone)]
pub struct RetrievalResources {
    pub bm25: Arc<Bm25Index>,
    pub vectors: Arc<VectorIndex>,
    pub embedder: Arc<dyn Embedder>,
    pub generator: Arc<dyn TextGenerator>,
}

/// Assemble the retriever stack for `method`
pub fn build_retriever(
    method: RetrievalMethod,
    resources: &RetrievalResources,
    config: &RetrievalConfig,
    params: GenerationParams,
) -> Arc<dyn Retriever> {
    let lexical = || -> Arc<dyn Retriever> {
        Arc::new(LexicalAdapter::new(Arc::clone(&resources.bm25)))
    };
    let vector = || -> Arc<dyn Retriever> {
        Arc::new(VectorAdapter::new(
            Arc::clone(&resources.vectors),
            Arc::clone(&resources.embedder),
        ))
    };

    match method {
        RetrievalMethod::Lexical => lexical(),
        RetrievalMethod::Vector => vector(),
        RetrievalMethod::Hybrid => Arc::new(HybridRetriever::new(
            vec![lexical(), vector()],
            config.candidate_k,
            config.rrf_k,
        )),
        RetrievalMethod::Hyde => Arc::new(HydeRetriever::new(
            Arc::clone(&resources.generator),
            Arc::clone(&resources.embedder),
            Arc::clone(&resources.vectors),
            params,
        )),
        RetrievalMethod::Expansion => Arc::new(ExpansionRetriever::new(
            vector(),
            Arc::clone(&resources.generator),
            config.expansion_queries,
            config.rrf_k,
            params,
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_request() {
        assert!(validate_request("what is rrf", 1).is_ok());
        assert!(matches!(
            validate_request("", 3),
            Err(RagBenchError::InvalidQuery(_))
        ));
        assert!(matches!(
            validate_request(" \t\n", 3),
            Err(RagBenchError::InvalidQuery(_))
        ));
        assert!(matches!(
            validate_request("query", 0),
            Err(RagBenchError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_method_display() {
        assert_eq!(RetrievalMethod::Hybrid.to_string(), "hybrid");
        assert_eq!(RetrievalMethod::Hyde.to_string(), "hyde");
    }
}
