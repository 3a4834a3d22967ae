//! CLI command handlers module
//!
//! - index: chunk sources and build the vector index
//! - search: retrieval without generation
//! - ask: single RAG answer
//! - eval: batch evaluation over a golden dataset
//! - info: configuration display

pub mod ask;
pub mod eval;
pub mod index;
pub mod info;
pub mod search;

pub use ask::*;
pub use eval::*;
pub use index::*;
pub use info::*;
pub use search::*;

use std::sync::Arc;

use tracing::debug;

use crate::corpus::Corpus;
use crate::embeddings::Embedder;
use crate::embeddings::EmbeddingClient;
use crate::llm::GenerationParams;
use crate::llm::LlmService;
use crate::rag::ContextAssembler;
use crate::rag::RagService;
use crate::retrieval::build_retriever;
use crate::retrieval::Bm25Index;
use crate::retrieval::Bm25Params;
use crate::retrieval::RetrievalMethod;
use crate::retrieval::RetrievalResources;
use crate::retrieval::Retriever;
use crate::retrieval::VectorIndex;
use crate::AppConfig;
use crate::Result;

/// Load the persisted corpus and index and connect the model clients
pub fn load_resources(config: &AppConfig) -> Result<RetrievalResources> {
    let corpus = Corpus::load(&config.paths.corpus_file())?;
    debug!(
        "Loaded corpus {} ({} chunks)",
        corpus.short_fingerprint(),
        corpus.len()
    );

    let embedder = EmbeddingClient::from_app_config(config)?;
    let vectors = VectorIndex::load(&config.paths.index_file())?;
    vectors.ensure_matches(&corpus, embedder.model())?;

    let bm25 = Bm25Index::from_corpus(&corpus, Bm25Params::from_config(&config.retrieval));

    Ok(RetrievalResources {
        bm25: Arc::new(bm25),
        vectors: Arc::new(vectors),
        embedder: Arc::new(embedder),
        generator: Arc::new(LlmService::new(config)?),
    })
}

/// Retriever for `method` over the persisted corpus
pub fn load_retriever(config: &AppConfig, method: RetrievalMethod) -> Result<Arc<dyn Retriever>> {
    let resources = load_resources(config)?;
    Ok(build_retriever(
        method,
        &resources,
        &config.retrieval,
        GenerationParams::from_app_config(config),
    ))
}

/// Full RAG pipeline for `method`
pub fn load_rag_service(config: &AppConfig, method: RetrievalMethod) -> Result<RagService> {
    let resources = load_resources(config)?;
    let params = GenerationParams::from_app_config(config);
    let retriever = build_retriever(method, &resources, &config.retrieval, params);

    Ok(RagService::new(
        retriever,
        resources.generator,
        ContextAssembler::new(config.retrieval.max_context_length),
        params,
    ))
}
