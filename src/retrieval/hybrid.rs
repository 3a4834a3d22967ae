//! Hybrid retrieval: several adapters fused with reciprocal rank fusion

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::validate_request;
use super::Retriever;
use crate::models::RankedList;
use crate::rag::fusion::fuse;
use crate::Result;

pub struct HybridRetriever {
    retrievers: Vec<Arc<dyn Retriever>>,
    candidate_k: usize,
    rrf_k: u32,
}

impl HybridRetriever {
    pub const NAME: &'static str = "hybrid";

    /// `candidate_k` is the depth requested from each inner retriever
    pub fn new(retrievers: Vec<Arc<dyn Retriever>>, candidate_k: usize, rrf_k: u32) -> Self {
        Self {
            retrievers,
            candidate_k,
            rrf_k,
        }
    }
}

#[async_trait]
impl Retriever for HybridRetriever {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList> {
        validate_request(query, k)?;
        let depth = self.candidate_k.max(k);

        let mut lists = Vec::with_capacity(self.retrievers.len());
        for retriever in &self.retrievers {
            let list = retriever.retrieve(query, depth).await?;
            debug!("{} contributed {} candidates", retriever.name(), list.len());
            lists.push(list);
        }

        let mut fused = fuse(&lists, self.rrf_k);
        fused.truncate(k);
        RankedList::new(Self::NAME, fused)
    }
}
