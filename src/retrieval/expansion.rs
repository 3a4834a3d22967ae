//! Multi-query expansion
//!
//! The generator rewrites the question into several narrower phrasings; each
//! phrasing is retrieved separately and the lists are fused with RRF, the
//! original question's list first.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::warn;

use super::validate_request;
use super::Retriever;
use crate::llm::prompts::build_expansion_prompt;
use crate::llm::prompts::parse_line_list;
use crate::llm::GenerationParams;
use crate::llm::TextGenerator;
use crate::models::RankedList;
use crate::rag::fusion::fuse;
use crate::Result;

pub struct ExpansionRetriever {
    inner: Arc<dyn Retriever>,
    generator: Arc<dyn TextGenerator>,
    query_count: usize,
    rrf_k: u32,
    params: GenerationParams,
}

impl ExpansionRetriever {
    pub const NAME: &'static str = "expansion";

    pub fn new(
        inner: Arc<dyn Retriever>,
        generator: Arc<dyn TextGenerator>,
        query_count: usize,
        rrf_k: u32,
        params: GenerationParams,
    ) -> Self {
        Self {
            inner,
            generator,
            query_count,
            rrf_k,
            params,
        }
    }

    /// Original question followed by up to `query_count` generated phrasings
    pub async fn expand(&self, question: &str) -> Result<Vec<String>> {
        let mut queries = vec![question.to_string()];
        if self.query_count == 0 {
            return Ok(queries);
        }

        let text = self
            .generator
            .generate(&build_expansion_prompt(question, self.query_count), &self.params)
            .await?;

        for phrasing in parse_line_list(&text).into_iter().take(self.query_count) {
            if !queries.contains(&phrasing) {
                queries.push(phrasing);
            }
        }
        if queries.len() == 1 {
            warn!("Query expansion produced no usable phrasings");
        }
        Ok(queries)
    }
}

#[async_trait]
impl Retriever for ExpansionRetriever {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList> {
        validate_request(query, k)?;

        let queries = self.expand(query).await?;
        debug!("Retrieving with {} queries", queries.len());

        let mut lists = Vec::with_capacity(queries.len());
        for q in &queries {
            lists.push(self.inner.retrieve(q, k).await?);
        }

        let mut fused = fuse(&lists, self.rrf_k);
        fused.truncate(k);
        RankedList::new(Self::NAME, fused)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;
    use crate::models::Document;

    /// Serves canned lists per query and records what it was asked
    struct Canned {
        lists: HashMap<&'static str, Vec<&'static str>>,
        seen: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl Retriever for Canned {
        fn name(&self) -> &str {
            "canned"
        }

        async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList> {
            self.seen.lock().unwrap().push(query.to_string());
            let docs = self
                .lists
                .get(query)
                .map(|contents| {
                    contents
                        .iter()
                        .take(k)
                        .map(|c| Document::from_content(*c))
                        .collect()
                })
                .unwrap_or_default();
            RankedList::new("canned", docs)
        }
    }

    struct Reply(&'static str);

    #[async_trait]
    impl TextGenerator for Reply {
        async fn generate(&self, _prompt: &str, _params: &GenerationParams) -> Result<String> {
            Ok(self.0.to_string())
        }
    }

    fn canned() -> Arc<Canned> {
        Arc::new(Canned {
            lists: HashMap::from([
                ("what is rrf", vec!["A", "B"]),
                ("how are ranks fused", vec!["C", "B"]),
                ("why use rank fusion", vec!["B", "D"]),
            ]),
            seen: Mutex::new(Vec::new()),
        })
    }

    #[tokio::test]
    async fn test_fuses_original_and_phrasings() {
        let inner = canned();
        let expansion = ExpansionRetriever::new(
            inner.clone(),
            Arc::new(Reply("1. how are ranks fused\n\n2. why use rank fusion\n3. what is rrf")),
            3,
            60,
            GenerationParams::default(),
        );

        let list = expansion.retrieve("what is rrf", 2).await.unwrap();
        let contents: Vec<&str> = list.documents().iter().map(Document::content).collect();
        // B appears in every list; A comes first among the single hits
        assert_eq!(contents, vec!["B", "A"]);

        // The duplicate of the original question is not retrieved twice
        let seen = inner.seen.lock().unwrap();
        assert_eq!(
            *seen,
            vec!["what is rrf", "how are ranks fused", "why use rank fusion"]
        );
    }

    #[tokio::test]
    async fn test_caps_phrasing_count() {
        let expansion = ExpansionRetriever::new(
            canned(),
            Arc::new(Reply("one\ntwo\nthree\nfour")),
            2,
            60,
            GenerationParams::default(),
        );
        let queries = expansion.expand("q").await.unwrap();
        assert_eq!(queries, vec!["q", "one", "two"]);
    }
}
