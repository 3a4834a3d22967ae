//! BM25 (Okapi) lexical retrieval over the tokenized chunk corpus

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::validate_request;
use super::Retriever;
use crate::config::RetrievalConfig;
use crate::corpus::tokenize;
use crate::corpus::Corpus;
use crate::errors::RagBenchError;
use crate::models::Document;
use crate::models::RankedList;
use crate::Result;

/// BM25 tuning parameters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bm25Params {
    pub k1: f32,
    pub b: f32,
    /// Negative idfs are floored to `epsilon * mean(idf)`
    pub epsilon: f32,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self {
            k1: crate::config::default_bm25_k1(),
            b: crate::config::default_bm25_b(),
            epsilon: crate::config::default_bm25_epsilon(),
        }
    }
}

impl Bm25Params {
    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self {
            k1: config.bm25_k1,
            b: config.bm25_b,
            epsilon: config.bm25_epsilon,
        }
    }
}

/// Term statistics for a fixed corpus. Built once, read-only afterwards.
#[derive(Debug, Clone)]
pub struct Bm25Index {
    documents: Vec<Document>,
    term_freqs: Vec<HashMap<String, u32>>,
    doc_lens: Vec<usize>,
    avg_doc_len: f32,
    idf: HashMap<String, f32>,
    params: Bm25Params,
}

impl Bm25Index {
    pub fn from_corpus(corpus: &Corpus, params: Bm25Params) -> Self {
        Self::build(corpus.documents().to_vec(), corpus.tokenized(), params)
    }

    /// Build from chunk texts and their token lists (aligned 1:1)
    pub fn build(documents: Vec<Document>, tokenized: Vec<Vec<String>>, params: Bm25Params) -> Self {
        debug_assert_eq!(documents.len(), tokenized.len());

        let mut term_freqs = Vec::with_capacity(tokenized.len());
        let mut doc_lens = Vec::with_capacity(tokenized.len());
        let mut doc_freqs: HashMap<String, u32> = HashMap::new();

        for tokens in tokenized {
            doc_lens.push(tokens.len());
            let mut freqs: HashMap<String, u32> = HashMap::new();
            for token in tokens {
                *freqs.entry(token).or_default() += 1;
            }
            for term in freqs.keys() {
                *doc_freqs.entry(term.clone()).or_default() += 1;
            }
            term_freqs.push(freqs);
        }

        let doc_count = doc_lens.len();
        let avg_doc_len = if doc_count == 0 {
            0.0
        } else {
            doc_lens.iter().sum::<usize>() as f32 / doc_count as f32
        };

        let idf = compute_idf(&doc_freqs, doc_count, params.epsilon);

        Self {
            documents,
            term_freqs,
            doc_lens,
            avg_doc_len,
            idf,
            params,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// BM25 score of every document, in corpus order
    pub fn scores(&self, query_tokens: &[String]) -> Vec<f32> {
        let Bm25Params { k1, b, .. } = self.params;
        let avg_doc_len = self.avg_doc_len.max(f32::EPSILON);

        self.term_freqs
            .iter()
            .zip(&self.doc_lens)
            .map(|(freqs, &doc_len)| {
                let length_norm = k1 * (1.0 - b + b * doc_len as f32 / avg_doc_len);
                // Repeated query tokens contribute once per occurrence
                query_tokens
                    .iter()
                    .map(|term| {
                        let tf = freqs.get(term).copied().unwrap_or(0) as f32;
                        let idf = self.idf.get(term).copied().unwrap_or(0.0);
                        idf * (tf * (k1 + 1.0)) / (tf + length_norm)
                    })
                    .sum()
            })
            .collect()
    }

    /// Indices of the `n` best documents; ties keep corpus order
    pub fn top_n(&self, query_tokens: &[String], n: usize) -> Vec<(usize, f32)> {
        let mut ranked: Vec<(usize, f32)> = self.scores(query_tokens).into_iter().enumerate().collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranked.truncate(n);
        ranked
    }
}

fn compute_idf(doc_freqs: &HashMap<String, u32>, doc_count: usize, epsilon: f32) -> HashMap<String, f32> {
    let n = doc_count as f32;
    let mut idf = HashMap::with_capacity(doc_freqs.len());
    let mut idf_sum = 0.0f32;
    let mut negative = Vec::new();

    for (term, &freq) in doc_freqs {
        let freq = freq as f32;
        let value = (n - freq + 0.5).ln() - (freq + 0.5).ln();
        idf_sum += value;
        if value < 0.0 {
            negative.push(term.clone());
        }
        idf.insert(term.clone(), value);
    }

    if !idf.is_empty() {
        let floor = epsilon * idf_sum / idf.len() as f32;
        for term in negative {
            idf.insert(term, floor);
        }
    }
    idf
}

/// Lexical retrieval adapter
pub struct LexicalAdapter {
    index: Arc<Bm25Index>,
}

impl LexicalAdapter {
    pub const NAME: &'static str = "bm25";

    pub fn new(index: Arc<Bm25Index>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Bm25Index {
        &self.index
    }
}

#[async_trait]
impl Retriever for LexicalAdapter {
    fn name(&self) -> &str {
        Self::NAME
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList> {
        validate_request(query, k)?;
        if self.index.is_empty() {
            return Err(RagBenchError::AdapterUnavailable(
                "lexical corpus is empty".to_string(),
            ));
        }

        let tokens = tokenize(query);
        let hits = self.index.top_n(&tokens, k);
        debug!("BM25 retrieved {} of {} chunks", hits.len(), self.index.len());

        let documents = hits
            .into_iter()
            .map(|(idx, _)| self.index.documents[idx].clone())
            .collect();
        // Corpus contents are already unique
        RankedList::new(Self::NAME, documents)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus(texts: &[&str]) -> Corpus {
        Corpus::new(texts.iter().map(|t| Document::from_content(*t)).collect())
    }

    fn adapter(texts: &[&str]) -> LexicalAdapter {
        LexicalAdapter::new(Arc::new(Bm25Index::from_corpus(&corpus(texts), Bm25Params::default())))
    }

    fn contents(list: &RankedList) -> Vec<&str> {
        list.documents().iter().map(Document::content).collect()
    }

    #[test]
    fn test_idf_matches_okapi_formula() {
        let index = Bm25Index::from_corpus(
            &corpus(&["apple banana", "apple cherry", "apple date", "elder"]),
            Bm25Params::default(),
        );
        // "cherry": n = 1 of N = 4 -> ln(3.5 / 1.5)
        let cherry = index.idf["cherry"];
        assert!((cherry - (3.5f32 / 1.5).ln()).abs() < 1e-6);
        // "apple": n = 3 of 4 -> ln(1.5 / 3.5) < 0, floored to epsilon * mean idf
        assert!(index.idf["apple"] > 0.0);
    }

    #[tokio::test]
    async fn test_rare_terms_rank_higher() {
        let adapter = adapter(&[
            "the cat sat on the mat",
            "reciprocal rank fusion combines rankings",
            "the dog sat on the log",
        ]);

        let list = adapter.retrieve("rank fusion", 2).await.unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(contents(&list)[0], "reciprocal rank fusion combines rankings");
        assert_eq!(list.source(), "bm25");
    }

    #[tokio::test]
    async fn test_ties_keep_corpus_order() {
        let adapter = adapter(&["zero one", "two three", "four five"]);
        let list = adapter.retrieve("unrelated", 3).await.unwrap();
        assert_eq!(contents(&list), vec!["zero one", "two three", "four five"]);
    }

    #[tokio::test]
    async fn test_k_larger_than_corpus() {
        let adapter = adapter(&["only document"]);
        assert_eq!(adapter.retrieve("document", 10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let adapter = adapter(&["text"]);
        assert!(matches!(
            adapter.retrieve("   ", 3).await,
            Err(RagBenchError::InvalidQuery(_))
        ));
        assert!(matches!(
            adapter.retrieve("text", 0).await,
            Err(RagBenchError::InvalidParameter(_))
        ));
    }

    #[tokio::test]
    async fn test_empty_corpus_is_unavailable() {
        let adapter = adapter(&[]);
        assert!(matches!(
            adapter.retrieve("anything", 3).await,
            Err(RagBenchError::AdapterUnavailable(_))
        ));
    }

    #[test]
    fn test_repeated_query_terms_count_twice() {
        let index = Bm25Index::from_corpus(&corpus(&["alpha beta", "gamma delta"]), Bm25Params::default());
        let once = index.scores(&["alpha".to_string()])[0];
        let twice = index.scores(&["alpha".to_string(), "alpha".to_string()])[0];
        assert!((twice - 2.0 * once).abs() < 1e-6);
    }
}
