//! In-process collaborators for integration tests

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use ragbench::embeddings::Embedder;
use ragbench::llm::GenerationParams;
use ragbench::llm::TextGenerator;
use ragbench::models::Document;
use ragbench::models::RankedList;
use ragbench::retrieval::Retriever;
use ragbench::RagBenchError;
use ragbench::Result;

pub const DIMENSION: usize = 64;

/// Bag-of-words embedder: every token is hashed onto one of `DIMENSION` axes
pub struct HashEmbedder;

#[async_trait]
impl Embedder for HashEmbedder {
    fn model(&self) -> &str {
        "hash-bow"
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vector = vec![0.0f32; DIMENSION];
        for token in ragbench::corpus::tokenize(text) {
            let bucket = token
                .bytes()
                .fold(7usize, |acc, b| acc.wrapping_mul(31).wrapping_add(b as usize));
            vector[bucket % DIMENSION] += 1.0;
        }
        Ok(vector)
    }
}

/// Replies with queued answers, then with a fixed fallback
pub struct ScriptedGenerator {
    replies: Mutex<VecDeque<Result<String>>>,
    fallback: String,
    pub prompts: Mutex<Vec<String>>,
}

impl ScriptedGenerator {
    pub fn always(reply: &str) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            fallback: reply.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn with_replies(replies: Vec<Result<String>>, fallback: &str) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            fallback: fallback.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompt_count(&self) -> usize {
        self.prompts.lock().unwrap().len()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, prompt: &str, _params: &GenerationParams) -> Result<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        match self.replies.lock().unwrap().pop_front() {
            Some(reply) => reply,
            None => Ok(self.fallback.clone()),
        }
    }
}

/// Fails for one specific query, returns a fixed list otherwise
pub struct FlakyRetriever {
    pub failing_query: String,
    pub documents: Vec<&'static str>,
}

#[async_trait]
impl Retriever for FlakyRetriever {
    fn name(&self) -> &str {
        "flaky"
    }

    async fn retrieve(&self, query: &str, k: usize) -> Result<RankedList> {
        ragbench::retrieval::validate_request(query, k)?;
        if query == self.failing_query {
            return Err(RagBenchError::AdapterUnavailable("index offline".to_string()));
        }
        RankedList::new(
            "flaky",
            self.documents
                .iter()
                .take(k)
                .map(|c| Document::from_content(*c))
                .collect(),
        )
    }
}

pub fn corpus_texts() -> Vec<&'static str> {
    vec![
        "Reciprocal rank fusion sums one over k plus rank across every ranked list.",
        "BM25 scores a document by term frequency, inverse document frequency and length.",
        "Dense retrieval embeds the query and compares it to chunk vectors with cosine similarity.",
        "HyDE asks a language model to write a hypothetical answer and searches with its embedding.",
        "Query expansion rewrites a question into several related questions before retrieval.",
        "The recursive splitter breaks text on paragraphs, lines and spaces to bound chunk size.",
    ]
}
