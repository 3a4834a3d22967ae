//! Core retrieval and evaluation records

use std::collections::BTreeMap;
use std::collections::HashSet;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::RagBenchError;
use crate::Result;

/// Provenance of a chunk
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    /// 0-based page within the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// 0-based chunk position within the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_index: Option<usize>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl DocumentMetadata {
    pub fn with_source(source: impl Into<String>) -> Self {
        Self {
            source: Some(source.into()),
            ..Self::default()
        }
    }
}

/// A retrievable content unit. Its content string is its identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    content: String,
    #[serde(default)]
    metadata: DocumentMetadata,
}

impl Document {
    pub fn new(content: impl Into<String>, metadata: DocumentMetadata) -> Self {
        Self {
            content: content.into(),
            metadata,
        }
    }

    /// Document without provenance
    pub fn from_content(content: impl Into<String>) -> Self {
        Self::new(content, DocumentMetadata::default())
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    /// Deduplication key within a fusion pass
    pub fn identity(&self) -> &str {
        &self.content
    }

    pub fn metadata(&self) -> &DocumentMetadata {
        &self.metadata
    }
}

/// Ordered retrieval result of one adapter for one query (rank 1 first)
#[derive(Debug, Clone, PartialEq)]
pub struct RankedList {
    source: String,
    documents: Vec<Document>,
}

impl RankedList {
    /// Build a ranked list, rejecting repeated document identities
    pub fn new(source: impl Into<String>, documents: Vec<Document>) -> Result<Self> {
        let source = source.into();
        let mut seen = HashSet::with_capacity(documents.len());
        for doc in &documents {
            if !seen.insert(doc.identity()) {
                return Err(RagBenchError::InvalidParameter(format!(
                    "ranked list from '{source}' contains a duplicate document"
                )));
            }
        }
        Ok(Self { source, documents })
    }

    /// Build a ranked list keeping only the first occurrence of each identity
    pub fn dedup(source: impl Into<String>, documents: Vec<Document>) -> Self {
        let mut seen = HashSet::with_capacity(documents.len());
        let documents = documents
            .into_iter()
            .filter(|doc| seen.insert(doc.identity().to_string()))
            .collect();
        Self {
            source: source.into(),
            documents,
        }
    }

    pub fn empty(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            documents: Vec::new(),
        }
    }

    /// Name of the adapter that produced this list
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn into_documents(self) -> Vec<Document> {
        self.documents
    }

    /// Iterate over `(rank, document)` with 1-based ranks
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &Document)> {
        self.documents.iter().enumerate().map(|(idx, doc)| (idx + 1, doc))
    }
}

/// Reference data for one golden question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundTruthEntry {
    pub ground_truth_contexts: Vec<String>,
    pub ground_truth_answer: String,
}

/// One line of the golden dataset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenRecord {
    pub question: String,
    pub ground_truth_contexts: Vec<String>,
    pub ground_truth_answer: String,
}

impl GoldenRecord {
    pub fn ground_truth(&self) -> GroundTruthEntry {
        GroundTruthEntry {
            ground_truth_contexts: self.ground_truth_contexts.clone(),
            ground_truth_answer: self.ground_truth_answer.clone(),
        }
    }
}

/// A question to evaluate, possibly without reference data on the same line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    pub question: String,
}

/// Normalized record consumed by the downstream scorer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    pub question: String,
    pub ground_truth_contexts: Vec<String>,
    pub ground_truth_answer: String,
    pub retrieved_contexts: Vec<String>,
    pub generated_answer: String,
}
