//! Evaluation record construction

use std::collections::HashMap;

use tracing::warn;

use crate::errors::RagBenchError;
use crate::models::Document;
use crate::models::EvaluationRecord;
use crate::models::GoldenRecord;
use crate::models::GroundTruthEntry;
use crate::Result;

/// Combine a question, its retrieved chunks and generated answer with the
/// reference data. Retrieved contents keep their rank order.
pub fn build_record(
    question: &str,
    retrieved: &[Document],
    generated_answer: &str,
    ground_truth: &GroundTruthEntry,
) -> EvaluationRecord {
    EvaluationRecord {
        question: question.to_string(),
        ground_truth_contexts: ground_truth.ground_truth_contexts.clone(),
        ground_truth_answer: ground_truth.ground_truth_answer.clone(),
        retrieved_contexts: retrieved.iter().map(|doc| doc.content().to_string()).collect(),
        generated_answer: generated_answer.to_string(),
    }
}

/// Reference data keyed by the exact question text
#[derive(Debug, Clone, Default)]
pub struct GroundTruthIndex {
    entries: HashMap<String, GroundTruthEntry>,
}

impl GroundTruthIndex {
    /// Index golden records; a repeated question keeps its first entry
    pub fn from_records(records: &[GoldenRecord]) -> Self {
        let mut entries = HashMap::with_capacity(records.len());
        for record in records {
            if entries.contains_key(&record.question) {
                warn!("Duplicate golden question ignored: {}", record.question);
                continue;
            }
            entries.insert(record.question.clone(), record.ground_truth());
        }
        Self { entries }
    }

    /// Exact string match; no trimming or case folding
    pub fn lookup(&self, question: &str) -> Result<&GroundTruthEntry> {
        self.entries
            .get(question)
            .ok_or_else(|| RagBenchError::GroundTruthNotFound(question.to_string()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Looks up ground truth and builds records
#[derive(Debug, Clone)]
pub struct EvaluationRecordBuilder {
    ground_truth: GroundTruthIndex,
}

impl EvaluationRecordBuilder {
    pub fn new(ground_truth: GroundTruthIndex) -> Self {
        Self { ground_truth }
    }

    pub fn build(
        &self,
        question: &str,
        retrieved: &[Document],
        generated_answer: &str,
    ) -> Result<EvaluationRecord> {
        let entry = self.ground_truth.lookup(question)?;
        Ok(build_record(question, retrieved, generated_answer, entry))
    }

    pub fn ground_truth(&self) -> &GroundTruthIndex {
        &self.ground_truth
    }
}
