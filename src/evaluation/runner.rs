//! Batch evaluation loop

use tracing::info;
use tracing::warn;

use super::EvaluationRecordBuilder;
use super::JsonlWriter;
use crate::models::EvaluationRecord;
use crate::rag::RagService;
use crate::Result;

/// Outcome of one evaluation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EvaluationSummary {
    pub total: usize,
    pub written: usize,
    pub skipped: usize,
}

/// Answers each question with the RAG pipeline and records the result
pub struct EvaluationRunner {
    rag: RagService,
    builder: EvaluationRecordBuilder,
}

impl EvaluationRunner {
    pub fn new(rag: RagService, builder: EvaluationRecordBuilder) -> Self {
        Self { rag, builder }
    }

    /// Process `questions` one after another.
    ///
    /// A question that fails (retrieval, generation or missing ground truth)
    /// is logged and skipped. A failed write aborts the run.
    pub async fn run(
        &self,
        questions: &[String],
        writer: &mut JsonlWriter,
        k: usize,
    ) -> Result<EvaluationSummary> {
        let mut summary = EvaluationSummary {
            total: questions.len(),
            ..EvaluationSummary::default()
        };

        for (idx, question) in questions.iter().enumerate() {
            info!("[{}/{}] {}", idx + 1, questions.len(), question);

            let record = match self.evaluate(question, k).await {
                Ok(record) => record,
                Err(e) if e.is_per_query() => {
                    warn!("Skipping question {}: {}", idx + 1, e);
                    summary.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            writer.write_record(&record)?;
            summary.written += 1;
        }

        info!(
            "Evaluation finished: {} written, {} skipped of {}",
            summary.written, summary.skipped, summary.total
        );
        Ok(summary)
    }

    /// Build the record for a single question
    pub async fn evaluate(&self, question: &str, k: usize) -> Result<EvaluationRecord> {
        // Ground truth is checked before retrieval
        self.builder.ground_truth().lookup(question)?;

        let response = self.rag.answer(question, k).await?;
        self.builder.build(question, &response.sources, &response.answer)
    }
}
