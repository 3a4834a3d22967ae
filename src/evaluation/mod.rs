//! Evaluation harness
//!
//! Reads a golden dataset, answers each question with the RAG pipeline and
//! appends one [`EvaluationRecord`](crate::models::EvaluationRecord) per
//! question to a JSONL file for a downstream scorer.

pub mod dataset;
pub mod record;
pub mod runner;

pub use dataset::read_jsonl;
pub use dataset::JsonlWriter;
pub use record::build_record;
pub use record::EvaluationRecordBuilder;
pub use record::GroundTruthIndex;
pub use runner::EvaluationRunner;
pub use runner::EvaluationSummary;
