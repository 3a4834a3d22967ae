//! Batch evaluation handler

use std::path::PathBuf;

use crate::cli::handlers::load_rag_service;
use crate::cli::output::print_evaluation_summary;
use crate::cli::output::print_info;
use crate::cli::output::print_warning;
use crate::evaluation::read_jsonl;
use crate::evaluation::EvaluationRecordBuilder;
use crate::evaluation::EvaluationRunner;
use crate::evaluation::GroundTruthIndex;
use crate::evaluation::JsonlWriter;
use crate::models::GoldenRecord;
use crate::models::QuestionRecord;
use crate::retrieval::RetrievalMethod;
use crate::AppConfig;
use crate::Result;

/// Options of the `eval` command after CLI parsing
pub struct EvalOptions {
    pub dataset: Option<PathBuf>,
    pub questions: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub method: RetrievalMethod,
    pub limit: Option<usize>,
    pub append: bool,
}

pub async fn handle_eval_command(config: &AppConfig, options: EvalOptions) -> Result<()> {
    let dataset = options
        .dataset
        .unwrap_or_else(|| config.paths.golden_dataset.clone());
    let output = options
        .output
        .unwrap_or_else(|| config.paths.results_file.clone());
    let limit = options.limit.unwrap_or(config.retrieval.top_k);

    print_info(&format!(
        "🧪 Evaluating {} with {} retrieval (k = {})",
        dataset.display(),
        options.method,
        limit
    ));

    let golden: Vec<GoldenRecord> = read_jsonl(&dataset)?;
    let ground_truth = GroundTruthIndex::from_records(&golden);

    let questions: Vec<String> = match &options.questions {
        Some(path) => read_jsonl::<QuestionRecord>(path)?
            .into_iter()
            .map(|record| record.question)
            .collect(),
        None => golden.into_iter().map(|record| record.question).collect(),
    };

    if questions.is_empty() {
        print_warning("No questions to evaluate");
        return Ok(());
    }
    println!("   ✓ {} questions, {} with ground truth", questions.len(), ground_truth.len());

    let rag = load_rag_service(config, options.method)?;
    let runner = EvaluationRunner::new(rag, EvaluationRecordBuilder::new(ground_truth));

    let mut writer = if options.append {
        JsonlWriter::append(&output)?
    } else {
        JsonlWriter::create(&output)?
    };

    let summary = runner.run(&questions, &mut writer, limit).await?;
    print_evaluation_summary(&summary, &output.display().to_string());

    if summary.skipped > 0 {
        print_warning(&format!(
            "{} question(s) skipped; see the log for details",
            summary.skipped
        ));
    }
    Ok(())
}
