//! CLI output formatting utilities
//!
//! This module provides consistent output formatting for the `ragbench` CLI

use crate::evaluation::EvaluationSummary;
use crate::models::Document;
use crate::AppConfig;

/// Safely truncate a string at character boundary (not byte boundary)
///
/// # Arguments
/// * `s` - The string to truncate
/// * `max_chars` - Maximum number of characters (not bytes)
///
/// # Returns
/// Truncated string with "..." suffix if truncated, otherwise the original string
#[must_use]
pub fn truncate_str(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        let truncated: String = s.chars().take(max_chars).collect();
        format!("{truncated}...")
    } else {
        s.to_string()
    }
}

/// Print search header
pub fn print_search_header(query: &str, method: &str, limit: usize) {
    println!("🔍 Searching for: \"{query}\"");
    println!("Method: {method} | Limit: {limit}");
    println!();
}

/// Print ranked search results
pub fn print_ranked_documents(documents: &[Document]) {
    println!("Found {} chunks:", documents.len());

    for (rank, document) in documents.iter().enumerate() {
        let meta = document.metadata();
        println!();
        println!("  #{} {}", rank + 1, meta.source.as_deref().unwrap_or("(unknown source)"));
        if let Some(page) = meta.page {
            println!("  📄 Page: {}", page + 1);
        }
        if let Some(chunk) = meta.chunk_index {
            println!("  🧩 Chunk: {chunk}");
        }
        let preview = truncate_str(&document.content().replace('\n', " "), 200);
        println!("  📝 {preview}");
    }
}

/// Print evaluation run summary
pub fn print_evaluation_summary(summary: &EvaluationSummary, output: &str) {
    println!();
    println!("📊 Evaluation Summary:");
    println!("  Questions: {}", summary.total);
    println!("  Written: {}", summary.written);
    println!("  Skipped: {}", summary.skipped);
    println!("  Output: {output}");
}

/// Print configuration
pub fn print_config(config: &AppConfig) {
    println!("📋 ragbench Configuration:");
    println!();

    println!("📝 Logging:");
    println!("  Level: {}", config.logging.level);
    println!("  Backtrace: {}", config.logging.backtrace);
    println!();

    println!("🧠 Embeddings:");
    println!("  Provider: {}", config.embeddings.provider);
    println!("  Endpoint: {}", config.embeddings.endpoint);
    println!("  Key: {}", mask_key(config.embeddings.api_key.as_deref()));
    println!("  Model: {}", config.embedding_model());
    println!("  Dimension: {}", config.embedding_dimension());
    println!("  Batch size: {}", config.embeddings.batch_size);
    println!("  Timeout: {}s", config.embeddings.timeout_secs);
    println!();

    println!("🤖 LLM:");
    println!("  Provider: {}", config.llm.provider);
    println!("  Endpoint: {}", config.llm_endpoint());
    println!("  Key: {}", mask_key(config.llm.api_key.as_deref()));
    println!("  Model: {}", config.llm_model());
    println!("  Temperature: {}", config.llm.temperature);
    println!("  Max tokens: {}", config.llm.max_tokens);
    println!("  Timeout: {}s", config.llm.timeout_secs);
    println!();

    println!("✂️  Chunking:");
    println!("  Chunk size: {}", config.chunking.chunk_size);
    println!("  Chunk overlap: {}", config.chunking.chunk_overlap);
    println!();

    println!("🔎 Retrieval:");
    println!("  Top k: {}", config.retrieval.top_k);
    println!("  Candidate k: {}", config.retrieval.candidate_k);
    println!("  RRF k: {}", config.rrf_k());
    println!(
        "  BM25: k1={} b={} epsilon={}",
        config.retrieval.bm25_k1, config.retrieval.bm25_b, config.retrieval.bm25_epsilon
    );
    println!("  Expansion queries: {}", config.retrieval.expansion_queries);
    println!("  Max context length: {}", config.retrieval.max_context_length);
    println!();

    println!("📁 Paths:");
    println!("  Data dir: {}", config.paths.data_dir.display());
    println!("  Golden dataset: {}", config.paths.golden_dataset.display());
    println!("  Results file: {}", config.paths.results_file.display());
}

/// Show only the last four characters of a secret
fn mask_key(key: Option<&str>) -> String {
    match key {
        None => "(not set)".to_string(),
        Some(key) if key.chars().count() <= 8 => "***masked***".to_string(),
        Some(key) => {
            let tail: String = key.chars().skip(key.chars().count() - 4).collect();
            format!("***{tail}")
        }
    }
}

/// Print colored output functions
pub fn print_info(msg: &str) {
    println!("ℹ️  {msg}");
}

pub fn print_success(msg: &str) {
    println!("✅ {msg}");
}

pub fn print_warning(msg: &str) {
    println!("⚠️  {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("❌ {msg}");
}
