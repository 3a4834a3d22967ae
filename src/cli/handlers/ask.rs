//! Single-question RAG handler

use crate::cli::handlers::load_rag_service;
use crate::cli::output::print_info;
use crate::cli::output::print_warning;
use crate::retrieval::RetrievalMethod;
use crate::AppConfig;
use crate::Result;

pub async fn handle_ask_command(
    config: &AppConfig,
    question: &str,
    method: RetrievalMethod,
    limit: Option<usize>,
    show_context: bool,
) -> Result<()> {
    let limit = limit.unwrap_or(config.retrieval.top_k);
    print_info(&format!("🤖 RAG Query ({method}): \"{question}\""));

    let rag = load_rag_service(config, method)?;

    println!("\n🔍 Retrieving and generating...");
    let response = rag.answer(question, limit).await?;

    if response.sources.is_empty() {
        print_warning("No relevant chunks found; the answer is ungrounded");
    }

    println!();
    println!("{}", response.format());

    if show_context {
        println!("📚 Assembled context ({} chars):", response.context.chars().count());
        println!("{}", response.context);
        println!("{}", rag.context_assembler().create_summary(&response.sources));
    }

    Ok(())
}
