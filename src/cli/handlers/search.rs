//! Retrieval-only search handler

use crate::cli::handlers::load_retriever;
use crate::cli::output::print_ranked_documents;
use crate::cli::output::print_search_header;
use crate::cli::output::print_warning;
use crate::retrieval::RetrievalMethod;
use crate::AppConfig;
use crate::Result;

pub async fn handle_search_command(
    config: &AppConfig,
    query: &str,
    method: RetrievalMethod,
    limit: Option<usize>,
) -> Result<()> {
    let limit = limit.unwrap_or(config.retrieval.top_k);
    print_search_header(query, &method.to_string(), limit);

    let retriever = load_retriever(config, method)?;
    let results = retriever.retrieve(query, limit).await?;

    if results.is_empty() {
        print_warning("No matching chunks found");
        return Ok(());
    }

    print_ranked_documents(results.documents());
    Ok(())
}
