//! Corpus chunking and vector index handlers

use std::path::Path;

use tracing::info;

use crate::cli::output::print_info;
use crate::cli::output::print_success;
use crate::corpus::Corpus;
use crate::corpus::TextSplitter;
use crate::embeddings::EmbeddingClient;
use crate::errors::RagBenchError;
use crate::retrieval::VectorIndex;
use crate::AppConfig;
use crate::Result;

/// Chunk `source_dir`, persist the corpus and (re)build the vector index
pub async fn handle_index_command(config: &AppConfig, source_dir: &Path, force: bool) -> Result<()> {
    print_info(&format!("📚 Indexing documents in {}", source_dir.display()));

    println!("\n✂️  Step 1: Chunking documents...");
    let splitter = TextSplitter::from_config(&config.chunking)?;
    let corpus = Corpus::from_directory(source_dir, &splitter)?;
    println!(
        "   ✓ {} chunks (fingerprint {})",
        corpus.len(),
        corpus.short_fingerprint()
    );

    let corpus_path = config.paths.corpus_file();
    corpus.save(&corpus_path)?;

    let index_path = config.paths.index_file();
    if !force {
        match VectorIndex::load(&index_path) {
            Ok(existing) => match existing.ensure_matches(&corpus, config.embedding_model()) {
                Ok(()) => {
                    print_success(&format!(
                        "Vector index is up to date ({} entries, built {}); use --force to rebuild",
                        existing.len(),
                        existing.built_at().format("%Y-%m-%d %H:%M:%S UTC")
                    ));
                    return Ok(());
                }
                Err(e) => info!("Rebuilding vector index: {}", e),
            },
            Err(RagBenchError::AdapterUnavailable(_)) => info!("No vector index yet; building"),
            Err(e) => return Err(e),
        }
    }

    println!("🧠 Step 2: Embedding chunks...");
    let embedder = EmbeddingClient::from_app_config(config)?;
    let index = VectorIndex::build(&corpus, &embedder, config.embeddings.batch_size).await?;
    println!(
        "   ✓ {} embeddings, {} dimensions",
        index.len(),
        index.dimension()
    );

    index.save(&index_path)?;
    print_success(&format!(
        "Index ready: {} and {}",
        corpus_path.display(),
        index_path.display()
    ));
    Ok(())
}
