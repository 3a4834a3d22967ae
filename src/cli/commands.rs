//! CLI command definitions and argument parsing

use std::path::PathBuf;

use clap::Parser;
use clap::Subcommand;

use crate::retrieval::RetrievalMethod;

#[derive(Parser)]
#[command(name = "ragbench")]
#[command(about = "Retrieval-augmented generation toolkit: index, search, ask and evaluate")]
#[command(version)]
pub struct Cli {
    /// Enable verbose debug logging (default: info level)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to the configuration file (default: config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Chunk a directory of documents and build the vector index
    Index {
        /// Directory containing .txt / .md sources
        source_dir: PathBuf,
        /// Rebuild embeddings even when the stored index matches the corpus
        #[arg(short, long)]
        force: bool,
    },
    /// Retrieve chunks without LLM generation
    Search {
        /// Search query
        query: String,
        /// Retrieval method
        #[arg(short, long, value_enum, default_value_t = RetrievalMethod::Hybrid)]
        method: RetrievalMethod,
        /// Maximum number of results (default: retrieval.top_k)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Answer a question with retrieval-augmented generation
    Ask {
        /// The question to ask
        question: String,
        /// Retrieval method
        #[arg(short, long, value_enum, default_value_t = RetrievalMethod::Hybrid)]
        method: RetrievalMethod,
        /// Number of chunks to retrieve (default: retrieval.top_k)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Show retrieved sources and the assembled context
        #[arg(short, long)]
        show_context: bool,
    },
    /// Run the golden dataset through the pipeline and write evaluation records
    Eval {
        /// Golden dataset (JSONL with question and ground truth)
        #[arg(long)]
        dataset: Option<PathBuf>,
        /// Questions to evaluate (JSONL with a question field); defaults to
        /// the dataset's own questions
        #[arg(long)]
        questions: Option<PathBuf>,
        /// Output JSONL file (default: paths.results_file)
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Retrieval method
        #[arg(short, long, value_enum, default_value_t = RetrievalMethod::Hybrid)]
        method: RetrievalMethod,
        /// Number of chunks to retrieve per question (default: retrieval.top_k)
        #[arg(short, long)]
        limit: Option<usize>,
        /// Append to the output file instead of overwriting it
        #[arg(long)]
        append: bool,
    },
    /// Show current configuration
    Config,
}
