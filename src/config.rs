use std::path::Path;
use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;

use crate::errors::RagBenchError;

/// Prefix for environment overrides, e.g. `RAGBENCH__LLM__API_KEY`
const ENV_PREFIX: &str = "RAGBENCH";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub backtrace: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingsConfig {
    /// `openai` or `ollama`
    pub provider: String,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    pub model: String,
    pub dimension: usize,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

pub(crate) fn default_batch_size() -> usize {
    32
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// `openai` or `ollama`
    pub provider: String,
    pub endpoint: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_llm_model")]
    pub model: String,
    #[serde(default)]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_llm_model() -> String {
    "qwen2.5:7b".to_string()
}

pub(crate) fn default_max_tokens() -> usize {
    1024
}

pub(crate) fn default_timeout_secs() -> u64 {
    120
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of documents handed to the generator
    pub top_k: usize,
    /// Depth requested from each adapter before fusion
    pub candidate_k: usize,
    /// Reciprocal rank fusion damping constant
    #[serde(default = "default_rrf_k")]
    pub rrf_k: u32,
    #[serde(default = "default_bm25_k1")]
    pub bm25_k1: f32,
    #[serde(default = "default_bm25_b")]
    pub bm25_b: f32,
    #[serde(default = "default_bm25_epsilon")]
    pub bm25_epsilon: f32,
    #[serde(default = "default_expansion_queries")]
    pub expansion_queries: usize,
    #[serde(default = "default_max_context_length")]
    pub max_context_length: usize,
}

pub(crate) fn default_rrf_k() -> u32 {
    60
}

pub(crate) fn default_bm25_k1() -> f32 {
    1.5
}

pub(crate) fn default_bm25_b() -> f32 {
    0.75
}

pub(crate) fn default_bm25_epsilon() -> f32 {
    0.25
}

pub(crate) fn default_expansion_queries() -> usize {
    3
}

pub(crate) fn default_max_context_length() -> usize {
    4000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    pub data_dir: PathBuf,
    pub golden_dataset: PathBuf,
    pub results_file: PathBuf,
}

impl PathsConfig {
    pub fn corpus_file(&self) -> PathBuf {
        self.data_dir.join("corpus.json")
    }

    pub fn index_file(&self) -> PathBuf {
        self.data_dir.join("vector_index.json")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub logging: LoggingConfig,
    pub embeddings: EmbeddingsConfig,
    pub llm: LlmConfig,
    pub chunking: ChunkingConfig,
    pub retrieval: RetrievalConfig,
    pub paths: PathsConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file layered with `RAGBENCH__*` environment overrides
    pub fn load_from<P: AsRef<Path>>(path: P) -> crate::Result<Self> {
        let path = path.as_ref();
        let settings = config::Config::builder()
            .add_source(config::File::from(path).format(config::FileFormat::Toml))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default config file path
    pub fn load() -> crate::Result<Self> {
        // Try to load from config.toml first, then fall back to config.example.toml
        if Path::new("config.toml").exists() {
            Self::load_from("config.toml")
        } else if Path::new("config.example.toml").exists() {
            tracing::warn!(
                "Using config.example.toml. Please create config.toml for production use."
            );
            Self::load_from("config.example.toml")
        } else {
            Err(RagBenchError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "No config file found. Please create config.toml or config.example.toml",
            )))
        }
    }

    /// Reject settings that cannot produce a working pipeline
    pub fn validate(&self) -> crate::Result<()> {
        if self.chunking.chunk_size == 0 {
            return Err(RagBenchError::ConfigError(
                "chunking.chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.chunking.chunk_overlap > self.chunking.chunk_size {
            return Err(RagBenchError::ConfigError(format!(
                "chunking.chunk_overlap ({}) is larger than chunking.chunk_size ({})",
                self.chunking.chunk_overlap, self.chunking.chunk_size
            )));
        }
        if self.retrieval.top_k == 0 || self.retrieval.candidate_k == 0 {
            return Err(RagBenchError::ConfigError(
                "retrieval.top_k and retrieval.candidate_k must be greater than zero".to_string(),
            ));
        }
        if self.embeddings.dimension == 0 {
            return Err(RagBenchError::ConfigError(
                "embeddings.dimension must be greater than zero".to_string(),
            ));
        }
        if self.embeddings.batch_size == 0 {
            return Err(RagBenchError::ConfigError(
                "embeddings.batch_size must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Get embedding dimension
    pub fn embedding_dimension(&self) -> usize {
        self.embeddings.dimension
    }

    /// Get embedding model name
    pub fn embedding_model(&self) -> &str {
        &self.embeddings.model
    }

    /// Get LLM endpoint
    pub fn llm_endpoint(&self) -> &str {
        &self.llm.endpoint
    }

    /// Get LLM model
    pub fn llm_model(&self) -> &str {
        &self.llm.model
    }

    /// Get the RRF damping constant
    pub fn rrf_k(&self) -> u32 {
        self.retrieval.rrf_k
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig {
                level: "info".to_string(),
                backtrace: true,
            },
            embeddings: EmbeddingsConfig {
                provider: "ollama".to_string(),
                endpoint: "http://localhost:11434".to_string(),
                api_key: None,
                model: "nomic-embed-text".to_string(),
                dimension: 768,
                batch_size: default_batch_size(),
                timeout_secs: default_timeout_secs(),
            },
            llm: LlmConfig {
                provider: "ollama".to_string(),
                endpoint: "http://localhost:11434".to_string(),
                api_key: None,
                model: default_llm_model(),
                temperature: 0.0,
                max_tokens: default_max_tokens(),
                timeout_secs: default_timeout_secs(),
            },
            chunking: ChunkingConfig {
                chunk_size: 800,
                chunk_overlap: 200,
            },
            retrieval: RetrievalConfig {
                top_k: 5,
                candidate_k: 10,
                rrf_k: default_rrf_k(),
                bm25_k1: default_bm25_k1(),
                bm25_b: default_bm25_b(),
                bm25_epsilon: default_bm25_epsilon(),
                expansion_queries: default_expansion_queries(),
                max_context_length: default_max_context_length(),
            },
            paths: PathsConfig {
                data_dir: PathBuf::from("data"),
                golden_dataset: PathBuf::from("data/golden_dataset.jsonl"),
                results_file: PathBuf::from("data/run_results.jsonl"),
            },
        }
    }
}
