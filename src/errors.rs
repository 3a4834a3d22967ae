use thiserror::Error;

#[derive(Error, Debug)]
pub enum RagBenchError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Retrieval adapter unavailable: {0}")]
    AdapterUnavailable(String),

    #[error("Ground truth not found for question: {0}")]
    GroundTruthNotFound(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Embedding error: {0}")]
    EmbeddingError(String),

    #[error("LLM error: {0}")]
    LlmError(String),

    #[error("HTTP error: {0}")]
    HttpError(String),

    #[error("Serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlParsing(#[from] toml::de::Error),

    #[error("Config loading error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RagBenchError {
    /// Whether this error only concerns the query being processed, so a batch
    /// run can log it and move on to the next question
    pub fn is_per_query(&self) -> bool {
        matches!(
            self,
            Self::InvalidQuery(_)
                | Self::InvalidParameter(_)
                | Self::AdapterUnavailable(_)
                | Self::GroundTruthNotFound(_)
                | Self::EmbeddingError(_)
                | Self::LlmError(_)
                | Self::HttpError(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, RagBenchError>;
