//! Embedding API clients for various providers

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use futures::stream;
use futures::stream::StreamExt;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use super::Embedder;
use super::EmbeddingConfig;
use crate::errors::RagBenchError;
use crate::Result;

/// Ollama has no batch endpoint; this many single requests run at once
const OLLAMA_CONCURRENCY: usize = 8;

/// Supported embedding providers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmbeddingProvider {
    /// `OpenAI`-compatible embeddings API
    OpenAI,
    /// Ollama local embeddings
    Ollama,
}

impl FromStr for EmbeddingProvider {
    type Err = RagBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(RagBenchError::ConfigError(format!(
                "unknown provider '{other}' (expected openai or ollama)"
            ))),
        }
    }
}

/// Client for generating embeddings from various providers
pub struct EmbeddingClient {
    provider: EmbeddingProvider,
    model: String,
    dimension: usize,
    endpoint: String,
    api_key: Option<String>,
    client: Client,
}

impl EmbeddingClient {
    /// Create a new embedding client
    pub fn new(config: &EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .pool_idle_timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| RagBenchError::HttpError(e.to_string()))?;

        Ok(Self {
            provider: config.provider,
            model: config.model.clone(),
            dimension: config.dimension,
            endpoint: config.endpoint.clone(),
            api_key: config.api_key.clone(),
            client,
        })
    }

    pub fn from_app_config(config: &crate::config::AppConfig) -> Result<Self> {
        Self::new(&EmbeddingConfig::from_app_config(config)?)
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<()> {
        if embedding.len() == self.dimension {
            Ok(())
        } else {
            Err(RagBenchError::EmbeddingError(format!(
                "model {} returned {} dimensions, configured for {}",
                self.model,
                embedding.len(),
                self.dimension
            )))
        }
    }

    /// Generate embeddings using `OpenAI` API (single or batch input)
    async fn generate_openai(&self, input: Vec<&str>) -> Result<Vec<Vec<f32>>> {
        let api_key = self.api_key.as_ref().ok_or_else(|| {
            RagBenchError::ConfigError("OpenAI API key not provided".to_string())
        })?;

        #[derive(Serialize)]
        struct OpenAIRequest<'a> {
            input: Vec<&'a str>,
            model: &'a str,
        }

        #[derive(Deserialize)]
        struct OpenAIResponse {
            data: Vec<EmbeddingData>,
        }

        #[derive(Deserialize)]
        struct EmbeddingData {
            index: usize,
            embedding: Vec<f32>,
        }

        let url = format!("{}/embeddings", self.endpoint);
        let expected = input.len();
        debug!("Calling OpenAI embeddings API: {} ({} items)", url, expected);

        let request = OpenAIRequest {
            input,
            model: &self.model,
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {api_key}"))
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RagBenchError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagBenchError::EmbeddingError(format!(
                "OpenAI API error ({status}): {error_text}"
            )));
        }

        let mut result: OpenAIResponse = response.json().await.map_err(|e| {
            RagBenchError::EmbeddingError(format!("Failed to parse response: {e}"))
        })?;

        if result.data.len() != expected {
            return Err(RagBenchError::EmbeddingError(format!(
                "expected {expected} embeddings, got {}",
                result.data.len()
            )));
        }

        // The API may return items out of order
        result.data.sort_by_key(|d| d.index);
        let embeddings: Vec<Vec<f32>> = result.data.into_iter().map(|d| d.embedding).collect();
        for embedding in &embeddings {
            self.check_dimension(embedding)?;
        }
        Ok(embeddings)
    }

    /// Generate embedding using Ollama API
    async fn generate_ollama(&self, text: &str) -> Result<Vec<f32>> {
        #[derive(Serialize)]
        struct OllamaRequest<'a> {
            model: &'a str,
            prompt: &'a str,
        }

        #[derive(Deserialize)]
        struct OllamaResponse {
            embedding: Vec<f32>,
        }

        let url = format!("{}/api/embeddings", self.endpoint);
        debug!("Calling Ollama embeddings API: {}", url);

        let request = OllamaRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| RagBenchError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagBenchError::EmbeddingError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: OllamaResponse = response.json().await.map_err(|e| {
            RagBenchError::EmbeddingError(format!("Failed to parse response: {e}"))
        })?;

        self.check_dimension(&result.embedding)?;
        Ok(result.embedding)
    }
}

#[async_trait]
impl Embedder for EmbeddingClient {
    fn model(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        match self.provider {
            EmbeddingProvider::OpenAI => self
                .generate_openai(vec![text])
                .await?
                .into_iter()
                .next()
                .ok_or_else(|| RagBenchError::EmbeddingError("No embedding in response".to_string())),
            EmbeddingProvider::Ollama => self.generate_ollama(text).await,
        }
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        match self.provider {
            EmbeddingProvider::OpenAI => self.generate_openai(texts.to_vec()).await,
            EmbeddingProvider::Ollama => {
                let owned: Vec<String> = texts.iter().map(|text| (*text).to_string()).collect();
                // `buffered` yields results in input order
                let results: Vec<Result<Vec<f32>>> = stream::iter(owned)
                    .map(|text| async move { self.generate_ollama(&text).await })
                    .buffered(OLLAMA_CONCURRENCY.min(texts.len()))
                    .collect()
                    .await;

                results.into_iter().collect()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use wiremock::matchers::body_partial_json;
    use wiremock::matchers::method;
    use wiremock::matchers::path;
    use wiremock::Mock;
    use wiremock::MockServer;
    use wiremock::ResponseTemplate;

    use super::*;

    #[test]
    fn test_provider_parsing() {
        assert_eq!("OpenAI".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::OpenAI);
        assert_eq!("ollama".parse::<EmbeddingProvider>().unwrap(), EmbeddingProvider::Ollama);
        assert!(matches!(
            "bert".parse::<EmbeddingProvider>(),
            Err(RagBenchError::ConfigError(_))
        ));
    }

    fn ollama_config(endpoint: String) -> EmbeddingConfig {
        EmbeddingConfig {
            provider: EmbeddingProvider::Ollama,
            model: "nomic-embed-text".to_string(),
            dimension: 2,
            endpoint,
            api_key: None,
            timeout_secs: 5,
        }
    }

    async fn mount_embedding(server: &MockServer, prompt: &str, embedding: [f32; 2]) {
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .and(body_partial_json(json!({ "prompt": prompt })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": embedding })))
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_ollama_batch_keeps_input_order() {
        let server = MockServer::start().await;
        mount_embedding(&server, "first", [1.0, 0.0]).await;
        mount_embedding(&server, "second", [0.0, 1.0]).await;
        mount_embedding(&server, "third", [0.5, 0.5]).await;

        let client = EmbeddingClient::new(&ollama_config(server.uri())).unwrap();
        // Spawning requires the batch future to be Send
        let embeddings = tokio::spawn(async move {
            client.embed_batch(&["first", "second", "third"]).await
        })
        .await
        .unwrap()
        .unwrap();

        assert_eq!(embeddings, vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![0.5, 0.5]]);
    }

    #[tokio::test]
    async fn test_ollama_dimension_mismatch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "embedding": [1.0, 2.0, 3.0] })))
            .mount(&server)
            .await;

        let client = EmbeddingClient::new(&ollama_config(server.uri())).unwrap();
        assert!(matches!(
            client.embed_batch(&["text"]).await,
            Err(RagBenchError::EmbeddingError(_))
        ));
    }

    #[tokio::test]
    #[ignore = "Requires API key"]
    async fn test_openai_embedding() {
        let client = EmbeddingClient::new(&EmbeddingConfig {
            provider: EmbeddingProvider::OpenAI,
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            endpoint: "https://api.openai.com/v1".to_string(),
            api_key: std::env::var("OPENAI_API_KEY").ok(),
            timeout_secs: 30,
        })
        .unwrap();

        let embedding = client.embed("Hello, world!").await.unwrap();
        assert_eq!(embedding.len(), 1536);
    }
}
