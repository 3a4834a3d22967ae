//! LLM text generation
//!
//! [`TextGenerator`] is what the pipeline, HyDE and query expansion depend
//! on; [`LlmService`] implements it over HTTP.

pub mod prompts;

use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;

use crate::config::AppConfig;
use crate::errors::RagBenchError;
use crate::Result;

/// Sampling parameters for a single generation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: usize,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            max_tokens: crate::config::default_max_tokens(),
        }
    }
}

impl GenerationParams {
    pub fn from_app_config(config: &AppConfig) -> Self {
        Self {
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }
}

/// Produces text from a prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String>;
}

/// Chat message in OpenAI format
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProvider {
    /// `OpenAI`-compatible `/chat/completions`
    OpenAI,
    /// Ollama `/api/generate`
    Ollama,
}

impl FromStr for LlmProvider {
    type Err = RagBenchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "ollama" => Ok(Self::Ollama),
            other => Err(RagBenchError::ConfigError(format!(
                "unknown llm provider '{other}' (expected openai or ollama)"
            ))),
        }
    }
}

/// HTTP client for chat/completion endpoints
pub struct LlmService {
    provider: LlmProvider,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    client: Client,
}

impl LlmService {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let provider: LlmProvider = config.llm.provider.parse()?;
        if provider == LlmProvider::OpenAI && config.llm.api_key.is_none() {
            return Err(RagBenchError::ConfigError(
                "llm.api_key is required for the openai provider".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.llm.timeout_secs))
            .build()
            .map_err(|e| RagBenchError::HttpError(e.to_string()))?;

        Ok(Self {
            provider,
            endpoint: config.llm_endpoint().trim_end_matches('/').to_string(),
            api_key: config.llm.api_key.clone(),
            model: config.llm_model().to_string(),
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    async fn chat_openai(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        #[derive(Serialize)]
        struct ChatRequest<'a> {
            model: &'a str,
            messages: Vec<ChatMessage>,
            temperature: f32,
            max_tokens: usize,
        }

        #[derive(Deserialize)]
        struct ChatResponse {
            choices: Vec<Choice>,
        }

        #[derive(Deserialize)]
        struct Choice {
            message: ChatMessage,
        }

        let url = format!("{}/chat/completions", self.endpoint);
        debug!("Calling chat completions API: {}", url);

        let request = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage::user(prompt)],
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let mut builder = self.client.post(&url).json(&request);
        if let Some(api_key) = &self.api_key {
            builder = builder.header("Authorization", format!("Bearer {api_key}"));
        }
        let response = builder
            .send()
            .await
            .map_err(|e| RagBenchError::HttpError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(RagBenchError::LlmError(format!(
                "Chat API error ({status}): {error_text}"
            )));
        }

        let result: ChatResponse = response
            .json()
            .await
            .map_err(|e| RagBenchError::LlmError(format!("Failed to parse response: {e}")))?;

        result
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| RagBenchError::LlmError("No choices in response".to_string()))
    }

    async fn generate_ollama(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        #[derive(Serialize)]
        struct GenerateRequest<'a> {
            model: &'a str,
            prompt: &'a str,
            stream: bool,
            options: GenerateOptions,
        }

        #[derive(Serialize)]
        struct GenerateOptions {
            temperature: f32,
            num_predict: usize,
        }

        #[derive(Deserialize)]
        struct GenerateResponse {
            response: String,
        }

        let url = format!("{}/api/generate", self.endpoint);
        debug!("Calling Ollama generate API: {}", url);

        let request = GenerateRequest {
            model: &self.model,
            prompt,
            stream: false,
            options: GenerateOptions {
                temperature: params.temperature,
                num_predict: params.max_tokens,
            },
        };

        let response = self
            .client
            .post(&url)
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
            return Err(RagBenchError::LlmError(format!(
                "Ollama API error ({status}): {error_text}"
            )));
        }

        let result: GenerateResponse = response
            .json()
            .await
            .map_err(|e| RagBenchError::LlmError(format!("Failed to parse response: {e}")))?;

        Ok(result.response)
    }
}

#[async_trait]
impl TextGenerator for LlmService {
    async fn generate(&self, prompt: &str, params: &GenerationParams) -> Result<String> {
        let text = match self.provider {
            LlmProvider::OpenAI => self.chat_openai(prompt, params).await?,
            LlmProvider::Ollama => self.generate_ollama(prompt, params).await?,
        };
        Ok(text.trim().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_params_follow_config() {
        let mut config = AppConfig::default();
        config.llm.temperature = 0.3;
        config.llm.max_tokens = 256;

        let params = GenerationParams::from_app_config(&config);
        assert!((params.temperature - 0.3).abs() < f32::EPSILON);
        assert_eq!(params.max_tokens, 256);
    }

    #[test]
    fn test_openai_provider_requires_key() {
        let mut config = AppConfig::default();
        config.llm.provider = "openai".to_string();
        assert!(matches!(
            LlmService::new(&config),
            Err(RagBenchError::ConfigError(_))
        ));

        config.llm.api_key = Some("sk-test".to_string());
        config.llm.endpoint = "https://api.openai.com/v1/".to_string();
        let service = LlmService::new(&config).unwrap();
        assert_eq!(service.endpoint, "https://api.openai.com/v1");
    }
}
