//! Ollama embedding provider.
//!
//! Uses Ollama's local embeddings API with models like nomic-embed-text.
//! Requests are retried with exponential backoff on transient failures.

use crate::embeddings::EmbeddingProvider;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tabletalk_core::{AppError, AppResult};

/// Default Ollama API endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

const EMBEDDING_ENDPOINT: &str = "/api/embeddings";

/// Maximum retry attempts for failed requests.
const MAX_RETRIES: u32 = 3;

/// Initial backoff duration in milliseconds.
const INITIAL_BACKOFF_MS: u64 = 100;

/// Default dimensions for nomic-embed-text.
const DEFAULT_DIMENSIONS: usize = 768;

/// Request payload for the Ollama embeddings API.
#[derive(Debug, Serialize)]
struct EmbeddingRequest {
    model: String,
    prompt: String,
}

/// Response from the Ollama embeddings API.
#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f32>,
}

/// Ollama embedding provider using the local API.
#[derive(Debug, Clone)]
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimensions: usize,
}

impl OllamaEmbedder {
    /// Create a provider with the default dimensions (nomic-embed-text).
    pub fn new(base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_dimensions(base_url, model, DEFAULT_DIMENSIONS)
    }

    /// Create a provider with explicit dimensions.
    pub fn with_dimensions(
        base_url: impl Into<String>,
        model: impl Into<String>,
        dimensions: usize,
    ) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
            model: model.into(),
            dimensions,
        }
    }

    /// Embed one text, retrying transient failures with backoff.
    async fn embed_one(&self, text: &str) -> AppResult<Vec<f32>> {
        let url = format!("{}{}", self.base_url, EMBEDDING_ENDPOINT);
        let request = EmbeddingRequest {
            model: self.model.clone(),
            prompt: text.to_string(),
        };

        let mut backoff_ms = INITIAL_BACKOFF_MS;
        let mut last_error = None;

        for attempt in 1..=MAX_RETRIES {
            let result = self.client.post(&url).json(&request).send().await;

            match result {
                Ok(response) if response.status().is_success() => {
                    let parsed: EmbeddingResponse = response.json().await.map_err(|e| {
                        AppError::Schema(format!("Failed to parse embedding response: {}", e))
                    })?;

                    if parsed.embedding.len() != self.dimensions {
                        return Err(AppError::Schema(format!(
                            "Embedding dimension mismatch: expected {}, got {}",
                            self.dimensions,
                            parsed.embedding.len()
                        )));
                    }

                    return Ok(parsed.embedding);
                }
                Ok(response) => {
                    let status = response.status();
                    let body = response
                        .text()
                        .await
                        .unwrap_or_else(|_| "Unknown error".to_string());

                    // Client errors will not succeed on retry
                    if status.is_client_error() {
                        return Err(AppError::Schema(format!(
                            "Ollama embeddings API error ({}): {}",
                            status, body
                        )));
                    }

                    last_error = Some(format!("({}): {}", status, body));
                }
                Err(e) => {
                    last_error = Some(e.to_string());
                }
            }

            if attempt < MAX_RETRIES {
                tracing::warn!(
                    "Embedding request failed (attempt {}/{}), retrying in {}ms",
                    attempt,
                    MAX_RETRIES,
                    backoff_ms
                );
                tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
                backoff_ms *= 2;
            }
        }

        Err(AppError::Schema(format!(
            "Embedding request failed after {} attempts: {}",
            MAX_RETRIES,
            last_error.unwrap_or_else(|| "unknown error".to_string())
        )))
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OllamaEmbedder {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for text in texts {
            embeddings.push(self.embed_one(text).await?);
        }

        Ok(embeddings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn test_embed_against_mock_server() {
        let server = MockServer::start().await;
        let embedding: Vec<f32> = vec![0.1; 4];

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": embedding,
            })))
            .mount(&server)
            .await;

        let provider = OllamaEmbedder::with_dimensions(server.uri(), "nomic-embed-text", 4);
        let result = provider.embed("orders table").await.unwrap();
        assert_eq!(result.len(), 4);
    }

    #[tokio::test]
    async fn test_dimension_mismatch() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "embedding": [0.1, 0.2],
            })))
            .mount(&server)
            .await;

        let provider = OllamaEmbedder::with_dimensions(server.uri(), "nomic-embed-text", 4);
        let err = provider.embed("orders table").await.unwrap_err();
        assert!(err.to_string().contains("dimension mismatch"));
    }

    #[tokio::test]
    async fn test_client_error_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(404).set_body_string("model not found"))
            .expect(1)
            .mount(&server)
            .await;

        let provider = OllamaEmbedder::with_dimensions(server.uri(), "missing-model", 4);
        let err = provider.embed("orders table").await.unwrap_err();
        assert!(err.to_string().contains("model not found"));
    }

    #[tokio::test]
    async fn test_server_error_is_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/api/embeddings"))
            .respond_with(ResponseTemplate::new(500).set_body_string("overloaded"))
            .expect(3)
            .mount(&server)
            .await;

        let provider = OllamaEmbedder::with_dimensions(server.uri(), "nomic-embed-text", 4);
        let err = provider.embed("orders table").await.unwrap_err();
        assert!(err.to_string().contains("after 3 attempts"));
    }
}
