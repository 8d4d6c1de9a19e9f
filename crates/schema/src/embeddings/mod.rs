//! Embedding providers for table schema retrieval.
//!
//! Provides a provider-agnostic trait plus an Ollama-backed implementation
//! and a deterministic mock for tests.

pub mod mock;
pub mod ollama;

pub use mock::MockEmbedder;
pub use ollama::OllamaEmbedder;

use std::sync::Arc;
use tabletalk_core::{AppError, AppResult};

/// Trait for embedding providers.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Get provider name (e.g., "ollama", "mock")
    fn provider_name(&self) -> &str;

    /// Get model identifier
    fn model_name(&self) -> &str;

    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Generate embeddings for multiple texts in a batch.
    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>>;

    /// Generate embedding for a single text (convenience method).
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>> {
        let mut results = self.embed_batch(&[text.to_string()]).await?;
        results
            .pop()
            .ok_or_else(|| AppError::Schema("No embedding returned".to_string()))
    }
}

/// Create an embedding provider by name.
pub fn create_embedder(
    provider: &str,
    endpoint: Option<&str>,
    model: &str,
) -> AppResult<Arc<dyn EmbeddingProvider>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let base_url = endpoint.unwrap_or(ollama::DEFAULT_OLLAMA_URL);
            Ok(Arc::new(OllamaEmbedder::new(base_url, model)))
        }
        "mock" => Ok(Arc::new(MockEmbedder::new(mock::DEFAULT_DIMENSIONS))),
        _ => Err(AppError::Schema(format!(
            "Unknown embedding provider: '{}'. Supported providers: ollama, mock",
            provider
        ))),
    }
}
