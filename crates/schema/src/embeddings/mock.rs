//! Deterministic mock embedding provider for tests.
//!
//! Produces stable vectors derived from the text bytes, so identical texts
//! always embed identically and similarity ordering is reproducible without
//! a model server.

use crate::embeddings::EmbeddingProvider;
use tabletalk_core::AppResult;

/// Default dimensions for the mock provider.
pub const DEFAULT_DIMENSIONS: usize = 64;

/// Mock embedding provider.
#[derive(Debug, Clone)]
pub struct MockEmbedder {
    dimensions: usize,
}

impl MockEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self { dimensions }
    }

    /// Hash text bytes into a normalized vector.
    fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimensions];

        for (pos, byte) in text.bytes().enumerate() {
            let idx = (pos + byte as usize) % self.dimensions;
            vector[idx] += 1.0;
        }

        let norm: f32 = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for MockEmbedder {
    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        "mock-hash-v1"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed_batch(&self, texts: &[String]) -> AppResult<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }
}
