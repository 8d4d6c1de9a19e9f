//! In-memory vector retrieval over table schemas.
//!
//! The index is built fresh at startup from the described tables; there are
//! only ever as many entries as database tables, so a flat scan with cosine
//! similarity is sufficient.

use crate::embeddings::EmbeddingProvider;
use crate::types::TableSchema;
use std::sync::Arc;
use tabletalk_core::{AppError, AppResult};

/// An indexed table schema with its embedding.
#[derive(Debug, Clone)]
struct IndexEntry {
    schema: TableSchema,
    embedding: Vec<f32>,
}

/// Flat in-memory index of table schemas.
#[derive(Debug, Default)]
pub struct SchemaIndex {
    entries: Vec<IndexEntry>,
}

impl SchemaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a schema with its embedding to the index.
    pub fn insert(&mut self, schema: TableSchema, embedding: Vec<f32>) {
        self.entries.push(IndexEntry { schema, embedding });
    }

    /// Search for the top-k most similar schemas to the query embedding.
    ///
    /// Returns schemas ordered by descending similarity score.
    pub fn search(&self, query_embedding: &[f32], top_k: usize) -> Vec<(TableSchema, f32)> {
        let mut results: Vec<(TableSchema, f32)> = self
            .entries
            .iter()
            .map(|entry| {
                let score = cosine_similarity(query_embedding, &entry.embedding);
                (entry.schema.clone(), score)
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(top_k);

        results
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Mismatched lengths and zero-norm vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}

/// Retrieves the table schemas most relevant to a question.
pub struct SchemaRetriever {
    provider: Arc<dyn EmbeddingProvider>,
    index: SchemaIndex,
}

impl SchemaRetriever {
    /// Build a retriever by embedding all table schemas.
    pub async fn build(
        provider: Arc<dyn EmbeddingProvider>,
        schemas: Vec<TableSchema>,
    ) -> AppResult<Self> {
        let texts: Vec<String> = schemas.iter().map(TableSchema::embedding_text).collect();

        tracing::info!(
            "Indexing {} table schemas with provider '{}' (model: {})",
            schemas.len(),
            provider.provider_name(),
            provider.model_name()
        );

        let embeddings = provider.embed_batch(&texts).await?;

        if embeddings.len() != schemas.len() {
            return Err(AppError::Schema(format!(
                "Embedding count mismatch: {} schemas, {} embeddings",
                schemas.len(),
                embeddings.len()
            )));
        }

        let mut index = SchemaIndex::new();
        for (schema, embedding) in schemas.into_iter().zip(embeddings) {
            index.insert(schema, embedding);
        }

        Ok(Self { provider, index })
    }

    /// Retrieve the top-k schemas relevant to a question.
    pub async fn retrieve(&self, question: &str, top_k: usize) -> AppResult<Vec<TableSchema>> {
        if self.index.is_empty() {
            return Err(AppError::Schema(
                "Schema index is empty; no tables have been described".to_string(),
            ));
        }

        let query_embedding = self.provider.embed(question).await?;
        let results = self.index.search(&query_embedding, top_k);

        tracing::debug!(
            "Retrieved {} schemas for question (requested top-{})",
            results.len(),
            top_k
        );

        Ok(results.into_iter().map(|(schema, _)| schema).collect())
    }

    /// Number of indexed schemas.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::MockEmbedder;

    fn schema(name: &str, context: &str) -> TableSchema {
        TableSchema {
            table_name: name.to_string(),
            context: Some(context.to_string()),
        }
    }

    #[test]
    fn test_cosine_similarity() {
        let a = vec![1.0, 0.0, 0.0];
        let b = vec![1.0, 0.0, 0.0];
        assert!((cosine_similarity(&a, &b) - 1.0).abs() < 0.001);

        let c = vec![1.0, 0.0, 0.0];
        let d = vec![0.0, 1.0, 0.0];
        assert!((cosine_similarity(&c, &d) - 0.0).abs() < 0.001);
    }

    #[test]
    fn test_cosine_similarity_mismatched_lengths() {
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[1.0]), 0.0);
    }

    #[test]
    fn test_cosine_similarity_zero_norm() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }

    #[test]
    fn test_search_orders_by_score_and_truncates() {
        let mut index = SchemaIndex::new();
        index.insert(schema("a", ""), vec![1.0, 0.0]);
        index.insert(schema("b", ""), vec![0.0, 1.0]);
        index.insert(schema("c", ""), vec![0.7, 0.7]);

        let results = index.search(&[1.0, 0.0], 2);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].0.table_name, "a");
        assert_eq!(results[1].0.table_name, "c");
        assert!(results[0].1 >= results[1].1);
    }

    #[tokio::test]
    async fn test_retriever_finds_exact_schema() {
        let provider = Arc::new(MockEmbedder::new(64));
        let schemas = vec![
            schema("orders", "Customer purchase records"),
            schema("products", "Product catalog with prices"),
            schema("employees", "Staff directory"),
        ];

        let retriever = SchemaRetriever::build(provider, schemas).await.unwrap();
        assert_eq!(retriever.len(), 3);

        // The query matching an indexed text exactly must rank first.
        let results = retriever
            .retrieve("orders: Customer purchase records", 1)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].table_name, "orders");
    }

    #[tokio::test]
    async fn test_retriever_empty_index() {
        let provider = Arc::new(MockEmbedder::new(64));
        let retriever = SchemaRetriever::build(provider, vec![]).await.unwrap();

        let err = retriever.retrieve("anything", 3).await.unwrap_err();
        assert!(err.to_string().contains("index is empty"));
    }

    #[tokio::test]
    async fn test_retriever_top_k_caps_results() {
        let provider = Arc::new(MockEmbedder::new(64));
        let schemas = vec![
            schema("orders", "a"),
            schema("products", "b"),
            schema("employees", "c"),
        ];

        let retriever = SchemaRetriever::build(provider, schemas).await.unwrap();
        let results = retriever.retrieve("question", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }
}
