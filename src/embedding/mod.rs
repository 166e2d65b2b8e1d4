//! Text embedding for the vector backend
//!
//! The store never computes vectors itself; it calls through the `Embedder`
//! trait. The shipped implementation asks a local Ollama instance via
//! `POST /api/embeddings`.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::errors::{Result, StoreError};

/// Vector width of `nomic-embed-text`
pub const EMBEDDING_DIM: usize = 768;

/// Capability of turning text into a fixed-width vector
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Embed several texts; the default just loops
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    fn dimension(&self) -> usize;
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    embedding: Vec<f32>,
}

/// Embedder backed by Ollama's embeddings endpoint
pub struct OllamaEmbedder {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaEmbedder {
    pub fn new(config: &EmbeddingConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .expect("Failed to build HTTP client");

        OllamaEmbedder {
            client,
            base_url: config.ollama_url.clone(),
            model: config.model.clone(),
        }
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let url = format!("{}/api/embeddings", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(StoreError::EmbeddingFailed(format!(
                "Ollama API error: {}",
                response.status()
            )));
        }

        let parsed: EmbeddingsResponse = response.json().await?;

        if parsed.embedding.len() != EMBEDDING_DIM {
            return Err(StoreError::EmbeddingFailed(format!(
                "Unexpected embedding width {} from model {}",
                parsed.embedding.len(),
                self.model
            )));
        }

        Ok(parsed.embedding)
    }

    fn dimension(&self) -> usize {
        EMBEDDING_DIM
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_deserializes() {
        let parsed: EmbeddingsResponse =
            serde_json::from_str(r#"{"embedding": [0.25, -1.5, 3.0]}"#).unwrap();
        assert_eq!(parsed.embedding, vec![0.25, -1.5, 3.0]);
    }

    #[test]
    fn test_embedder_from_config() {
        let embedder = OllamaEmbedder::new(&EmbeddingConfig::default());
        assert_eq!(embedder.dimension(), EMBEDDING_DIM);
        assert_eq!(embedder.model, "nomic-embed-text");
    }

    #[tokio::test]
    async fn test_default_batch_preserves_order() {
        struct Fixed;

        #[async_trait]
        impl Embedder for Fixed {
            async fn embed(&self, text: &str) -> Result<Vec<f32>> {
                Ok(vec![text.len() as f32])
            }

            fn dimension(&self) -> usize {
                1
            }
        }

        let texts = vec!["a".to_string(), "four".to_string()];
        let embeddings = Fixed.embed_batch(&texts).await.unwrap();
        assert_eq!(embeddings, vec![vec![1.0], vec![4.0]]);
    }
}
