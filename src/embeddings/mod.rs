//! Embeddings generation module
//!
//! Documents and questions are turned into vectors by an [`Embedder`]:
//! - a local feature-hashing embedder (default, no network access)
//! - OpenAI-compatible embedding endpoints
//! - Ollama local models
//!
//! # Examples
//!
//! ```rust,no_run
//! use faqrag::config::AppConfig;
//! use faqrag::embeddings::embedder_from_config;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let embedder = embedder_from_config(&config)?;
//!
//!     let embedding = embedder.embed("How long does shipping take?").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod hashing;

use std::sync::Arc;

use async_trait::async_trait;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;
pub use hashing::HashingEmbedder;

use crate::config::AppConfig;
use crate::config::EmbeddingBackend;
use crate::errors::Result;

/// Maximum batch size for embedding generation
pub const MAX_BATCH_SIZE: usize = 100;

/// Text embedding capability used by the vector store
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts, preserving order
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());
        for text in texts {
            embeddings.push(self.embed(text).await?);
        }
        Ok(embeddings)
    }

    /// Embedding dimensions
    fn dimension(&self) -> usize;

    /// Model name recorded in the store header
    fn model_name(&self) -> &str;
}

/// Build the embedder selected in the configuration
pub fn embedder_from_config(config: &AppConfig) -> Result<Arc<dyn Embedder>> {
    let embeddings = &config.embeddings;
    let embedder: Arc<dyn Embedder> = match embeddings.backend {
        EmbeddingBackend::Hashing => Arc::new(HashingEmbedder::new(embeddings.dimension)),
        EmbeddingBackend::OpenAI => Arc::new(EmbeddingClient::new(
            EmbeddingProvider::OpenAI,
            embeddings.model.clone(),
            embeddings.endpoint.clone(),
            config.openai.api_key.clone(),
            embeddings.dimension,
        )?),
        EmbeddingBackend::Ollama => Arc::new(EmbeddingClient::new(
            EmbeddingProvider::Ollama,
            embeddings.model.clone(),
            embeddings.endpoint.clone(),
            None,
            embeddings.dimension,
        )?),
    };
    Ok(embedder)
}

/// Cosine similarity; zero vectors are dissimilar to everything
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0f32;
    let mut na = 0.0f32;
    let mut nb = 0.0f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na.sqrt() * nb.sqrt())
    }
}

pub(crate) fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let n2: f32 = v.iter().map(|x| x * x).sum();
    if n2 > 0.0 {
        let norm = n2.sqrt();
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cosine_similarity_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_similarity_zero_vector() {
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 2.0]), 0.0);
    }

    #[test]
    fn test_l2_normalize() {
        let v = l2_normalize(vec![3.0, 4.0]);
        assert!((v[0] - 0.6).abs() < 1e-6);
        assert!((v[1] - 0.8).abs() < 1e-6);
        assert_eq!(l2_normalize(vec![0.0, 0.0]), vec![0.0, 0.0]);
    }

    #[tokio::test]
    async fn test_default_config_uses_hashing_embedder() {
        let embedder = embedder_from_config(&AppConfig::default()).unwrap();
        assert_eq!(embedder.dimension(), 384);
        assert_eq!(embedder.embed("hello").await.unwrap().len(), 384);
    }
}
