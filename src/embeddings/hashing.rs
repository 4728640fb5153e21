//! Local feature-hashing embedder
//!
//! Words and character trigrams are hashed into a fixed number of buckets with a
//! signed contribution, then the vector is L2-normalized. Deterministic and
//! offline, so it doubles as the embedder used in tests.

use async_trait::async_trait;
use sha2::Digest;
use sha2::Sha256;

use super::l2_normalize;
use super::Embedder;
use crate::errors::Result;

const MODEL_NAME: &str = "feature-hashing-v1";

/// Trigrams count less than whole words
const TRIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    /// Embed synchronously; the async trait method delegates here
    #[must_use]
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0f32; self.dimension];

        for word in tokenize(text) {
            self.add_feature(&mut v, &word, 1.0);

            let chars: Vec<char> = format!("#{word}#").chars().collect();
            for window in chars.windows(3) {
                let trigram: String = window.iter().collect();
                self.add_feature(&mut v, &trigram, TRIGRAM_WEIGHT);
            }
        }

        l2_normalize(v)
    }

    fn add_feature(&self, v: &mut [f32], feature: &str, weight: f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let hash = u64::from_le_bytes(bytes);

        let bucket = (hash % self.dimension as u64) as usize;
        let sign = if digest[8] & 1 == 0 { 1.0 } else { -1.0 };
        v[bucket] += sign * weight;
    }
}

/// Lowercased alphanumeric words
fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.embed_text(text))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn model_name(&self) -> &str {
        MODEL_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embeddings::cosine_similarity;

    #[test]
    fn test_tokenize() {
        assert_eq!(
            tokenize("Q: What's your return-policy?"),
            vec!["q", "what", "s", "your", "return", "policy"]
        );
        assert!(tokenize("  ?! ").is_empty());
    }

    #[test]
    fn test_embedding_is_deterministic_and_normalized() {
        let embedder = HashingEmbedder::new(64);
        let a = embedder.embed_text("How long does shipping take?");
        let b = embedder.embed_text("How long does shipping take?");

        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_empty_text_embeds_to_zero_vector() {
        let embedder = HashingEmbedder::new(16);
        assert!(embedder.embed_text("").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_related_text_scores_higher() {
        let embedder = HashingEmbedder::new(384);
        let query = embedder.embed_text("What is your return policy?");
        let related = embedder.embed_text("Q: What is your return policy? A: 30 days.");
        let unrelated = embedder.embed_text("Q: How long does shipping take? A: 5 business days.");

        assert!(cosine_similarity(&query, &related) > cosine_similarity(&query, &unrelated));
    }

    #[test]
    fn test_case_insensitive() {
        let embedder = HashingEmbedder::new(128);
        assert_eq!(
            embedder.embed_text("Refund POLICY"),
            embedder.embed_text("refund policy")
        );
    }
}
