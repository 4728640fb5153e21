//! Retrieval of FAQ matches from a similarity-search backend

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use tracing::warn;

use crate::errors::FaqRagError;
use crate::errors::Result;
use crate::models::RetrievedMatch;
use crate::store::VectorStore;

/// Default number of matches handed to the providers
pub const DEFAULT_RETRIEVAL_LIMIT: usize = 3;

/// Call signature a backend exposes for nearest-neighbour queries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryInterface {
    /// `query(text, limit)`
    Limit,
    /// Older backends: `query_top_k(text, top_k)`
    TopK,
}

/// Similarity-search backend the retriever reads from
#[async_trait]
pub trait MatchSource: Send + Sync {
    /// Interface this backend implements; read once when the retriever is built
    fn interface(&self) -> QueryInterface {
        QueryInterface::Limit
    }

    /// Up to `limit` matches, most similar first
    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RetrievedMatch>>;

    async fn query_top_k(&self, text: &str, top_k: usize) -> Result<Vec<RetrievedMatch>> {
        let _ = (text, top_k);
        Err(FaqRagError::StoreError(
            "backend does not implement query_top_k".to_string(),
        ))
    }
}

#[async_trait]
impl MatchSource for VectorStore {
    async fn query(&self, text: &str, limit: usize) -> Result<Vec<RetrievedMatch>> {
        VectorStore::query(self, text, limit).await
    }
}

/// Turns a question into ranked FAQ matches. Adds no ranking of its own.
pub struct Retriever {
    source: Arc<dyn MatchSource>,
    interface: QueryInterface,
}

impl Retriever {
    /// Create a new retriever, negotiating the backend's query interface
    pub fn new(source: Arc<dyn MatchSource>) -> Self {
        let interface = source.interface();
        debug!("Retriever bound to {:?} query interface", interface);
        Self { source, interface }
    }

    pub const fn interface(&self) -> QueryInterface {
        self.interface
    }

    /// Up to `limit` matches in the backend's order. Backend failures are logged
    /// and produce an empty list.
    pub async fn retrieve(&self, question: &str, limit: usize) -> Vec<RetrievedMatch> {
        let result = match self.interface {
            QueryInterface::Limit => self.source.query(question, limit).await,
            QueryInterface::TopK => self.source.query_top_k(question, limit).await,
        };

        match result {
            Ok(mut matches) => {
                // A backend returning more than asked for is trimmed, never reordered
                matches.truncate(limit);
                debug!("Retrieved {} matches", matches.len());
                matches
            }
            Err(e) => {
                warn!("Database search error: {}", e);
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn faq(question: &str, answer: &str) -> RetrievedMatch {
        RetrievedMatch {
            question: question.to_string(),
            answer: answer.to_string(),
        }
    }

    struct LimitSource(Vec<RetrievedMatch>);

    #[async_trait]
    impl MatchSource for LimitSource {
        async fn query(&self, _text: &str, limit: usize) -> Result<Vec<RetrievedMatch>> {
            Ok(self.0.iter().take(limit).cloned().collect())
        }
    }

    struct LegacySource(Vec<RetrievedMatch>);

    #[async_trait]
    impl MatchSource for LegacySource {
        fn interface(&self) -> QueryInterface {
            QueryInterface::TopK
        }

        async fn query(&self, _text: &str, _limit: usize) -> Result<Vec<RetrievedMatch>> {
            Err(FaqRagError::StoreError("unexpected keyword 'limit'".to_string()))
        }

        async fn query_top_k(&self, _text: &str, top_k: usize) -> Result<Vec<RetrievedMatch>> {
            Ok(self.0.iter().take(top_k).cloned().collect())
        }
    }

    struct BrokenSource;

    #[async_trait]
    impl MatchSource for BrokenSource {
        async fn query(&self, _text: &str, _limit: usize) -> Result<Vec<RetrievedMatch>> {
            Err(FaqRagError::StoreError("index unreadable".to_string()))
        }
    }

    /// Ignores the limit entirely
    struct GreedySource(Vec<RetrievedMatch>);

    #[async_trait]
    impl MatchSource for GreedySource {
        async fn query(&self, _text: &str, _limit: usize) -> Result<Vec<RetrievedMatch>> {
            Ok(self.0.clone())
        }
    }

    fn corpus() -> Vec<RetrievedMatch> {
        vec![
            faq("What is your return policy?", "30 days."),
            faq("How long does shipping take?", "3-5 business days."),
            faq("Do you ship abroad?", "Yes."),
        ]
    }

    #[tokio::test]
    async fn test_retrieve_delegates_with_limit() {
        let retriever = Retriever::new(Arc::new(LimitSource(corpus())));

        assert_eq!(retriever.interface(), QueryInterface::Limit);
        assert_eq!(retriever.retrieve("returns", 2).await, corpus()[..2].to_vec());
    }

    #[tokio::test]
    async fn test_legacy_backend_uses_top_k() {
        let retriever = Retriever::new(Arc::new(LegacySource(corpus())));

        assert_eq!(retriever.interface(), QueryInterface::TopK);
        assert_eq!(retriever.retrieve("returns", 1).await, corpus()[..1].to_vec());
    }

    #[tokio::test]
    async fn test_backend_failure_yields_empty() {
        let retriever = Retriever::new(Arc::new(BrokenSource));
        assert!(retriever.retrieve("returns", 3).await.is_empty());
    }

    #[tokio::test]
    async fn test_overlong_results_are_truncated_in_order() {
        let retriever = Retriever::new(Arc::new(GreedySource(corpus())));
        let matches = retriever.retrieve("anything", 2).await;

        assert_eq!(matches, corpus()[..2].to_vec());
    }
}
