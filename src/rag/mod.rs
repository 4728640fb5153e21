//! RAG (Retrieval-Augmented Generation) module
//!
//! This module turns a free-text question into an answer:
//! - Semantic retrieval of FAQ entries from the vector store
//! - Context assembly from the retrieved entries
//! - Answer generation through an ordered chain of providers, falling back to
//!   the best retrieved entry when no provider produces text
//!
//! # Examples
//!
//! ```rust,no_run
//! use faqrag::config::AppConfig;
//! use faqrag::service::FaqService;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = FaqService::new(&config).await?;
//!
//!     let response = service.answer("What is your return policy?").await;
//!     println!("Answer: {}", response.answer);
//!     println!("Provider: {}", response.provider);
//!
//!     Ok(())
//! }
//! ```

pub mod context;
pub mod pipeline;
pub mod retriever;

pub use context::assemble_context;
pub use pipeline::AnswerOrchestrator;
pub use pipeline::ProviderChain;
pub use pipeline::NO_INFORMATION_ANSWER;
pub use retriever::MatchSource;
pub use retriever::QueryInterface;
pub use retriever::Retriever;
pub use retriever::DEFAULT_RETRIEVAL_LIMIT;
