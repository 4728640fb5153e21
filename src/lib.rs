//! faqrag: retrieval-augmented FAQ answering
//!
//! Questions are matched against a persistent FAQ vector store, the best
//! matches become the context for an AI provider, and when no provider can
//! answer the best stored answer is returned as-is.

pub mod cli;
pub mod config;
pub mod corpus;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod models;
pub mod rag;
pub mod service;
pub mod store;

#[cfg(test)]
mod tests;

pub use config::AppConfig;
pub use errors::*;
pub use service::FaqService;
