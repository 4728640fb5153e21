//! FAQ service: wires the store, retriever and providers together and exposes
//! the operations the CLI (or any other front end) needs

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use tracing::warn;

use crate::config::AppConfig;
use crate::corpus::find_faq_file;
use crate::corpus::load_faq_file;
use crate::embeddings::embedder_from_config;
use crate::errors::FaqRagError;
use crate::errors::Result;
use crate::llm::GeminiProvider;
use crate::llm::OpenAiProvider;
use crate::llm::ProviderStatus;
use crate::llm::TextGenerator;
use crate::models::AnswerEnvelope;
use crate::models::FaqEntry;
use crate::models::GenerationRequest;
use crate::models::NewFaqEntry;
use crate::models::ProviderTag;
use crate::models::RetrievedMatch;
use crate::rag::AnswerOrchestrator;
use crate::rag::MatchSource;
use crate::rag::ProviderChain;
use crate::rag::Retriever;
use crate::store::VectorStore;

/// Context used when exercising a single provider
pub const PROVIDER_TEST_CONTEXT: &str = "Test context";

/// Snapshot for health/debug output
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub corpus_size: usize,
    pub store_path: PathBuf,
    pub providers: Vec<ProviderStatus>,
    pub available_providers: usize,
    /// No provider is available; every answer will be a retrieved entry
    pub fallback_mode: bool,
    pub openai_key_set: bool,
    pub google_key_set: bool,
}

/// Result of exercising one provider directly
#[derive(Debug, Clone, Serialize)]
pub struct ProviderTestReport {
    pub provider: ProviderTag,
    pub response: Option<String>,
    pub success: bool,
}

/// What `populate_if_empty` did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PopulateOutcome {
    AlreadyPopulated(usize),
    Populated { path: PathBuf, entries: usize },
    NoDataFile,
}

pub struct FaqService {
    store: Arc<VectorStore>,
    orchestrator: AnswerOrchestrator,
    openai_key_set: bool,
    google_key_set: bool,
}

impl FaqService {
    /// Build the full service from configuration
    ///
    /// # Errors
    /// - Store cannot be opened (unreadable or incompatible collection file)
    /// - Embedder cannot be built
    ///
    /// Providers never fail construction; they come up unavailable instead.
    pub async fn new(config: &AppConfig) -> Result<Self> {
        let embedder = embedder_from_config(config)?;
        let store = Arc::new(
            VectorStore::open(config.store_path(), &config.store.collection, embedder).await?,
        );

        let openai: Arc<dyn TextGenerator> = Arc::new(OpenAiProvider::from_config(&config.openai));
        let gemini: Arc<dyn TextGenerator> =
            Arc::new(GeminiProvider::from_config(&config.gemini).await);
        let providers = ProviderChain::new(vec![openai, gemini]);
        info!(
            "{} of {} AI providers available",
            providers.available_count(),
            providers.providers().len()
        );

        let mut service = Self::from_parts(store, providers, config.retrieval_limit());
        service.openai_key_set = config.openai_key_set();
        service.google_key_set = config.google_key_set();
        Ok(service)
    }

    /// Create from existing components
    pub fn from_parts(
        store: Arc<VectorStore>,
        providers: ProviderChain,
        retrieval_limit: usize,
    ) -> Self {
        let source: Arc<dyn MatchSource> = store.clone();
        let orchestrator = AnswerOrchestrator::new(Retriever::new(source), providers)
            .with_retrieval_limit(retrieval_limit);

        Self {
            store,
            orchestrator,
            openai_key_set: false,
            google_key_set: false,
        }
    }

    /// Answer a question through retrieval and the provider chain
    pub async fn answer(&self, question: &str) -> AnswerEnvelope {
        self.orchestrator.answer(question).await
    }

    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        self.orchestrator.provider_statuses()
    }

    /// Number of stored FAQ rows, duplicates included
    pub fn corpus_size(&self) -> Result<usize> {
        self.store.count()
    }

    /// Every stored FAQ, in the store's deterministic order for an empty query
    pub async fn list_faqs(&self) -> Result<Vec<RetrievedMatch>> {
        let count = self.store.count()?;
        if count == 0 {
            return Ok(Vec::new());
        }
        self.store.query("", count).await
    }

    pub async fn ingest(&self, entries: &[NewFaqEntry]) -> Result<Vec<FaqEntry>> {
        self.store.ingest(entries).await
    }

    /// Ingest a corpus file; with `clear_first` the store is emptied beforehand
    pub async fn ingest_file(&self, path: impl AsRef<Path>, clear_first: bool) -> Result<usize> {
        let entries = load_faq_file(path)?;
        if clear_first {
            self.store.clear().await?;
        }
        Ok(self.store.ingest(&entries).await?.len())
    }

    /// Ingest the first existing candidate file, but only into an empty store
    pub async fn populate_if_empty(&self, candidates: &[PathBuf]) -> Result<PopulateOutcome> {
        let count = self.store.count()?;
        if count > 0 {
            info!("Database already contains {} entries", count);
            return Ok(PopulateOutcome::AlreadyPopulated(count));
        }

        let Some(path) = find_faq_file(candidates) else {
            warn!("FAQ data file not found");
            return Ok(PopulateOutcome::NoDataFile);
        };

        let entries = self.ingest_file(path, false).await?;
        info!("Database populated from {}", path.display());
        Ok(PopulateOutcome::Populated {
            path: path.to_path_buf(),
            entries,
        })
    }

    pub async fn clear(&self) -> Result<usize> {
        self.store.clear().await
    }

    /// Run one provider against a fixed test context
    ///
    /// # Errors
    /// - The provider is not configured or not available
    pub async fn test_provider(
        &self,
        tag: ProviderTag,
        question: &str,
    ) -> Result<ProviderTestReport> {
        let provider = self
            .orchestrator
            .providers()
            .get(tag)
            .filter(|p| p.is_available())
            .ok_or_else(|| FaqRagError::ProviderUnavailable(tag.to_string()))?;

        let result = provider
            .generate(&GenerationRequest::new(question, PROVIDER_TEST_CONTEXT))
            .await;
        let response = result.usable_text().map(str::to_string);

        Ok(ProviderTestReport {
            provider: tag,
            success: response.is_some(),
            response,
        })
    }

    pub fn status(&self) -> Result<ServiceStatus> {
        let providers = self.provider_statuses();
        let available_providers = providers.iter().filter(|p| p.available).count();

        Ok(ServiceStatus {
            corpus_size: self.store.count()?,
            store_path: self.store.path().to_path_buf(),
            providers,
            available_providers,
            fallback_mode: available_providers == 0,
            openai_key_set: self.openai_key_set,
            google_key_set: self.google_key_set,
        })
    }

    pub fn store(&self) -> &Arc<VectorStore> {
        &self.store
    }
}
