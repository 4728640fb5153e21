//! Answer pipeline: Retrieve -> Assemble context -> Generate with fallback

use std::sync::Arc;

use tracing::field;
use tracing::info;
use tracing::instrument;
use tracing::warn;
use tracing::Span;

use crate::llm::ProviderStatus;
use crate::llm::TextGenerator;
use crate::models::AnswerEnvelope;
use crate::models::Confidence;
use crate::models::GenerationRequest;
use crate::models::ProviderTag;
use crate::rag::assemble_context;
use crate::rag::Retriever;
use crate::rag::DEFAULT_RETRIEVAL_LIMIT;

/// Returned when nothing relevant was retrieved
pub const NO_INFORMATION_ANSWER: &str = "I don't have information about that specific question. Please contact our support team for assistance.";

/// Providers in priority order. Built once at startup; each provider's
/// availability is already fixed by then.
#[derive(Clone, Default)]
pub struct ProviderChain {
    providers: Vec<Arc<dyn TextGenerator>>,
}

impl ProviderChain {
    pub fn new(providers: Vec<Arc<dyn TextGenerator>>) -> Self {
        Self { providers }
    }

    pub fn providers(&self) -> &[Arc<dyn TextGenerator>] {
        &self.providers
    }

    pub fn get(&self, tag: ProviderTag) -> Option<&Arc<dyn TextGenerator>> {
        self.providers.iter().find(|p| p.tag() == tag)
    }

    pub fn statuses(&self) -> Vec<ProviderStatus> {
        self.providers.iter().map(|p| p.status()).collect()
    }

    pub fn available_count(&self) -> usize {
        self.providers.iter().filter(|p| p.is_available()).count()
    }
}

/// Composes retrieval and the provider chain into one answer per question
pub struct AnswerOrchestrator {
    retriever: Retriever,
    providers: ProviderChain,
    retrieval_limit: usize,
}

impl AnswerOrchestrator {
    pub fn new(retriever: Retriever, providers: ProviderChain) -> Self {
        Self {
            retriever,
            providers,
            retrieval_limit: DEFAULT_RETRIEVAL_LIMIT,
        }
    }

    #[must_use]
    pub fn with_retrieval_limit(mut self, limit: usize) -> Self {
        self.retrieval_limit = limit.max(1);
        self
    }

    /// Answer a question. Always produces an envelope: generation failures
    /// degrade to the top retrieved entry, an empty retrieval to a fixed reply.
    #[instrument(
        name = "faq_bot_conversation",
        skip(self),
        fields(provider = field::Empty, confidence = field::Empty, matches = field::Empty)
    )]
    pub async fn answer(&self, question: &str) -> AnswerEnvelope {
        let matches = self.retriever.retrieve(question, self.retrieval_limit).await;
        let span = Span::current();
        span.record("matches", matches.len());

        let Some(top) = matches.first() else {
            span.record("provider", ProviderTag::None.as_str());
            span.record("confidence", "low");
            info!("No relevant FAQs found");
            return AnswerEnvelope {
                question: question.to_string(),
                answer: NO_INFORMATION_ANSWER.to_string(),
                relevant_matches: Vec::new(),
                confidence: Confidence::Low,
                provider: ProviderTag::None,
            };
        };

        let request = GenerationRequest::new(question, assemble_context(&matches));

        let mut answer = None;
        for provider in self.providers.providers() {
            if !provider.is_available() {
                continue;
            }
            let result = provider.generate(&request).await;
            if let Some(text) = result.usable_text() {
                info!("{} response generated", provider.tag());
                answer = Some((text.to_string(), provider.tag()));
                break;
            }
        }

        let (answer, provider) = answer.unwrap_or_else(|| {
            warn!("Using fallback response");
            (top.answer.trim().to_string(), ProviderTag::Fallback)
        });
        let confidence = Confidence::for_match_count(matches.len());

        span.record("provider", provider.as_str());
        span.record("confidence", field::display(confidence));

        AnswerEnvelope {
            question: question.to_string(),
            answer,
            relevant_matches: matches,
            confidence,
            provider,
        }
    }

    pub fn providers(&self) -> &ProviderChain {
        &self.providers
    }

    pub fn provider_statuses(&self) -> Vec<ProviderStatus> {
        self.providers.statuses()
    }

    pub const fn retriever(&self) -> &Retriever {
        &self.retriever
    }
}
